#![forbid(unsafe_code)]

//! Per-widget lifecycle state shared between the UI and the refresh task.
//!
//! A [`WidgetLifecycle`] holds the runtime flags of one widget (`enabled`,
//! `focusable`, focus char) plus the stop rendezvous with that widget's
//! refresh runner. All mutable state sits behind a single mutex per widget;
//! no lock is ever shared between widgets.
//!
//! # Stop handshake
//!
//! [`WidgetLifecycle::stop`] disables the widget and then blocks until the
//! runner has observed the request in [`WidgetLifecycle::next_tick`]. The
//! runner only checks between ticks, so an in-flight refresh finishes first
//! and nothing renders after `stop` returns. Stopping again is a no-op.
//!
//! ```
//! use std::thread;
//! use std::time::Duration;
//! use std::sync::Arc;
//! use gridboard_core::CommonSettings;
//! use gridboard_widgets::lifecycle::{Tick, WidgetLifecycle};
//!
//! let lifecycle = Arc::new(WidgetLifecycle::new(CommonSettings::named("demo", "Demo")));
//! assert!(lifecycle.attach_runner());
//!
//! let runner = Arc::clone(&lifecycle);
//! let handle = thread::spawn(move || {
//!     while runner.next_tick(Some(Duration::from_millis(5))) != Tick::Stop {}
//! });
//!
//! lifecycle.stop();
//! assert!(lifecycle.is_stopped());
//! handle.join().unwrap();
//! ```

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use gridboard_core::CommonSettings;

/// Progress of the stop handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPhase {
    /// No stop has been requested.
    Running,
    /// `stop` was called and is waiting for the runner.
    Requested,
    /// The runner acknowledged, or there was no runner to wait for.
    Stopped,
}

/// Why [`WidgetLifecycle::next_tick`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The refresh interval elapsed.
    Due,
    /// Someone asked for an immediate refresh.
    Requested,
    /// The widget was stopped; the runner must exit.
    Stop,
}

#[derive(Debug)]
struct LifecycleState {
    enabled: bool,
    focusable: bool,
    focus_char: String,
    refreshing: bool,
    refresh_requested: bool,
    stop: StopPhase,
    attached: bool,
    runner: Option<ThreadId>,
}

/// Runtime flags and stop rendezvous for one widget.
#[derive(Debug)]
pub struct WidgetLifecycle {
    settings: CommonSettings,
    state: Mutex<LifecycleState>,
    changed: Condvar,
}

impl WidgetLifecycle {
    /// Create the lifecycle from merged settings.
    pub fn new(settings: CommonSettings) -> Self {
        let state = LifecycleState {
            enabled: settings.enabled,
            focusable: settings.focusable,
            focus_char: settings.focus_char.clone(),
            refreshing: false,
            refresh_requested: false,
            stop: StopPhase::Running,
            attached: false,
            runner: None,
        };
        Self {
            settings,
            state: Mutex::new(state),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Settings the widget was built from.
    pub fn settings(&self) -> &CommonSettings {
        &self.settings
    }

    /// Instance name of the widget.
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Whether the widget draws a border.
    pub fn bordered(&self) -> bool {
        self.settings.bordered
    }

    /// Configured refresh interval in seconds.
    pub fn refresh_interval_secs(&self) -> u64 {
        self.settings.refresh_interval_secs
    }

    /// Time between scheduled refreshes; `None` when the interval is 0 and
    /// the widget only refreshes on request.
    pub fn refresh_interval(&self) -> Option<Duration> {
        match self.settings.refresh_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn enable(&self) {
        self.lock().enabled = true;
    }

    pub fn disable(&self) {
        self.lock().enabled = false;
    }

    pub fn enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn disabled(&self) -> bool {
        !self.lock().enabled
    }

    /// A disabled widget is never focusable, whatever its configuration says.
    pub fn focusable(&self) -> bool {
        let state = self.lock();
        state.enabled && state.focusable
    }

    pub fn set_focusable(&self, focusable: bool) {
        self.lock().focusable = focusable;
    }

    /// Key that focuses this widget; empty when none is assigned.
    pub fn focus_char(&self) -> String {
        self.lock().focus_char.clone()
    }

    pub fn set_focus_char(&self, focus_char: impl Into<String>) {
        self.lock().focus_char = focus_char.into();
    }

    /// Whether the runner is inside a refresh right now.
    pub fn refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Set by the runner around each refresh.
    pub fn set_refreshing(&self, refreshing: bool) {
        self.lock().refreshing = refreshing;
    }

    /// Border title with the focus char appended as an underlined hint.
    pub fn contextual_title(&self, title: &str) -> String {
        let focus_char = self.focus_char();
        match (title.is_empty(), focus_char.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!(" {title} "),
            (true, false) => format!(" [darkgray::u]{focus_char}[::-][green] "),
            (false, false) => format!(" {title} [darkgray::u]{focus_char}[::-][green] "),
        }
    }

    /// Border color name for the unfocused state.
    pub fn border_color(&self) -> &str {
        if self.focusable() {
            &self.settings.colors.border_focusable
        } else {
            &self.settings.colors.border_normal
        }
    }

    /// Ask the runner for a refresh without waiting for the interval.
    pub fn request_refresh(&self) {
        let mut state = self.lock();
        if state.stop == StopPhase::Running {
            state.refresh_requested = true;
            self.changed.notify_all();
        }
    }

    /// Disable the widget and wait until its runner has stopped ticking.
    ///
    /// Returns at once when no runner is attached, when the widget is already
    /// stopped, or when called from the runner thread itself (the runner then
    /// stops at its next tick).
    pub fn stop(&self) {
        let mut state = self.lock();
        state.enabled = false;
        if state.stop == StopPhase::Stopped {
            return;
        }
        if !state.attached {
            state.stop = StopPhase::Stopped;
            self.changed.notify_all();
            return;
        }

        state.stop = StopPhase::Requested;
        self.changed.notify_all();
        if state.runner == Some(thread::current().id()) {
            return;
        }

        gridboard_core::debug!(widget = %self.settings.name, "waiting for refresh runner to stop");
        while state.stop == StopPhase::Requested {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Current stop phase.
    pub fn stop_phase(&self) -> StopPhase {
        self.lock().stop
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_phase() == StopPhase::Stopped
    }

    /// Register a refresh runner before spawning it.
    ///
    /// Returns `false` if the widget is already stopped or already has a
    /// runner; the caller must not start one then.
    pub fn attach_runner(&self) -> bool {
        let mut state = self.lock();
        if state.stop != StopPhase::Running || state.attached {
            return false;
        }
        state.attached = true;
        true
    }

    /// Mark the calling thread as the runner.
    ///
    /// Runners call this first thing, so a `stop` issued from inside their
    /// first refresh does not wait on itself.
    pub fn enter_runner(&self) {
        self.lock().runner = Some(thread::current().id());
    }

    /// Release the runner slot; any pending `stop` is acknowledged.
    ///
    /// Runners call this when they exit for a reason other than [`Tick::Stop`].
    pub fn detach_runner(&self) {
        let mut state = self.lock();
        state.attached = false;
        state.runner = None;
        state.refreshing = false;
        if state.stop == StopPhase::Requested {
            state.stop = StopPhase::Stopped;
        }
        self.changed.notify_all();
    }

    /// Block the runner until the next tick.
    ///
    /// `interval` of `None` waits for an explicit refresh request or a stop.
    /// A pending stop is checked first and acknowledged here.
    pub fn next_tick(&self, interval: Option<Duration>) -> Tick {
        let deadline = interval.map(|d| Instant::now() + d);
        let mut state = self.lock();
        state.runner = Some(thread::current().id());

        loop {
            match state.stop {
                StopPhase::Requested => {
                    state.stop = StopPhase::Stopped;
                    state.attached = false;
                    state.runner = None;
                    self.changed.notify_all();
                    gridboard_core::debug!(widget = %self.settings.name, "refresh runner acknowledged stop");
                    return Tick::Stop;
                }
                StopPhase::Stopped => return Tick::Stop,
                StopPhase::Running => {}
            }
            if state.refresh_requested {
                state.refresh_requested = false;
                return Tick::Requested;
            }

            state = match deadline {
                None => self
                    .changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Tick::Due;
                    }
                    self.changed
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}
