#![forbid(unsafe_code)]

//! Per-widget refresh tasks.
//!
//! Every widget gets its own background thread that refreshes it on its
//! interval and sends the rendered content to the UI loop. Tasks never wait
//! on each other; the only lock a task takes is its own widget's.
//!
//! # How it works
//!
//! 1. [`RefreshScheduler::start`] registers a runner with the widget's
//!    lifecycle and spawns the thread, which marks itself as the runner.
//! 2. The thread refreshes once right away, then waits in
//!    [`WidgetLifecycle::next_tick`] for the interval, an explicit refresh
//!    request, or a stop.
//! 3. After each refresh the widget is rendered under the same lock and a
//!    [`RefreshMsg::Rendered`] is sent to the UI loop.
//! 4. Stopping goes through the lifecycle handshake and then joins the thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use gridboard_core::geometry::Size;
use gridboard_widgets::{Content, Tick, Widget, WidgetLifecycle};

/// A widget shared between its refresh task and the UI loop.
pub type SharedWidget = Arc<Mutex<Box<dyn Widget>>>;

/// Wrap a widget for sharing.
pub fn share(widget: Box<dyn Widget>) -> SharedWidget {
    Arc::new(Mutex::new(widget))
}

/// Messages from refresh tasks to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMsg {
    /// A widget finished a refresh and produced new content.
    Rendered {
        /// Slot index of the widget on the dashboard.
        slot: usize,
        content: Content,
    },
}

/// A running refresh task handle.
pub struct RefreshTask {
    slot: usize,
    lifecycle: Arc<WidgetLifecycle>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RefreshTask {
    /// Slot the task refreshes.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Ask for a refresh now instead of waiting for the interval.
    pub fn request_refresh(&self) {
        self.lifecycle.request_refresh();
    }

    /// Stop the task and join its thread.
    ///
    /// When this returns the widget will not be refreshed or rendered again.
    pub fn stop(mut self) {
        self.lifecycle.stop();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::warn!(slot = self.slot, "refresh task panicked");
            }
        }
    }
}

/// Owns the refresh tasks of a dashboard and the channel they report on.
pub struct RefreshScheduler {
    tasks: Vec<RefreshTask>,
    sender: mpsc::Sender<RefreshMsg>,
    receiver: mpsc::Receiver<RefreshMsg>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            tasks: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Start refreshing `widget` in `slot`, rendering into `size`.
    ///
    /// Returns `false` if the widget is stopped or already has a runner.
    pub fn start(&mut self, slot: usize, widget: SharedWidget, size: Size) -> bool {
        let lifecycle = Arc::clone(
            widget
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .lifecycle(),
        );
        if !lifecycle.attach_runner() {
            tracing::debug!(slot, widget = lifecycle.name(), "refresh runner not started");
            return false;
        }

        let sender = self.sender.clone();
        let runner = Arc::clone(&lifecycle);
        let spawned = thread::Builder::new()
            .name(format!("refresh-{}", lifecycle.name()))
            .spawn(move || run(slot, &widget, &runner, size, &sender));

        match spawned {
            Ok(handle) => {
                tracing::debug!(
                    slot,
                    widget = lifecycle.name(),
                    interval_secs = lifecycle.refresh_interval_secs(),
                    "refresh runner started"
                );
                self.tasks.push(RefreshTask {
                    slot,
                    lifecycle,
                    thread: Some(handle),
                });
                true
            }
            Err(err) => {
                tracing::error!(slot, error = %err, "failed to spawn refresh runner");
                lifecycle.detach_runner();
                false
            }
        }
    }

    /// Ask the task in `slot` for an immediate refresh.
    pub fn request_refresh(&self, slot: usize) -> bool {
        match self.tasks.iter().find(|t| t.slot == slot) {
            Some(task) => {
                task.request_refresh();
                true
            }
            None => false,
        }
    }

    /// Pending messages, without blocking.
    pub fn drain_messages(&self) -> Vec<RefreshMsg> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RefreshMsg> {
        self.receiver.recv_timeout(timeout).ok()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Stop the task in `slot`, if any.
    pub fn stop(&mut self, slot: usize) {
        if let Some(pos) = self.tasks.iter().position(|t| t.slot == slot) {
            self.tasks.swap_remove(pos).stop();
        }
    }

    /// Stop every task. Calling this again is a no-op.
    pub fn stop_all(&mut self) {
        for task in self.tasks.drain(..) {
            tracing::debug!(slot = task.slot, "stopping refresh runner");
            task.stop();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn run(
    slot: usize,
    widget: &SharedWidget,
    lifecycle: &WidgetLifecycle,
    size: Size,
    sender: &mpsc::Sender<RefreshMsg>,
) {
    let _detach = DetachOnExit(lifecycle);
    lifecycle.enter_runner();
    let interval = lifecycle.refresh_interval();
    let mut tick = Tick::Requested;
    let mut refreshes: u64 = 0;

    while tick != Tick::Stop {
        if lifecycle.enabled() {
            let content = refresh_once(widget, lifecycle, size);
            refreshes += 1;
            if sender.send(RefreshMsg::Rendered { slot, content }).is_err() {
                tracing::debug!(slot, refreshes, "dashboard gone, refresh runner exiting");
                return;
            }
        }
        tick = lifecycle.next_tick(interval);
    }
    tracing::debug!(slot, refreshes, "refresh runner stopped");
}

/// Releases the runner slot on every exit path, unwinding included.
struct DetachOnExit<'a>(&'a WidgetLifecycle);

impl Drop for DetachOnExit<'_> {
    fn drop(&mut self) {
        self.0.detach_runner();
    }
}

fn refresh_once(widget: &SharedWidget, lifecycle: &WidgetLifecycle, size: Size) -> Content {
    let start = Instant::now();
    lifecycle.set_refreshing(true);
    let content = {
        let mut widget = widget.lock().unwrap_or_else(PoisonError::into_inner);
        widget.refresh();
        widget.render(size)
    };
    lifecycle.set_refreshing(false);
    tracing::debug!(
        widget = lifecycle.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "widget refreshed"
    );
    content
}
