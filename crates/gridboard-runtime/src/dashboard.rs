#![forbid(unsafe_code)]

//! The dashboard: widgets placed on the grid, focus, key routing and the
//! UI loop.
//!
//! The UI loop owns drawing and input. Widgets refresh on their own tasks
//! (see [`crate::refresh`]) and hand back rendered [`Content`] snapshots,
//! which the loop stores per slot and draws from. The loop only takes a
//! widget's lock when it forwards a key to that widget, and never waits for
//! it: while a refresh task holds the lock for a slow fetch, keys for that
//! widget queue on its slot and are replayed in order once the lock frees.
//!
//! # Key routing
//!
//! 1. `Ctrl+C` quits.
//! 2. While a help box is open, `Esc` or `/` closes it and other keys are
//!    swallowed.
//! 3. `Tab` / `BackTab` move focus among focusable widgets.
//! 4. The focused widget sees the key next. `Esc` also clears focus after
//!    the widget has seen it.
//! 5. A focus char the widget ignores focuses its widget.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, TryLockError};
use std::time::Duration;

use gridboard_core::event::{Event, KeyCode, KeyEvent};
use gridboard_core::geometry::{Rect, Size};
use gridboard_core::{ConfigError, GlobalConfig, GridSpec};
use gridboard_widgets::{Content, InputOutcome, Scroll, Widget, WidgetLifecycle};

use crate::refresh::{RefreshMsg, RefreshScheduler, SharedWidget, share};
use crate::registry::WidgetRegistry;
use crate::terminal::{self, PanelStyle, TerminalSession, color_for};

/// How long the UI loop waits for input before checking for new content.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Highest focus char handed out automatically.
const MAX_AUTO_FOCUS_CHAR: u32 = 9;

/// Keys held per busy widget; later ones are dropped.
const MAX_PENDING_KEYS: usize = 32;

/// Errors that end the dashboard.
#[derive(Debug)]
pub enum DashboardError {
    /// Terminal I/O failed.
    Io(io::Error),
    /// The configuration is unusable.
    Config(ConfigError),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "terminal I/O error: {e}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<io::Error> for DashboardError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for DashboardError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// One widget on the grid and the latest content it produced.
struct Slot {
    widget: SharedWidget,
    lifecycle: Arc<WidgetLifecycle>,
    rect: Rect,
    size: Size,
    content: Content,
    scroll: usize,
    pending: VecDeque<KeyEvent>,
}

/// What happened to a key offered to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Handled,
    Ignored,
    /// The widget is locked by its refresh task; the key was queued.
    Deferred,
}

impl Slot {
    fn apply(&mut self, content: Content) {
        let lines = content.body.lines().count();
        self.scroll = adjust_scroll(self.scroll, content.scroll, usize::from(self.size.height), lines);
        self.content = content;
    }

    fn style(&self, focused: bool) -> PanelStyle {
        let colors = &self.lifecycle.settings().colors;
        let border = if focused {
            colors.border_focused.as_str()
        } else {
            self.lifecycle.border_color()
        };
        PanelStyle {
            bordered: self.lifecycle.bordered(),
            border: color_for(border),
            title: color_for(&colors.title),
        }
    }
}

/// New scroll offset for a view `height` lines tall showing `line_count`
/// lines, after a render asked for `scroll`.
pub fn adjust_scroll(current: usize, scroll: Scroll, height: usize, line_count: usize) -> usize {
    match scroll {
        Scroll::Keep => current.min(line_count.saturating_sub(height)),
        Scroll::Top => 0,
        Scroll::Line(line) if height == 0 => line,
        Scroll::Line(line) if line < current => line,
        Scroll::Line(line) if line >= current + height => line + 1 - height,
        Scroll::Line(_) => current,
    }
}

/// Widgets on a grid, plus focus and refresh state.
pub struct Dashboard {
    grid: GridSpec,
    slots: Vec<Slot>,
    focus: Option<usize>,
    help: Option<String>,
    scheduler: RefreshScheduler,
    running: bool,
    clear_pending: bool,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("grid", &self.grid)
            .field("slots", &self.slots.len())
            .field("focus", &self.focus)
            .field("help_visible", &self.help.is_some())
            .field("running", &self.running)
            .finish()
    }
}

impl Dashboard {
    /// Place `widgets` on `grid`.
    ///
    /// Widgets are ordered by placement, top to bottom then left to right.
    /// Focusable widgets without a focus char get the next free digit.
    pub fn new(grid: GridSpec, widgets: Vec<Box<dyn Widget>>) -> Result<Self, DashboardError> {
        grid.validate()?;

        let mut widgets = widgets;
        widgets.sort_by_key(|w| {
            let p = w.lifecycle().settings().position;
            (p.top, p.left)
        });

        let mut slots: Vec<Slot> = widgets
            .into_iter()
            .map(|widget| {
                let lifecycle = Arc::clone(widget.lifecycle());
                let placement = lifecycle.settings().position;
                Slot {
                    rect: grid.outer_rect(&placement),
                    size: grid.resolve(&placement),
                    content: Content::default(),
                    scroll: 0,
                    pending: VecDeque::new(),
                    lifecycle,
                    widget: share(widget),
                }
            })
            .collect();

        assign_focus_chars(&slots);
        for slot in &mut slots {
            let title = slot.lifecycle.contextual_title(&slot.lifecycle.settings().title);
            slot.content = Content::new(title, "");
        }
        tracing::debug!(widgets = slots.len(), "dashboard assembled");

        Ok(Self {
            grid,
            slots,
            focus: None,
            help: None,
            scheduler: RefreshScheduler::new(),
            running: true,
            clear_pending: true,
        })
    }

    /// Build every enabled module of `global` through `registry`.
    pub fn from_config(global: &GlobalConfig, registry: &WidgetRegistry) -> Result<Self, DashboardError> {
        Self::new(global.grid.clone(), registry.build_enabled(global))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Slot index of the focused widget.
    pub fn focused(&self) -> Option<usize> {
        self.focus
    }

    pub fn help_visible(&self) -> bool {
        self.help.is_some()
    }

    /// Lifecycle of the widget in `slot`.
    pub fn lifecycle(&self, slot: usize) -> Option<&Arc<WidgetLifecycle>> {
        self.slots.get(slot).map(|s| &s.lifecycle)
    }

    /// Latest content of the widget in `slot`.
    pub fn content(&self, slot: usize) -> Option<&Content> {
        self.slots.get(slot).map(|s| &s.content)
    }

    /// Current scroll offset of the widget in `slot`.
    pub fn scroll(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).map(|s| s.scroll)
    }

    /// Start a refresh task for every widget. Returns how many started.
    pub fn start(&mut self) -> usize {
        let mut started = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if self.scheduler.start(index, Arc::clone(&slot.widget), slot.size) {
                started += 1;
            }
        }
        started
    }

    /// Store content delivered by refresh tasks and replay keys that were
    /// waiting on a busy widget. Returns whether anything changed.
    pub fn pump(&mut self) -> bool {
        let messages = self.scheduler.drain_messages();
        let mut changed = !messages.is_empty();
        for message in messages {
            self.apply(message);
        }
        changed |= self.replay_pending();
        changed
    }

    /// Wait up to `timeout` for one refresh message and store it.
    pub fn pump_timeout(&mut self, timeout: Duration) -> bool {
        match self.scheduler.recv_timeout(timeout) {
            Some(message) => {
                self.apply(message);
                self.replay_pending();
                true
            }
            None => false,
        }
    }

    /// Keys queued for the widget in `slot` while it was busy.
    pub fn pending_keys(&self, slot: usize) -> usize {
        self.slots.get(slot).map_or(0, |s| s.pending.len())
    }

    fn apply(&mut self, message: RefreshMsg) {
        match message {
            RefreshMsg::Rendered { slot, content } => {
                if let Some(s) = self.slots.get_mut(slot) {
                    s.apply(content);
                }
            }
        }
    }

    /// React to one input event.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Resize { width, height } => {
                tracing::debug!(width, height, "terminal resized");
                self.clear_pending = true;
            }
            Event::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        if key.ctrl() && key.is_char('c') {
            tracing::info!("quit requested");
            self.running = false;
            return;
        }

        if self.help.is_some() {
            if matches!(key.code, KeyCode::Escape | KeyCode::Char('/')) {
                self.help = None;
                self.clear_pending = true;
            }
            return;
        }

        match key.code {
            KeyCode::Tab => return self.focus_next(),
            KeyCode::BackTab => return self.focus_prev(),
            _ => {}
        }

        if let Some(index) = self.focus {
            let delivery = self.forward_key(index, key);
            if key.code == KeyCode::Escape {
                self.set_focus(None);
            }
            if delivery != Delivery::Ignored {
                return;
            }
        }
        self.focus_by_char(key);
    }

    fn focus_by_char(&mut self, key: &KeyEvent) {
        let KeyCode::Char(c) = key.code else {
            return;
        };
        if !key.modifiers.is_empty() {
            return;
        }
        let target = self
            .slots
            .iter()
            .position(|s| s.lifecycle.focusable() && s.lifecycle.focus_char() == c.to_string());
        if target.is_some() {
            self.set_focus(target);
        }
    }

    /// Offer `key` to the focused widget in `index`, queueing it behind any
    /// keys still waiting for that widget.
    fn forward_key(&mut self, index: usize, key: &KeyEvent) -> Delivery {
        let Some(slot) = self.slots.get(index) else {
            return Delivery::Ignored;
        };
        if !slot.lifecycle.focusable() {
            self.set_focus(None);
            return Delivery::Ignored;
        }

        let delivery = if slot.pending.is_empty() {
            self.deliver(index, key)
        } else {
            Delivery::Deferred
        };
        if delivery == Delivery::Deferred {
            self.defer(index, *key);
        }
        delivery
    }

    fn defer(&mut self, index: usize, key: KeyEvent) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if slot.pending.len() >= MAX_PENDING_KEYS {
            tracing::debug!(slot = index, key = ?key.code, "widget busy, key dropped");
            return;
        }
        tracing::trace!(slot = index, key = ?key.code, "widget busy, key queued");
        slot.pending.push_back(key);
    }

    /// Hand `key` to the widget unless its refresh task holds the lock.
    fn deliver(&mut self, index: usize, key: &KeyEvent) -> Delivery {
        let Some(slot) = self.slots.get(index) else {
            return Delivery::Ignored;
        };
        let widget = Arc::clone(&slot.widget);
        let size = slot.size;
        let mut guard = match widget.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Delivery::Deferred,
        };

        let outcome = guard.handle_key(key);
        tracing::trace!(slot = index, key = ?key.code, ?outcome, "key dispatched");
        match outcome {
            InputOutcome::Ignored => Delivery::Ignored,
            InputOutcome::Consumed => {
                let content = guard.render(size);
                drop(guard);
                if let Some(slot) = self.slots.get_mut(index) {
                    slot.apply(content);
                }
                Delivery::Handled
            }
            InputOutcome::Refresh => {
                drop(guard);
                self.scheduler.request_refresh(index);
                Delivery::Handled
            }
            InputOutcome::ToggleHelp => {
                self.help = Some(guard.help_text());
                Delivery::Handled
            }
        }
    }

    /// Deliver queued keys to widgets that are no longer busy.
    fn replay_pending(&mut self) -> bool {
        let mut replayed = false;
        for index in 0..self.slots.len() {
            while let Some(key) = self.slots[index].pending.front().copied() {
                let delivery = self.deliver(index, &key);
                if delivery == Delivery::Deferred {
                    break;
                }
                self.slots[index].pending.pop_front();
                replayed = true;
                if delivery == Delivery::Ignored && self.focus == Some(index) {
                    self.focus_by_char(&key);
                }
            }
        }
        replayed
    }

    fn set_focus(&mut self, focus: Option<usize>) {
        if self.focus != focus {
            let name = focus
                .and_then(|i| self.slots.get(i))
                .map(|s| s.lifecycle.name().to_string());
            tracing::debug!(slot = ?focus, widget = ?name, "focus changed");
            self.focus = focus;
        }
    }

    /// Focus the next focusable widget after the current one, wrapping.
    pub fn focus_next(&mut self) {
        let len = self.slots.len();
        let start = self.focus.map_or(0, |i| i + 1);
        let next = (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&i| self.slots[i].lifecycle.focusable());
        if next.is_some() {
            self.set_focus(next);
        }
    }

    /// Focus the focusable widget before the current one, wrapping.
    pub fn focus_prev(&mut self) {
        let len = self.slots.len();
        let start = self.focus.unwrap_or(0) + len;
        let prev = (1..=len)
            .map(|offset| (start - offset) % len)
            .find(|&i| self.slots[i].lifecycle.focusable());
        if prev.is_some() {
            self.set_focus(prev);
        }
    }

    /// Disable every widget. Refresh tasks keep running but skip fetching.
    pub fn disable_all(&self) {
        for slot in &self.slots {
            slot.lifecycle.disable();
        }
        tracing::debug!(widgets = self.slots.len(), "all widgets disabled");
    }

    /// Stop every refresh task. Safe to call more than once.
    pub fn stop_all(&mut self) {
        self.scheduler.stop_all();
        for slot in &self.slots {
            slot.lifecycle.stop();
        }
    }

    /// Queue a full frame.
    pub fn draw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if std::mem::take(&mut self.clear_pending) {
            terminal::clear_screen(out)?;
        }
        for (index, slot) in self.slots.iter().enumerate() {
            let style = slot.style(self.focus == Some(index));
            terminal::draw_panel(out, slot.rect, &style, &slot.content, slot.scroll)?;
        }
        if let Some(help) = &self.help {
            let screen = Rect::new(0, 0, self.grid.total_width(), self.grid.total_height());
            terminal::draw_help(out, screen, help)?;
        }
        Ok(())
    }

    /// Run until `Ctrl+C`, then stop every refresh task.
    pub fn run(&mut self, session: &TerminalSession) -> Result<(), DashboardError> {
        let started = self.start();
        tracing::info!(widgets = self.slots.len(), started, "dashboard running");

        let mut stdout = io::stdout();
        let result = self.event_loop(session, &mut stdout);
        self.stop_all();
        result
    }

    fn event_loop<W: Write>(&mut self, session: &TerminalSession, out: &mut W) -> Result<(), DashboardError> {
        self.draw(out)?;
        out.flush()?;

        while self.running {
            let mut dirty = false;
            if session.poll_event(POLL_INTERVAL)? {
                loop {
                    if let Some(event) = session.read_event()? {
                        self.handle_event(&event);
                        dirty = true;
                    }
                    if !self.running || !session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }
            dirty |= self.pump();

            if dirty && self.running {
                self.draw(out)?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn assign_focus_chars(slots: &[Slot]) {
    let mut taken: Vec<String> = slots
        .iter()
        .map(|s| s.lifecycle.focus_char())
        .filter(|c| !c.is_empty())
        .collect();
    let mut free = (1..=MAX_AUTO_FOCUS_CHAR)
        .filter_map(|d| char::from_digit(d, 10))
        .map(String::from);

    for slot in slots {
        if !slot.lifecycle.focusable() || !slot.lifecycle.focus_char().is_empty() {
            continue;
        }
        let Some(focus_char) = free.by_ref().find(|c| !taken.contains(c)) else {
            break;
        };
        taken.push(focus_char.clone());
        slot.lifecycle.set_focus_char(focus_char);
    }
}
