#![forbid(unsafe_code)]

//! Widget building blocks for gridboard.
//!
//! Every dashboard widget implements [`Widget`]. The runtime drives it from
//! two sides: a refresh task per widget calls [`Widget::refresh`] followed by
//! [`Widget::render`], and the UI loop forwards key presses to
//! [`Widget::handle_key`]. Both go through the widget's own lock, so a widget
//! never needs interior locking for its data.
//!
//! Shared state that the UI reads without taking the widget lock (enabled,
//! focusable, stop handshake) lives in the widget's [`WidgetLifecycle`].

pub mod bar_chart;
pub mod bar_graph;
pub mod keyboard;
pub mod lifecycle;
pub mod list;
pub mod selection;

use std::fmt;
use std::sync::Arc;

use gridboard_core::event::KeyEvent;
use gridboard_core::geometry::Size;
use gridboard_core::settings_doc::DescribeSettings;
use gridboard_core::CommonSettings;

pub use bar_chart::{Bar, render_bars};
pub use bar_graph::{BarGraph, BarSource};
pub use keyboard::KeyboardDispatch;
pub use lifecycle::{StopPhase, Tick, WidgetLifecycle};
pub use list::{ItemSource, ListWidget};
pub use selection::{NO_SELECTION, SelectionModel};

/// Where the view should scroll after a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scroll {
    /// Leave the scroll position alone.
    #[default]
    Keep,
    /// Jump back to the first line.
    Top,
    /// Make this line visible.
    Line(usize),
}

/// What a widget wants drawn inside its border.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Content {
    /// Title shown in the border, color tags allowed.
    pub title: String,
    /// Body text with color-tag markup.
    pub body: String,
    /// Wrap long lines instead of cutting them.
    pub wrap: bool,
    pub scroll: Scroll,
}

impl Content {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            wrap: false,
            scroll: Scroll::Keep,
        }
    }

    #[must_use]
    pub fn wrapped(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn scrolled(mut self, scroll: Scroll) -> Self {
        self.scroll = scroll;
        self
    }
}

/// Result of offering a key press to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The widget has no binding for the key.
    Ignored,
    /// The widget handled the key and needs a redraw.
    Consumed,
    /// The widget asks its refresh task for an immediate refresh.
    Refresh,
    /// The widget asks the dashboard to show or hide its help.
    ToggleHelp,
}

/// Failure reported by a widget's data source.
///
/// Shown in place of the widget's content; never escapes the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Capability set every dashboard widget provides.
pub trait Widget: Send {
    /// Lifecycle state shared with the runtime.
    fn lifecycle(&self) -> &Arc<WidgetLifecycle>;

    /// Fetch fresh data. Errors are recorded by the widget and rendered.
    fn refresh(&mut self);

    /// Produce the content to draw in an area of `size` cells.
    fn render(&mut self, size: Size) -> Content;

    /// Static usage text.
    fn help_text(&self) -> String {
        format!(
            "\n  There is no help available for widget {}",
            self.lifecycle().settings().kind
        )
    }

    /// Offer a key press to the widget.
    fn handle_key(&mut self, _key: &KeyEvent) -> InputOutcome {
        InputOutcome::Ignored
    }

    /// Documentation of the settings this widget reads.
    fn config_text(&self) -> String {
        CommonSettings::config_text()
    }
}

/// Placeholder for module kinds nothing is registered for.
#[derive(Debug)]
pub struct UnknownWidget {
    lifecycle: Arc<WidgetLifecycle>,
}

impl UnknownWidget {
    /// Title every unknown module shows.
    pub const TITLE: &'static str = "Unknown";

    pub fn new(mut settings: CommonSettings) -> Self {
        settings.title = Self::TITLE.to_string();
        Self {
            lifecycle: Arc::new(WidgetLifecycle::new(settings)),
        }
    }
}

impl Widget for UnknownWidget {
    fn lifecycle(&self) -> &Arc<WidgetLifecycle> {
        &self.lifecycle
    }

    fn refresh(&mut self) {}

    fn render(&mut self, _size: Size) -> Content {
        let kind = &self.lifecycle.settings().kind;
        Content::new(
            self.lifecycle.contextual_title(Self::TITLE),
            format!("No module is registered for type [red]{kind}[default]"),
        )
        .wrapped(true)
    }
}
