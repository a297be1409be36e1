#![forbid(unsafe_code)]

//! Bar graph widget.
//!
//! Reads `graphStars` (bar width, default 20) and `graphIcon` (fill glyph,
//! default `|`) from the module block and draws whatever bars its
//! [`BarSource`] returns.

use std::sync::Arc;

use gridboard_core::geometry::Size;
use gridboard_core::settings_doc::{ConfigEntry, ConfigField, generate};
use gridboard_core::{COMMON_FIELDS, CommonSettings, ModuleConfig};

use crate::bar_chart::{Bar, MAX_BAR_WIDTH, render_bars};
use crate::lifecycle::WidgetLifecycle;
use crate::{Content, FetchError, Widget};

pub const DEFAULT_GRAPH_STARS: u64 = 20;
pub const DEFAULT_GRAPH_ICON: &str = "|";

const BAR_GRAPH_FIELDS: &[ConfigEntry] = &[
    ConfigEntry::Nested(COMMON_FIELDS),
    ConfigEntry::Field(ConfigField::new(
        "GraphIcon",
        "The character used to draw the bars.",
        true,
        "",
    )),
    ConfigEntry::Field(ConfigField::new(
        "GraphStars",
        "The width of a full bar, in characters.",
        true,
        "A positive integer, 0..n.",
    )),
];

/// Data collaborator of a [`BarGraph`].
pub trait BarSource: Send {
    fn fetch(&mut self) -> Result<Vec<Bar>, FetchError>;
}

/// A widget that draws its data as a text bar chart.
pub struct BarGraph<S: BarSource> {
    lifecycle: Arc<WidgetLifecycle>,
    source: S,
    max_stars: i64,
    star_char: String,
    bars: Vec<Bar>,
    error: Option<FetchError>,
}

impl<S: BarSource> BarGraph<S> {
    pub fn new(settings: CommonSettings, module: &ModuleConfig, source: S) -> Self {
        let max_stars = module.extra_u64("graphStars", DEFAULT_GRAPH_STARS);
        Self {
            lifecycle: Arc::new(WidgetLifecycle::new(settings)),
            source,
            max_stars: i64::try_from(max_stars).map_or(MAX_BAR_WIDTH, |n| n.min(MAX_BAR_WIDTH)),
            star_char: module.extra_str("graphIcon", DEFAULT_GRAPH_ICON),
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn max_stars(&self) -> i64 {
        self.max_stars
    }

    pub fn star_char(&self) -> &str {
        &self.star_char
    }

    /// Chart text for `bars` using this graph's width and glyph.
    pub fn build_bars(&self, bars: &[Bar]) -> String {
        render_bars(bars, self.max_stars, &self.star_char)
    }
}

impl<S: BarSource> Widget for BarGraph<S> {
    fn lifecycle(&self) -> &Arc<WidgetLifecycle> {
        &self.lifecycle
    }

    fn refresh(&mut self) {
        match self.source.fetch() {
            Ok(bars) => {
                self.error = None;
                self.bars = bars;
            }
            Err(err) => {
                gridboard_core::warn!(widget = %self.lifecycle.name(), error = %err, "fetch failed");
                self.error = Some(err);
                self.bars.clear();
            }
        }
    }

    fn render(&mut self, _size: Size) -> Content {
        let title = self.lifecycle.contextual_title(&self.lifecycle.settings().title);
        match &self.error {
            Some(err) => Content::new(title, err.to_string()).wrapped(true),
            None => Content::new(title, self.build_bars(&self.bars)),
        }
    }

    fn config_text(&self) -> String {
        generate(BAR_GRAPH_FIELDS)
    }
}
