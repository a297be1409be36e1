#![forbid(unsafe_code)]

//! Text bar charts.
//!
//! Each [`Bar`] becomes one line:
//!
//! ```text
//! <label><pad>[[<color>]<stars>[default]<spaces>] <value>
//! ```
//!
//! The label column is as wide as the widest label, measured in bytes so
//! the output matches existing golden files. A bar fills
//! `percent * max_stars / 100` cells (rounded down) with the star glyph and
//! pads the rest with spaces, so every bracket closes at the same column.
//! The output uses the color-tag markup from [`gridboard_core::markup`]; the
//! doubled `[[` renders as a literal opening bracket.

use std::fmt::Write as _;

/// Color tag used when a bar has none.
pub const DEFAULT_BAR_COLOR: &str = "default";

/// Widest bar drawn; larger widths are clamped to it.
pub const MAX_BAR_WIDTH: i64 = u16::MAX as i64;

/// One row of a bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bar {
    pub label: String,
    /// Fill level; values outside `0..=100` are clamped.
    pub percent: i64,
    /// Text after the bar; the percent is shown when absent.
    pub value_label: Option<String>,
    /// Color tag for the filled cells.
    pub color: Option<String>,
}

impl Bar {
    /// A bar with the given label and percent.
    pub fn new(label: impl Into<String>, percent: i64) -> Self {
        Self {
            label: label.into(),
            percent,
            value_label: None,
            color: None,
        }
    }

    /// Show `value` after the bar instead of the percent.
    pub fn with_value_label(mut self, value: impl Into<String>) -> Self {
        self.value_label = Some(value.into());
        self
    }

    /// Fill the bar in `color`.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Number of filled cells for a bar `max_stars` wide.
    pub fn star_count(&self, max_stars: i64) -> usize {
        let filled = i128::from(self.percent.clamp(0, 100)) * i128::from(max_stars.max(0)) / 100;
        usize::try_from(filled).unwrap_or(usize::MAX)
    }
}

/// Render `bars` as a chart `max_stars` cells wide using `star` as the glyph.
///
/// A negative `max_stars` renders empty bars; widths above
/// [`MAX_BAR_WIDTH`] are clamped.
pub fn render_bars(bars: &[Bar], max_stars: i64, star: &str) -> String {
    let max_stars = max_stars.clamp(0, MAX_BAR_WIDTH);
    let width = usize::try_from(max_stars).unwrap_or(0);
    let label_width = bars.iter().map(|bar| bar.label.len()).max().unwrap_or(0);

    let mut out = String::new();
    for bar in bars {
        let stars = bar.star_count(max_stars);
        let pad = label_width - bar.label.len();
        let color = bar
            .color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_BAR_COLOR);
        let value = match bar.value_label.as_deref() {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => bar.percent.to_string(),
        };

        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{label}{pad}[[{color}]{fill}[default]{rest}] {value}",
            label = bar.label,
            pad = " ".repeat(pad),
            fill = star.repeat(stars),
            rest = " ".repeat(width - stars),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridboard_core::markup::strip_color_tags;

    fn stars_in(line: &str, star: char) -> usize {
        strip_color_tags(line).chars().filter(|&c| c == star).count()
    }

    #[test]
    fn full_half_and_empty() {
        for (percent, expected) in [(100, 20), (50, 10), (0, 0)] {
            let out = render_bars(&[Bar::new("x", percent)], 20, "|");
            assert_eq!(stars_in(&out, '|'), expected, "percent {percent}");
        }
    }

    #[test]
    fn golden_two_rows() {
        let bars = [
            Bar::new("cpu", 50).with_color("green"),
            Bar::new("memory", 25).with_value_label("1.2G"),
        ];
        let expected = "cpu   [[green]|||||[default]     ] 50\n\
                        memory[[default]||[default]        ] 1.2G\n";
        assert_eq!(render_bars(&bars, 10, "|"), expected);
    }

    #[test]
    fn rounds_down() {
        assert_eq!(Bar::new("a", 99).star_count(20), 19);
        assert_eq!(Bar::new("a", 4).star_count(20), 0);
        assert_eq!(Bar::new("a", 5).star_count(20), 1);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(Bar::new("a", 150).star_count(20), 20);
        assert_eq!(Bar::new("a", -5).star_count(20), 0);
        assert_eq!(Bar::new("a", 50).star_count(-3), 0);
        assert_eq!(render_bars(&[Bar::new("a", 50)], -3, "*"), "a[[default][default]] 50\n");
    }

    #[test]
    fn huge_widths_do_not_overflow() {
        assert_eq!(Bar::new("a", 100).star_count(100_000_000_000_000_000), 100_000_000_000_000_000);
        assert_eq!(Bar::new("a", 100).star_count(i64::MAX), usize::try_from(i64::MAX).unwrap());
        let out = render_bars(&[Bar::new("a", 1)], i64::MAX, "|");
        assert_eq!(stars_in(&out, '|'), 655);
        assert!(out.ends_with(" ] 1\n"));
    }

    #[test]
    fn labels_pad_by_byte_length() {
        let bars = [Bar::new("é", 10), Bar::new("ab", 10)];
        let expected = "é[[default][default]  ] 10\n\
                        ab[[default][default]  ] 10\n";
        assert_eq!(render_bars(&bars, 2, "|"), expected);
    }

    #[test]
    fn over_full_value_still_shows_raw_percent() {
        let out = render_bars(&[Bar::new("a", 120)], 4, "#");
        assert_eq!(out, "a[[default]####[default]] 120\n");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_bars(&[], 20, "|"), "");
    }

    #[test]
    fn empty_value_label_falls_back_to_percent() {
        let out = render_bars(&[Bar::new("a", 10).with_value_label("")], 10, "|");
        assert!(out.ends_with("] 10\n"));
    }

    #[test]
    fn brackets_align() {
        let bars = [Bar::new("a", 10), Bar::new("long label", 90)];
        let out = strip_color_tags(&render_bars(&bars, 10, "|"));
        let closes: Vec<usize> = out.lines().map(|l| l.find(']').unwrap()).collect();
        assert_eq!(closes[0], closes[1]);
    }
}
