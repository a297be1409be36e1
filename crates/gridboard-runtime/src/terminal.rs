#![forbid(unsafe_code)]

//! Terminal ownership and drawing.
//!
//! [`TerminalSession`] is an RAII guard around raw mode, the alternate screen
//! and the hidden cursor. Dropping it restores the terminal, and a panic hook
//! does the same on unwinding panics.
//!
//! The drawing functions are generic over [`Write`] and only queue crossterm
//! commands, so they can be pointed at a `Vec<u8>` in tests. The caller
//! flushes.
//!
//! # Cleanup order
//!
//! 1. Show cursor
//! 2. Leave alternate screen (if entered)
//! 3. Exit raw mode
//! 4. Flush stdout

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use gridboard_core::event::Event;
use gridboard_core::geometry::Rect;
use gridboard_core::markup::{Span, parse_markup};
use gridboard_widgets::Content;

/// Guard that owns the terminal while the dashboard runs.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or the alternate screen cannot be entered.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
        };
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        session.alternate_screen_enabled = true;
        tracing::info!("alternate screen enabled");

        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(true)` means an event is ready.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read the next event. `Ok(None)` for events the dashboard ignores.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        Ok(Event::from_crossterm(crossterm::event::read()?))
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, Show);

        if self.alternate_screen_enabled {
            let _ = execute!(stdout, LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            tracing::info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, ResetColor, Show, LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Map a theme color name to a terminal color.
///
/// Accepts crossterm's names (`red`, `dark_grey`, ...), a few extra names
/// used by themes (`orange`, `lightblue`, `gray`, `darkgray`) and `#rrggbb`.
/// `None` means the terminal default.
pub fn color_for(name: &str) -> Option<Color> {
    let name = name.trim().to_ascii_lowercase();
    match name.as_str() {
        "" | "-" | "default" | "reset" => None,
        "orange" => Some(Color::Rgb {
            r: 255,
            g: 165,
            b: 0,
        }),
        "lightblue" | "light_blue" => Some(Color::Rgb {
            r: 173,
            g: 216,
            b: 230,
        }),
        "gray" | "grey" => Some(Color::Grey),
        "darkgray" | "darkgrey" => Some(Color::DarkGrey),
        hex if hex.starts_with('#') => parse_hex(hex),
        other => Color::try_from(other).ok(),
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Break marked-up text into lines no wider than `width` cells.
///
/// Without `wrap`, characters past the right edge are dropped. A trailing
/// newline does not produce an empty last line.
pub fn layout_lines(text: &str, width: u16, wrap: bool) -> Vec<Vec<Span>> {
    let width = usize::from(width);
    let mut lines: Vec<Vec<Span>> = vec![Vec::new()];
    let mut column = 0usize;

    for span in parse_markup(text) {
        for c in span.text.chars() {
            if c == '\n' {
                lines.push(Vec::new());
                column = 0;
                continue;
            }
            let w = c.width().unwrap_or(0);
            if column + w > width {
                if !wrap || w > width {
                    continue;
                }
                lines.push(Vec::new());
                column = 0;
            }
            if let Some(line) = lines.last_mut() {
                push_char(line, c, &span);
            }
            column += w;
        }
    }

    if lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

fn push_char(line: &mut Vec<Span>, c: char, style: &Span) {
    match line.last_mut() {
        Some(last) if last.fg == style.fg && last.bg == style.bg => last.text.push(c),
        _ => line.push(Span {
            text: c.to_string(),
            fg: style.fg.clone(),
            bg: style.bg.clone(),
        }),
    }
}

/// Display width of a laid-out line.
pub fn line_width(line: &[Span]) -> usize {
    line.iter().map(|span| span.text.width()).sum()
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing
// ─────────────────────────────────────────────────────────────────────────────

/// How a panel's frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelStyle {
    pub bordered: bool,
    pub border: Option<Color>,
    /// Default title color; title markup overrides it.
    pub title: Option<Color>,
}

/// Draw `content` into the outer rectangle `rect`.
///
/// The body starts at line `scroll`. Everything inside `rect` is
/// overwritten, so stale text from the previous frame never shows.
pub fn draw_panel<W: Write>(
    out: &mut W,
    rect: Rect,
    style: &PanelStyle,
    content: &Content,
    scroll: usize,
) -> io::Result<()> {
    if rect.is_empty() {
        return Ok(());
    }
    let framed = style.bordered && rect.width >= 2 && rect.height >= 2;
    let inner = if framed { rect.inset(1) } else { rect };

    let blank = " ".repeat(usize::from(inner.width));
    for row in 0..inner.height {
        queue!(out, MoveTo(inner.x, inner.y + row), Print(&blank))?;
    }

    if framed {
        draw_border(out, rect, style.border)?;
        let title = layout_lines(&content.title, rect.width - 2, false);
        if let Some(first) = title.first() {
            queue!(out, MoveTo(rect.x + 1, rect.y))?;
            print_spans(out, first, style.title)?;
        }
    }

    let lines = layout_lines(&content.body, inner.width, content.wrap);
    for (row, line) in lines
        .iter()
        .skip(scroll)
        .take(usize::from(inner.height))
        .enumerate()
    {
        let y = inner.y + u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(inner.x, y))?;
        print_spans(out, line, None)?;
    }

    queue!(out, ResetColor)
}

fn draw_border<W: Write>(out: &mut W, rect: Rect, color: Option<Color>) -> io::Result<()> {
    let horizontal = "─".repeat(usize::from(rect.width - 2));
    let right = rect.right() - 1;
    let bottom = rect.bottom() - 1;

    queue!(out, SetForegroundColor(color.unwrap_or(Color::Reset)))?;
    queue!(
        out,
        MoveTo(rect.x, rect.y),
        Print("┌"),
        Print(&horizontal),
        Print("┐"),
        MoveTo(rect.x, bottom),
        Print("└"),
        Print(&horizontal),
        Print("┘")
    )?;
    for y in rect.y + 1..bottom {
        queue!(out, MoveTo(rect.x, y), Print("│"), MoveTo(right, y), Print("│"))?;
    }
    queue!(out, ResetColor)
}

fn print_spans<W: Write>(out: &mut W, spans: &[Span], default_fg: Option<Color>) -> io::Result<()> {
    for span in spans {
        let fg = span.fg.as_deref().and_then(color_for).or(default_fg);
        let bg = span.bg.as_deref().and_then(color_for);
        queue!(
            out,
            SetForegroundColor(fg.unwrap_or(Color::Reset)),
            SetBackgroundColor(bg.unwrap_or(Color::Reset)),
            Print(span.text.as_str())
        )?;
    }
    queue!(out, ResetColor)
}

/// Draw a bordered help box centered in `screen`.
pub fn draw_help<W: Write>(out: &mut W, screen: Rect, text: &str) -> io::Result<()> {
    let lines = layout_lines(text, screen.width.saturating_sub(4), false);
    let widest = lines.iter().map(|line| line_width(line)).max().unwrap_or(0);
    let width = u16::try_from(widest + 4)
        .unwrap_or(u16::MAX)
        .min(screen.width);
    let height = u16::try_from(lines.len() + 2)
        .unwrap_or(u16::MAX)
        .min(screen.height);
    let rect = Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    );

    // One column of padding on each side of the text.
    let padded: String = text.lines().map(|l| format!(" {l}\n")).collect();
    let style = PanelStyle {
        bordered: true,
        border: color_for("orange"),
        title: color_for("white"),
    };
    draw_panel(out, rect, &style, &Content::new(" Help ", padded), 0)
}

/// Queue a full screen clear.
pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, ResetColor, Clear(ClearType::All))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Vec<Span>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn lines_are_clipped_without_wrap() {
        let lines = layout_lines("abcdef\nxy\n", 4, false);
        assert_eq!(texts(&lines), vec!["abcd", "xy"]);
    }

    #[test]
    fn lines_wrap_when_asked() {
        let lines = layout_lines("abcdef", 4, true);
        assert_eq!(texts(&lines), vec!["abcd", "ef"]);
    }

    #[test]
    fn wide_chars_count_double() {
        let lines = layout_lines("日本語", 4, true);
        assert_eq!(texts(&lines), vec!["日本", "語"]);
        assert_eq!(line_width(&lines[0]), 4);
    }

    #[test]
    fn styles_carry_across_lines() {
        let lines = layout_lines("[red]ab\ncd[default]e", 10, false);
        assert_eq!(lines[1][0].text, "cd");
        assert_eq!(lines[1][0].fg.as_deref(), Some("red"));
        assert_eq!(lines[1][1].fg, None);
    }

    #[test]
    fn zero_width_keeps_nothing_visible() {
        let lines = layout_lines("abc", 0, true);
        assert_eq!(texts(&lines), vec![""]);
    }

    #[test]
    fn color_names() {
        assert_eq!(color_for("default"), None);
        assert_eq!(color_for("red"), Some(Color::Red));
        assert_eq!(color_for("grey"), Some(Color::Grey));
        assert_eq!(color_for("darkgray"), Some(Color::DarkGrey));
        assert_eq!(color_for("#0a0B0c"), Some(Color::Rgb { r: 10, g: 11, b: 12 }));
        assert_eq!(color_for("#12"), None);
        assert_eq!(color_for("no-such-color"), None);
    }

    #[test]
    fn panel_draws_border_title_and_body() {
        let mut out = Vec::new();
        let style = PanelStyle {
            bordered: true,
            border: Some(Color::Red),
            title: None,
        };
        let content = Content::new(" Load ", "cpu 10\nmem 20\nswap 30\n");
        draw_panel(&mut out, Rect::new(0, 0, 12, 4), &style, &content, 1).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("┌"));
        assert!(text.contains("┘"));
        assert!(text.contains(" Load "));
        assert!(text.contains("mem 20"));
        assert!(text.contains("swap 30"));
        assert!(!text.contains("cpu 10"));
    }

    #[test]
    fn unbordered_panel_uses_whole_rect() {
        let mut out = Vec::new();
        let content = Content::new(" Hidden ", "abc");
        draw_panel(&mut out, Rect::new(2, 2, 3, 1), &PanelStyle::default(), &content, 0).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("abc"));
        assert!(!text.contains("Hidden"));
        assert!(!text.contains("┌"));
    }

    #[test]
    fn empty_rect_draws_nothing() {
        let mut out = Vec::new();
        let content = Content::new("t", "body");
        draw_panel(&mut out, Rect::new(0, 0, 0, 5), &PanelStyle::default(), &content, 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn help_fits_small_screens() {
        let mut out = Vec::new();
        let text = "Keyboard commands for Feeds:\n\n    /: Show/hide this help window\n";
        draw_help(&mut out, Rect::new(0, 0, 10, 3), text).unwrap();
        let drawn = String::from_utf8(out).unwrap();
        assert!(drawn.contains("┌"));
        assert!(drawn.contains("Help"));
    }
}
