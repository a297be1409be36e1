#![forbid(unsafe_code)]

//! Inline color-tag markup.
//!
//! Widget content is plain text with embedded tags of the form `[name]`,
//! `[fg:bg]` or `[fg:bg:flags]`. A `[` that does not start a well-formed tag
//! is literal text, so `[[red]x` shows a literal bracket followed by a red
//! `x`. The tag `[default]` (or `[-]`) resets the foreground color.
//!
//! The grammar is intentionally small: tag names may contain ASCII letters,
//! digits, `#`, `:`, `_` and `-`, and must be closed by `]`.

/// A run of text with the tag that was active when it was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Displayed text.
    pub text: String,
    /// Active foreground tag; `None` means the terminal default.
    pub fg: Option<String>,
    /// Active background tag; `None` means the terminal default.
    pub bg: Option<String>,
}

/// Split marked-up text into styled spans.
///
/// Newlines are kept inside span text; callers split lines themselves.
pub fn parse_markup(input: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut fg: Option<String> = None;
    let mut bg: Option<String> = None;
    let mut current = String::new();
    let mut rest = input;

    while let Some(open) = rest.find('[') {
        current.push_str(&rest[..open]);
        let after = &rest[open..];
        match tag_at(after) {
            Some((tag, consumed)) => {
                if !current.is_empty() {
                    spans.push(Span {
                        text: std::mem::take(&mut current),
                        fg: fg.clone(),
                        bg: bg.clone(),
                    });
                }
                apply_tag(tag, &mut fg, &mut bg);
                rest = &after[consumed..];
            }
            None => {
                current.push('[');
                rest = &after[1..];
            }
        }
    }
    current.push_str(rest);
    if !current.is_empty() {
        spans.push(Span { text: current, fg, bg });
    }
    spans
}

/// Remove every color tag, keeping the visible text.
pub fn strip_color_tags(input: &str) -> String {
    parse_markup(input)
        .into_iter()
        .map(|span| span.text)
        .collect()
}

/// Returns the tag body and the number of bytes the tag occupies, if `s`
/// starts with a well-formed tag.
fn tag_at(s: &str) -> Option<(&str, usize)> {
    let body_and_rest = s.strip_prefix('[')?;
    let close = body_and_rest.find(']')?;
    let body = &body_and_rest[..close];
    let valid = body
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | ':' | '_' | '-'));
    if valid { Some((body, close + 2)) } else { None }
}

fn apply_tag(tag: &str, fg: &mut Option<String>, bg: &mut Option<String>) {
    let mut parts = tag.split(':');
    let fg_part = parts.next().unwrap_or_default();
    let bg_part = parts.next();

    match fg_part {
        "" => {}
        "-" | "default" => *fg = None,
        name => *fg = Some(name.to_string()),
    }
    match bg_part {
        None | Some("") => {}
        Some("-") | Some("default") => *bg = None,
        Some(name) => *bg = Some(name.to_string()),
    }
}
