#![forbid(unsafe_code)]

//! Input events consumed by the dashboard loop.
//!
//! Terminal events are mapped from crossterm into this small vocabulary so
//! widgets and key dispatch never depend on the backend directly. Only keys
//! and resizes are modelled.

use std::fmt;

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// Input event seen by the dashboard loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),

    /// The terminal changed size.
    Resize {
        /// Columns after the resize.
        width: u16,
        /// Rows after the resize.
        height: u16,
    },
}

impl Event {
    /// Convert a crossterm event, dropping the kinds the dashboard ignores.
    ///
    /// Key releases are dropped so a key never fires twice on terminals that
    /// report both edges.
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) if key.kind != cte::KeyEventKind::Release => {
                map_key_event(key).map(Event::Key)
            }
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            _ => None,
        }
    }
}

/// A key press with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event without modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Shorthand for a plain character key.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// True when the key is the character `c`, whatever the modifiers.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// Key codes the dashboard distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
}

impl fmt::Display for KeyCode {
    /// Name used in keyboard help text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("Space"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Enter => f.write_str("Enter"),
            Self::Escape => f.write_str("Esc"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Tab => f.write_str("Tab"),
            Self::BackTab => f.write_str("Backtab"),
            Self::Delete => f.write_str("Delete"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::PageUp => f.write_str("PgUp"),
            Self::PageDown => f.write_str("PgDn"),
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::F(n) => write!(f, "F{n}"),
        }
    }
}

bitflags! {
    /// Held modifier keys. Hyper and Meta fold into `SUPER`.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const SHIFT = 1 << 0;
        const ALT = 1 << 1;
        const CTRL = 1 << 2;
        const SUPER = 1 << 3;
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    KeyCode::try_from(event.code)
        .ok()
        .map(|code| KeyEvent::new(code).with_modifiers(Modifiers::from(event.modifiers)))
}

#[cfg(not(target_arch = "wasm32"))]
impl TryFrom<cte::KeyCode> for KeyCode {
    type Error = cte::KeyCode;

    /// Fails with the crossterm code for keys the dashboard has no use for.
    fn try_from(code: cte::KeyCode) -> Result<Self, Self::Error> {
        use cte::KeyCode as Ct;

        Ok(match code {
            Ct::Char(c) => Self::Char(c),
            Ct::F(n) => Self::F(n),
            Ct::Esc => Self::Escape,
            Ct::Enter => Self::Enter,
            Ct::Tab => Self::Tab,
            Ct::BackTab => Self::BackTab,
            Ct::Backspace => Self::Backspace,
            Ct::Delete => Self::Delete,
            Ct::Up => Self::Up,
            Ct::Down => Self::Down,
            Ct::Left => Self::Left,
            Ct::Right => Self::Right,
            Ct::Home => Self::Home,
            Ct::End => Self::End,
            Ct::PageUp => Self::PageUp,
            Ct::PageDown => Self::PageDown,
            other => return Err(other),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<cte::KeyModifiers> for Modifiers {
    fn from(held: cte::KeyModifiers) -> Self {
        use cte::KeyModifiers as Ct;

        [
            (Ct::SHIFT, Self::SHIFT),
            (Ct::ALT, Self::ALT),
            (Ct::CONTROL, Self::CTRL),
            (Ct::SUPER | Ct::HYPER | Ct::META, Self::SUPER),
        ]
        .into_iter()
        .filter(|(ct, _)| held.intersects(*ct))
        .fold(Self::NONE, |acc, (_, ours)| acc | ours)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crossterm::event as ct_event;

    #[test]
    fn key_shorthands() {
        let quit = KeyEvent::char('c');
        assert_eq!(quit.code, KeyCode::Char('c'));
        assert!(quit.is_char('c') && !quit.is_char('C'));
        assert!(!quit.ctrl());
        assert!(quit.with_modifiers(Modifiers::CTRL | Modifiers::SHIFT).ctrl());
    }

    #[test]
    fn hyper_and_meta_count_as_super() {
        let held = ct_event::KeyModifiers::HYPER | ct_event::KeyModifiers::ALT;
        assert_eq!(Modifiers::from(held), Modifiers::SUPER | Modifiers::ALT);
        assert!(Modifiers::from(ct_event::KeyModifiers::NONE).is_empty());
    }

    #[test]
    fn display_names() {
        assert_eq!(KeyCode::Down.to_string(), "Down");
        assert_eq!(KeyCode::Escape.to_string(), "Esc");
        assert_eq!(KeyCode::Char('/').to_string(), "/");
        assert_eq!(KeyCode::Char(' ').to_string(), "Space");
        assert_eq!(KeyCode::F(5).to_string(), "F5");
    }

    #[test]
    fn maps_crossterm_key_press() {
        let ct = ct_event::KeyEvent::new(ct_event::KeyCode::Esc, ct_event::KeyModifiers::CONTROL);
        let mapped = Event::from_crossterm(ct_event::Event::Key(ct));
        assert_eq!(
            mapped,
            Some(Event::Key(
                KeyEvent::new(KeyCode::Escape).with_modifiers(Modifiers::CTRL)
            ))
        );
    }

    #[test]
    fn drops_key_release() {
        let mut ct = ct_event::KeyEvent::new(ct_event::KeyCode::Char('a'), ct_event::KeyModifiers::NONE);
        ct.kind = ct_event::KeyEventKind::Release;
        assert_eq!(Event::from_crossterm(ct_event::Event::Key(ct)), None);
    }

    #[test]
    fn maps_resize_and_ignores_focus() {
        assert_eq!(
            Event::from_crossterm(ct_event::Event::Resize(80, 24)),
            Some(Event::Resize {
                width: 80,
                height: 24
            })
        );
        assert_eq!(Event::from_crossterm(ct_event::Event::FocusGained), None);
    }

    #[test]
    fn unmapped_key_is_none() {
        let ct = ct_event::KeyEvent::new(ct_event::KeyCode::CapsLock, ct_event::KeyModifiers::NONE);
        assert_eq!(Event::from_crossterm(ct_event::Event::Key(ct)), None);
    }
}
