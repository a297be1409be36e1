#![forbid(unsafe_code)]

//! Key bindings with help text.
//!
//! A [`KeyboardDispatch`] maps keys to widget-defined actions. Actions are
//! plain values; the widget matches on the returned action while it holds its
//! own state mutably, so dispatch itself never touches widget data.
//!
//! Bindings keep declaration order, which is also the order of the help
//! listing:
//!
//! ```
//! use gridboard_core::event::{KeyCode, KeyEvent};
//! use gridboard_widgets::keyboard::KeyboardDispatch;
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Action { Help, Refresh, Open }
//!
//! let keys = KeyboardDispatch::new()
//!     .with_common_controls(Action::Help, Action::Refresh)
//!     .bind(KeyCode::Enter, Action::Open, "Open item");
//!
//! assert_eq!(keys.dispatch(&KeyEvent::new(KeyCode::Enter)), Some(Action::Open));
//! assert_eq!(
//!     keys.help_text("News"),
//!     "Keyboard commands for News:\n\n    /: Show/hide this help window\n    r: Refresh widget\n    Enter: Open item\n"
//! );
//! ```

use gridboard_core::event::{KeyCode, KeyEvent, Modifiers};

/// One key binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding<A> {
    pub key: KeyCode,
    pub action: A,
    pub help: String,
}

/// Ordered key bindings for one widget.
#[derive(Debug, Clone)]
pub struct KeyboardDispatch<A> {
    bindings: Vec<KeyBinding<A>>,
}

impl<A> Default for KeyboardDispatch<A> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<A: Clone> KeyboardDispatch<A> {
    /// Dispatch without bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `action`.
    ///
    /// Rebinding a key replaces its action and help text but keeps its
    /// position in the help listing.
    #[must_use]
    pub fn bind(mut self, key: KeyCode, action: A, help: impl Into<String>) -> Self {
        self.set(key, action, help);
        self
    }

    /// In-place form of [`Self::bind`].
    pub fn set(&mut self, key: KeyCode, action: A, help: impl Into<String>) {
        let help = help.into();
        match self.bindings.iter_mut().find(|b| b.key == key) {
            Some(existing) => {
                existing.action = action;
                existing.help = help;
            }
            None => self.bindings.push(KeyBinding { key, action, help }),
        }
    }

    /// `/` toggles help, `r` refreshes the widget.
    #[must_use]
    pub fn with_common_controls(self, help: A, refresh: A) -> Self {
        self.bind(KeyCode::Char('/'), help, "Show/hide this help window")
            .bind(KeyCode::Char('r'), refresh, "Refresh widget")
    }

    /// Arrow keys and `j`/`k` move the selection, `Esc` clears it.
    #[must_use]
    pub fn with_selection_controls(self, next: A, prev: A, unselect: A) -> Self {
        self.bind(KeyCode::Down, next.clone(), "Select next item")
            .bind(KeyCode::Char('j'), next, "Select next item")
            .bind(KeyCode::Up, prev.clone(), "Select previous item")
            .bind(KeyCode::Char('k'), prev, "Select previous item")
            .bind(KeyCode::Escape, unselect, "Clear selection")
    }

    /// Action bound to `event`, if any.
    ///
    /// Keys held with Ctrl, Alt or Super never match; Shift is ignored since
    /// it is already folded into the character.
    pub fn dispatch(&self, event: &KeyEvent) -> Option<A> {
        if event
            .modifiers
            .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER)
        {
            return None;
        }
        let found = self
            .bindings
            .iter()
            .find(|b| b.key == event.code)
            .map(|b| b.action.clone());
        gridboard_core::trace!(key = %event.code, matched = found.is_some(), "key dispatch");
        found
    }

    pub fn bindings(&self) -> &[KeyBinding<A>] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Help listing for a widget titled `title`.
    pub fn help_text(&self, title: &str) -> String {
        let mut out = format!("Keyboard commands for {title}:\n\n");
        for binding in &self.bindings {
            out.push_str("    ");
            out.push_str(&binding.key.to_string());
            out.push_str(": ");
            out.push_str(&binding.help);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        Help,
        Refresh,
        Next,
        Prev,
        Clear,
        Open,
    }

    fn dispatch() -> KeyboardDispatch<Act> {
        KeyboardDispatch::new()
            .with_common_controls(Act::Help, Act::Refresh)
            .with_selection_controls(Act::Next, Act::Prev, Act::Clear)
            .bind(KeyCode::Enter, Act::Open, "Open item")
    }

    #[test]
    fn maps_arrows_and_vim_keys() {
        let keys = dispatch();
        assert_eq!(keys.dispatch(&KeyEvent::new(KeyCode::Down)), Some(Act::Next));
        assert_eq!(keys.dispatch(&KeyEvent::char('j')), Some(Act::Next));
        assert_eq!(keys.dispatch(&KeyEvent::new(KeyCode::Up)), Some(Act::Prev));
        assert_eq!(keys.dispatch(&KeyEvent::char('k')), Some(Act::Prev));
        assert_eq!(keys.dispatch(&KeyEvent::new(KeyCode::Escape)), Some(Act::Clear));
        assert_eq!(keys.dispatch(&KeyEvent::char('r')), Some(Act::Refresh));
        assert_eq!(keys.dispatch(&KeyEvent::char('/')), Some(Act::Help));
    }

    #[test]
    fn unbound_key_is_none() {
        assert_eq!(dispatch().dispatch(&KeyEvent::char('z')), None);
    }

    #[test]
    fn ctrl_chords_do_not_match() {
        let event = KeyEvent::char('r').with_modifiers(Modifiers::CTRL);
        assert_eq!(dispatch().dispatch(&event), None);
        let shifted = KeyEvent::char('/').with_modifiers(Modifiers::SHIFT);
        assert_eq!(dispatch().dispatch(&shifted), Some(Act::Help));
    }

    #[test]
    fn rebinding_replaces_in_place() {
        let keys = dispatch().bind(KeyCode::Char('r'), Act::Open, "Reload");
        assert_eq!(keys.dispatch(&KeyEvent::char('r')), Some(Act::Open));
        assert_eq!(keys.bindings()[1].help, "Reload");
        assert_eq!(keys.bindings().len(), dispatch().bindings().len());
    }

    #[test]
    fn golden_help_text() {
        let expected = "Keyboard commands for Feeds:\n\n\
                        \x20   /: Show/hide this help window\n\
                        \x20   r: Refresh widget\n\
                        \x20   Down: Select next item\n\
                        \x20   j: Select next item\n\
                        \x20   Up: Select previous item\n\
                        \x20   k: Select previous item\n\
                        \x20   Esc: Clear selection\n\
                        \x20   Enter: Open item\n";
        assert_eq!(dispatch().help_text("Feeds"), expected);
    }

    #[test]
    fn empty_dispatch_has_header_only() {
        let keys: KeyboardDispatch<Act> = KeyboardDispatch::new();
        assert!(keys.is_empty());
        assert_eq!(keys.help_text("X"), "Keyboard commands for X:\n\n");
    }
}
