#![forbid(unsafe_code)]

//! Selectable list widget backed by an [`ItemSource`].
//!
//! The widget owns the fetched items, a [`SelectionModel`] and the key
//! bindings; the source only knows how to fetch items, describe one as a row,
//! and open one. Rows alternate between the even and odd row colors, opened
//! items are greyed out, and the selected row gets the highlight background.

use std::sync::Arc;

use gridboard_core::event::{KeyCode, KeyEvent};
use gridboard_core::geometry::Size;
use gridboard_core::settings_doc::{ConfigEntry, generate};
use gridboard_core::{CommonSettings, ThemeColors};

use crate::keyboard::KeyboardDispatch;
use crate::lifecycle::WidgetLifecycle;
use crate::selection::SelectionModel;
use crate::{Content, FetchError, InputOutcome, Scroll, Widget};

/// Foreground used for items that were already opened.
pub const VIEWED_COLOR: &str = "gray";

/// Body shown when the source returned no items.
pub const NO_DATA: &str = "No data";

/// Data collaborator of a [`ListWidget`].
pub trait ItemSource: Send {
    type Item: Send;

    /// Fetch the current items.
    fn fetch(&mut self) -> Result<Vec<Self::Item>, FetchError>;

    /// One-line description of an item.
    fn row_text(&self, item: &Self::Item) -> String;

    /// Act on the selected item, e.g. open it in a browser.
    fn open(&mut self, _item: &Self::Item) -> Result<(), FetchError> {
        Ok(())
    }

    /// Settings documentation for this source, usually starting with
    /// `ConfigEntry::Nested(COMMON_FIELDS)`. Empty means common settings only.
    fn settings_fields(&self) -> &'static [ConfigEntry] {
        &[]
    }
}

/// Actions bound to list keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    ToggleHelp,
    Refresh,
    Next,
    Prev,
    Unselect,
    Open,
}

#[derive(Debug)]
struct Entry<T> {
    item: T,
    viewed: bool,
}

/// A list widget with cyclic selection.
pub struct ListWidget<S: ItemSource> {
    lifecycle: Arc<WidgetLifecycle>,
    source: S,
    entries: Vec<Entry<S::Item>>,
    selection: SelectionModel,
    error: Option<FetchError>,
    keys: KeyboardDispatch<ListAction>,
}

impl<S: ItemSource> ListWidget<S> {
    pub fn new(settings: CommonSettings, source: S) -> Self {
        let keys = KeyboardDispatch::new()
            .with_common_controls(ListAction::ToggleHelp, ListAction::Refresh)
            .with_selection_controls(ListAction::Next, ListAction::Prev, ListAction::Unselect)
            .bind(KeyCode::Enter, ListAction::Open, "Open the selected item");
        Self {
            lifecycle: Arc::new(WidgetLifecycle::new(settings)),
            source,
            entries: Vec::new(),
            selection: SelectionModel::new(),
            error: None,
            keys,
        }
    }

    /// Add or replace a key binding on top of the default list controls.
    #[must_use]
    pub fn with_binding(mut self, key: KeyCode, action: ListAction, help: &str) -> Self {
        self.keys.set(key, action, help);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the item at `index` was opened since the last refresh.
    pub fn is_viewed(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.viewed)
    }

    /// Open the selected item and mark it viewed. Does nothing without a
    /// selection.
    pub fn open_selected(&mut self) {
        if !self.selection.has_selection() {
            return;
        }
        let index = self.selection.get_selected();
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        entry.viewed = true;
        if let Err(err) = self.source.open(&entry.item) {
            gridboard_core::warn!(
                widget = %self.lifecycle.name(),
                error = %err,
                "failed to open list item"
            );
        }
    }

    fn colors(&self) -> &ThemeColors {
        &self.lifecycle.settings().colors
    }

    fn row_color(&self, index: usize) -> &str {
        let colors = self.colors();
        if index % 2 == 0 {
            &colors.even_row
        } else {
            &colors.odd_row
        }
    }

    fn body(&self) -> String {
        let highlight = &self.colors().highlighted_background;
        let mut out = String::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let fg = if entry.viewed {
                VIEWED_COLOR
            } else {
                self.row_color(index)
            };
            let tag = if self.selection.is_selected(index) {
                format!("{fg}:{highlight}")
            } else {
                fg.to_string()
            };
            out.push_str(&format!(
                "[{tag}]{:2}. {}[-:-]\n",
                index + 1,
                self.source.row_text(&entry.item)
            ));
        }
        out
    }
}

impl<S: ItemSource> Widget for ListWidget<S> {
    fn lifecycle(&self) -> &Arc<WidgetLifecycle> {
        &self.lifecycle
    }

    fn refresh(&mut self) {
        match self.source.fetch() {
            Ok(items) => {
                self.error = None;
                self.entries = items
                    .into_iter()
                    .map(|item| Entry {
                        item,
                        viewed: false,
                    })
                    .collect();
            }
            Err(err) => {
                gridboard_core::warn!(widget = %self.lifecycle.name(), error = %err, "fetch failed");
                self.error = Some(err);
                self.entries.clear();
            }
        }
        self.selection.set_item_count(self.entries.len());
    }

    fn render(&mut self, _size: Size) -> Content {
        let title = self.lifecycle.contextual_title(&self.lifecycle.settings().title);
        let scroll = if self.selection.take_scroll_to_top() {
            Scroll::Top
        } else if self.selection.has_selection() {
            Scroll::Line(self.selection.get_selected())
        } else {
            Scroll::Keep
        };

        if let Some(err) = &self.error {
            return Content::new(title, err.to_string())
                .wrapped(true)
                .scrolled(Scroll::Top);
        }
        if self.entries.is_empty() {
            return Content::new(title, NO_DATA);
        }
        Content::new(title, self.body()).scrolled(scroll)
    }

    fn help_text(&self) -> String {
        self.keys.help_text(&self.lifecycle.settings().title)
    }

    fn handle_key(&mut self, key: &KeyEvent) -> InputOutcome {
        let Some(action) = self.keys.dispatch(key) else {
            return InputOutcome::Ignored;
        };
        match action {
            ListAction::ToggleHelp => return InputOutcome::ToggleHelp,
            ListAction::Refresh => return InputOutcome::Refresh,
            ListAction::Next => self.selection.next(),
            ListAction::Prev => self.selection.prev(),
            ListAction::Unselect => self.selection.unselect(),
            ListAction::Open => self.open_selected(),
        }
        InputOutcome::Consumed
    }

    fn config_text(&self) -> String {
        match self.source.settings_fields() {
            [] => <CommonSettings as gridboard_core::DescribeSettings>::config_text(),
            fields => generate(fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridboard_core::settings_doc::ConfigField;
    use gridboard_core::{GlobalConfig, ModuleConfig};

    struct Stories {
        batches: Vec<Result<Vec<&'static str>, FetchError>>,
        opened: Vec<&'static str>,
    }

    impl ItemSource for Stories {
        type Item = &'static str;

        fn fetch(&mut self) -> Result<Vec<&'static str>, FetchError> {
            if self.batches.is_empty() {
                return Ok(Vec::new());
            }
            self.batches.remove(0)
        }

        fn row_text(&self, item: &&'static str) -> String {
            (*item).to_string()
        }

        fn open(&mut self, item: &&'static str) -> Result<(), FetchError> {
            self.opened.push(item);
            Ok(())
        }
    }

    fn widget(batches: Vec<Result<Vec<&'static str>, FetchError>>) -> ListWidget<Stories> {
        let module = ModuleConfig {
            enabled: Some(true),
            focusable: Some(true),
            ..ModuleConfig::default()
        };
        let settings =
            CommonSettings::from_module("news", "News", true, &module, &GlobalConfig::default());
        ListWidget::new(
            settings,
            Stories {
                batches,
                opened: Vec::new(),
            },
        )
    }

    fn press(w: &mut ListWidget<Stories>, code: KeyCode) -> InputOutcome {
        w.handle_key(&KeyEvent::new(code))
    }

    #[test]
    fn empty_source_shows_no_data() {
        let mut w = widget(vec![Ok(vec![])]);
        w.refresh();
        let content = w.render(Size::new(20, 5));
        assert_eq!(content.body, NO_DATA);
        assert_eq!(content.title, " News ");
    }

    #[test]
    fn rows_alternate_colors() {
        let mut w = widget(vec![Ok(vec!["a", "b", "c"])]);
        w.refresh();
        let body = w.render(Size::new(20, 5)).body;
        assert_eq!(
            body,
            "[white] 1. a[-:-]\n[lightblue] 2. b[-:-]\n[white] 3. c[-:-]\n"
        );
    }

    #[test]
    fn fetch_error_replaces_items() {
        let mut w = widget(vec![Ok(vec!["a", "b"]), Err(FetchError::new("timeout"))]);
        w.refresh();
        press(&mut w, KeyCode::Down);
        w.refresh();
        assert!(w.is_empty());
        assert_eq!(w.selection().item_count(), 0);
        assert!(!w.selection().has_selection());
        let content = w.render(Size::new(20, 5));
        assert_eq!(content.body, "timeout");
        assert!(content.wrap);
        w.refresh();
        assert!(w.error().is_none());
    }

    #[test]
    fn selection_highlights_row() {
        let mut w = widget(vec![Ok(vec!["a", "b"])]);
        w.refresh();
        assert_eq!(press(&mut w, KeyCode::Down), InputOutcome::Consumed);
        assert_eq!(press(&mut w, KeyCode::Down), InputOutcome::Consumed);
        let content = w.render(Size::new(20, 5));
        assert!(content.body.contains("[lightblue:blue] 2. b"));
        assert_eq!(content.scroll, Scroll::Line(1));
    }

    #[test]
    fn open_marks_viewed_and_grays_row() {
        let mut w = widget(vec![Ok(vec!["a", "b"])]);
        w.refresh();
        press(&mut w, KeyCode::Enter);
        assert!(!w.is_viewed(0), "nothing selected, nothing opened");
        press(&mut w, KeyCode::Down);
        press(&mut w, KeyCode::Enter);
        assert!(w.is_viewed(0));
        assert_eq!(w.source().opened, vec!["a"]);
        press(&mut w, KeyCode::Escape);
        let content = w.render(Size::new(20, 5));
        assert!(content.body.starts_with("[gray] 1. a"));
        assert_eq!(content.scroll, Scroll::Top);
    }

    #[test]
    fn common_keys_escalate() {
        let mut w = widget(vec![]);
        assert_eq!(press(&mut w, KeyCode::Char('r')), InputOutcome::Refresh);
        assert_eq!(press(&mut w, KeyCode::Char('/')), InputOutcome::ToggleHelp);
        assert_eq!(press(&mut w, KeyCode::Char('x')), InputOutcome::Ignored);
    }

    #[test]
    fn help_lists_bindings() {
        let w = widget(vec![]);
        let help = w.help_text();
        assert!(help.starts_with("Keyboard commands for News:\n\n"));
        assert!(help.contains("    Enter: Open the selected item\n"));
    }

    struct Documented;

    const FIELDS: &[ConfigEntry] = &[
        ConfigEntry::Nested(gridboard_core::COMMON_FIELDS),
        ConfigEntry::Field(ConfigField::new("Feeds", "Feed URLs to read.", false, "")),
    ];

    impl ItemSource for Documented {
        type Item = ();
        fn fetch(&mut self) -> Result<Vec<()>, FetchError> {
            Ok(vec![])
        }
        fn row_text(&self, _item: &()) -> String {
            String::new()
        }
        fn settings_fields(&self) -> &'static [ConfigEntry] {
            FIELDS
        }
    }

    #[test]
    fn config_text_uses_source_fields() {
        let w = ListWidget::new(CommonSettings::named("f", "F"), Documented);
        let text = w.config_text();
        assert!(text.starts_with("\n\n bordered\n"));
        assert!(text.ends_with("\n\n feeds\n Feed URLs to read."));
    }
}
