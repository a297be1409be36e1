#![forbid(unsafe_code)]

//! Cyclic row selection for list-style widgets.
//!
//! The selected index is either [`NO_SELECTION`] or a valid index into the
//! current items. Movement wraps around at both ends. The model lives inside
//! its widget and is only touched while the widget's own lock is held, so the
//! input path and the refresh path never observe it half-updated.

/// Sentinel index meaning nothing is selected.
pub const NO_SELECTION: isize = -1;

/// Selection state of a list widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionModel {
    selected: isize,
    item_count: usize,
    scroll_to_top: bool,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    /// An empty model with nothing selected.
    pub const fn new() -> Self {
        Self {
            selected: NO_SELECTION,
            item_count: 0,
            scroll_to_top: false,
        }
    }

    /// Raw selected index, [`NO_SELECTION`] included.
    #[inline]
    pub fn selected(&self) -> isize {
        self.selected
    }

    /// Whether an item is selected. Use this rather than [`Self::get_selected`]
    /// to tell "row 0" apart from "nothing".
    #[inline]
    pub fn has_selection(&self) -> bool {
        self.selected != NO_SELECTION
    }

    /// Index usable for lookups: the selection, or 0 when nothing is selected.
    #[inline]
    pub fn get_selected(&self) -> usize {
        usize::try_from(self.selected).unwrap_or(0)
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Record how many items the widget currently shows.
    ///
    /// A selection that falls outside the new range is cleared.
    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;
        if self.has_selection() && self.get_selected() >= count {
            self.selected = NO_SELECTION;
        }
    }

    /// Select the next item, wrapping to the first. No-op without items.
    pub fn next(&mut self) {
        let Some(count) = self.count() else { return };
        self.selected = (self.selected + 1).rem_euclid(count);
    }

    /// Select the previous item, wrapping to the last. No-op without items.
    ///
    /// With nothing selected this selects the last item.
    pub fn prev(&mut self) {
        let Some(count) = self.count() else { return };
        self.selected = if self.has_selection() {
            (self.selected - 1 + count).rem_euclid(count)
        } else {
            count - 1
        };
    }

    /// Clear the selection and ask the view to scroll back to the top.
    pub fn unselect(&mut self) {
        self.selected = NO_SELECTION;
        self.scroll_to_top = true;
    }

    /// Consume the pending scroll-to-top request.
    pub fn take_scroll_to_top(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }

    /// Whether `index` is the selected row.
    #[inline]
    pub fn is_selected(&self, index: usize) -> bool {
        self.has_selection() && self.get_selected() == index
    }

    fn count(&self) -> Option<isize> {
        match isize::try_from(self.item_count) {
            Ok(0) | Err(_) => None,
            Ok(count) => Some(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(count: usize) -> SelectionModel {
        let mut m = SelectionModel::new();
        m.set_item_count(count);
        m
    }

    #[test]
    fn starts_unselected() {
        let m = SelectionModel::new();
        assert_eq!(m.selected(), NO_SELECTION);
        assert!(!m.has_selection());
        assert_eq!(m.get_selected(), 0);
    }

    #[test]
    fn next_from_nothing_selects_first() {
        let mut m = model(3);
        m.next();
        assert_eq!(m.selected(), 0);
    }

    #[test]
    fn next_wraps() {
        let mut m = model(2);
        m.next();
        m.next();
        m.next();
        assert_eq!(m.selected(), 0);
    }

    #[test]
    fn prev_wraps_to_last() {
        let mut m = model(3);
        m.next();
        m.prev();
        assert_eq!(m.selected(), 2);
    }

    #[test]
    fn prev_from_nothing_selects_last() {
        let mut m = model(4);
        m.prev();
        assert_eq!(m.selected(), 3);
    }

    #[test]
    fn empty_list_is_noop() {
        let mut m = model(0);
        m.next();
        m.prev();
        assert_eq!(m.selected(), NO_SELECTION);
    }

    #[test]
    fn next_then_prev_restores() {
        let mut m = model(5);
        m.next();
        m.next();
        let before = m.selected();
        m.next();
        m.prev();
        assert_eq!(m.selected(), before);
    }

    #[test]
    fn unselect_keeps_sentinel_distinct_from_zero() {
        let mut m = model(3);
        m.next();
        m.next();
        m.unselect();
        assert_eq!(m.get_selected(), 0);
        assert!(!m.has_selection());
        assert!(!m.is_selected(0));
        assert!(m.take_scroll_to_top());
        assert!(!m.take_scroll_to_top());
    }

    #[test]
    fn shrinking_items_clears_stale_selection() {
        let mut m = model(5);
        for _ in 0..4 {
            m.next();
        }
        assert_eq!(m.selected(), 3);
        m.set_item_count(2);
        assert!(!m.has_selection());
        m.set_item_count(10);
        assert!(!m.has_selection());
    }

    #[test]
    fn shrinking_keeps_valid_selection() {
        let mut m = model(5);
        m.next();
        m.set_item_count(1);
        assert_eq!(m.selected(), 0);
    }
}
