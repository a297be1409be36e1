#![forbid(unsafe_code)]

//! Grid geometry.
//!
//! The dashboard is partitioned into a grid of columns and rows, each with a
//! size in terminal cells. Every module declares a [`ModulePlacement`] in grid
//! units; [`resolve`] turns that placement into the usable content size of the
//! module, with the border already subtracted.
//!
//! # Invariants
//!
//! 1. Resolution never fails. Out-of-range placements are clamped into the
//!    grid, never rejected.
//! 2. The resolved width and height are never negative; an empty usable area
//!    is legitimate.
//! 3. The border allowance is a flat [`BORDER_ALLOWANCE`] per axis, no matter
//!    how many cells the placement spans.
//!
//! # Example
//!
//! ```
//! use gridboard_core::geometry::{ModulePlacement, Size, resolve};
//!
//! let placement = ModulePlacement::new(0, 0, 2, 1);
//! let size = resolve(&placement, &[10, 10, 10], &[5, 5]);
//! assert_eq!(size, Size::new(18, 3));
//! ```

use serde::Deserialize;

use crate::config::ConfigError;

/// Cells taken by the border on each axis of a module.
///
/// Applied once per module, not once per spanned cell boundary.
pub const BORDER_ALLOWANCE: i64 = 2;

/// Column widths and row heights of the dashboard grid, in cells.
///
/// Loaded once at startup and shared read-only by every widget.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GridSpec {
    /// Width of each column.
    #[serde(default)]
    pub columns: Vec<u16>,
    /// Height of each row.
    #[serde(default)]
    pub rows: Vec<u16>,
}

impl GridSpec {
    /// Create a grid, rejecting a grid without columns or rows.
    pub fn new(columns: Vec<u16>, rows: Vec<u16>) -> Result<Self, ConfigError> {
        let grid = Self { columns, rows };
        grid.validate()?;
        Ok(grid)
    }

    /// Check that the grid has at least one column and one row.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns.len(),
                rows: self.rows.len(),
            });
        }
        Ok(())
    }

    /// Usable content size for a placement on this grid.
    #[inline]
    pub fn resolve(&self, placement: &ModulePlacement) -> Size {
        resolve(placement, &self.columns, &self.rows)
    }

    /// Outer screen rectangle of a placement, border included.
    ///
    /// The origin is the sum of the column widths left of the placement and
    /// the row heights above it.
    pub fn outer_rect(&self, placement: &ModulePlacement) -> Rect {
        let p = placement.clamped(self.columns.len(), self.rows.len());
        let span = |cells: &[u16], start: u16, len: u16| -> (u16, u16) {
            let start = usize::from(start).min(cells.len());
            let end = (start + usize::from(len)).min(cells.len());
            let offset: u32 = cells[..start].iter().map(|&c| u32::from(c)).sum();
            let extent: u32 = cells[start..end].iter().map(|&c| u32::from(c)).sum();
            (saturate(i64::from(offset)), saturate(i64::from(extent)))
        };
        let (x, width) = span(&self.columns, p.left, p.width);
        let (y, height) = span(&self.rows, p.top, p.height);
        Rect::new(x, y, width, height)
    }

    /// Total width of all columns.
    pub fn total_width(&self) -> u16 {
        saturate(self.columns.iter().map(|&c| i64::from(c)).sum())
    }

    /// Total height of all rows.
    pub fn total_height(&self) -> u16 {
        saturate(self.rows.iter().map(|&r| i64::from(r)).sum())
    }
}

/// Position and span of a module in grid-cell units.
///
/// Absent fields default to `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default)]
pub struct ModulePlacement {
    /// First column (0-indexed).
    pub left: u16,
    /// First row (0-indexed).
    pub top: u16,
    /// Number of columns spanned.
    pub width: u16,
    /// Number of rows spanned.
    pub height: u16,
}

impl ModulePlacement {
    /// Create a new placement.
    #[inline]
    pub const fn new(left: u16, top: u16, width: u16, height: u16) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Clamp the placement into a grid of `column_count` x `row_count` cells.
    ///
    /// `left`/`top` land in `[0, count - 1]` and the span is cut so that it
    /// ends inside the grid. A zero-sized axis yields a zero placement on that
    /// axis.
    pub fn clamped(&self, column_count: usize, row_count: usize) -> Self {
        let (left, width) = clamp_axis(self.left, self.width, column_count);
        let (top, height) = clamp_axis(self.top, self.height, row_count);
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

fn clamp_axis(start: u16, span: u16, count: usize) -> (u16, u16) {
    if count == 0 {
        return (0, 0);
    }
    let last = u16::try_from(count - 1).unwrap_or(u16::MAX);
    let start = start.min(last);
    let room = u16::try_from(count - usize::from(start)).unwrap_or(u16::MAX);
    (start, span.min(room))
}

/// Width and height in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Check if the size has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Resolve a placement against the grid into a border-adjusted content size.
///
/// Clamps the placement into the grid, sums the spanned column widths and row
/// heights, subtracts [`BORDER_ALLOWANCE`] from each, and floors both at zero.
pub fn resolve(placement: &ModulePlacement, columns: &[u16], rows: &[u16]) -> Size {
    let p = placement.clamped(columns.len(), rows.len());
    if p != *placement {
        crate::trace!(
            requested = ?placement,
            clamped = ?p,
            "module placement clamped into grid"
        );
    }

    let span_sum = |cells: &[u16], start: u16, len: u16| -> i64 {
        let start = usize::from(start);
        let end = (start + usize::from(len)).min(cells.len());
        cells
            .get(start..end)
            .map(|s| s.iter().map(|&c| i64::from(c)).sum())
            .unwrap_or(0)
    };

    let width = span_sum(columns, p.left, p.width) - BORDER_ALLOWANCE;
    let height = span_sum(rows, p.top, p.height) - BORDER_ALLOWANCE;

    Size::new(saturate(width), saturate(height))
}

fn saturate(value: i64) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

/// A rectangle in terminal coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Shrink by `margin` cells on every side.
    pub fn inset(&self, margin: u16) -> Rect {
        let twice = margin.saturating_mul(2);
        Rect {
            x: self.x.saturating_add(margin),
            y: self.y.saturating_add(margin),
            width: self.width.saturating_sub(twice),
            height: self.height.saturating_sub(twice),
        }
    }

    /// Size of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLS: [u16; 3] = [10, 10, 10];
    const ROWS: [u16; 2] = [5, 5];

    #[test]
    fn two_columns_one_row() {
        let size = resolve(&ModulePlacement::new(0, 0, 2, 1), &COLS, &ROWS);
        assert_eq!(size, Size::new(18, 3));
    }

    #[test]
    fn border_is_flat_for_wide_spans() {
        // Three columns cross two interior boundaries but lose only 2 cells.
        let size = resolve(&ModulePlacement::new(0, 0, 3, 2), &COLS, &ROWS);
        assert_eq!(size, Size::new(28, 8));
    }

    #[test]
    fn zero_span_is_empty_not_negative() {
        let size = resolve(&ModulePlacement::new(1, 1, 0, 0), &COLS, &ROWS);
        assert_eq!(size, Size::new(0, 0));
    }

    #[test]
    fn cells_smaller_than_border_floor_at_zero() {
        let size = resolve(&ModulePlacement::new(0, 0, 1, 1), &[1], &[2]);
        assert_eq!(size, Size::new(0, 0));
    }

    #[test]
    fn left_beyond_grid_clamps_to_last_column() {
        let size = resolve(&ModulePlacement::new(9, 0, 4, 1), &[10, 20, 30], &ROWS);
        // left -> 2, width -> 1
        assert_eq!(size.width, 28);
    }

    #[test]
    fn span_overflow_is_cut_at_grid_edge() {
        let p = ModulePlacement::new(1, 1, 10, 10).clamped(3, 2);
        assert_eq!(p, ModulePlacement::new(1, 1, 2, 1));
    }

    #[test]
    fn empty_grid_resolves_to_zero() {
        let size = resolve(&ModulePlacement::new(0, 0, 1, 1), &[], &[]);
        assert_eq!(size, Size::default());
    }

    #[test]
    fn huge_cells_saturate() {
        let size = resolve(
            &ModulePlacement::new(0, 0, 2, 1),
            &[u16::MAX, u16::MAX],
            &[4],
        );
        assert_eq!(size, Size::new(u16::MAX, 2));
    }

    #[test]
    fn grid_spec_rejects_empty_axes() {
        assert!(GridSpec::new(vec![], vec![1]).is_err());
        assert!(GridSpec::new(vec![1], vec![]).is_err());
        assert!(GridSpec::new(vec![1], vec![1]).is_ok());
    }

    #[test]
    fn outer_rect_offsets_by_preceding_cells() {
        let grid = GridSpec::new(vec![10, 20, 30], vec![5, 7]).unwrap();
        let rect = grid.outer_rect(&ModulePlacement::new(1, 1, 2, 1));
        assert_eq!(rect, Rect::new(10, 5, 50, 7));
        assert_eq!(rect.inset(1).size(), grid.resolve(&ModulePlacement::new(1, 1, 2, 1)));
    }

    #[test]
    fn placement_deserializes_with_defaults() {
        let p: ModulePlacement = serde_json::from_str(r#"{"left": 2, "width": 3}"#).unwrap();
        assert_eq!(p, ModulePlacement::new(2, 0, 3, 0));
    }

    #[test]
    fn totals() {
        let grid = GridSpec::new(vec![10, 20], vec![3, 4, 5]).unwrap();
        assert_eq!(grid.total_width(), 30);
        assert_eq!(grid.total_height(), 12);
    }
}
