#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Two coordinate spaces meet here:
//!
//! - **Grid space**: integer cells, 0-indexed, origin at the top-left cell.
//!   [`GridDims`], [`CellCoord`] and [`GridRect`] live here.
//! - **Pixel space**: the host surface the grid is drawn into, in `f64`
//!   client units. [`PixelRect`] lives here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of grid columns.
pub const GRID_COLS: u16 = 8;

/// Default number of grid rows.
pub const GRID_ROWS: u16 = 8;

/// Errors from constructing geometry values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// A grid needs at least one column and one row.
    ZeroDimension { cols: u16, rows: u16 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { cols, rows } => {
                write!(f, "grid dimensions must be non-zero (got {cols}x{rows})")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

// ─────────────────────────────────────────────────────────────────────────────
// Grid Dimensions
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed column/row count of a dashboard grid.
///
/// Both dimensions are always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridDimsRepr", into = "GridDimsRepr")]
pub struct GridDims {
    cols: u16,
    rows: u16,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct GridDimsRepr {
    cols: u16,
    rows: u16,
}

impl TryFrom<GridDimsRepr> for GridDims {
    type Error = GeometryError;

    fn try_from(repr: GridDimsRepr) -> Result<Self, Self::Error> {
        Self::new(repr.cols, repr.rows)
    }
}

impl From<GridDims> for GridDimsRepr {
    fn from(dims: GridDims) -> Self {
        Self {
            cols: dims.cols,
            rows: dims.rows,
        }
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl GridDims {
    /// The standard 8x8 dashboard grid.
    pub const DEFAULT: Self = Self {
        cols: GRID_COLS,
        rows: GRID_ROWS,
    };

    /// Create grid dimensions, rejecting a zero column or row count.
    pub const fn new(cols: u16, rows: u16) -> Result<Self, GeometryError> {
        if cols == 0 || rows == 0 {
            return Err(GeometryError::ZeroDimension { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.cols as u32 * self.rows as u32
    }

    /// Whether `cell` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains_cell(&self, cell: CellCoord) -> bool {
        cell.col < self.cols && cell.row < self.rows
    }

    /// Whether `rect` is non-empty and lies fully inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains_rect(&self, rect: GridRect) -> bool {
        !rect.is_empty()
            && rect.col as u32 + rect.col_span as u32 <= self.cols as u32
            && rect.row as u32 + rect.row_span as u32 <= self.rows as u32
    }

    /// Force `rect` into the grid.
    ///
    /// Spans are clamped into `[1, dims]` first, then the origin is pulled
    /// back so the far edge does not pass the grid boundary.
    #[must_use]
    pub fn clamp_rect(&self, rect: GridRect) -> GridRect {
        let col_span = rect.col_span.clamp(1, self.cols);
        let row_span = rect.row_span.clamp(1, self.rows);
        GridRect {
            col: rect.col.min(self.cols - col_span),
            row: rect.row.min(self.rows - row_span),
            col_span,
            row_span,
        }
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cells
// ─────────────────────────────────────────────────────────────────────────────

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: u16,
    pub row: u16,
}

impl CellCoord {
    #[inline]
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }
}

/// A rectangle of grid cells.
///
/// Edges follow the half-open convention: `col..right()` and
/// `row..bottom()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRect {
    pub col: u16,
    pub row: u16,
    pub col_span: u16,
    pub row_span: u16,
}

impl GridRect {
    #[inline]
    pub const fn new(col: u16, row: u16, col_span: u16, row_span: u16) -> Self {
        Self {
            col,
            row,
            col_span,
            row_span,
        }
    }

    /// Top-left cell.
    #[inline]
    pub const fn origin(&self) -> CellCoord {
        CellCoord::new(self.col, self.row)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.col.saturating_add(self.col_span)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.row.saturating_add(self.row_span)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.col_span as u32 * self.row_span as u32
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.col_span == 0 || self.row_span == 0
    }

    /// Check if a cell is inside the rectangle.
    #[inline]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.col >= self.col
            && cell.col < self.right()
            && cell.row >= self.row
            && cell.row < self.bottom()
    }

    /// Axis-aligned overlap test.
    ///
    /// Rectangles that only share an edge do not overlap.
    #[inline]
    pub const fn overlaps(&self, other: &GridRect) -> bool {
        self.col < other.right()
            && self.right() > other.col
            && self.row < other.bottom()
            && self.bottom() > other.row
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pixel Space
// ─────────────────────────────────────────────────────────────────────────────

/// Bounding rectangle of the grid container in host pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the rectangle can be subdivided into cells: finite origin and
    /// strictly positive, finite extent.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Pixel size of one cell for the given grid, or `None` when the
    /// rectangle is not usable.
    #[must_use]
    pub fn cell_size(&self, dims: GridDims) -> Option<(f64, f64)> {
        if !self.is_usable() {
            return None;
        }
        Some((
            self.width / f64::from(dims.cols()),
            self.height / f64::from(dims.rows()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dims_reject_zero() {
        assert_eq!(
            GridDims::new(0, 8),
            Err(GeometryError::ZeroDimension { cols: 0, rows: 8 })
        );
        assert!(GridDims::new(8, 0).is_err());
        assert_eq!(GridDims::new(8, 8), Ok(GridDims::DEFAULT));
    }

    #[test]
    fn grid_dims_serde_validates() {
        let dims: GridDims = serde_json::from_str(r#"{"cols":12,"rows":6}"#).unwrap();
        assert_eq!((dims.cols(), dims.rows()), (12, 6));
        assert!(serde_json::from_str::<GridDims>(r#"{"cols":0,"rows":6}"#).is_err());
        assert_eq!(
            serde_json::to_string(&GridDims::DEFAULT).unwrap(),
            r#"{"cols":8,"rows":8}"#
        );
    }

    #[test]
    fn contains_rect_respects_far_edge() {
        let dims = GridDims::DEFAULT;
        assert!(dims.contains_rect(GridRect::new(0, 0, 8, 8)));
        assert!(dims.contains_rect(GridRect::new(6, 6, 2, 2)));
        assert!(!dims.contains_rect(GridRect::new(7, 0, 2, 1)));
        assert!(!dims.contains_rect(GridRect::new(0, 0, 0, 1)));
    }

    #[test]
    fn clamp_rect_pulls_origin_back() {
        let dims = GridDims::DEFAULT;
        assert_eq!(
            dims.clamp_rect(GridRect::new(7, 7, 3, 2)),
            GridRect::new(5, 6, 3, 2)
        );
        assert_eq!(
            dims.clamp_rect(GridRect::new(2, 2, 0, 20)),
            GridRect::new(2, 0, 1, 8)
        );
    }

    #[test]
    fn overlap_excludes_shared_edges() {
        let a = GridRect::new(0, 0, 2, 2);
        assert!(a.overlaps(&GridRect::new(1, 1, 2, 2)));
        assert!(!a.overlaps(&GridRect::new(2, 0, 2, 2)));
        assert!(!a.overlaps(&GridRect::new(0, 2, 2, 2)));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn rect_contains_cell_half_open() {
        let r = GridRect::new(1, 1, 2, 3);
        assert!(r.contains(CellCoord::new(1, 1)));
        assert!(r.contains(CellCoord::new(2, 3)));
        assert!(!r.contains(CellCoord::new(3, 1)));
        assert!(!r.contains(CellCoord::new(1, 4)));
    }

    #[test]
    fn grid_rect_serializes_camel_case() {
        let json = serde_json::to_string(&GridRect::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, r#"{"col":1,"row":2,"colSpan":3,"rowSpan":4}"#);
    }

    #[test]
    fn pixel_rect_cell_size() {
        let r = PixelRect::new(10.0, 20.0, 800.0, 400.0);
        assert_eq!(r.cell_size(GridDims::DEFAULT), Some((100.0, 50.0)));
        assert_eq!(r.right(), 810.0);
        assert_eq!(r.bottom(), 420.0);
    }

    #[test]
    fn pixel_rect_unusable() {
        assert!(!PixelRect::from_size(0.0, 100.0).is_usable());
        assert!(!PixelRect::from_size(100.0, -1.0).is_usable());
        assert!(!PixelRect::from_size(f64::NAN, 100.0).is_usable());
        assert!(!PixelRect::new(f64::INFINITY, 0.0, 1.0, 1.0).is_usable());
        assert_eq!(PixelRect::default().cell_size(GridDims::DEFAULT), None);
    }
}
