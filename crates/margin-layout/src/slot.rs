//! First-fit search for an unoccupied rectangle.

use crate::model::LayoutModel;
use margin_core::geometry::{CellCoord, GridDims, GridRect};

/// Find the first origin where a `col_span × row_span` rectangle overlaps
/// none of `occupied`.
///
/// Candidates are scanned row-major: rows top to bottom, columns left to
/// right within a row. Returns `None` when no candidate fits, including
/// when a span is zero or larger than the grid.
#[must_use]
pub fn find_empty_spot<I>(dims: GridDims, occupied: I, col_span: u16, row_span: u16) -> Option<CellCoord>
where
    I: IntoIterator<Item = GridRect>,
{
    if col_span == 0 || row_span == 0 || col_span > dims.cols() || row_span > dims.rows() {
        return None;
    }
    let occupied: Vec<GridRect> = occupied.into_iter().filter(|r| !r.is_empty()).collect();
    for row in 0..=dims.rows() - row_span {
        for col in 0..=dims.cols() - col_span {
            let candidate = GridRect::new(col, row, col_span, row_span);
            if !occupied.iter().any(|rect| candidate.overlaps(rect)) {
                return Some(candidate.origin());
            }
        }
    }
    None
}

/// [`find_empty_spot`] against every widget in `layout`.
#[must_use]
pub fn find_empty_spot_in(layout: &LayoutModel, col_span: u16, row_span: u16) -> Option<CellCoord> {
    find_empty_spot(layout.dims(), layout.rects(), col_span, row_span)
}

/// [`find_empty_spot`], falling back to the grid origin when nothing fits.
///
/// The fallback overlaps whatever is already at `(0, 0)`.
#[must_use]
pub fn spot_or_origin<I>(dims: GridDims, occupied: I, col_span: u16, row_span: u16) -> CellCoord
where
    I: IntoIterator<Item = GridRect>,
{
    find_empty_spot(dims, occupied, col_span, row_span).unwrap_or_default()
}
