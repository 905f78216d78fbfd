//! Pixel ↔ cell mapping for a grid drawn into a host container.

use margin_core::geometry::{CellCoord, GridDims, GridRect, PixelRect};
use margin_core::pointer::PointerPosition;

/// Map a pointer position to the grid cell under it.
///
/// `col = floor((x - left) / (width / cols))`, likewise for rows. Returns
/// `None` when the pointer falls outside `[0, cols) × [0, rows)`, when the
/// container has no usable size, or when the pointer is not finite.
#[must_use]
pub fn cell_at(bounds: PixelRect, dims: GridDims, pointer: PointerPosition) -> Option<CellCoord> {
    let (cell_width, cell_height) = bounds.cell_size(dims)?;
    if !pointer.is_finite() {
        return None;
    }
    let col = ((pointer.x - bounds.left) / cell_width).floor();
    let row = ((pointer.y - bounds.top) / cell_height).floor();
    if col < 0.0 || row < 0.0 || col >= f64::from(dims.cols()) || row >= f64::from(dims.rows()) {
        return None;
    }
    Some(CellCoord::new(col as u16, row as u16))
}

/// Pixel rectangle covered by `rect` inside `bounds`, or `None` when the
/// container has no usable size.
#[must_use]
pub fn cell_rect_to_pixels(bounds: PixelRect, dims: GridDims, rect: GridRect) -> Option<PixelRect> {
    let (cell_width, cell_height) = bounds.cell_size(dims)?;
    Some(PixelRect::new(
        bounds.left + f64::from(rect.col) * cell_width,
        bounds.top + f64::from(rect.row) * cell_height,
        f64::from(rect.col_span) * cell_width,
        f64::from(rect.row_span) * cell_height,
    ))
}
