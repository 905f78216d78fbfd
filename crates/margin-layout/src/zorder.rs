//! Stacking order.
//!
//! Z-indices are plain integers with no fixed range. Raising or lowering a
//! widget always steps one past the current extreme, so values drift over
//! time; only relative order matters.

use crate::model::LayoutModel;

/// Z-index that would put a new widget above everything present
/// (`0` for an empty layout).
#[must_use]
pub fn front_z_index(layout: &LayoutModel) -> i32 {
    layout.z_bounds().map_or(0, |(_, max)| max.saturating_add(1))
}

/// Z-index that would put a widget below everything present
/// (`0` for an empty layout).
#[must_use]
pub fn back_z_index(layout: &LayoutModel) -> i32 {
    layout.z_bounds().map_or(0, |(min, _)| min.saturating_sub(1))
}

/// Set `id` to one above the highest z-index in the layout.
///
/// Returns the new z-index, or `None` for an unknown id.
pub fn bring_to_front(layout: &mut LayoutModel, id: &str) -> Option<i32> {
    if !layout.contains(id) {
        return None;
    }
    let z_index = front_z_index(layout);
    layout.set_z_index(id, z_index).map(|pos| pos.z_index)
}

/// Set `id` to one below the lowest z-index in the layout.
///
/// Returns the new z-index, or `None` for an unknown id.
pub fn send_to_back(layout: &mut LayoutModel, id: &str) -> Option<i32> {
    if !layout.contains(id) {
        return None;
    }
    let z_index = back_z_index(layout);
    layout.set_z_index(id, z_index).map(|pos| pos.z_index)
}

/// Whether `id` is strictly above every other widget.
#[must_use]
pub fn is_topmost(layout: &LayoutModel, id: &str) -> bool {
    let Some(target) = layout.get(id) else {
        return false;
    };
    layout
        .iter()
        .filter(|(other, _)| other.as_str() != id)
        .all(|(_, pos)| pos.z_index < target.z_index)
}
