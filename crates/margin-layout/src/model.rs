//! Layout model: the authoritative widget → position map for one page.
//!
//! # Invariants
//!
//! 1. **Bounds**: every stored position satisfies `col + colSpan <= cols`
//!    and `row + rowSpan <= rows`, with both spans `>= 1`.
//! 2. **Minimum size**: spans never drop below the widget's
//!    [`SpanConstraints`] unless the minimum cannot fit between the origin
//!    and the grid edge, in which case bounds win.
//! 3. **No overlap rule**: widgets may overlap after placement. Only
//!    [`find_empty_spot`](crate::slot::find_empty_spot) avoids overlap.
//!
//! Every mutator clamps instead of rejecting. Unknown ids are no-ops that
//! return `None`.

use crate::position::{SpanConstraints, WidgetId, WidgetPosition};
use margin_core::geometry::{GridDims, GridRect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Plain persisted form of a layout: `{ widgetId: position }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutSnapshot {
    pub widgets: BTreeMap<WidgetId, WidgetPosition>,
}

impl LayoutSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `other` on `self`: entries in `other` win per id.
    pub fn merge_from(&mut self, other: &LayoutSnapshot) {
        for (id, pos) in &other.widgets {
            self.widgets.insert(id.clone(), *pos);
        }
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl<I: Into<WidgetId>> FromIterator<(I, WidgetPosition)> for LayoutSnapshot {
    fn from_iter<T: IntoIterator<Item = (I, WidgetPosition)>>(iter: T) -> Self {
        Self {
            widgets: iter.into_iter().map(|(id, pos)| (id.into(), pos)).collect(),
        }
    }
}

/// What a diagnostic found wrong with one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    EmptySpan,
    OutOfBounds,
    BelowMinimum,
}

/// One invariant violation found by [`LayoutModel::violations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutViolation {
    pub widget: WidgetId,
    pub position: WidgetPosition,
    pub kind: ViolationKind,
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position;
        write!(
            f,
            "{} at ({},{}) span {}x{}: {:?}",
            self.widget, p.col, p.row, p.col_span, p.row_span, self.kind
        )
    }
}

/// Widget positions and constraints on a fixed grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutModel {
    dims: GridDims,
    widgets: BTreeMap<WidgetId, WidgetPosition>,
    constraints: BTreeMap<WidgetId, SpanConstraints>,
}

impl LayoutModel {
    /// Empty layout on a grid of `dims`.
    #[must_use]
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            widgets: BTreeMap::new(),
            constraints: BTreeMap::new(),
        }
    }

    /// Build from a snapshot, sanitizing every entry into bounds.
    #[must_use]
    pub fn from_snapshot(dims: GridDims, snapshot: &LayoutSnapshot) -> Self {
        let mut model = Self::new(dims);
        model.replace_from_snapshot(snapshot);
        model
    }

    #[inline]
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<WidgetPosition> {
        self.widgets.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WidgetId, &WidgetPosition)> {
        self.widgets.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> {
        self.widgets.keys()
    }

    /// Footprints of every widget.
    pub fn rects(&self) -> impl Iterator<Item = GridRect> + '_ {
        self.widgets.values().map(WidgetPosition::rect)
    }

    /// Minimum spans for `id` (1x1 when none were registered).
    pub fn constraints(&self, id: &str) -> SpanConstraints {
        self.constraints.get(id).copied().unwrap_or_default()
    }

    /// Register minimum spans for `id`.
    ///
    /// An existing entry that is now too small is grown in place, up to the
    /// grid edge. Constraints may be registered before the widget exists.
    pub fn set_constraints(&mut self, id: impl Into<WidgetId>, constraints: SpanConstraints) {
        let id = id.into();
        self.constraints.insert(id.clone(), constraints);
        if let Some(pos) = self.widgets.get(&id).copied() {
            let col_span = i32::from(pos.col_span);
            let row_span = i32::from(pos.row_span);
            self.set_size(id.as_str(), col_span, row_span);
        }
    }

    /// Store `position` for `id`, replacing any previous entry.
    ///
    /// The position is sanitized: spans are raised to the widget minimum and
    /// capped at the grid size, then the origin is pulled back so the widget
    /// fits. Returns the stored position.
    pub fn insert(&mut self, id: impl Into<WidgetId>, position: WidgetPosition) -> WidgetPosition {
        let id = id.into();
        let sanitized = sanitize(position, self.constraints(id.as_str()), self.dims);
        self.widgets.insert(id, sanitized);
        sanitized
    }

    /// Remove `id` and its constraints.
    pub fn remove(&mut self, id: &str) -> Option<WidgetPosition> {
        self.constraints.remove(id);
        self.widgets.remove(id)
    }

    /// Drop every widget and constraint.
    pub fn clear(&mut self) {
        self.widgets.clear();
        self.constraints.clear();
    }

    /// Move `id` so its origin is as close to `(col, row)` as the grid allows.
    ///
    /// `col` clamps into `[0, cols - colSpan]`, `row` into
    /// `[0, rows - rowSpan]`. Spans and z-index are unchanged.
    pub fn set_position(&mut self, id: &str, col: i32, row: i32) -> Option<WidgetPosition> {
        let dims = self.dims;
        let pos = self.widgets.get_mut(id)?;
        pos.col = clamp_origin(col, pos.col_span, dims.cols());
        pos.row = clamp_origin(row, pos.row_span, dims.rows());
        Some(*pos)
    }

    /// Resize `id` around its fixed origin.
    ///
    /// Each span clamps into `[max(1, min), remaining]`, where `remaining`
    /// is the distance from the origin to the grid edge.
    pub fn set_size(&mut self, id: &str, col_span: i32, row_span: i32) -> Option<WidgetPosition> {
        let dims = self.dims;
        let constraints = self.constraints(id);
        let pos = self.widgets.get_mut(id)?;
        pos.col_span = clamp_span(col_span, constraints.min_col_span(), pos.col, dims.cols());
        pos.row_span = clamp_span(row_span, constraints.min_row_span(), pos.row, dims.rows());
        Some(*pos)
    }

    /// Overwrite the stacking value of `id`.
    pub fn set_z_index(&mut self, id: &str, z_index: i32) -> Option<WidgetPosition> {
        let pos = self.widgets.get_mut(id)?;
        pos.z_index = z_index;
        Some(*pos)
    }

    /// Lowest and highest z-index, or `None` for an empty layout.
    pub fn z_bounds(&self) -> Option<(i32, i32)> {
        let mut values = self.widgets.values().map(|p| p.z_index);
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), z| (lo.min(z), hi.max(z))))
    }

    /// Widgets in paint order: ascending z-index, ties by id.
    pub fn stacking_order(&self) -> Vec<(&WidgetId, WidgetPosition)> {
        let mut ordered: Vec<_> = self.widgets.iter().map(|(id, pos)| (id, *pos)).collect();
        ordered.sort_by(|(a_id, a), (b_id, b)| a.z_index.cmp(&b.z_index).then_with(|| a_id.cmp(b_id)));
        ordered
    }

    /// Plain copy of every position.
    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            widgets: self.widgets.clone(),
        }
    }

    /// Replace every position with the snapshot's, keeping constraints of
    /// ids that survive.
    pub fn replace_from_snapshot(&mut self, snapshot: &LayoutSnapshot) {
        self.widgets.clear();
        self.constraints
            .retain(|id, _| snapshot.widgets.contains_key(id.as_str()));
        for (id, pos) in &snapshot.widgets {
            self.insert(id.clone(), *pos);
        }
    }

    /// Entries that break the bounds or minimum-size invariants.
    ///
    /// Always empty for a model mutated only through this API.
    pub fn violations(&self) -> Vec<LayoutViolation> {
        let mut found = Vec::new();
        for (id, pos) in &self.widgets {
            let rect = pos.rect();
            let kind = if rect.is_empty() {
                Some(ViolationKind::EmptySpan)
            } else if !self.dims.contains_rect(rect) {
                Some(ViolationKind::OutOfBounds)
            } else {
                let c = self.constraints(id.as_str());
                let col_fits = c.min_col_span() <= self.dims.cols() - pos.col;
                let row_fits = c.min_row_span() <= self.dims.rows() - pos.row;
                ((col_fits && pos.col_span < c.min_col_span())
                    || (row_fits && pos.row_span < c.min_row_span()))
                .then_some(ViolationKind::BelowMinimum)
            };
            if let Some(kind) = kind {
                found.push(LayoutViolation {
                    widget: id.clone(),
                    position: *pos,
                    kind,
                });
            }
        }
        found
    }
}

/// Clamp a requested origin so `origin + span <= extent`.
pub(crate) fn clamp_origin(requested: i32, span: u16, extent: u16) -> u16 {
    let max_origin = i32::from(extent.saturating_sub(span));
    // Clamped into [0, u16::MAX] so the cast is lossless.
    requested.clamp(0, max_origin) as u16
}

/// Clamp a requested span into `[max(1, min), extent - origin]`.
///
/// The upper bound is applied last so the grid edge wins over the minimum.
pub(crate) fn clamp_span(requested: i32, min: u16, origin: u16, extent: u16) -> u16 {
    let floor = i32::from(min.max(1));
    let remaining = i32::from(extent.saturating_sub(origin).max(1));
    requested.max(floor).min(remaining) as u16
}

fn sanitize(position: WidgetPosition, constraints: SpanConstraints, dims: GridDims) -> WidgetPosition {
    let col_span = position
        .col_span
        .max(constraints.min_col_span())
        .clamp(1, dims.cols());
    let row_span = position
        .row_span
        .max(constraints.min_row_span())
        .clamp(1, dims.rows());
    WidgetPosition {
        col: position.col.min(dims.cols() - col_span),
        row: position.row.min(dims.rows() - row_span),
        col_span,
        row_span,
        z_index: position.z_index,
    }
}
