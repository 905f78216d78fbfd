//! Widget identity, placement, and size constraints.

use margin_core::geometry::GridRect;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque widget identifier, unique within one page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for WidgetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&WidgetId> for WidgetId {
    fn from(id: &WidgetId) -> Self {
        id.clone()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Placement of one widget on the grid.
///
/// Serialized with the persisted field names `col`, `row`, `colSpan`,
/// `rowSpan`, `zIndex`. Records written before stacking existed carry no
/// `zIndex`; those read back as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPosition {
    pub col: u16,
    pub row: u16,
    pub col_span: u16,
    pub row_span: u16,
    #[serde(default)]
    pub z_index: i32,
}

impl WidgetPosition {
    /// Position at z-index 0.
    pub const fn new(col: u16, row: u16, col_span: u16, row_span: u16) -> Self {
        Self {
            col,
            row,
            col_span,
            row_span,
            z_index: 0,
        }
    }

    #[must_use]
    pub const fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Footprint on the grid, ignoring stacking.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> GridRect {
        GridRect::new(self.col, self.row, self.col_span, self.row_span)
    }
}

/// Minimum spans a widget may be resized down to.
///
/// Both minimums are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanConstraints {
    min_col_span: u16,
    min_row_span: u16,
}

impl Default for SpanConstraints {
    fn default() -> Self {
        Self::UNCONSTRAINED
    }
}

impl SpanConstraints {
    /// A 1x1 floor.
    pub const UNCONSTRAINED: Self = Self {
        min_col_span: 1,
        min_row_span: 1,
    };

    /// Zero minimums are raised to 1.
    pub const fn new(min_col_span: u16, min_row_span: u16) -> Self {
        Self {
            min_col_span: if min_col_span == 0 { 1 } else { min_col_span },
            min_row_span: if min_row_span == 0 { 1 } else { min_row_span },
        }
    }

    #[inline]
    #[must_use]
    pub const fn min_col_span(&self) -> u16 {
        self.min_col_span
    }

    #[inline]
    #[must_use]
    pub const fn min_row_span(&self) -> u16 {
        self.min_row_span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serializes_persisted_field_names() {
        let pos = WidgetPosition::new(1, 2, 3, 4).with_z_index(-2);
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(
            json,
            r#"{"col":1,"row":2,"colSpan":3,"rowSpan":4,"zIndex":-2}"#
        );
    }

    #[test]
    fn missing_z_index_defaults_to_zero() {
        let pos: WidgetPosition =
            serde_json::from_str(r#"{"col":0,"row":2,"colSpan":3,"rowSpan":3}"#).unwrap();
        assert_eq!(pos, WidgetPosition::new(0, 2, 3, 3));
    }

    #[test]
    fn constraints_floor_at_one() {
        let c = SpanConstraints::new(0, 3);
        assert_eq!(c.min_col_span(), 1);
        assert_eq!(c.min_row_span(), 3);
        assert_eq!(SpanConstraints::default(), SpanConstraints::new(1, 1));
    }

    #[test]
    fn widget_id_is_transparent() {
        let id = WidgetId::from("text-3");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""text-3""#);
        assert_eq!(id.to_string(), "text-3");
        let borrowed: &str = id.borrow();
        assert_eq!(borrowed, "text-3");
    }
}
