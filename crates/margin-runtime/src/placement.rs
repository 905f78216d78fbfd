//! Bulk placement records.
//!
//! The wire shape a dashboard service accepts when replacing a page's whole
//! layout in one request. A batch is validated completely before anything
//! is applied.

use margin_layout::{LayoutSnapshot, WidgetId, WidgetPosition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Most placements a single batch may carry.
pub const MAX_PLACEMENTS: usize = 200;

/// Longest accepted widget key, in characters.
pub const MAX_WIDGET_KEY_LEN: usize = 255;

/// One widget's placement in service form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPlacement {
    pub widget_key: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub z_index: i32,
    /// Free-form widget settings, stored per widget and returned on export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl WidgetPlacement {
    fn from_position(widget_key: &str, pos: &WidgetPosition, config: Option<Value>) -> Self {
        Self {
            widget_key: widget_key.to_string(),
            x: i32::from(pos.col),
            y: i32::from(pos.row),
            width: i32::from(pos.col_span),
            height: i32::from(pos.row_span),
            z_index: pos.z_index,
            config,
        }
    }

    fn to_position(&self) -> WidgetPosition {
        WidgetPosition::new(
            saturate_u16(self.x),
            saturate_u16(self.y),
            saturate_u16(self.width),
            saturate_u16(self.height),
        )
        .with_z_index(self.z_index)
    }
}

/// A full-page replacement request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlacementBatch {
    pub widgets: Vec<WidgetPlacement>,
}

impl PlacementBatch {
    /// Placements for every widget in `snapshot`, ordered by key, without
    /// settings.
    #[must_use]
    pub fn from_snapshot(snapshot: &LayoutSnapshot) -> Self {
        Self::from_parts(snapshot, &BTreeMap::new())
    }

    /// Placements for every widget in `snapshot`, each with its entry from
    /// `settings`.
    #[must_use]
    pub fn from_parts(snapshot: &LayoutSnapshot, settings: &BTreeMap<WidgetId, Value>) -> Self {
        Self {
            widgets: snapshot
                .widgets
                .iter()
                .map(|(id, pos)| {
                    WidgetPlacement::from_position(id.as_str(), pos, settings.get(id).cloned())
                })
                .collect(),
        }
    }

    /// Settings carried by the batch, keyed by widget.
    #[must_use]
    pub fn settings(&self) -> BTreeMap<WidgetId, Value> {
        self.widgets
            .iter()
            .filter_map(|p| {
                p.config
                    .as_ref()
                    .map(|config| (WidgetId::from(p.widget_key.as_str()), config.clone()))
            })
            .collect()
    }

    /// Check the whole batch, reporting the first problem found.
    pub fn validate(&self) -> Result<(), PlacementError> {
        if self.widgets.len() > MAX_PLACEMENTS {
            return Err(PlacementError::TooManyPlacements {
                count: self.widgets.len(),
                max: MAX_PLACEMENTS,
            });
        }
        let mut seen = HashSet::with_capacity(self.widgets.len());
        for (index, placement) in self.widgets.iter().enumerate() {
            let key = placement.widget_key.as_str();
            if key.is_empty() {
                return Err(PlacementError::EmptyWidgetKey { index });
            }
            let len = key.chars().count();
            if len > MAX_WIDGET_KEY_LEN {
                return Err(PlacementError::WidgetKeyTooLong {
                    index,
                    len,
                    max: MAX_WIDGET_KEY_LEN,
                });
            }
            if !seen.insert(key) {
                return Err(PlacementError::DuplicateWidgetKey(key.to_string()));
            }
            if placement.width < 1 || placement.height < 1 {
                return Err(PlacementError::NonPositiveSpan {
                    widget_key: key.to_string(),
                    width: placement.width,
                    height: placement.height,
                });
            }
            if placement.x < 0 || placement.y < 0 {
                return Err(PlacementError::NegativeOrigin {
                    widget_key: key.to_string(),
                    x: placement.x,
                    y: placement.y,
                });
            }
        }
        Ok(())
    }

    /// Validate, then convert to a layout snapshot.
    ///
    /// Positions are not clamped here; the layout model sanitizes them
    /// when the snapshot is installed.
    pub fn to_snapshot(&self) -> Result<LayoutSnapshot, PlacementError> {
        self.validate()?;
        Ok(self
            .widgets
            .iter()
            .map(|p| (p.widget_key.as_str(), p.to_position()))
            .collect())
    }
}

fn saturate_u16(value: i32) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

/// Rejected placement batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    TooManyPlacements { count: usize, max: usize },
    EmptyWidgetKey { index: usize },
    WidgetKeyTooLong { index: usize, len: usize, max: usize },
    DuplicateWidgetKey(String),
    NonPositiveSpan { widget_key: String, width: i32, height: i32 },
    NegativeOrigin { widget_key: String, x: i32, y: i32 },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyPlacements { count, max } => {
                write!(f, "too many widgets in batch: {count} (max {max})")
            }
            Self::EmptyWidgetKey { index } => write!(f, "widget #{index} has an empty widgetKey"),
            Self::WidgetKeyTooLong { index, len, max } => {
                write!(f, "widget #{index} key is {len} characters (max {max})")
            }
            Self::DuplicateWidgetKey(key) => write!(f, "duplicate widgetKey in batch: {key}"),
            Self::NonPositiveSpan {
                widget_key,
                width,
                height,
            } => write!(
                f,
                "widget {widget_key} must be at least 1x1 (got {width}x{height})"
            ),
            Self::NegativeOrigin { widget_key, x, y } => {
                write!(f, "widget {widget_key} has a negative origin ({x},{y})")
            }
        }
    }
}

impl std::error::Error for PlacementError {}
