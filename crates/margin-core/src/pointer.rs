//! Pointer primitives.
//!
//! Hosts deliver pointer input in their own pixel space; the engine only
//! needs the position, the button, and a stable pointer id to pair down/up.

use serde::{Deserialize, Serialize};

/// Pointer location in host pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Mouse/pen/touch button that produced a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Left mouse button, pen contact, or touch.
    #[default]
    Primary,
    /// Wheel / middle button.
    Auxiliary,
    /// Right mouse button.
    Secondary,
    /// Any other button index.
    Other(u8),
}

impl PointerButton {
    /// Map a DOM-style button index (`0` primary, `1` auxiliary,
    /// `2` secondary).
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}
