#![forbid(unsafe_code)]

//! Dashboard grid layout engine.
//!
//! - [`mapper`] - pixel position → grid cell
//! - [`model`] - the [`LayoutModel`] with its clamping setters
//! - [`slot`] - first-fit search for free space
//! - [`zorder`] - bring-to-front / send-to-back
//! - [`interaction`] - the drag/resize [`InteractionMachine`]
//!
//! Everything here is pure and synchronous. Persistence, widget kinds and
//! host event wiring live in `margin-runtime`.
//!
//! ```
//! use margin_layout::{CellCoord, GridDims, LayoutModel, WidgetPosition, find_empty_spot_in};
//!
//! let mut layout = LayoutModel::new(GridDims::DEFAULT);
//! layout.insert("greeting", WidgetPosition::new(0, 0, 5, 2));
//! assert_eq!(find_empty_spot_in(&layout, 3, 2), Some(CellCoord::new(5, 0)));
//! ```

pub mod interaction;
pub mod mapper;
pub mod model;
pub mod position;
pub mod slot;
pub mod zorder;

pub use interaction::{
    CellOffset, InteractionCancelReason, InteractionCommit, InteractionEffect, InteractionEvent,
    InteractionEventError, InteractionEventKind, InteractionHandle, InteractionMachine,
    InteractionMode, InteractionNoopReason, InteractionState, InteractionTransition,
};
pub use mapper::{cell_at, cell_rect_to_pixels};
pub use margin_core::geometry::{CellCoord, GridDims, GridRect, PixelRect};
pub use model::{LayoutModel, LayoutSnapshot, LayoutViolation, ViolationKind};
pub use position::{SpanConstraints, WidgetId, WidgetPosition};
pub use slot::{find_empty_spot, find_empty_spot_in, spot_or_origin};
pub use zorder::{back_z_index, bring_to_front, front_z_index, is_topmost, send_to_back};
