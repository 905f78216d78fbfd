#![forbid(unsafe_code)]

//! Core primitives for the Margin dashboard engine.
//!
//! - [`geometry`] - grid dimensions, cell coordinates, cell rectangles and
//!   pixel-space container bounds
//! - [`pointer`] - pointer positions and buttons as delivered by a host
//!   event source
//! - `logging` - tracing subscriber setup (requires the `logging` feature)
//!
//! Nothing in this crate performs I/O apart from installing the global
//! tracing subscriber.

pub mod geometry;
#[cfg(feature = "logging")]
pub mod logging;
pub mod pointer;

pub use geometry::{CellCoord, GRID_COLS, GRID_ROWS, GeometryError, GridDims, GridRect, PixelRect};
pub use pointer::{PointerButton, PointerPosition};
