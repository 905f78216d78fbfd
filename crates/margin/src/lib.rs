#![forbid(unsafe_code)]

//! Margin public facade crate.
//!
//! Re-exports the types a host needs to embed a dashboard page and offers a
//! prelude for day-to-day usage.
//!
//! ```
//! use margin::prelude::*;
//!
//! let mut page = DashboardStore::in_memory();
//! let id = page.add_widget_of("text").expect("text is a built-in widget");
//! assert!(page.position(id.as_str()).is_some());
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use margin_core::geometry::{CellCoord, GeometryError, GridDims, GridRect, PixelRect};
#[cfg(feature = "logging")]
pub use margin_core::logging::{LogFormat, LoggingConfig, LoggingInitError};
pub use margin_core::pointer::{PointerButton, PointerPosition};

// --- Layout re-exports -----------------------------------------------------

pub use margin_layout::{
    InteractionCancelReason, InteractionCommit, InteractionEffect, InteractionEvent,
    InteractionEventError, InteractionEventKind, InteractionHandle, InteractionMachine,
    InteractionMode, InteractionTransition, LayoutModel, LayoutSnapshot, SpanConstraints, WidgetId,
    WidgetPosition,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use margin_runtime::{
    DashboardConfig, DashboardStore, FileStorage, MemoryStorage, NullStorage, PersistenceConfig,
    PlacementBatch, PlacementError, StorageBackend, StorageError, WidgetCatalog, WidgetKind,
    WidgetTemplate,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Margin hosts.
#[derive(Debug)]
pub enum Error {
    /// Invalid grid dimensions.
    Geometry(GeometryError),
    /// Malformed interaction event.
    Event(InteractionEventError),
    /// Storage backend failure on an explicit flush or clear.
    #[cfg(feature = "runtime")]
    Storage(StorageError),
    /// Rejected bulk placement batch.
    #[cfg(feature = "runtime")]
    Placement(PlacementError),
    /// Tracing subscriber could not be installed.
    #[cfg(feature = "logging")]
    Logging(LoggingInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "{err}"),
            Self::Event(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Placement(err) => write!(f, "{err}"),
            #[cfg(feature = "logging")]
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            Self::Event(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Placement(err) => Some(err),
            #[cfg(feature = "logging")]
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<InteractionEventError> for Error {
    fn from(err: InteractionEventError) -> Self {
        Self::Event(err)
    }
}

#[cfg(feature = "runtime")]
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

#[cfg(feature = "runtime")]
impl From<PlacementError> for Error {
    fn from(err: PlacementError) -> Self {
        Self::Placement(err)
    }
}

#[cfg(feature = "logging")]
impl From<LoggingInitError> for Error {
    fn from(err: LoggingInitError) -> Self {
        Self::Logging(err)
    }
}

/// Standard result type for Margin APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, GridDims, InteractionEvent, InteractionEventKind, InteractionHandle,
        InteractionMode, PixelRect, PointerButton, PointerPosition, Result, WidgetId,
        WidgetPosition,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{DashboardConfig, DashboardStore, MemoryStorage, WidgetCatalog, WidgetKind};

    pub use crate::{core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use margin_core as core;
pub use margin_layout as layout;
#[cfg(feature = "runtime")]
pub use margin_runtime as runtime;
