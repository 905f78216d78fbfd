#![forbid(unsafe_code)]

//! Margin runtime.
//!
//! Ties the pure layout engine in `margin-layout` to widget identity and
//! storage so a host can drive a whole dashboard page through one object.
//!
//! # Key Components
//!
//! - [`DashboardStore`] - owns one page: layout, interaction, hidden set, content
//! - [`WidgetCatalog`] - widget templates and the default arrangement
//! - [`StorageBackend`] - string key/value port with [`MemoryStorage`],
//!   [`FileStorage`] and [`NullStorage`] implementations
//! - [`PagePersistence`] - typed JSON documents over a backend, scoped per page
//! - [`PlacementBatch`] - validated bulk import/export of a page layout
//! - [`DashboardConfig`] - page id, grid size, persistence switches
//!
//! Storage is best-effort: a failing backend is logged through `tracing`
//! and never surfaces from a mutation.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod page_state;
pub mod placement;
pub mod state_persistence;

pub use catalog::{WidgetCatalog, WidgetKind, WidgetRecord, WidgetTemplate};
pub use config::{DEFAULT_KEY_PREFIX, DashboardConfig, PersistenceConfig};
pub use dashboard::DashboardStore;
pub use page_state::{PageDocuments, PagePersistence, StorageKeys, scoped_key};
pub use placement::{MAX_PLACEMENTS, MAX_WIDGET_KEY_LEN, PlacementBatch, PlacementError, WidgetPlacement};
pub use state_persistence::{
    FileStorage, MemoryStorage, NullStorage, STATE_DIR_ENV, StorageBackend, StorageError,
    StorageResult,
};
