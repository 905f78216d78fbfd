//! Dashboard configuration.
//!
//! Builder-style structs with sensible defaults. [`DashboardConfig::from_env`]
//! reads overrides from the process environment:
//!
//! | Variable            | Field                          | Default   |
//! |---------------------|--------------------------------|-----------|
//! | `MARGIN_PAGE_ID`    | `page_id`                      | none      |
//! | `MARGIN_GRID_COLS`  | `dims.cols`                    | `8`       |
//! | `MARGIN_GRID_ROWS`  | `dims.rows`                    | `8`       |
//! | `MARGIN_KEY_PREFIX` | `persistence.key_prefix`       | `margin`  |
//! | `MARGIN_AUTOLOAD`   | `persistence.auto_load`        | `true`    |
//! | `MARGIN_AUTOSAVE`   | `persistence.auto_save`        | `true`    |
//!
//! Invalid values are logged and ignored.

use crate::page_state::StorageKeys;
use margin_core::geometry::GridDims;

/// Default prefix for storage keys.
pub const DEFAULT_KEY_PREFIX: &str = "margin";

/// How page state is read and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Prefix of every storage key.
    pub key_prefix: String,
    /// Load stored state when the store opens.
    pub auto_load: bool,
    /// Save after every mutation.
    pub auto_save: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            auto_load: true,
            auto_save: true,
        }
    }
}

impl PersistenceConfig {
    /// Neither load nor save; the store lives purely in memory.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            auto_load: false,
            auto_save: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn auto_load(mut self, enabled: bool) -> Self {
        self.auto_load = enabled;
        self
    }

    #[must_use]
    pub fn auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }
}

/// Configuration for one dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardConfig {
    /// Page identifier; `None` is the main page.
    pub page_id: Option<String>,
    pub dims: GridDims,
    pub persistence: PersistenceConfig,
}

impl DashboardConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for a named page. An empty id selects the main page.
    #[must_use]
    pub fn for_page(page_id: impl Into<String>) -> Self {
        Self::default().page_id(page_id)
    }

    #[must_use]
    pub fn page_id(mut self, page_id: impl Into<String>) -> Self {
        let page_id = page_id.into();
        self.page_id = (!page_id.is_empty()).then_some(page_id);
        self
    }

    #[must_use]
    pub fn with_dims(mut self, dims: GridDims) -> Self {
        self.dims = dims;
        self
    }

    #[must_use]
    pub fn with_persistence(mut self, persistence: PersistenceConfig) -> Self {
        self.persistence = persistence;
        self
    }

    /// Storage keys for this page.
    #[must_use]
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(&self.persistence.key_prefix, self.page_id.as_deref())
    }

    /// Build from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(page) = lookup("MARGIN_PAGE_ID") {
            config = config.page_id(page.trim());
        }

        let cols = lookup("MARGIN_GRID_COLS").map(|v| parse_dimension("MARGIN_GRID_COLS", &v));
        let rows = lookup("MARGIN_GRID_ROWS").map(|v| parse_dimension("MARGIN_GRID_ROWS", &v));
        if cols.is_some() || rows.is_some() {
            let cols = cols.flatten().unwrap_or(config.dims.cols());
            let rows = rows.flatten().unwrap_or(config.dims.rows());
            match GridDims::new(cols, rows) {
                Ok(dims) => config.dims = dims,
                Err(err) => tracing::warn!(error = %err, "ignoring grid size from environment"),
            }
        }

        if let Some(prefix) = lookup("MARGIN_KEY_PREFIX") {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                tracing::warn!("ignoring empty MARGIN_KEY_PREFIX");
            } else {
                config.persistence.key_prefix = prefix.to_string();
            }
        }
        if let Some(flag) = lookup("MARGIN_AUTOLOAD").and_then(|v| parse_flag("MARGIN_AUTOLOAD", &v)) {
            config.persistence.auto_load = flag;
        }
        if let Some(flag) = lookup("MARGIN_AUTOSAVE").and_then(|v| parse_flag("MARGIN_AUTOSAVE", &v)) {
            config.persistence.auto_save = flag;
        }
        config
    }
}

fn parse_dimension(var: &str, value: &str) -> Option<u16> {
    match value.trim().parse::<u16>() {
        Ok(n) => Some(n),
        Err(err) => {
            tracing::warn!(var, value, error = %err, "ignoring invalid grid dimension");
            None
        }
    }
}

fn parse_flag(var: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(var, value, "ignoring invalid boolean flag");
            None
        }
    }
}
