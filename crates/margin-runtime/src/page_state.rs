//! Typed page documents on top of a [`StorageBackend`].
//!
//! One page owns five keys, each holding a JSON document:
//!
//! | Key                                  | Document |
//! |--------------------------------------|----------|
//! | `{prefix}-grid-layout[-{page}]`      | `{ id: {col,row,colSpan,rowSpan,zIndex} }` |
//! | `{prefix}-hidden-widgets[-{page}]`   | `[id, ...]` |
//! | `{prefix}-widget-registry[-{page}]`  | `{ id: {typeKey, kind} }` |
//! | `{prefix}-widget-content[-{page}]`   | `{ id: "opaque content" }` |
//! | `{prefix}-widget-settings[-{page}]`  | `{ id: <any JSON value> }` |
//!
//! The main page (no page id) uses the bare keys.

use crate::catalog::WidgetRecord;
use crate::state_persistence::{StorageBackend, StorageResult};
use margin_layout::{LayoutSnapshot, WidgetId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Scope `base` to a page: `base` for the main page, `base-{page}` otherwise.
#[must_use]
pub fn scoped_key(base: &str, page_id: Option<&str>) -> String {
    match page_id {
        Some(page) if !page.is_empty() => format!("{base}-{page}"),
        _ => base.to_string(),
    }
}

/// Storage keys of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    layout: String,
    hidden: String,
    registry: String,
    content: String,
    settings: String,
}

impl StorageKeys {
    #[must_use]
    pub fn new(prefix: &str, page_id: Option<&str>) -> Self {
        Self {
            layout: scoped_key(&format!("{prefix}-grid-layout"), page_id),
            hidden: scoped_key(&format!("{prefix}-hidden-widgets"), page_id),
            registry: scoped_key(&format!("{prefix}-widget-registry"), page_id),
            content: scoped_key(&format!("{prefix}-widget-content"), page_id),
            settings: scoped_key(&format!("{prefix}-widget-settings"), page_id),
        }
    }

    #[must_use]
    pub fn layout(&self) -> &str {
        &self.layout
    }

    #[must_use]
    pub fn hidden(&self) -> &str {
        &self.hidden
    }

    #[must_use]
    pub fn registry(&self) -> &str {
        &self.registry
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn settings(&self) -> &str {
        &self.settings
    }

    #[must_use]
    pub fn all(&self) -> [&str; 5] {
        [
            &self.layout,
            &self.hidden,
            &self.registry,
            &self.content,
            &self.settings,
        ]
    }
}

/// Everything persisted for one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageDocuments {
    pub layout: LayoutSnapshot,
    pub hidden: BTreeSet<WidgetId>,
    pub registry: BTreeMap<WidgetId, WidgetRecord>,
    pub content: BTreeMap<WidgetId, String>,
    pub settings: BTreeMap<WidgetId, Value>,
}

/// Typed JSON access to one page's keys.
pub struct PagePersistence {
    backend: Arc<dyn StorageBackend>,
    keys: StorageKeys,
}

impl PagePersistence {
    pub fn new(backend: Arc<dyn StorageBackend>, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn load_layout(&self) -> StorageResult<Option<LayoutSnapshot>> {
        self.load_json(self.keys.layout())
    }

    pub fn save_layout(&self, layout: &LayoutSnapshot) -> StorageResult<()> {
        self.save_json(self.keys.layout(), layout)
    }

    pub fn load_hidden(&self) -> StorageResult<Option<BTreeSet<WidgetId>>> {
        self.load_json(self.keys.hidden())
    }

    pub fn save_hidden(&self, hidden: &BTreeSet<WidgetId>) -> StorageResult<()> {
        self.save_json(self.keys.hidden(), hidden)
    }

    pub fn load_registry(&self) -> StorageResult<Option<BTreeMap<WidgetId, WidgetRecord>>> {
        self.load_json(self.keys.registry())
    }

    pub fn save_registry(&self, registry: &BTreeMap<WidgetId, WidgetRecord>) -> StorageResult<()> {
        self.save_json(self.keys.registry(), registry)
    }

    pub fn load_content(&self) -> StorageResult<Option<BTreeMap<WidgetId, String>>> {
        self.load_json(self.keys.content())
    }

    pub fn save_content(&self, content: &BTreeMap<WidgetId, String>) -> StorageResult<()> {
        self.save_json(self.keys.content(), content)
    }

    pub fn load_settings(&self) -> StorageResult<Option<BTreeMap<WidgetId, Value>>> {
        self.load_json(self.keys.settings())
    }

    pub fn save_settings(&self, settings: &BTreeMap<WidgetId, Value>) -> StorageResult<()> {
        self.save_json(self.keys.settings(), settings)
    }

    /// Write every document, stopping at the first failure.
    pub fn save_all(&self, documents: &PageDocuments) -> StorageResult<()> {
        self.save_layout(&documents.layout)?;
        self.save_hidden(&documents.hidden)?;
        self.save_registry(&documents.registry)?;
        self.save_content(&documents.content)?;
        self.save_settings(&documents.settings)?;
        tracing::debug!(
            backend = self.backend.name(),
            key = self.keys.layout(),
            widgets = documents.layout.len(),
            hidden = documents.hidden.len(),
            "saved page state"
        );
        Ok(())
    }

    /// Remove every key of this page.
    pub fn clear(&self) -> StorageResult<()> {
        for key in self.keys.all() {
            self.backend.remove(key)?;
        }
        tracing::debug!(backend = self.backend.name(), key = self.keys.layout(), "cleared page state");
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.backend.get(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let text = serde_json::to_string(value)?;
        self.backend.set(key, &text)
    }
}

impl fmt::Debug for PagePersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagePersistence")
            .field("backend", &self.backend.name())
            .field("keys", &self.keys)
            .finish()
    }
}
