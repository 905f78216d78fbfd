//! Page-level dashboard store.
//!
//! [`DashboardStore`] owns everything one page needs: the [`LayoutModel`],
//! the [`InteractionMachine`], which widgets exist and of what kind, which
//! singletons are hidden, and opaque per-widget content and settings.
//! Every mutation goes through it, and every successful mutation is
//! written back through the injected [`StorageBackend`] when auto-save is
//! on.
//!
//! Storage failures are logged and swallowed: the in-memory state stays
//! authoritative and the next mutation's save acts as the retry.

use crate::catalog::{WidgetCatalog, WidgetKind, WidgetRecord, WidgetTemplate};
use crate::config::DashboardConfig;
use crate::page_state::{PageDocuments, PagePersistence};
use crate::placement::{PlacementBatch, PlacementError};
use crate::state_persistence::{StorageBackend, StorageResult};
use margin_core::geometry::PixelRect;
use margin_layout::{
    InteractionCancelReason, InteractionEvent, InteractionEventError, InteractionEventKind,
    InteractionMachine, InteractionMode, InteractionNoopReason, InteractionState,
    InteractionTransition, LayoutModel, LayoutSnapshot, WidgetId, WidgetPosition, front_z_index,
    spot_or_origin,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Dashboard state for one page.
pub struct DashboardStore {
    config: DashboardConfig,
    catalog: WidgetCatalog,
    layout: LayoutModel,
    registry: BTreeMap<WidgetId, WidgetRecord>,
    hidden: BTreeSet<WidgetId>,
    content: BTreeMap<WidgetId, String>,
    settings: BTreeMap<WidgetId, Value>,
    interaction: InteractionMachine,
    persistence: PagePersistence,
    next_instance: u64,
}

impl DashboardStore {
    /// Open a page: start from the catalog defaults, then overlay stored
    /// state when `auto_load` is on. Never fails; unreadable documents are
    /// logged and skipped.
    pub fn open(
        config: DashboardConfig,
        catalog: WidgetCatalog,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        let persistence = PagePersistence::new(backend, config.storage_keys());
        let mut store = Self {
            layout: LayoutModel::new(config.dims),
            config,
            catalog,
            registry: BTreeMap::new(),
            hidden: BTreeSet::new(),
            content: BTreeMap::new(),
            settings: BTreeMap::new(),
            interaction: InteractionMachine::new(),
            persistence,
            next_instance: 0,
        };
        let stored = if store.config.persistence.auto_load {
            store.load_documents()
        } else {
            PageDocuments::default()
        };
        store.install(stored);
        tracing::debug!(
            backend = store.persistence.backend_name(),
            key = store.persistence.keys().layout(),
            widgets = store.layout.len(),
            hidden = store.hidden.len(),
            "opened dashboard page"
        );
        store
    }

    /// Page with the built-in catalog and in-memory storage only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(
            DashboardConfig::default(),
            WidgetCatalog::builtin(),
            Arc::new(crate::state_persistence::MemoryStorage::new()),
        )
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutModel {
        &self.layout
    }

    pub fn position(&self, id: &str) -> Option<WidgetPosition> {
        self.layout.get(id)
    }

    /// Where to draw `id` right now: the live preview while it is being
    /// dragged or resized, its committed position otherwise.
    pub fn display_position(&self, id: &str) -> Option<WidgetPosition> {
        match (self.interaction.active_widget(), self.interaction.preview()) {
            (Some(active), Some(preview)) if active.as_str() == id => Some(*preview),
            _ => self.layout.get(id),
        }
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    pub fn hidden_widgets(&self) -> impl Iterator<Item = &WidgetId> {
        self.hidden.iter()
    }

    pub fn widget_kind(&self, id: &str) -> Option<WidgetKind> {
        if !self.layout.contains(id) && !self.registry.contains_key(id) {
            return None;
        }
        Some(self.record_for(id).kind)
    }

    /// Placed, non-hidden widgets in paint order (ascending z, ties by id).
    pub fn visible_widgets(&self) -> Vec<(WidgetId, WidgetPosition)> {
        self.layout
            .stacking_order()
            .into_iter()
            .filter(|(id, _)| !self.hidden.contains(id.as_str()))
            .map(|(id, pos)| (id.clone(), pos))
            .collect()
    }

    pub fn content(&self, id: &str) -> Option<&str> {
        self.content.get(id).map(String::as_str)
    }

    /// Free-form settings stored for `id`.
    pub fn settings(&self, id: &str) -> Option<&Value> {
        self.settings.get(id)
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn interaction_state(&self) -> &InteractionState {
        self.interaction.state()
    }

    /// Active widget and its preview position, if an interaction is live.
    pub fn preview(&self) -> Option<(&WidgetId, &WidgetPosition)> {
        self.interaction.active_widget().zip(self.interaction.preview())
    }

    /// Everything this page would persist.
    #[must_use]
    pub fn documents(&self) -> PageDocuments {
        PageDocuments {
            layout: self.layout.snapshot(),
            hidden: self.hidden.clone(),
            registry: self.registry.clone(),
            content: self.content.clone(),
            settings: self.settings.clone(),
        }
    }

    // ── Layout operations ───────────────────────────────────────────────

    /// Move `id` to `(col, row)`, clamped into the grid.
    pub fn move_widget(&mut self, id: &str, col: i32, row: i32) -> Option<WidgetPosition> {
        let pos = self.layout.set_position(id, col, row)?;
        self.persist();
        Some(pos)
    }

    /// Resize `id` around its origin, clamped to its minimum and the grid.
    pub fn resize_widget(&mut self, id: &str, col_span: i32, row_span: i32) -> Option<WidgetPosition> {
        let pos = self.layout.set_size(id, col_span, row_span)?;
        self.persist();
        Some(pos)
    }

    /// Add a widget from `template` and return its id.
    ///
    /// Ephemeral templates get a fresh `{type}-{n}` id. Singletons use
    /// their type key as id: a hidden singleton is shown again at its
    /// remembered slot; one that was never placed gets a new slot. New
    /// slots come from the first free spot in the layout, hidden widgets
    /// included, or the grid origin when nothing fits, and go on top of
    /// the stack.
    pub fn add_widget(&mut self, template: &WidgetTemplate) -> WidgetId {
        let id = match template.kind {
            WidgetKind::Ephemeral => self.allocate_id(&template.type_key),
            WidgetKind::Singleton => WidgetId::new(template.type_key.as_str()),
        };
        self.registry.insert(id.clone(), template.record());
        self.hidden.remove(id.as_str());
        self.layout.set_constraints(id.clone(), template.constraints);

        if !self.layout.contains(id.as_str()) {
            let (col_span, row_span) = template.initial_span(self.layout.dims());
            let origin = spot_or_origin(self.layout.dims(), self.layout.rects(), col_span, row_span);
            let z_index = front_z_index(&self.layout);
            self.layout.insert(
                id.clone(),
                WidgetPosition::new(origin.col, origin.row, col_span, row_span).with_z_index(z_index),
            );
        }
        if let Some(initial) = &template.initial_content {
            self.content
                .entry(id.clone())
                .or_insert_with(|| initial.clone());
        }
        tracing::debug!(widget = %id, kind = ?template.kind, "added widget");
        self.persist();
        id
    }

    /// [`add_widget`](Self::add_widget) by catalog type key.
    pub fn add_widget_of(&mut self, type_key: &str) -> Option<WidgetId> {
        let template = self.catalog.template(type_key)?.clone();
        Some(self.add_widget(&template))
    }

    /// Delete `id`: ephemeral widgets are removed with their content,
    /// singletons are hidden. Returns `false` for an unknown id.
    pub fn delete_widget(&mut self, id: &str) -> bool {
        if !self.layout.contains(id) && !self.registry.contains_key(id) {
            return false;
        }
        if self.interaction.active_widget().is_some_and(|w| w.as_str() == id) {
            self.interaction.cancel(InteractionCancelReason::WidgetRemoved);
        }
        match self.record_for(id).kind {
            WidgetKind::Ephemeral => {
                self.layout.remove(id);
                self.registry.remove(id);
                self.content.remove(id);
                self.settings.remove(id);
                self.hidden.remove(id);
            }
            WidgetKind::Singleton => {
                self.hidden.insert(WidgetId::from(id));
            }
        }
        tracing::debug!(widget = id, "deleted widget");
        self.persist();
        true
    }

    pub fn bring_to_front(&mut self, id: &str) -> Option<i32> {
        let z = margin_layout::bring_to_front(&mut self.layout, id)?;
        self.persist();
        Some(z)
    }

    pub fn send_to_back(&mut self, id: &str) -> Option<i32> {
        let z = margin_layout::send_to_back(&mut self.layout, id)?;
        self.persist();
        Some(z)
    }

    /// Back to the catalog's default arrangement: user-created widgets and
    /// their content go away, hidden singletons reappear. Content and
    /// settings of every singleton are kept, placed or not.
    pub fn reset_layout(&mut self) {
        self.interaction.force_cancel();
        let kept_content: BTreeMap<WidgetId, String> = std::mem::take(&mut self.content)
            .into_iter()
            .filter(|(id, _)| self.is_singleton(id.as_str()))
            .collect();
        let kept_settings: BTreeMap<WidgetId, Value> = std::mem::take(&mut self.settings)
            .into_iter()
            .filter(|(id, _)| self.is_singleton(id.as_str()))
            .collect();
        self.layout.clear();
        self.registry.clear();
        self.hidden.clear();
        self.install(PageDocuments {
            content: kept_content,
            settings: kept_settings,
            ..PageDocuments::default()
        });
        tracing::debug!(widgets = self.layout.len(), "reset dashboard layout");
        self.persist();
    }

    /// Replace the content of a known widget.
    pub fn set_content(&mut self, id: &str, content: impl Into<String>) -> bool {
        if !self.layout.contains(id) && !self.registry.contains_key(id) {
            return false;
        }
        self.content.insert(WidgetId::from(id), content.into());
        self.persist();
        true
    }

    /// Replace the free-form settings of a known widget.
    pub fn set_settings(&mut self, id: &str, settings: Value) -> bool {
        if !self.layout.contains(id) && !self.registry.contains_key(id) {
            return false;
        }
        self.settings.insert(WidgetId::from(id), settings);
        self.persist();
        true
    }

    // ── Interaction ─────────────────────────────────────────────────────

    /// Route one pointer event; a commit is applied to the layout and
    /// persisted. Hidden widgets cannot be grabbed.
    pub fn handle_event(
        &mut self,
        bounds: PixelRect,
        event: &InteractionEvent,
    ) -> Result<InteractionTransition, InteractionEventError> {
        if let InteractionEventKind::PointerDown { widget, .. } = &event.kind {
            if !self.interaction.is_active() && self.hidden.contains(widget.as_str()) {
                return self
                    .interaction
                    .reject_event(event, InteractionNoopReason::UnknownWidget);
            }
        }
        let transition = self.interaction.apply_event(&self.layout, bounds, event)?;
        if let Some(commit) = transition.commit() {
            if let Some(pos) = commit.apply_to(&mut self.layout) {
                tracing::debug!(
                    widget = %commit.widget(),
                    col = pos.col,
                    row = pos.row,
                    col_span = pos.col_span,
                    row_span = pos.row_span,
                    "committed interaction"
                );
                self.persist();
            }
        }
        Ok(transition)
    }

    /// Abandon any live drag/resize.
    pub fn cancel_interaction(&mut self, reason: InteractionCancelReason) -> InteractionTransition {
        self.interaction.cancel(reason)
    }

    // ── Bulk placement ──────────────────────────────────────────────────

    /// Every placed widget in service form, with its stored settings.
    #[must_use]
    pub fn export_placements(&self) -> PlacementBatch {
        PlacementBatch::from_parts(&self.layout.snapshot(), &self.settings)
    }

    /// Replace the whole layout with a validated batch.
    ///
    /// Nothing changes when validation fails. Ephemeral widgets missing
    /// from the batch are dropped with their content. Widget settings are
    /// replaced by the batch's `config` entries.
    pub fn import_placements(&mut self, batch: &PlacementBatch) -> Result<(), PlacementError> {
        let snapshot = batch.to_snapshot()?;
        self.interaction.force_cancel();
        self.replace_layout(&snapshot);
        self.settings = batch.settings();
        let layout = &self.layout;
        self.registry
            .retain(|id, record| record.kind == WidgetKind::Singleton || layout.contains(id.as_str()));
        let registry = &self.registry;
        let catalog = &self.catalog;
        let known = |id: &WidgetId| {
            layout.contains(id.as_str())
                || registry.contains_key(id.as_str())
                || catalog.singleton_record(id.as_str()).is_some()
        };
        self.content.retain(|id, _| known(id));
        tracing::debug!(widgets = snapshot.len(), "imported placements");
        self.persist();
        Ok(())
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Write all page documents now, returning any storage error.
    pub fn flush(&self) -> StorageResult<()> {
        self.persistence.save_all(&self.documents())
    }

    /// Remove this page's stored state. In-memory state is untouched.
    pub fn clear_page_state(&self) -> StorageResult<()> {
        self.persistence.clear()
    }

    fn persist(&self) {
        if !self.config.persistence.auto_save {
            return;
        }
        if let Err(err) = self.flush() {
            tracing::warn!(
                backend = self.persistence.backend_name(),
                key = self.persistence.keys().layout(),
                error = %err,
                "failed to persist dashboard state"
            );
        }
    }

    fn load_documents(&self) -> PageDocuments {
        PageDocuments {
            layout: self.recover("layout", self.persistence.load_layout()).unwrap_or_default(),
            hidden: self.recover("hidden", self.persistence.load_hidden()).unwrap_or_default(),
            registry: self.recover("registry", self.persistence.load_registry()).unwrap_or_default(),
            content: self.recover("content", self.persistence.load_content()).unwrap_or_default(),
            settings: self.recover("settings", self.persistence.load_settings()).unwrap_or_default(),
        }
    }

    fn recover<T>(&self, document: &str, result: StorageResult<Option<T>>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    backend = self.persistence.backend_name(),
                    document,
                    error = %err,
                    "ignoring unreadable page state"
                );
                None
            }
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Defaults overlaid with `stored`. Expects an empty layout/registry.
    fn install(&mut self, stored: PageDocuments) {
        for id in self.catalog.default_layout().widgets.keys() {
            if let Some(record) = self.catalog.singleton_record(id.as_str()) {
                self.registry.insert(id.clone(), record);
            }
        }
        self.registry.extend(stored.registry);

        let mut merged = self.catalog.default_layout().clone();
        merged.merge_from(&stored.layout);
        self.replace_layout(&merged);

        let layout = &self.layout;
        self.registry
            .retain(|id, record| record.kind == WidgetKind::Singleton || layout.contains(id.as_str()));
        let registry = &self.registry;
        let catalog = &self.catalog;
        let known = |id: &WidgetId| {
            layout.contains(id.as_str())
                || registry.contains_key(id.as_str())
                || catalog.singleton_record(id.as_str()).is_some()
        };
        self.hidden = stored.hidden;
        self.content = stored.content.into_iter().filter(|(id, _)| known(id)).collect();
        self.settings = stored.settings.into_iter().filter(|(id, _)| known(id)).collect();
    }

    /// Install `snapshot` with the constraints each widget's type declares.
    fn replace_layout(&mut self, snapshot: &LayoutSnapshot) {
        for id in snapshot.widgets.keys() {
            let record = self.record_for(id.as_str());
            let constraints = self.catalog.constraints_for(&record.type_key);
            self.layout.set_constraints(id.clone(), constraints);
        }
        self.layout.replace_from_snapshot(snapshot);
    }

    /// Stored record, else the catalog singleton owning `id`, else an
    /// untyped ephemeral widget.
    fn record_for(&self, id: &str) -> WidgetRecord {
        self.registry
            .get(id)
            .cloned()
            .or_else(|| self.catalog.singleton_record(id))
            .unwrap_or_else(|| WidgetRecord {
                type_key: id.to_string(),
                kind: WidgetKind::Ephemeral,
            })
    }

    fn is_singleton(&self, id: &str) -> bool {
        self.record_for(id).kind == WidgetKind::Singleton
    }

    fn allocate_id(&mut self, type_key: &str) -> WidgetId {
        loop {
            self.next_instance = self.next_instance.wrapping_add(1);
            let candidate = format!("{type_key}-{}", self.next_instance);
            let taken = self.layout.contains(&candidate)
                || self.registry.contains_key(candidate.as_str())
                || self.content.contains_key(candidate.as_str())
                || self.settings.contains_key(candidate.as_str());
            if !taken {
                return WidgetId::from(candidate);
            }
        }
    }
}

impl fmt::Debug for DashboardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardStore")
            .field("page_id", &self.config.page_id)
            .field("widgets", &self.layout.len())
            .field("hidden", &self.hidden.len())
            .field("mode", &self.interaction.mode())
            .field("persistence", &self.persistence)
            .finish()
    }
}
