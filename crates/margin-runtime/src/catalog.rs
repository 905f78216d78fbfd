//! Widget kinds, templates, and the built-in catalog.
//!
//! A widget's [`WidgetKind`] decides what deleting it means: ephemeral
//! widgets are removed outright, singletons are hidden and keep their slot
//! so adding them again restores the remembered position.

use margin_core::geometry::GridDims;
use margin_layout::{LayoutSnapshot, SpanConstraints, WidgetPosition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Delete semantics of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// User-created instance; delete removes it and its content.
    Ephemeral,
    /// Built-in widget with a fixed id; delete hides it.
    Singleton,
}

/// Persisted identity of a placed widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRecord {
    pub type_key: String,
    pub kind: WidgetKind,
}

/// How to create a widget of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetTemplate {
    pub type_key: String,
    pub kind: WidgetKind,
    pub col_span: u16,
    pub row_span: u16,
    pub constraints: SpanConstraints,
    pub initial_content: Option<String>,
}

impl WidgetTemplate {
    fn with_kind(type_key: impl Into<String>, kind: WidgetKind, col_span: u16, row_span: u16) -> Self {
        Self {
            type_key: type_key.into(),
            kind,
            col_span: col_span.max(1),
            row_span: row_span.max(1),
            constraints: SpanConstraints::UNCONSTRAINED,
            initial_content: None,
        }
    }

    /// Template for user-created instances with generated ids.
    pub fn ephemeral(type_key: impl Into<String>, col_span: u16, row_span: u16) -> Self {
        Self::with_kind(type_key, WidgetKind::Ephemeral, col_span, row_span)
    }

    /// Template for a widget whose id is its type key.
    pub fn singleton(type_key: impl Into<String>, col_span: u16, row_span: u16) -> Self {
        Self::with_kind(type_key, WidgetKind::Singleton, col_span, row_span)
    }

    #[must_use]
    pub fn with_min_span(mut self, min_col_span: u16, min_row_span: u16) -> Self {
        self.constraints = SpanConstraints::new(min_col_span, min_row_span);
        self
    }

    #[must_use]
    pub fn with_initial_content(mut self, content: impl Into<String>) -> Self {
        self.initial_content = Some(content.into());
        self
    }

    #[must_use]
    pub fn record(&self) -> WidgetRecord {
        WidgetRecord {
            type_key: self.type_key.clone(),
            kind: self.kind,
        }
    }

    /// Starting span on `dims`: at least the minimum, at most the grid.
    #[must_use]
    pub fn initial_span(&self, dims: GridDims) -> (u16, u16) {
        (
            self.col_span
                .max(self.constraints.min_col_span())
                .min(dims.cols()),
            self.row_span
                .max(self.constraints.min_row_span())
                .min(dims.rows()),
        )
    }
}

/// Known widget types plus the arrangement a fresh page starts with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetCatalog {
    templates: BTreeMap<String, WidgetTemplate>,
    default_layout: LayoutSnapshot,
}

impl WidgetCatalog {
    /// Empty catalog with no templates and an empty default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock dashboard widgets.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with_template(WidgetTemplate::singleton(builtin::GREETING, 5, 2))
            .with_template(WidgetTemplate::singleton(builtin::QUICK_LINKS, 3, 3))
            .with_template(WidgetTemplate::singleton(builtin::SHORTCUT_HINT, 4, 1))
            .with_template(WidgetTemplate::singleton(builtin::CALENDAR, 6, 6).with_min_span(4, 4))
            .with_template(WidgetTemplate::singleton(builtin::DAILY_EVENTS, 3, 4).with_min_span(2, 3))
            .with_template(
                WidgetTemplate::ephemeral(builtin::TEXT, 3, 2)
                    .with_initial_content(builtin::TEXT_PLACEHOLDER),
            )
            .with_template(WidgetTemplate::ephemeral(builtin::IMAGE, 2, 2).with_initial_content(""))
            .with_default(builtin::GREETING, WidgetPosition::new(0, 0, 5, 2))
            .with_default(builtin::QUICK_LINKS, WidgetPosition::new(0, 2, 3, 3))
            .with_default(builtin::SHORTCUT_HINT, WidgetPosition::new(0, 5, 4, 1))
    }

    #[must_use]
    pub fn with_template(mut self, template: WidgetTemplate) -> Self {
        self.register(template);
        self
    }

    /// Add an entry to the default arrangement.
    #[must_use]
    pub fn with_default(mut self, id: &str, position: WidgetPosition) -> Self {
        self.default_layout.widgets.insert(id.into(), position);
        self
    }

    /// Register or replace a template, returning the previous one.
    pub fn register(&mut self, template: WidgetTemplate) -> Option<WidgetTemplate> {
        self.templates.insert(template.type_key.clone(), template)
    }

    pub fn template(&self, type_key: &str) -> Option<&WidgetTemplate> {
        self.templates.get(type_key)
    }

    pub fn templates(&self) -> impl Iterator<Item = &WidgetTemplate> {
        self.templates.values()
    }

    #[must_use]
    pub fn default_layout(&self) -> &LayoutSnapshot {
        &self.default_layout
    }

    /// Record for a widget id that has no stored record: singleton
    /// templates own the id equal to their type key.
    #[must_use]
    pub fn singleton_record(&self, id: &str) -> Option<WidgetRecord> {
        self.template(id)
            .filter(|t| t.kind == WidgetKind::Singleton)
            .map(WidgetTemplate::record)
    }

    /// Minimum spans for widgets of `type_key` (1x1 if unknown).
    #[must_use]
    pub fn constraints_for(&self, type_key: &str) -> SpanConstraints {
        self.template(type_key)
            .map(|t| t.constraints)
            .unwrap_or_default()
    }
}

/// Type keys of the stock widgets.
pub mod builtin {
    pub const GREETING: &str = "greeting";
    pub const QUICK_LINKS: &str = "quickLinks";
    pub const SHORTCUT_HINT: &str = "shortcutHint";
    pub const CALENDAR: &str = "calendar";
    pub const DAILY_EVENTS: &str = "dailyEvents";
    pub const TEXT: &str = "text";
    pub const IMAGE: &str = "image";

    /// Content of a freshly added text widget.
    pub const TEXT_PLACEHOLDER: &str = "Click to edit...";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_defaults() {
        let catalog = WidgetCatalog::builtin();
        let defaults = catalog.default_layout();
        assert_eq!(defaults.len(), 3);
        assert_eq!(
            defaults.widgets.get(builtin::QUICK_LINKS),
            Some(&WidgetPosition::new(0, 2, 3, 3))
        );
        let calendar = catalog.template(builtin::CALENDAR).unwrap();
        assert_eq!(calendar.kind, WidgetKind::Singleton);
        assert_eq!(calendar.constraints, SpanConstraints::new(4, 4));
        let text = catalog.template(builtin::TEXT).unwrap();
        assert_eq!(text.initial_content.as_deref(), Some("Click to edit..."));
    }

    #[test]
    fn singleton_record_only_for_singletons() {
        let catalog = WidgetCatalog::builtin();
        assert_eq!(
            catalog.singleton_record("greeting"),
            Some(WidgetRecord {
                type_key: "greeting".into(),
                kind: WidgetKind::Singleton,
            })
        );
        assert_eq!(catalog.singleton_record("text"), None);
        assert_eq!(catalog.singleton_record("text-1"), None);
    }

    #[test]
    fn initial_span_respects_minimum_and_grid() {
        let small = GridDims::new(4, 4).unwrap();
        let t = WidgetTemplate::singleton("wide", 6, 1).with_min_span(2, 3);
        assert_eq!(t.initial_span(GridDims::DEFAULT), (6, 3));
        assert_eq!(t.initial_span(small), (4, 3));
    }

    #[test]
    fn zero_default_span_becomes_one() {
        let t = WidgetTemplate::ephemeral("note", 0, 0);
        assert_eq!((t.col_span, t.row_span), (1, 1));
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_string(&WidgetTemplate::ephemeral("text", 3, 2).record()).unwrap();
        assert_eq!(json, r#"{"typeKey":"text","kind":"ephemeral"}"#);
    }
}
