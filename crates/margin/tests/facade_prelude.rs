//! Facade smoke tests: a host written only against `margin::prelude`.

use margin::prelude::*;
use margin::{PlacementBatch, StorageBackend};
use std::sync::Arc;

fn drive_drag(page: &mut DashboardStore, widget: &str) -> Result<InteractionMode> {
    let bounds = PixelRect::from_size(800.0, 800.0);
    let events = [
        InteractionEventKind::PointerDown {
            widget: widget.into(),
            handle: InteractionHandle::Drag,
            pointer_id: 1,
            button: PointerButton::Primary,
            position: PointerPosition::new(10.0, 10.0),
        },
        InteractionEventKind::PointerMove {
            pointer_id: 1,
            position: PointerPosition::new(110.0, 310.0),
        },
        InteractionEventKind::PointerUp { pointer_id: 1 },
    ];
    for (i, kind) in events.into_iter().enumerate() {
        page.handle_event(bounds, &InteractionEvent::new(i as u64 + 1, kind))?;
    }
    Ok(page.interaction_mode())
}

#[test]
fn host_drives_page_through_prelude() {
    let backend = Arc::new(MemoryStorage::new());
    let mut page = DashboardStore::open(
        DashboardConfig::for_page("home"),
        WidgetCatalog::builtin(),
        backend.clone(),
    );
    assert_eq!(drive_drag(&mut page, "greeting").unwrap(), InteractionMode::Idle);
    assert_eq!(
        page.position("greeting"),
        Some(WidgetPosition::new(1, 3, 5, 2))
    );
    assert!(backend.get("margin-grid-layout-home").unwrap().is_some());
}

#[test]
fn malformed_event_converts_to_facade_error() {
    let mut page = DashboardStore::in_memory();
    let event = InteractionEvent::new(0, InteractionEventKind::PointerUp { pointer_id: 1 });
    let err: Error = page
        .handle_event(PixelRect::from_size(800.0, 800.0), &event)
        .unwrap_err()
        .into();
    assert!(matches!(err, Error::Event(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn errors_propagate_with_question_mark() {
    fn build() -> Result<GridDims> {
        Ok(GridDims::new(0, 8)?)
    }
    assert!(matches!(build(), Err(Error::Geometry(_))));

    fn import(page: &mut DashboardStore) -> Result<()> {
        let batch: PlacementBatch =
            serde_json::from_str(r#"{"widgets":[{"widgetKey":"","x":0,"y":0,"width":1,"height":1}]}"#)
                .expect("batch json");
        page.import_placements(&batch)?;
        Ok(())
    }
    let mut page = DashboardStore::in_memory();
    let err = import(&mut page).unwrap_err();
    assert!(matches!(err, Error::Placement(_)));
    assert!(err.to_string().contains("empty widgetKey"));
}

#[test]
fn singleton_kind_visible_through_prelude() {
    let mut page = DashboardStore::in_memory();
    assert_eq!(page.widget_kind("greeting"), Some(WidgetKind::Singleton));
    page.delete_widget("greeting");
    assert!(page.is_hidden("greeting"));
}

#[test]
fn logging_config_is_reexported() {
    let config = margin::LoggingConfig::from_lookup(|key| match key {
        "MARGIN_LOG" => Some("margin_runtime=debug".to_string()),
        "MARGIN_LOG_FORMAT" => Some("json".to_string()),
        _ => None,
    });
    assert_eq!(config.filter_directives(), "margin_runtime=debug");
}
