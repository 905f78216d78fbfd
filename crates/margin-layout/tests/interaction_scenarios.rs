//! Interaction scenarios driven through `InteractionMachine::apply_event`.
//!
//! # Invariants
//!
//! 1. **Geometry**: on an 800x800 surface, pointer pixels map to the
//!    documented cells and the far edge maps to nothing.
//! 2. **Drag commit**: a commit carries the last preview origin.
//! 3. **Resize floor**: a commit never carries spans below the minimum.
//! 4. **Preview only**: the layout is untouched until a commit is applied.
//! 5. **Bounds**: applying any commit from an arbitrary event stream keeps
//!    every widget inside the grid.

use margin_core::pointer::{PointerButton, PointerPosition};
use margin_layout::{
    CellCoord, GridDims, InteractionCommit, InteractionEvent, InteractionEventKind,
    InteractionHandle, InteractionMachine, InteractionMode, LayoutModel, PixelRect,
    SpanConstraints, WidgetId, WidgetPosition, cell_at,
};
use proptest::prelude::*;

const SURFACE: PixelRect = PixelRect::from_size(800.0, 800.0);

fn pointer_down(seq: u64, widget: &str, handle: InteractionHandle, x: f64, y: f64) -> InteractionEvent {
    InteractionEvent::new(
        seq,
        InteractionEventKind::PointerDown {
            widget: WidgetId::from(widget),
            handle,
            pointer_id: 1,
            button: PointerButton::Primary,
            position: PointerPosition::new(x, y),
        },
    )
}

fn pointer_move(seq: u64, x: f64, y: f64) -> InteractionEvent {
    InteractionEvent::new(
        seq,
        InteractionEventKind::PointerMove {
            pointer_id: 1,
            position: PointerPosition::new(x, y),
        },
    )
}

fn pointer_up(seq: u64) -> InteractionEvent {
    InteractionEvent::new(seq, InteractionEventKind::PointerUp { pointer_id: 1 })
}

// ============================================================================
// Documented examples
// ============================================================================

#[test]
fn geometry_examples() {
    let dims = GridDims::DEFAULT;
    let at = |x, y| cell_at(SURFACE, dims, PointerPosition::new(x, y));
    assert_eq!(at(350.0, 150.0), Some(CellCoord::new(3, 1)));
    assert_eq!(at(799.0, 799.0), Some(CellCoord::new(7, 7)));
    assert_eq!(at(800.0, 0.0), None);
    assert_eq!(at(-1.0, 0.0), None);
}

#[test]
fn drag_commit_example() {
    let mut layout = LayoutModel::new(GridDims::DEFAULT);
    layout.insert("w", WidgetPosition::new(0, 0, 2, 2));
    let mut machine = InteractionMachine::new();

    machine
        .apply_event(&layout, SURFACE, &pointer_down(1, "w", InteractionHandle::Drag, 10.0, 10.0))
        .unwrap();
    machine
        .apply_event(&layout, SURFACE, &pointer_move(2, 550.0, 550.0))
        .unwrap();
    assert_eq!(layout.get("w"), Some(WidgetPosition::new(0, 0, 2, 2)));

    let t = machine.apply_event(&layout, SURFACE, &pointer_up(3)).unwrap();
    let commit = t.commit().cloned().unwrap();
    commit.apply_to(&mut layout);
    assert_eq!(layout.get("w"), Some(WidgetPosition::new(5, 5, 2, 2)));
}

#[test]
fn resize_floor_example() {
    let mut layout = LayoutModel::new(GridDims::DEFAULT);
    layout.set_constraints("w", SpanConstraints::new(2, 2));
    layout.insert("w", WidgetPosition::new(0, 0, 4, 4));
    let mut machine = InteractionMachine::new();

    machine
        .apply_event(&layout, SURFACE, &pointer_down(1, "w", InteractionHandle::Resize, 390.0, 390.0))
        .unwrap();
    let t = machine
        .apply_event(&layout, SURFACE, &pointer_move(2, 20.0, 20.0))
        .unwrap();
    assert_eq!(machine.preview().map(|p| (p.col_span, p.row_span)), Some((2, 2)));
    assert_eq!(t.to, InteractionMode::Resize);

    let t = machine.apply_event(&layout, SURFACE, &pointer_up(3)).unwrap();
    assert_eq!(
        t.commit(),
        Some(&InteractionCommit::Resize {
            widget: WidgetId::from("w"),
            col_span: 2,
            row_span: 2,
        })
    );
}

#[test]
fn resize_pointer_down_outside_grid_still_starts() {
    let mut layout = LayoutModel::new(GridDims::DEFAULT);
    layout.insert("w", WidgetPosition::new(6, 6, 2, 2));
    let mut machine = InteractionMachine::new();
    let t = machine
        .apply_event(&layout, SURFACE, &pointer_down(1, "w", InteractionHandle::Resize, 805.0, 805.0))
        .unwrap();
    assert_eq!(t.to, InteractionMode::Resize);
}

// ============================================================================
// Random streams
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Down { widget: usize, resize: bool, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..4, any::<bool>(), -100.0f64..900.0, -100.0f64..900.0)
            .prop_map(|(widget, resize, x, y)| Step::Down { widget, resize, x, y }),
        (-100.0f64..900.0, -100.0f64..900.0).prop_map(|(x, y)| Step::Move { x, y }),
        Just(Step::Up),
    ]
}

proptest! {
    #[test]
    fn random_streams_keep_bounds(steps in prop::collection::vec(step_strategy(), 1..60)) {
        let mut layout = LayoutModel::new(GridDims::DEFAULT);
        layout.set_constraints("w2", SpanConstraints::new(4, 4));
        layout.set_constraints("w3", SpanConstraints::new(2, 3));
        layout.insert("w0", WidgetPosition::new(0, 0, 5, 2));
        layout.insert("w1", WidgetPosition::new(0, 2, 3, 3));
        layout.insert("w2", WidgetPosition::new(2, 2, 6, 6));
        layout.insert("w3", WidgetPosition::new(5, 0, 3, 4));
        let mut machine = InteractionMachine::new();

        for (i, step) in steps.into_iter().enumerate() {
            let seq = i as u64 + 1;
            let event = match step {
                Step::Down { widget, resize, x, y } => {
                    let handle = if resize { InteractionHandle::Resize } else { InteractionHandle::Drag };
                    pointer_down(seq, &format!("w{widget}"), handle, x, y)
                }
                Step::Move { x, y } => pointer_move(seq, x, y),
                Step::Up => pointer_up(seq),
            };
            let before = layout.clone();
            let t = machine.apply_event(&layout, SURFACE, &event).unwrap();
            prop_assert_eq!(&layout, &before);
            prop_assert_eq!(t.transition_id, seq);
            if let Some(preview) = machine.preview() {
                prop_assert!(layout.dims().contains_rect(preview.rect()), "{:?}", preview);
            }
            if let Some(commit) = t.commit() {
                commit.apply_to(&mut layout);
            }
            prop_assert!(layout.violations().is_empty(), "{:?}", layout.violations());
        }
    }
}
