//! Property-based invariant tests for the layout model, slot finder and
//! z-order operations.
//!
//! 1. Bounds hold after any sequence of `set_position` / `set_size`.
//! 2. `set_size` never goes below a minimum that fits.
//! 3. `set_position` is idempotent.
//! 4. A slot returned by the finder overlaps no existing widget.
//! 5. The finder returns the first free slot in row-major order.
//! 6. After `bring_to_front`, the widget is strictly above all others.
//! 7. After `send_to_back`, the widget is strictly below all others.
//! 8. Snapshots survive a JSON round-trip unchanged.

use margin_layout::{
    GridDims, GridRect, LayoutModel, LayoutSnapshot, SpanConstraints, WidgetPosition,
    bring_to_front, find_empty_spot, find_empty_spot_in, is_topmost, send_to_back,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Move { idx: usize, col: i32, row: i32 },
    Resize { idx: usize, col_span: i32, row_span: i32 },
}

fn dims_strategy() -> impl Strategy<Value = GridDims> {
    (1u16..=12, 1u16..=12).prop_map(|(c, r)| GridDims::new(c, r).unwrap())
}

fn position_strategy() -> impl Strategy<Value = WidgetPosition> {
    (0u16..16, 0u16..16, 0u16..16, 0u16..16, -20i32..20)
        .prop_map(|(c, r, cs, rs, z)| WidgetPosition::new(c, r, cs, rs).with_z_index(z))
}

fn constraints_strategy() -> impl Strategy<Value = SpanConstraints> {
    (1u16..6, 1u16..6).prop_map(|(c, r)| SpanConstraints::new(c, r))
}

fn op_strategy(n: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..n, -20i32..30, -20i32..30).prop_map(|(idx, col, row)| Op::Move { idx, col, row }),
        (0..n, -5i32..20, -5i32..20).prop_map(|(idx, col_span, row_span)| Op::Resize {
            idx,
            col_span,
            row_span
        }),
    ]
}

fn layout_strategy() -> impl Strategy<Value = LayoutModel> {
    (
        dims_strategy(),
        prop::collection::vec((position_strategy(), constraints_strategy()), 1..8),
    )
        .prop_map(|(dims, entries)| {
            let mut layout = LayoutModel::new(dims);
            for (i, (pos, constraints)) in entries.into_iter().enumerate() {
                let id = format!("w{i}");
                layout.set_constraints(id.as_str(), constraints);
                layout.insert(id, pos);
            }
            layout
        })
}

fn id(idx: usize, layout: &LayoutModel) -> String {
    format!("w{}", idx % layout.len())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Model clamping
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bounds_hold_after_any_ops(
        mut layout in layout_strategy(),
        ops in prop::collection::vec(op_strategy(8), 0..40),
    ) {
        prop_assert!(layout.violations().is_empty(), "{:?}", layout.violations());
        for op in ops {
            match op {
                Op::Move { idx, col, row } => {
                    let id = id(idx, &layout);
                    layout.set_position(&id, col, row);
                }
                Op::Resize { idx, col_span, row_span } => {
                    let id = id(idx, &layout);
                    layout.set_size(&id, col_span, row_span);
                }
            }
            let dims = layout.dims();
            for (wid, pos) in layout.iter() {
                prop_assert!(pos.col_span >= 1 && pos.row_span >= 1, "{} {:?}", wid, pos);
                prop_assert!(pos.col + pos.col_span <= dims.cols(), "{} {:?} in {}", wid, pos, dims);
                prop_assert!(pos.row + pos.row_span <= dims.rows(), "{} {:?} in {}", wid, pos, dims);
            }
        }
        prop_assert!(layout.violations().is_empty());
    }

    #[test]
    fn resize_respects_fitting_minimum(
        mut layout in layout_strategy(),
        idx in 0usize..8,
        col_span in -5i32..20,
        row_span in -5i32..20,
    ) {
        let id = id(idx, &layout);
        let dims = layout.dims();
        let constraints = layout.constraints(&id);
        let pos = layout.set_size(&id, col_span, row_span).unwrap();
        if constraints.min_col_span() <= dims.cols() - pos.col {
            prop_assert!(pos.col_span >= constraints.min_col_span());
        }
        if constraints.min_row_span() <= dims.rows() - pos.row {
            prop_assert!(pos.row_span >= constraints.min_row_span());
        }
    }

    #[test]
    fn set_position_idempotent(
        mut layout in layout_strategy(),
        idx in 0usize..8,
        col in -20i32..30,
        row in -20i32..30,
    ) {
        let id = id(idx, &layout);
        let once = layout.set_position(&id, col, row).unwrap();
        let twice = layout.set_position(&id, col, row).unwrap();
        prop_assert_eq!(once, twice);
        let again = layout.set_position(&id, i32::from(once.col), i32::from(once.row)).unwrap();
        prop_assert_eq!(once, again);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Empty-slot finder
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn empty_spot_is_free(layout in layout_strategy(), cs in 1u16..8, rs in 1u16..8) {
        if let Some(cell) = find_empty_spot_in(&layout, cs, rs) {
            let candidate = GridRect::new(cell.col, cell.row, cs, rs);
            prop_assert!(layout.dims().contains_rect(candidate));
            for (wid, pos) in layout.iter() {
                prop_assert!(!candidate.overlaps(&pos.rect()), "{:?} overlaps {} {:?}", candidate, wid, pos);
            }
        }
    }

    #[test]
    fn empty_spot_is_first_in_raster_order(layout in layout_strategy(), cs in 1u16..6, rs in 1u16..6) {
        let dims = layout.dims();
        let found = find_empty_spot_in(&layout, cs, rs);
        let mut expected = None;
        if cs <= dims.cols() && rs <= dims.rows() {
            'scan: for row in 0..=dims.rows() - rs {
                for col in 0..=dims.cols() - cs {
                    let candidate = GridRect::new(col, row, cs, rs);
                    if layout.rects().all(|r| !candidate.overlaps(&r)) {
                        expected = Some((col, row));
                        break 'scan;
                    }
                }
            }
        }
        prop_assert_eq!(found.map(|c| (c.col, c.row)), expected);
    }

    #[test]
    fn empty_grid_always_fits(dims in dims_strategy(), cs in 1u16..=12, rs in 1u16..=12) {
        let found = find_empty_spot(dims, [], cs, rs);
        prop_assert_eq!(found.is_some(), cs <= dims.cols() && rs <= dims.rows());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6-7. Z-order strictness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bring_to_front_is_strict(mut layout in layout_strategy(), idx in 0usize..8) {
        let id = id(idx, &layout);
        bring_to_front(&mut layout, &id).unwrap();
        prop_assert!(is_topmost(&layout, &id));
    }

    #[test]
    fn send_to_back_is_strict(mut layout in layout_strategy(), idx in 0usize..8) {
        let id = id(idx, &layout);
        let z = send_to_back(&mut layout, &id).unwrap();
        for (wid, pos) in layout.iter() {
            if wid.as_str() != id {
                prop_assert!(pos.z_index > z);
            }
        }
    }

    #[test]
    fn z_ops_leave_geometry_alone(mut layout in layout_strategy(), idx in 0usize..8) {
        let id = id(idx, &layout);
        let before = layout.get(&id).unwrap().rect();
        bring_to_front(&mut layout, &id);
        send_to_back(&mut layout, &id);
        prop_assert_eq!(layout.get(&id).unwrap().rect(), before);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Snapshot format
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn snapshot_json_round_trip(layout in layout_strategy()) {
        let snapshot = layout.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: LayoutSnapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&restored, &snapshot);
        let rebuilt = LayoutModel::from_snapshot(layout.dims(), &restored);
        prop_assert_eq!(rebuilt.snapshot(), snapshot);
    }
}
