//! Drag/resize interaction lifecycle.
//!
//! ```text
//! Idle --pointer-down(drag handle, cell inside grid)--> Dragging
//! Idle --pointer-down(resize handle)-----------------> Resizing
//! Dragging | Resizing --pointer-move--> (same state, preview updated)
//! Dragging | Resizing --pointer-up----> Idle (commit)
//! Dragging | Resizing --cancel--------> Idle (no commit)
//! ```
//!
//! The machine never mutates the layout. It reads positions and
//! constraints from a [`LayoutModel`], keeps a preview, and hands back an
//! [`InteractionCommit`] on pointer-up for the owner to apply. Every step
//! produces an [`InteractionTransition`] with a monotonically increasing
//! `transition_id`, including steps that change nothing (those carry
//! [`InteractionEffect::Noop`] with a reason).
//!
//! If the active widget disappears from the layout mid-interaction, the
//! next step aborts back to `Idle` with
//! [`InteractionCancelReason::WidgetRemoved`].

use crate::mapper::cell_at;
use crate::model::{LayoutModel, clamp_origin, clamp_span};
use crate::position::{SpanConstraints, WidgetId, WidgetPosition};
use margin_core::geometry::{CellCoord, GridDims, PixelRect};
use margin_core::pointer::{PointerButton, PointerPosition};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Which part of a widget received the pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionHandle {
    /// Widget body / title bar: moves the widget.
    Drag,
    /// Bottom-right grip: resizes the widget.
    Resize,
}

/// Why an active interaction ended without a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionCancelReason {
    /// Host reported the pointer as cancelled (e.g. `pointercancel`).
    PointerCancel,
    EscapeKey,
    FocusLost,
    /// The widget left the layout while the interaction was active.
    WidgetRemoved,
    /// Cancelled by the owner, e.g. on reset.
    Programmatic,
}

/// Host-agnostic pointer input routed to the machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InteractionEventKind {
    PointerDown {
        widget: WidgetId,
        handle: InteractionHandle,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    },
    PointerMove {
        pointer_id: u32,
        position: PointerPosition,
    },
    PointerUp {
        pointer_id: u32,
    },
    Cancel {
        reason: InteractionCancelReason,
    },
}

/// One input event with its host-assigned sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub sequence: u64,
    pub kind: InteractionEventKind,
}

impl InteractionEvent {
    pub fn new(sequence: u64, kind: InteractionEventKind) -> Self {
        Self { sequence, kind }
    }

    /// Structural checks applied before the event reaches the machine.
    pub fn validate(&self) -> Result<(), InteractionEventError> {
        if self.sequence == 0 {
            return Err(InteractionEventError::ZeroSequence);
        }
        let pointer_id = match &self.kind {
            InteractionEventKind::PointerDown { pointer_id, .. }
            | InteractionEventKind::PointerMove { pointer_id, .. }
            | InteractionEventKind::PointerUp { pointer_id } => Some(*pointer_id),
            InteractionEventKind::Cancel { .. } => None,
        };
        if pointer_id == Some(0) {
            return Err(InteractionEventError::ZeroPointerId);
        }
        Ok(())
    }
}

/// Malformed input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEventError {
    ZeroSequence,
    ZeroPointerId,
}

impl fmt::Display for InteractionEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSequence => write!(f, "interaction event sequence must be non-zero"),
            Self::ZeroPointerId => write!(f, "pointer events require a non-zero pointer_id"),
        }
    }
}

impl std::error::Error for InteractionEventError {}

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// Coarse interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Idle,
    Drag,
    Resize,
}

/// Cell distance between the grabbed cell and the widget origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellOffset {
    pub d_col: i32,
    pub d_row: i32,
}

/// Full interaction state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        widget: WidgetId,
        pointer_id: u32,
        offset: CellOffset,
        preview: WidgetPosition,
        started_sequence: u64,
    },
    Resizing {
        widget: WidgetId,
        pointer_id: u32,
        preview: WidgetPosition,
        started_sequence: u64,
    },
}

impl InteractionState {
    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        match self {
            Self::Idle => InteractionMode::Idle,
            Self::Dragging { .. } => InteractionMode::Drag,
            Self::Resizing { .. } => InteractionMode::Resize,
        }
    }

    #[must_use]
    pub fn widget(&self) -> Option<&WidgetId> {
        match self {
            Self::Idle => None,
            Self::Dragging { widget, .. } | Self::Resizing { widget, .. } => Some(widget),
        }
    }

    #[must_use]
    pub const fn pointer_id(&self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Dragging { pointer_id, .. } | Self::Resizing { pointer_id, .. } => {
                Some(*pointer_id)
            }
        }
    }

    /// Position the widget would take if the interaction committed now.
    #[must_use]
    pub const fn preview(&self) -> Option<&WidgetPosition> {
        match self {
            Self::Idle => None,
            Self::Dragging { preview, .. } | Self::Resizing { preview, .. } => Some(preview),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transitions
// ─────────────────────────────────────────────────────────────────────────────

/// Explicit diagnostics for steps that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionNoopReason {
    IdleWithoutActiveInteraction,
    ActiveInteractionInProgress,
    PointerMismatch,
    NonPrimaryButton,
    UnknownWidget,
    PointerOutsideGrid,
}

/// Layout change requested by a completed interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InteractionCommit {
    Move {
        widget: WidgetId,
        col: u16,
        row: u16,
    },
    Resize {
        widget: WidgetId,
        col_span: u16,
        row_span: u16,
    },
}

impl InteractionCommit {
    #[must_use]
    pub fn widget(&self) -> &WidgetId {
        match self {
            Self::Move { widget, .. } | Self::Resize { widget, .. } => widget,
        }
    }

    /// Apply to `layout` through its clamping setters.
    pub fn apply_to(&self, layout: &mut LayoutModel) -> Option<WidgetPosition> {
        match self {
            Self::Move { widget, col, row } => {
                layout.set_position(widget.as_str(), i32::from(*col), i32::from(*row))
            }
            Self::Resize {
                widget,
                col_span,
                row_span,
            } => layout.set_size(widget.as_str(), i32::from(*col_span), i32::from(*row_span)),
        }
    }
}

/// Effect emitted by one lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum InteractionEffect {
    DragStarted {
        widget: WidgetId,
        pointer_id: u32,
        cell: CellCoord,
        offset: CellOffset,
    },
    ResizeStarted {
        widget: WidgetId,
        pointer_id: u32,
    },
    PreviewUpdated {
        widget: WidgetId,
        preview: WidgetPosition,
    },
    Committed {
        commit: InteractionCommit,
    },
    Canceled {
        widget: Option<WidgetId>,
        pointer_id: Option<u32>,
        reason: InteractionCancelReason,
    },
    Noop {
        reason: InteractionNoopReason,
    },
}

/// One state-machine step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTransition {
    pub transition_id: u64,
    pub sequence: u64,
    pub from: InteractionMode,
    pub to: InteractionMode,
    pub effect: InteractionEffect,
}

impl InteractionTransition {
    /// The commit carried by this step, if any.
    #[must_use]
    pub fn commit(&self) -> Option<&InteractionCommit> {
        match &self.effect {
            InteractionEffect::Committed { commit } => Some(commit),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self.effect, InteractionEffect::Noop { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Machine
// ─────────────────────────────────────────────────────────────────────────────

/// Single-pointer drag/resize lifecycle machine.
///
/// Direct calls (`begin_drag`, `update_interaction`, ...) stamp their
/// transition with `sequence = transition_id`; [`apply_event`](Self::apply_event)
/// uses the event's own sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionMachine {
    state: InteractionState,
    transition_counter: u64,
}

impl InteractionMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        self.state.mode()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    #[must_use]
    pub fn active_widget(&self) -> Option<&WidgetId> {
        self.state.widget()
    }

    #[must_use]
    pub const fn preview(&self) -> Option<&WidgetPosition> {
        self.state.preview()
    }

    /// Number of transitions emitted so far.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    /// Validate and route one input event.
    pub fn apply_event(
        &mut self,
        layout: &LayoutModel,
        bounds: PixelRect,
        event: &InteractionEvent,
    ) -> Result<InteractionTransition, InteractionEventError> {
        event.validate()?;
        let from = self.mode();
        let effect = match &event.kind {
            InteractionEventKind::PointerDown {
                widget,
                handle,
                pointer_id,
                button,
                position,
            } => self.on_pointer_down(
                layout,
                bounds,
                PointerDown {
                    widget: widget.as_str(),
                    handle: *handle,
                    pointer_id: *pointer_id,
                    button: *button,
                    position: *position,
                },
                event.sequence,
            ),
            InteractionEventKind::PointerMove {
                pointer_id,
                position,
            } => self.on_pointer_move(layout, bounds, *pointer_id, *position),
            InteractionEventKind::PointerUp { pointer_id } => {
                self.on_pointer_up(layout, *pointer_id)
            }
            InteractionEventKind::Cancel { reason } => self.on_cancel(*reason),
        };
        Ok(self.finish(event.sequence, from, effect))
    }

    /// Validate `event` and record it as ignored for `reason`.
    ///
    /// For hosts that filter events the machine cannot judge, such as a
    /// pointer-down on a widget the host is not showing. State is untouched.
    pub fn reject_event(
        &mut self,
        event: &InteractionEvent,
        reason: InteractionNoopReason,
    ) -> Result<InteractionTransition, InteractionEventError> {
        event.validate()?;
        let from = self.mode();
        Ok(self.finish(event.sequence, from, noop(reason)))
    }

    /// Start a drag or resize on `widget`.
    ///
    /// Only the primary button starts anything. A drag additionally needs
    /// `position` inside the grid; a resize ignores it.
    #[allow(clippy::too_many_arguments)]
    pub fn begin_interaction(
        &mut self,
        layout: &LayoutModel,
        bounds: PixelRect,
        widget: &str,
        handle: InteractionHandle,
        pointer_id: u32,
        button: PointerButton,
        position: PointerPosition,
    ) -> InteractionTransition {
        let from = self.mode();
        let sequence = self.next_direct_sequence();
        let effect = self.on_pointer_down(
            layout,
            bounds,
            PointerDown {
                widget,
                handle,
                pointer_id,
                button,
                position,
            },
            sequence,
        );
        self.finish(sequence, from, effect)
    }

    /// Start dragging `widget` from the cell under `position`.
    ///
    /// Stays idle when the pointer is outside the grid.
    pub fn begin_drag(
        &mut self,
        layout: &LayoutModel,
        bounds: PixelRect,
        widget: &str,
        pointer_id: u32,
        position: PointerPosition,
    ) -> InteractionTransition {
        self.begin_interaction(
            layout,
            bounds,
            widget,
            InteractionHandle::Drag,
            pointer_id,
            PointerButton::Primary,
            position,
        )
    }

    /// Start resizing `widget` from its bottom-right grip.
    ///
    /// Pointer location is irrelevant at the start of a resize.
    pub fn begin_resize(
        &mut self,
        layout: &LayoutModel,
        widget: &str,
        pointer_id: u32,
    ) -> InteractionTransition {
        self.begin_interaction(
            layout,
            PixelRect::default(),
            widget,
            InteractionHandle::Resize,
            pointer_id,
            PointerButton::Primary,
            PointerPosition::default(),
        )
    }

    /// Recompute the preview from a pointer move.
    pub fn update_interaction(
        &mut self,
        layout: &LayoutModel,
        bounds: PixelRect,
        pointer_id: u32,
        position: PointerPosition,
    ) -> InteractionTransition {
        let from = self.mode();
        let effect = self.on_pointer_move(layout, bounds, pointer_id, position);
        let sequence = self.next_direct_sequence();
        self.finish(sequence, from, effect)
    }

    /// End the interaction and emit its commit.
    pub fn commit_interaction(&mut self, layout: &LayoutModel, pointer_id: u32) -> InteractionTransition {
        let from = self.mode();
        let effect = self.on_pointer_up(layout, pointer_id);
        let sequence = self.next_direct_sequence();
        self.finish(sequence, from, effect)
    }

    /// Abandon the interaction without committing.
    pub fn cancel(&mut self, reason: InteractionCancelReason) -> InteractionTransition {
        let from = self.mode();
        let effect = self.on_cancel(reason);
        let sequence = self.next_direct_sequence();
        self.finish(sequence, from, effect)
    }

    /// Cancel if active; `None` when already idle.
    pub fn force_cancel(&mut self) -> Option<InteractionTransition> {
        if !self.is_active() {
            return None;
        }
        Some(self.cancel(InteractionCancelReason::Programmatic))
    }

    fn on_pointer_down(
        &mut self,
        layout: &LayoutModel,
        bounds: PixelRect,
        down: PointerDown<'_>,
        sequence: u64,
    ) -> InteractionEffect {
        if self.is_active() {
            return noop(InteractionNoopReason::ActiveInteractionInProgress);
        }
        if !down.button.is_primary() {
            return noop(InteractionNoopReason::NonPrimaryButton);
        }
        let Some(current) = layout.get(down.widget) else {
            return noop(InteractionNoopReason::UnknownWidget);
        };
        let widget = WidgetId::from(down.widget);
        match down.handle {
            InteractionHandle::Drag => {
                let Some(cell) = cell_at(bounds, layout.dims(), down.position) else {
                    return noop(InteractionNoopReason::PointerOutsideGrid);
                };
                let offset = CellOffset {
                    d_col: i32::from(cell.col) - i32::from(current.col),
                    d_row: i32::from(cell.row) - i32::from(current.row),
                };
                self.state = InteractionState::Dragging {
                    widget: widget.clone(),
                    pointer_id: down.pointer_id,
                    offset,
                    preview: current,
                    started_sequence: sequence,
                };
                InteractionEffect::DragStarted {
                    widget,
                    pointer_id: down.pointer_id,
                    cell,
                    offset,
                }
            }
            InteractionHandle::Resize => {
                self.state = InteractionState::Resizing {
                    widget: widget.clone(),
                    pointer_id: down.pointer_id,
                    preview: current,
                    started_sequence: sequence,
                };
                InteractionEffect::ResizeStarted {
                    widget,
                    pointer_id: down.pointer_id,
                }
            }
        }
    }

    fn on_pointer_move(
        &mut self,
        layout: &LayoutModel,
        bounds: PixelRect,
        pointer_id: u32,
        position: PointerPosition,
    ) -> InteractionEffect {
        match self.state.clone() {
            InteractionState::Idle => noop(InteractionNoopReason::IdleWithoutActiveInteraction),
            InteractionState::Dragging {
                widget,
                pointer_id: active,
                offset,
                started_sequence,
                ..
            } => {
                if pointer_id != active {
                    return noop(InteractionNoopReason::PointerMismatch);
                }
                let Some(current) = layout.get(widget.as_str()) else {
                    return self.abort_removed(widget, active);
                };
                let Some(cell) = cell_at(bounds, layout.dims(), position) else {
                    return noop(InteractionNoopReason::PointerOutsideGrid);
                };
                let preview = drag_candidate(current, cell, offset, layout.dims());
                self.state = InteractionState::Dragging {
                    widget: widget.clone(),
                    pointer_id: active,
                    offset,
                    preview,
                    started_sequence,
                };
                InteractionEffect::PreviewUpdated { widget, preview }
            }
            InteractionState::Resizing {
                widget,
                pointer_id: active,
                started_sequence,
                ..
            } => {
                if pointer_id != active {
                    return noop(InteractionNoopReason::PointerMismatch);
                }
                let Some(current) = layout.get(widget.as_str()) else {
                    return self.abort_removed(widget, active);
                };
                let Some(cell) = cell_at(bounds, layout.dims(), position) else {
                    return noop(InteractionNoopReason::PointerOutsideGrid);
                };
                let constraints = layout.constraints(widget.as_str());
                let preview = resize_candidate(current, cell, constraints, layout.dims());
                self.state = InteractionState::Resizing {
                    widget: widget.clone(),
                    pointer_id: active,
                    preview,
                    started_sequence,
                };
                InteractionEffect::PreviewUpdated { widget, preview }
            }
        }
    }

    fn on_pointer_up(&mut self, layout: &LayoutModel, pointer_id: u32) -> InteractionEffect {
        let (widget, active, commit) = match &self.state {
            InteractionState::Idle => {
                return noop(InteractionNoopReason::IdleWithoutActiveInteraction);
            }
            InteractionState::Dragging {
                widget,
                pointer_id,
                preview,
                ..
            } => (
                widget.clone(),
                *pointer_id,
                InteractionCommit::Move {
                    widget: widget.clone(),
                    col: preview.col,
                    row: preview.row,
                },
            ),
            InteractionState::Resizing {
                widget,
                pointer_id,
                preview,
                ..
            } => (
                widget.clone(),
                *pointer_id,
                InteractionCommit::Resize {
                    widget: widget.clone(),
                    col_span: preview.col_span,
                    row_span: preview.row_span,
                },
            ),
        };
        if pointer_id != active {
            return noop(InteractionNoopReason::PointerMismatch);
        }
        if !layout.contains(widget.as_str()) {
            return self.abort_removed(widget, active);
        }
        self.state = InteractionState::Idle;
        InteractionEffect::Committed { commit }
    }

    fn on_cancel(&mut self, reason: InteractionCancelReason) -> InteractionEffect {
        let previous = std::mem::take(&mut self.state);
        if matches!(previous, InteractionState::Idle) {
            return noop(InteractionNoopReason::IdleWithoutActiveInteraction);
        }
        InteractionEffect::Canceled {
            pointer_id: previous.pointer_id(),
            widget: previous.widget().cloned(),
            reason,
        }
    }

    fn abort_removed(&mut self, widget: WidgetId, pointer_id: u32) -> InteractionEffect {
        self.state = InteractionState::Idle;
        InteractionEffect::Canceled {
            widget: Some(widget),
            pointer_id: Some(pointer_id),
            reason: InteractionCancelReason::WidgetRemoved,
        }
    }

    fn next_direct_sequence(&self) -> u64 {
        self.transition_counter.saturating_add(1)
    }

    fn finish(&mut self, sequence: u64, from: InteractionMode, effect: InteractionEffect) -> InteractionTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        InteractionTransition {
            transition_id: self.transition_counter,
            sequence,
            from,
            to: self.mode(),
            effect,
        }
    }
}

struct PointerDown<'a> {
    widget: &'a str,
    handle: InteractionHandle,
    pointer_id: u32,
    button: PointerButton,
    position: PointerPosition,
}

const fn noop(reason: InteractionNoopReason) -> InteractionEffect {
    InteractionEffect::Noop { reason }
}

/// New origin for a drag: grabbed cell minus offset, kept inside the grid
/// for the widget's current span.
fn drag_candidate(
    current: WidgetPosition,
    cell: CellCoord,
    offset: CellOffset,
    dims: GridDims,
) -> WidgetPosition {
    WidgetPosition {
        col: clamp_origin(i32::from(cell.col) - offset.d_col, current.col_span, dims.cols()),
        row: clamp_origin(i32::from(cell.row) - offset.d_row, current.row_span, dims.rows()),
        ..current
    }
}

/// New span for a resize: pointer cell becomes the bottom-right cell,
/// floored at the minimum and capped at the grid edge.
fn resize_candidate(
    current: WidgetPosition,
    cell: CellCoord,
    constraints: SpanConstraints,
    dims: GridDims,
) -> WidgetPosition {
    let requested_cols = i32::from(cell.col) - i32::from(current.col) + 1;
    let requested_rows = i32::from(cell.row) - i32::from(current.row) + 1;
    WidgetPosition {
        col_span: clamp_span(requested_cols, constraints.min_col_span(), current.col, dims.cols()),
        row_span: clamp_span(requested_rows, constraints.min_row_span(), current.row, dims.rows()),
        ..current
    }
}
