//! Annotation gesture handlers
//!
//! Turns press/move/release on the canvas into store operations for the
//! active tool, including the two ways of drawing an arrow.

use crate::annotations::store::{AnnotationStore, Begun};
use crate::domain::{AnnotationId, AnnotationKind, Point, Style, Tool};

/// Per-gesture bookkeeping that outlives a single event
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    /// Where the current left press went down
    pub press_origin: Option<Point>,
    /// An arrow was clicked without dragging and waits for its second click
    pub arrow_awaiting_click: bool,
    /// The press that finalized an awaiting arrow; its release is ignored
    pub swallow_release: bool,
}

impl GestureState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What a tool gesture step did to the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolOutcome {
    None,
    Started,
    Extended,
    Committed(AnnotationId),
    /// The text tool wants an editor opened at this point
    OpenText(Point),
}

impl ToolOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, ToolOutcome::None)
    }
}

/// Left press on the canvas with a tool selected
pub fn handle_tool_press(
    store: &mut AnnotationStore,
    gesture: &mut GestureState,
    tool: Tool,
    point: Point,
    style: Style,
) -> ToolOutcome {
    // Second click of a click-move-click arrow
    if gesture.arrow_awaiting_click
        && store
            .in_progress()
            .is_some_and(|a| matches!(a.kind, AnnotationKind::Arrow { .. }))
    {
        store.extend(point);
        gesture.arrow_awaiting_click = false;
        gesture.swallow_release = true;
        gesture.press_origin = None;
        return store
            .finalize()
            .map_or(ToolOutcome::None, ToolOutcome::Committed);
    }
    gesture.arrow_awaiting_click = false;
    gesture.swallow_release = false;

    if tool == Tool::Text {
        return ToolOutcome::OpenText(point);
    }

    gesture.press_origin = Some(point);
    match store.begin(tool, point, style) {
        Begun::Committed(id) => {
            gesture.press_origin = None;
            ToolOutcome::Committed(id)
        }
        Begun::InProgress(_) => ToolOutcome::Started,
    }
}

/// Pointer motion while drawing
pub fn handle_tool_move(store: &mut AnnotationStore, point: Point) -> ToolOutcome {
    if store.in_progress().is_none() {
        return ToolOutcome::None;
    }
    store.extend(point);
    ToolOutcome::Extended
}

/// Left release while drawing
pub fn handle_tool_release(
    store: &mut AnnotationStore,
    gesture: &mut GestureState,
    point: Point,
) -> ToolOutcome {
    if std::mem::take(&mut gesture.swallow_release) {
        return ToolOutcome::None;
    }
    let Some(origin) = gesture.press_origin.take() else {
        return ToolOutcome::None;
    };
    let Some(in_progress) = store.in_progress() else {
        return ToolOutcome::None;
    };

    if matches!(in_progress.kind, AnnotationKind::Arrow { .. }) && point == origin {
        // Plain click: keep the arrow live until the next press
        gesture.arrow_awaiting_click = true;
        return ToolOutcome::None;
    }

    store.extend(point);
    store
        .finalize()
        .map_or(ToolOutcome::None, ToolOutcome::Committed)
}
