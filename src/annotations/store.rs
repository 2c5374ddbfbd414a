//! Annotation store with whole-document undo/redo
//!
//! Every discrete mutation of a committed annotation pushes the
//! pre-mutation document onto the undo stack and clears the redo stack.
//! Drags are bracketed by `begin_gesture`/`end_gesture` so a whole drag
//! produces one snapshot no matter how many samples it had.

use crate::domain::{
    Annotation, AnnotationId, AnnotationKind, Handle, InkColor, Point, Style, TEXT_MIN_HEIGHT,
    TEXT_MIN_WIDTH, Tool, clamp_thickness,
};

/// Result of starting an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Begun {
    /// The gesture continues; extend and finalize it later
    InProgress(AnnotationId),
    /// Single-click stamp, already committed
    Committed(AnnotationId),
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    /// Committed annotations in paint order, oldest first
    annotations: Vec<Annotation>,
    in_progress: Option<Annotation>,
    undo_stack: Vec<Vec<Annotation>>,
    redo_stack: Vec<Vec<Annotation>>,
    /// Document as it was when the current drag began
    gesture_snapshot: Option<Vec<Annotation>>,
    next_id: AnnotationId,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    pub fn in_progress(&self) -> Option<&Annotation> {
        self.in_progress.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn allocate_id(&mut self) -> AnnotationId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    fn checkpoint(&mut self) {
        self.undo_stack.push(self.annotations.clone());
        self.redo_stack.clear();
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// Start an annotation at `point`
    ///
    /// Stamps are committed immediately. Any previous in-progress annotation
    /// is discarded.
    pub fn begin(&mut self, tool: Tool, point: Point, style: Style) -> Begun {
        let id = self.allocate_id();
        let annotation = Annotation::new(id, tool, point, style);
        let stamp = annotation.is_stamp();
        self.in_progress = Some(annotation);
        if stamp {
            self.finalize();
            return Begun::Committed(id);
        }
        Begun::InProgress(id)
    }

    /// Feed a pointer sample into the in-progress annotation
    ///
    /// Never touches the history.
    pub fn extend(&mut self, point: Point) {
        let Some(annotation) = self.in_progress.as_mut() else {
            return;
        };
        match &mut annotation.kind {
            AnnotationKind::Highlighter { points } | AnnotationKind::Line { points } => {
                points.push(point)
            }
            AnnotationKind::Arrow { end, .. } => *end = point,
            AnnotationKind::XMark { .. }
            | AnnotationKind::Question { .. }
            | AnnotationKind::Text { .. } => {}
        }
    }

    /// Commit the in-progress annotation
    pub fn finalize(&mut self) -> Option<AnnotationId> {
        let annotation = self.in_progress.take()?;
        let id = annotation.id;
        log::debug!("Committed {:?} #{}", annotation.tool(), id);
        self.checkpoint();
        self.annotations.push(annotation);
        Some(id)
    }

    /// Drop the in-progress annotation without committing
    pub fn discard_in_progress(&mut self) {
        self.in_progress = None;
    }

    /// Commit a finished text box
    pub fn add_text(
        &mut self,
        start: Point,
        text: String,
        width: f32,
        height: f32,
        style: Style,
    ) -> AnnotationId {
        let id = self.allocate_id();
        let mut annotation = Annotation::new(id, Tool::Text, start, style);
        annotation.kind = AnnotationKind::Text {
            start,
            text,
            width: width.max(TEXT_MIN_WIDTH),
            height: height.max(TEXT_MIN_HEIGHT),
        };
        self.checkpoint();
        self.annotations.push(annotation);
        id
    }

    /// Replace the content and box of an existing text annotation
    pub fn update_text(
        &mut self,
        id: AnnotationId,
        new_text: String,
        new_width: f32,
        new_height: f32,
    ) -> bool {
        let unchanged = match self.get(id).map(|a| &a.kind) {
            Some(AnnotationKind::Text {
                text,
                width,
                height,
                ..
            }) => *text == new_text && *width == new_width && *height == new_height,
            _ => return false,
        };
        if unchanged {
            return false;
        }
        self.checkpoint();
        if let Some(Annotation {
            kind:
                AnnotationKind::Text {
                    text,
                    width,
                    height,
                    ..
                },
            ..
        }) = self.get_mut(id)
        {
            *text = new_text;
            *width = new_width.max(TEXT_MIN_WIDTH);
            *height = new_height.max(TEXT_MIN_HEIGHT);
        }
        true
    }

    pub fn delete(&mut self, id: AnnotationId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.checkpoint();
        self.annotations.retain(|a| a.id != id);
        log::debug!("Deleted annotation #{}", id);
        true
    }

    pub fn recolor(&mut self, id: AnnotationId, color: InkColor) -> bool {
        match self.get(id) {
            Some(a) if a.color != color => {}
            _ => return false,
        }
        self.checkpoint();
        if let Some(a) = self.get_mut(id) {
            a.color = color;
        }
        true
    }

    pub fn restyle(&mut self, id: AnnotationId, thickness: f32) -> bool {
        let thickness = clamp_thickness(thickness);
        match self.get(id) {
            Some(a) if a.thickness != thickness => {}
            _ => return false,
        }
        self.checkpoint();
        if let Some(a) = self.get_mut(id) {
            a.thickness = thickness;
        }
        true
    }

    pub fn move_annotation(&mut self, id: AnnotationId, dx: f32, dy: f32) -> bool {
        if !self.contains(id) || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        self.checkpoint();
        if let Some(a) = self.get_mut(id) {
            a.translate(dx, dy);
        }
        true
    }

    pub fn resize_text(&mut self, id: AnnotationId, dw: f32, dh: f32) -> bool {
        if !self.get(id).is_some_and(Annotation::is_text) {
            return false;
        }
        self.checkpoint();
        if let Some(a) = self.get_mut(id) {
            resize_text_box(a, dw, dh);
        }
        true
    }

    /// Remember the document before a drag starts
    pub fn begin_gesture(&mut self) {
        self.gesture_snapshot = Some(self.annotations.clone());
    }

    /// Apply one drag sample to `handle` of annotation `id` without snapshotting
    pub fn drag_live(&mut self, id: AnnotationId, handle: Handle, dx: f32, dy: f32) {
        let Some(annotation) = self.get_mut(id) else {
            return;
        };
        match handle {
            Handle::Move => annotation.translate(dx, dy),
            Handle::Resize => resize_text_box(annotation, dx, dy),
            Handle::Start | Handle::End => {
                if let AnnotationKind::Arrow { start, end } = &mut annotation.kind {
                    let point = if handle == Handle::Start { start } else { end };
                    *point = point.translate(dx, dy);
                }
            }
            Handle::None => {}
        }
    }

    /// Close a drag; pushes one snapshot if the drag changed anything
    pub fn end_gesture(&mut self) -> bool {
        let Some(before) = self.gesture_snapshot.take() else {
            return false;
        };
        if before == self.annotations {
            return false;
        }
        self.undo_stack.push(before);
        self.redo_stack.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.annotations, previous);
        self.redo_stack.push(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.annotations, next);
        self.undo_stack.push(current);
        true
    }

    /// Drop everything, history included
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.in_progress = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.gesture_snapshot = None;
    }
}

fn resize_text_box(annotation: &mut Annotation, dw: f32, dh: f32) {
    if let AnnotationKind::Text { width, height, .. } = &mut annotation.kind {
        *width = (*width + dw).max(TEXT_MIN_WIDTH);
        *height = (*height + dh).max(TEXT_MIN_HEIGHT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(store: &mut AnnotationStore, tool: Tool, points: &[(f32, f32)]) -> AnnotationId {
        let (first, rest) = points.split_first().unwrap();
        store.begin(tool, Point::new(first.0, first.1), Style::default());
        for &(x, y) in rest {
            store.extend(Point::new(x, y));
        }
        store.finalize().unwrap()
    }

    #[test]
    fn test_stamp_commits_immediately() {
        let mut store = AnnotationStore::new();
        let begun = store.begin(Tool::XMark, Point::new(50.0, 50.0), Style::default());
        assert!(matches!(begun, Begun::Committed(_)));
        assert!(store.in_progress().is_none());
        assert_eq!(store.annotations().len(), 1);
        assert!(store.can_undo());
    }

    #[test]
    fn test_extend_does_not_snapshot() {
        let mut store = AnnotationStore::new();
        store.begin(Tool::Line, Point::new(0.0, 0.0), Style::default());
        for i in 1..50 {
            store.extend(Point::new(i as f32, 0.0));
        }
        assert!(!store.can_undo());
        store.finalize();
        store.undo();
        assert!(store.annotations().is_empty());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_undo_redo_restores_structure() {
        let mut store = AnnotationStore::new();
        let a = stroke(&mut store, Tool::Line, &[(0.0, 0.0), (10.0, 10.0)]);
        let b = stroke(&mut store, Tool::Arrow, &[(5.0, 5.0), (40.0, 5.0)]);
        store.recolor(a, InkColor::new(1, 2, 3));
        store.move_annotation(b, 3.0, 4.0);
        store.delete(a);

        let before = store.annotations().to_vec();
        for n in 1..=5 {
            for _ in 0..n {
                store.undo();
            }
            for _ in 0..n {
                store.redo();
            }
            assert_eq!(store.annotations(), before.as_slice());
        }
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut store = AnnotationStore::new();
        stroke(&mut store, Tool::Line, &[(0.0, 0.0), (10.0, 10.0)]);
        store.undo();
        assert!(store.can_redo());
        stroke(&mut store, Tool::Highlighter, &[(0.0, 0.0), (5.0, 0.0)]);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = AnnotationStore::new();
        let a = stroke(&mut store, Tool::Line, &[(0.0, 0.0), (1.0, 1.0)]);
        store.undo();
        let b = stroke(&mut store, Tool::Line, &[(0.0, 0.0), (1.0, 1.0)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_drag_gesture_is_one_snapshot() {
        let mut store = AnnotationStore::new();
        let id = stroke(&mut store, Tool::Arrow, &[(0.0, 0.0), (10.0, 0.0)]);
        store.begin_gesture();
        for _ in 0..10 {
            store.drag_live(id, Handle::End, 1.0, 1.0);
        }
        assert!(store.end_gesture());
        assert_eq!(
            store.get(id).unwrap().kind,
            AnnotationKind::Arrow {
                start: Point::new(0.0, 0.0),
                end: Point::new(20.0, 10.0)
            }
        );
        store.undo();
        assert_eq!(
            store.get(id).unwrap().kind,
            AnnotationKind::Arrow {
                start: Point::new(0.0, 0.0),
                end: Point::new(10.0, 0.0)
            }
        );
    }

    #[test]
    fn test_empty_gesture_pushes_nothing() {
        let mut store = AnnotationStore::new();
        stroke(&mut store, Tool::Line, &[(0.0, 0.0), (1.0, 1.0)]);
        store.undo();
        store.begin_gesture();
        assert!(!store.end_gesture());
        assert!(store.can_redo());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_text_resize_clamps_to_minimum() {
        let mut store = AnnotationStore::new();
        let id = store.add_text(Point::new(0.0, 0.0), "hi".into(), 120.0, 60.0, Style::default());
        store.resize_text(id, -500.0, -500.0);
        match &store.get(id).unwrap().kind {
            AnnotationKind::Text { width, height, .. } => {
                assert_eq!(*width, TEXT_MIN_WIDTH);
                assert_eq!(*height, TEXT_MIN_HEIGHT);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_restyle_clamps_thickness() {
        let mut store = AnnotationStore::new();
        let id = stroke(&mut store, Tool::Line, &[(0.0, 0.0), (1.0, 1.0)]);
        assert!(store.restyle(id, 500.0));
        assert_eq!(store.get(id).unwrap().thickness, 20.0);
        assert!(!store.restyle(id, 21.0));
    }
}
