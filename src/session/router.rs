//! Interaction router
//!
//! Dispatches every input message to the focus controller, the annotation
//! store or the text overlay depending on the session mode.

use std::time::Instant;

use crate::annotations::handlers::{self, ToolOutcome};
use crate::annotations::hit_test::hit_annotation;
use crate::config::{DefaultAction, FocusShape};
use crate::domain::{
    Annotation, AnnotationId, Handle, InkColor, Point, Tool, clamp_size, clamp_thickness,
};
use crate::focus::LockResult;
use crate::session::messages::{
    Command, Key, Modifiers, MouseButton, Msg, Outcome, PreferenceUpdate, Redraw, SessionEnd,
};
use crate::session::shortcuts;
use crate::session::state::Session;
use crate::text_edit::{EditKey, TextCommit, TextEdit};

/// Focus radius change per wheel notch
const RADIUS_STEP: f32 = 10.0;
/// Stamp and font size change per wheel notch
const SIZE_STEP: f32 = 2.0;
/// Stroke thickness change per wheel notch
const THICKNESS_STEP: f32 = 1.0;

impl Session {
    /// Handle one input message
    pub fn handle(&mut self, msg: Msg) -> Outcome {
        self.handle_at(msg, Instant::now())
    }

    /// Handle one input message at a host-supplied time
    pub fn handle_at(&mut self, msg: Msg, now: Instant) -> Outcome {
        if self.ended {
            return Outcome::none();
        }
        match msg {
            Msg::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            Msg::PointerDown { x, y, button } => {
                let p = Point::new(x, y);
                match button {
                    MouseButton::Left => self.left_press(p, now),
                    MouseButton::Right => self.right_click(p),
                    MouseButton::Middle => Outcome::none(),
                }
            }
            Msg::PointerUp {
                x,
                y,
                button: MouseButton::Left,
            } => self.left_release(Point::new(x, y), now),
            Msg::PointerUp { .. } => Outcome::none(),
            Msg::Wheel { delta_y } => self.wheel(delta_y),
            Msg::Key { key, modifiers } => self.key(&key, modifiers),
            Msg::SelectTool { tool } => self.select_tool(tool),
            Msg::SetColor { color } => self.set_color(color),
            Msg::SetShape { shape } => self.set_shape(shape),
        }
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    fn pointer_move(&mut self, p: Point) -> Outcome {
        self.pointer = p;
        if !self.focus.is_locked() {
            return self.request_frame();
        }

        if self.selection.is_dragging()
            && let Some(id) = self.selection.selected_id
        {
            let anchor = self.selection.drag_anchor;
            self.store
                .drag_live(id, self.selection.active_handle, p.x - anchor.x, p.y - anchor.y);
            self.selection.drag_anchor = p;
            return Outcome::now();
        }

        if handlers::handle_tool_move(&mut self.store, p).changed() {
            Outcome::now()
        } else {
            Outcome::none()
        }
    }

    fn left_press(&mut self, p: Point, now: Instant) -> Outcome {
        self.pointer = p;
        self.pending_label = None;

        if !self.focus.is_locked() {
            return self.preview_press(p);
        }

        if let Some(edit) = &self.text_edit {
            if edit.contains(p) {
                return Outcome::none();
            }
            // Focus loss commits; only an untouched invitation lets the press through
            let fall_through = edit.is_untouched_invitation();
            self.commit_text_edit();
            if !fall_through {
                return Outcome::now();
            }
        }

        match self.tools.tool {
            None => self.select_at(p),
            Some(tool) => self.tool_press(tool, p, now),
        }
    }

    /// Left press before lock: only the custom box reacts
    fn preview_press(&mut self, p: Point) -> Outcome {
        if !self.focus.is_custom_box() {
            return Outcome::none();
        }
        if self.focus.custom_box_start().is_none() {
            self.focus.begin_custom_box(p);
            return Outcome::now();
        }
        let result = self.focus.complete_custom_box(p);
        self.after_lock(result)
    }

    fn after_lock(&mut self, result: LockResult) -> Outcome {
        match result {
            LockResult::Ignored => return Outcome::none(),
            LockResult::LockedRebuildBackdrop => {
                self.renderer.rebuild_backdrop(&self.capture, &self.focus);
            }
            LockResult::Locked => {}
        }
        self.frame_pending = false;
        Outcome::now().with_cursor()
    }

    fn select_at(&mut self, p: Point) -> Outcome {
        let Some(hit) = hit_annotation(self.store.annotations(), self.selection.selected_id, p)
        else {
            self.selection.clear();
            return Outcome::now();
        };

        let is_text = self.store.get(hit.id).is_some_and(Annotation::is_text);
        if is_text && hit.handle == Handle::Move {
            // Text is edited in place rather than dragged
            self.selection.select(hit.id, Handle::None, p);
            self.open_existing_text(hit.id);
            return Outcome::now();
        }

        self.selection.select(hit.id, hit.handle, p);
        self.store.begin_gesture();
        Outcome::now()
    }

    fn tool_press(&mut self, tool: Tool, p: Point, now: Instant) -> Outcome {
        let style = self.tools.style;
        match handlers::handle_tool_press(&mut self.store, &mut self.gesture, tool, p, style) {
            ToolOutcome::OpenText(at) => {
                self.open_new_text(at);
                Outcome::now()
            }
            ToolOutcome::Committed(id) => {
                self.schedule_label(id, now);
                Outcome::now()
            }
            ToolOutcome::None => Outcome::none(),
            ToolOutcome::Started | ToolOutcome::Extended => Outcome::now(),
        }
    }

    fn left_release(&mut self, p: Point, now: Instant) -> Outcome {
        self.pointer = p;
        if !self.focus.is_locked() {
            return Outcome::none();
        }

        if self.selection.is_dragging() {
            self.store.end_gesture();
            self.selection.active_handle = Handle::None;
            return Outcome::now();
        }

        match handlers::handle_tool_release(&mut self.store, &mut self.gesture, p) {
            ToolOutcome::Committed(id) => {
                self.schedule_label(id, now);
                Outcome::now()
            }
            ToolOutcome::None => Outcome::none(),
            ToolOutcome::Started | ToolOutcome::Extended | ToolOutcome::OpenText(_) => {
                Outcome::now()
            }
        }
    }

    fn right_click(&mut self, p: Point) -> Outcome {
        self.pointer = p;
        self.pending_label = None;

        if self.focus.is_locked() {
            return self.export(self.default_action);
        }
        if self.focus.is_custom_box() {
            return if self.focus.cancel_custom_box() {
                Outcome::now()
            } else {
                Outcome::none()
            };
        }
        let result = self.focus.lock(p);
        self.after_lock(result)
    }

    // ========================================================================
    // Wheel
    // ========================================================================

    fn wheel(&mut self, delta_y: f32) -> Outcome {
        if delta_y == 0.0 || delta_y.is_nan() {
            return Outcome::none();
        }
        // Scrolling away from the user grows
        let step = -delta_y.signum();

        if !self.focus.is_locked() {
            if !self.focus.adjust_radius(step * RADIUS_STEP) {
                return Outcome::none();
            }
            return self.request_frame().with_persist(self.preferences());
        }

        if let Some(tool) = self.tools.tool {
            let style = &mut self.tools.style;
            if tool.adjusts_thickness() {
                style.thickness = clamp_thickness(style.thickness + step * THICKNESS_STEP);
            } else {
                style.size = clamp_size(style.size + step * SIZE_STEP);
            }
            return Outcome::none().with_cursor();
        }

        if let Some(id) = self.selection.selected_id
            && let Some(annotation) = self.store.get(id)
        {
            let thickness = annotation.thickness + step * THICKNESS_STEP;
            if self.store.restyle(id, thickness) {
                return Outcome::now();
            }
        }
        Outcome::none()
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    fn key(&mut self, key: &Key, modifiers: Modifiers) -> Outcome {
        // A focused overlay takes every key, Escape included
        if let Some(edit) = self.text_edit.as_mut() {
            return match edit.handle_key(key, modifiers) {
                EditKey::Commit => {
                    self.commit_text_edit();
                    Outcome::now()
                }
                EditKey::Cancel => {
                    log::debug!("Text edit cancelled");
                    self.text_edit = None;
                    Outcome::now()
                }
                EditKey::Edited => Outcome::now(),
                EditKey::Ignored => Outcome::none(),
            };
        }

        match shortcuts::handle_key_event(self.focus.is_locked(), key, modifiers) {
            Some(command) => self.run_command(command),
            None => Outcome::none(),
        }
    }

    fn run_command(&mut self, command: Command) -> Outcome {
        match command {
            Command::Close => {
                log::info!("Session cancelled");
                self.end();
                Outcome::ended(SessionEnd::Cancelled)
            }
            Command::Undo => {
                self.settle_gestures();
                if !self.store.undo() {
                    return Outcome::none();
                }
                self.retain_selection();
                Outcome::now()
            }
            Command::Redo => {
                self.settle_gestures();
                if !self.store.redo() {
                    return Outcome::none();
                }
                self.retain_selection();
                Outcome::now()
            }
            Command::DeleteSelection => {
                let Some(id) = self.selection.selected_id else {
                    return Outcome::none();
                };
                self.settle_gestures();
                self.store.delete(id);
                self.selection.clear();
                Outcome::now()
            }
            Command::SelectTool(tool) => self.select_tool(tool),
            Command::CycleShape => self.set_shape(self.focus.shape().next()),
            Command::Export(action) => self.export(action),
        }
    }

    // ========================================================================
    // Palette
    // ========================================================================

    fn select_tool(&mut self, tool: Option<Tool>) -> Outcome {
        if !self.focus.is_locked() {
            return Outcome::none();
        }
        self.commit_text_edit();
        self.settle_gestures();
        self.pending_label = None;
        if tool.is_some() {
            self.selection.clear();
        }
        self.tools.tool = tool;
        Outcome::now().with_cursor()
    }

    fn set_color(&mut self, color: InkColor) -> Outcome {
        self.tools.style.color = color;
        if let Some(edit) = self.text_edit.as_mut() {
            edit.set_color(color);
        }
        if self.tools.tool.is_none()
            && let Some(id) = self.selection.selected_id
        {
            self.store.recolor(id, color);
        }
        Outcome::now().with_cursor()
    }

    fn set_shape(&mut self, shape: FocusShape) -> Outcome {
        let blurred = self.focus.wants_blur();
        if !self.focus.set_shape(shape) {
            return Outcome::none();
        }
        if blurred != self.focus.wants_blur() {
            self.renderer.rebuild_backdrop(&self.capture, &self.focus);
        }
        Outcome::now()
            .with_cursor()
            .with_persist(self.preferences())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Coalesce preview repaints into one per display refresh
    fn request_frame(&mut self) -> Outcome {
        if std::mem::replace(&mut self.frame_pending, true) {
            Outcome::none()
        } else {
            Outcome::redraw(Redraw::NextFrame)
        }
    }

    fn preferences(&self) -> PreferenceUpdate {
        PreferenceUpdate {
            focus_radius: self.focus.radius(),
            shape: self.focus.shape(),
        }
    }

    /// Drop half-drawn annotations and close any drag
    fn settle_gestures(&mut self) {
        self.store.discard_in_progress();
        self.gesture.reset();
        if self.selection.is_dragging() {
            self.store.end_gesture();
            self.selection.active_handle = Handle::None;
        }
    }

    fn retain_selection(&mut self) {
        let store = &self.store;
        self.selection.retain(|id| store.contains(id));
    }

    fn open_new_text(&mut self, at: Point) {
        self.commit_text_edit();
        self.text_edit = Some(TextEdit::new_text(
            at,
            self.tools.style,
            false,
            self.viewport(),
        ));
    }

    fn open_existing_text(&mut self, id: AnnotationId) {
        self.commit_text_edit();
        let viewport = self.viewport();
        self.text_edit = self
            .store
            .get(id)
            .and_then(|annotation| TextEdit::edit_existing(annotation, viewport));
    }

    fn commit_text_edit(&mut self) {
        let Some(edit) = self.text_edit.take() else {
            return;
        };
        match edit.commit(&mut self.store) {
            TextCommit::Created(id) => log::debug!("Text #{} created", id),
            TextCommit::Updated(id) => log::debug!("Text #{} updated", id),
            TextCommit::Deleted(id) => log::debug!("Text #{} emptied and deleted", id),
            TextCommit::Nothing => {}
        }
        self.retain_selection();
    }

    /// Finish the session and hand the flattened image to the host
    fn export(&mut self, action: DefaultAction) -> Outcome {
        self.commit_text_edit();
        self.settle_gestures();
        self.selection.clear();
        self.pending_label = None;
        let image = self.render_export();
        log::info!(
            "Session finished: {} annotations, exporting with {:?}",
            self.store.annotations().len(),
            action
        );
        self.end();
        Outcome::ended(SessionEnd::Export { action, image })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::domain::AnnotationKind;
    use crate::session::messages::Named;
    use crate::session::state::{CursorKind, SessionOptions};

    fn capture() -> RgbaImage {
        RgbaImage::from_pixel(800, 600, Rgba([180, 180, 180, 255]))
    }

    fn session(shape: FocusShape) -> Session {
        let options = SessionOptions {
            shape,
            blur_radius: 0.0,
            focus_radius: 150.0,
            default_action: DefaultAction::Copy,
        };
        Session::new(capture(), options).unwrap()
    }

    fn locked_session() -> Session {
        let mut s = session(FocusShape::Circle);
        s.handle(Msg::right_click(400.0, 300.0));
        s
    }

    fn ctrl(c: &str) -> Msg {
        Msg::key(
            Key::character(c),
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        )
    }

    fn click(s: &mut Session, x: f32, y: f32) {
        s.handle(Msg::pointer_down(x, y));
        s.handle(Msg::pointer_up(x, y));
    }

    #[test]
    fn test_empty_capture_is_rejected() {
        assert!(Session::new(RgbaImage::new(0, 0), SessionOptions::default()).is_err());
    }

    #[test]
    fn test_circle_lock_freezes_geometry() {
        let mut s = session(FocusShape::Circle);
        s.handle(Msg::pointer_move(300.0, 400.0));
        let outcome = s.handle(Msg::right_click(300.0, 400.0));
        assert_eq!(outcome.redraw, Redraw::Now);
        assert!(outcome.cursor_changed);
        assert!(s.focus().is_locked());
        assert_eq!(s.focus().lock_center(), Point::new(300.0, 400.0));

        // wheel now resizes the stamp, not the window
        s.handle(Msg::select_tool(Some(Tool::XMark)));
        s.handle(Msg::wheel(-100.0));
        assert_eq!(s.focus().radius(), 150.0);
        assert_eq!(s.tools().style.size, 26.0);
    }

    #[test]
    fn test_preview_moves_coalesce_into_one_frame() {
        let mut s = session(FocusShape::Circle);
        assert_eq!(s.handle(Msg::pointer_move(10.0, 10.0)).redraw, Redraw::NextFrame);
        assert_eq!(s.handle(Msg::pointer_move(20.0, 20.0)).redraw, Redraw::None);
        assert!(s.on_frame().is_some());
        assert!(s.on_frame().is_none());
        assert_eq!(s.handle(Msg::pointer_move(30.0, 30.0)).redraw, Redraw::NextFrame);
    }

    #[test]
    fn test_preview_wheel_persists_radius() {
        let mut s = session(FocusShape::Square);
        let outcome = s.handle(Msg::wheel(-1.0));
        assert_eq!(s.focus().radius(), 160.0);
        assert_eq!(
            outcome.persist,
            Some(PreferenceUpdate {
                focus_radius: 160.0,
                shape: FocusShape::Square
            })
        );
        for _ in 0..100 {
            s.handle(Msg::wheel(1.0));
        }
        assert_eq!(s.focus().radius(), 25.0);
    }

    #[test]
    fn test_custom_box_flow() {
        let mut s = session(FocusShape::CustomBox);
        assert_eq!(s.cursor(), CursorKind::Crosshair);
        assert!(s.handle(Msg::wheel(-1.0)).persist.is_none());

        // right-click with no anchor does nothing
        let outcome = s.handle(Msg::right_click(5.0, 5.0));
        assert_eq!(outcome.redraw, Redraw::None);
        assert!(!s.focus().is_locked());

        click(&mut s, 100.0, 100.0);
        s.handle(Msg::right_click(5.0, 5.0));
        assert_eq!(s.focus().custom_box_start(), None);

        click(&mut s, 100.0, 100.0);
        s.handle(Msg::pointer_down(300.0, 200.0));
        assert!(s.focus().is_locked());
        assert_eq!(s.focus().lock_center(), Point::new(200.0, 150.0));
        assert_eq!(s.cursor(), CursorKind::Default);
    }

    #[test]
    fn test_custom_box_lock_blurs_backdrop() {
        // black left half, white right half
        let capture = RgbaImage::from_fn(200, 100, |x, _| {
            let v = if x < 100 { 0 } else { 255 };
            Rgba([v, v, v, 255])
        });
        let options = SessionOptions {
            shape: FocusShape::CustomBox,
            blur_radius: 8.0,
            focus_radius: 150.0,
            default_action: DefaultAction::Copy,
        };
        let mut s = Session::new(capture, options).unwrap();
        let edge = |s: &Session| s.render().pixel(97, 10).unwrap().demultiply().red();
        assert_eq!(edge(&s), 0);

        click(&mut s, 150.0, 60.0);
        assert_eq!(edge(&s), 0);
        s.handle(Msg::pointer_down(190.0, 90.0));
        assert!(s.focus().is_locked());
        assert!(edge(&s) > 0);
    }

    #[test]
    fn test_locked_wheel_saturates() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Question)));
        for _ in 0..200 {
            s.handle(Msg::wheel(-1.0));
        }
        assert_eq!(s.tools().style.size, 200.0);
        for _ in 0..200 {
            s.handle(Msg::wheel(1.0));
        }
        assert_eq!(s.tools().style.size, 4.0);

        s.handle(Msg::select_tool(Some(Tool::Highlighter)));
        for _ in 0..200 {
            s.handle(Msg::wheel(-1.0));
        }
        assert_eq!(s.tools().style.thickness, 20.0);
        for _ in 0..200 {
            s.handle(Msg::wheel(1.0));
        }
        assert_eq!(s.tools().style.thickness, 1.0);
        assert_eq!(s.tools().style.size, 4.0);
    }

    #[test]
    fn test_arrow_both_gestures() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Arrow)));

        s.handle(Msg::pointer_down(10.0, 10.0));
        s.handle(Msg::pointer_move(30.0, 30.0));
        s.handle(Msg::pointer_up(50.0, 50.0));

        click(&mut s, 100.0, 100.0);
        assert!(s.store().in_progress().is_some());
        s.handle(Msg::pointer_move(120.0, 130.0));
        click(&mut s, 150.0, 160.0);

        let arrows: Vec<_> = s
            .store()
            .annotations()
            .iter()
            .map(|a| a.kind.clone())
            .collect();
        assert_eq!(
            arrows,
            vec![
                AnnotationKind::Arrow {
                    start: Point::new(10.0, 10.0),
                    end: Point::new(50.0, 50.0)
                },
                AnnotationKind::Arrow {
                    start: Point::new(100.0, 100.0),
                    end: Point::new(150.0, 160.0)
                },
            ]
        );
        assert!(s.store().in_progress().is_none());
    }

    #[test]
    fn test_undo_clears_vanished_selection() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::XMark)));
        click(&mut s, 200.0, 200.0);
        s.handle(Msg::select_tool(None));
        click(&mut s, 202.0, 201.0);
        assert!(s.selected_id().is_some());

        s.handle(ctrl("z"));
        assert!(s.store().annotations().is_empty());
        assert_eq!(s.selected_id(), None);

        s.handle(ctrl("y"));
        assert_eq!(s.store().annotations().len(), 1);
    }

    #[test]
    fn test_drag_moves_and_undoes_in_one_step() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::XMark)));
        click(&mut s, 200.0, 200.0);
        s.handle(Msg::select_tool(None));

        s.handle(Msg::pointer_down(200.0, 200.0));
        for i in 1..=10 {
            s.handle(Msg::pointer_move(200.0 + i as f32, 200.0));
        }
        s.handle(Msg::pointer_up(210.0, 200.0));
        assert_eq!(
            s.store().annotations()[0].kind,
            AnnotationKind::XMark {
                center: Point::new(210.0, 200.0)
            }
        );

        s.handle(ctrl("z"));
        assert_eq!(
            s.store().annotations()[0].kind,
            AnnotationKind::XMark {
                center: Point::new(200.0, 200.0)
            }
        );
    }

    #[test]
    fn test_label_invitation_after_commit() {
        let mut s = locked_session();
        let start = Instant::now();
        s.handle(Msg::select_tool(Some(Tool::XMark)));
        s.handle_at(Msg::pointer_down(100.0, 100.0), start);
        assert!(s.pending_label().is_some());

        assert_eq!(s.tick(start + Duration::from_millis(50)), Redraw::None);
        assert_eq!(s.tick(start + Duration::from_millis(200)), Redraw::Now);
        let edit = s.text_edit().unwrap();
        assert!(edit.is_untouched_invitation());
        assert_eq!(edit.rect().top_left(), Point::new(120.0, 120.0));

        // declining by clicking elsewhere commits nothing and still stamps
        s.handle_at(Msg::pointer_down(400.0, 400.0), start);
        assert!(s.text_edit().is_none());
        assert_eq!(s.store().annotations().len(), 2);
        assert!(s.store().annotations().iter().all(|a| !a.is_text()));
    }

    #[test]
    fn test_press_cancels_pending_label() {
        let mut s = locked_session();
        let start = Instant::now();
        s.handle(Msg::select_tool(Some(Tool::Line)));
        s.handle_at(Msg::pointer_down(10.0, 10.0), start);
        s.handle_at(Msg::pointer_up(40.0, 10.0), start);
        assert!(s.pending_label().is_some());
        s.handle_at(Msg::pointer_down(60.0, 60.0), start);
        assert!(s.pending_label().is_none());
        assert_eq!(s.tick(start + Duration::from_secs(1)), Redraw::None);
    }

    #[test]
    fn test_text_tool_commit_and_empty_commit() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Text)));
        click(&mut s, 100.0, 100.0);
        assert!(s.text_edit().is_some());
        s.handle(Msg::key(Key::character("h"), Modifiers::NONE));
        s.handle(Msg::key(Key::character("i"), Modifiers::NONE));
        s.handle(Msg::named(Named::Enter));
        assert!(s.text_edit().is_none());
        assert_eq!(s.store().annotations().len(), 1);

        // an empty box commits nothing
        click(&mut s, 300.0, 300.0);
        s.handle(Msg::named(Named::Space));
        s.handle(Msg::named(Named::Enter));
        assert_eq!(s.store().annotations().len(), 1);
    }

    #[test]
    fn test_selecting_text_opens_editor_and_emptying_deletes() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Text)));
        click(&mut s, 100.0, 100.0);
        s.handle(Msg::key(Key::character("a"), Modifiers::NONE));
        s.handle(Msg::named(Named::Enter));
        s.handle(Msg::select_tool(None));

        click(&mut s, 110.0, 110.0);
        let edit = s.text_edit().unwrap();
        assert_eq!(edit.text(), "a");
        assert!(s.selected_id().is_some());

        s.handle(Msg::named(Named::Backspace));
        s.handle(Msg::named(Named::Enter));
        assert!(s.store().annotations().is_empty());
        assert_eq!(s.selected_id(), None);
    }

    #[test]
    fn test_escape_closes_overlay_before_session() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Text)));
        click(&mut s, 100.0, 100.0);
        s.handle(Msg::key(Key::character("x"), Modifiers::NONE));

        let first = s.handle(Msg::named(Named::Escape));
        assert!(first.end.is_none());
        assert!(s.text_edit().is_none());
        assert!(s.store().annotations().is_empty());

        let second = s.handle(Msg::named(Named::Escape));
        assert!(matches!(second.end, Some(SessionEnd::Cancelled)));
        assert!(s.is_ended());
        assert_eq!(s.handle(Msg::pointer_move(1.0, 1.0)).redraw, Redraw::None);
    }

    #[test]
    fn test_export_has_no_selection_chrome() {
        let draw = |select: bool| {
            let mut s = locked_session();
            s.handle(Msg::select_tool(Some(Tool::Arrow)));
            s.handle(Msg::pointer_down(350.0, 300.0));
            s.handle(Msg::pointer_up(450.0, 320.0));
            s.handle(Msg::select_tool(None));
            if select {
                click(&mut s, 400.0, 310.0);
                assert!(s.selected_id().is_some());
            }
            match s.handle(Msg::right_click(0.0, 0.0)).end {
                Some(SessionEnd::Export { action, image }) => {
                    assert_eq!(action, DefaultAction::Copy);
                    image
                }
                other => panic!("expected export, got {:?}", other),
            }
        };
        assert_eq!(draw(true), draw(false));
    }

    #[test]
    fn test_export_discards_unfinished_arrow() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Arrow)));
        click(&mut s, 380.0, 300.0);
        s.handle(Msg::pointer_move(420.0, 300.0));
        let Some(SessionEnd::Export { image, .. }) = s.handle(ctrl("s")).end else {
            panic!("expected export");
        };
        let untouched = locked_session().render_export();
        assert_eq!(image, untouched);
    }

    #[test]
    fn test_wheel_restyles_selection() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Line)));
        s.handle(Msg::pointer_down(100.0, 100.0));
        s.handle(Msg::pointer_up(200.0, 100.0));
        s.handle(Msg::select_tool(None));
        click(&mut s, 150.0, 100.0);
        s.handle(Msg::wheel(-1.0));
        assert_eq!(s.store().annotations()[0].thickness, 5.0);
        s.handle(ctrl("z"));
        assert_eq!(s.store().annotations()[0].thickness, 4.0);
    }

    #[test]
    fn test_color_recolors_selection_in_select_mode() {
        let mut s = locked_session();
        s.handle(Msg::select_tool(Some(Tool::Question)));
        click(&mut s, 100.0, 100.0);
        s.handle(Msg::select_tool(None));
        click(&mut s, 100.0, 100.0);
        let blue = InkColor::new(0, 0, 255);
        s.handle(Msg::SetColor { color: blue });
        assert_eq!(s.store().annotations()[0].color, blue);
        assert_eq!(s.tools().style.color, blue);
    }

    #[test]
    fn test_tab_cycles_shape_and_persists() {
        let mut s = session(FocusShape::Circle);
        let outcome = s.handle(Msg::named(Named::Tab));
        assert_eq!(s.focus().shape(), FocusShape::Square);
        assert_eq!(outcome.persist.map(|p| p.shape), Some(FocusShape::Square));
    }
}
