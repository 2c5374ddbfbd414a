//! Frame composition
//!
//! Paints a whole frame from the session model: backdrop, the sharp capture
//! through the focus clip, the focus border, then (once locked) the
//! annotation layer.

use image::RgbaImage;
use tiny_skia::{FillRule, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

use super::backdrop::compose_backdrop;
use super::geometry::{self, chrome};
use super::image::{
    paint_annotation, paint_edit_frame, paint_selection, paint_text_box, rgba_to_pixmap,
};
use crate::domain::{Annotation, Point};
use crate::focus::FocusRegion;
use crate::text_edit::TextEdit;

/// Everything a frame shows besides the capture itself
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub focus: &'a FocusRegion,
    pub pointer: Point,
    pub annotations: &'a [Annotation],
    pub in_progress: Option<&'a Annotation>,
    pub selected: Option<&'a Annotation>,
    pub text_edit: Option<&'a TextEdit>,
}

/// Holds the capture and its cached backdrop
#[derive(Debug, Clone)]
pub struct Renderer {
    source: Pixmap,
    backdrop: Pixmap,
}

impl Renderer {
    /// Returns None for an empty capture
    pub fn new(capture: &RgbaImage, focus: &FocusRegion) -> Option<Self> {
        let source = rgba_to_pixmap(capture)?;
        let backdrop = compose_backdrop(capture, blur_for(focus))?;
        Some(Self { source, backdrop })
    }

    pub fn width(&self) -> u32 {
        self.source.width()
    }

    pub fn height(&self) -> u32 {
        self.source.height()
    }

    /// Recompute the backdrop after the blur state changed
    pub fn rebuild_backdrop(&mut self, capture: &RgbaImage, focus: &FocusRegion) {
        match compose_backdrop(capture, blur_for(focus)) {
            Some(backdrop) => self.backdrop = backdrop,
            None => log::warn!("Failed to rebuild backdrop; keeping the previous one"),
        }
    }

    pub fn render(&self, scene: &Scene) -> Pixmap {
        let mut pixmap = self.backdrop.clone();
        self.paint_focus(&mut pixmap, scene);

        if !scene.focus.is_locked() {
            return pixmap;
        }

        let editing = scene.text_edit.and_then(TextEdit::editing_id);
        for annotation in scene.annotations {
            if Some(annotation.id) != editing {
                paint_annotation(&mut pixmap, annotation);
            }
        }
        if let Some(annotation) = scene.in_progress {
            paint_annotation(&mut pixmap, annotation);
        }
        if let Some(annotation) = scene.selected
            && Some(annotation.id) != editing
        {
            paint_selection(&mut pixmap, annotation);
        }
        if let Some(edit) = scene.text_edit {
            paint_text_box(
                &mut pixmap,
                edit.rect(),
                edit.text(),
                edit.color(),
                edit.size(),
                Some(edit.caret()),
            );
            paint_edit_frame(&mut pixmap, edit.rect());
        }
        pixmap
    }

    fn paint_focus(&self, pixmap: &mut Pixmap, scene: &Scene) {
        let focus = scene.focus;
        if let Some(path) = focus.clip(scene.pointer).and_then(geometry::focus_path)
            && let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height())
        {
            mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
            pixmap.draw_pixmap(
                0,
                0,
                self.source.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                Some(&mask),
            );

            let mut border = Paint::default();
            border.set_color_rgba8(255, 255, 255, alpha(chrome::BORDER_ALPHA));
            border.anti_alias = true;
            let stroke = Stroke {
                width: chrome::BORDER_WIDTH,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &border, &stroke, Transform::identity(), None);
        }

        if let Some(anchor) = focus.anchor_dot()
            && let Some(dot) = PathBuilder::from_circle(anchor.x, anchor.y, chrome::ANCHOR_DOT_RADIUS)
        {
            let mut paint = Paint::default();
            paint.set_color_rgba8(255, 255, 255, alpha(chrome::ANCHOR_DOT_ALPHA));
            paint.anti_alias = true;
            pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

fn blur_for(focus: &FocusRegion) -> Option<f32> {
    focus.wants_blur().then(|| focus.blur_radius())
}

fn alpha(opacity: f32) -> u8 {
    (opacity * 255.0).round() as u8
}
