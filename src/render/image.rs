//! Annotation painting using tiny-skia
//!
//! The same functions paint the on-screen canvas and the exported image,
//! so what is exported is exactly what was shown.

use image::{Rgba, RgbaImage};
use tiny_skia::{
    FillRule, IntSize, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, Stroke, StrokeDash,
    Transform,
};

use super::geometry::{self, arrow, chrome, stroke};
use super::text::{self, LINE_HEIGHT, PAD_X, PAD_Y};
use crate::domain::{Annotation, AnnotationKind, InkColor, Point, Rect};

/// Copy an image into a premultiplied pixmap
pub fn rgba_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut data = img.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }
    }
    Pixmap::from_vec(data, size)
}

/// Copy a pixmap back into a straight-alpha image
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

fn ink_paint(color: InkColor, opacity: f32) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8(opacity);
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Paint one annotation with its own style
pub fn paint_annotation(pixmap: &mut Pixmap, annotation: &Annotation) {
    let color = annotation.color;
    match &annotation.kind {
        AnnotationKind::Highlighter { points } => {
            let Some(path) = geometry::polyline_path(points) else {
                return;
            };
            let stroke = Stroke {
                width: annotation.thickness * stroke::HIGHLIGHTER_WIDTH_FACTOR,
                line_cap: LineCap::Butt,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            let paint = ink_paint(color, stroke::HIGHLIGHTER_OPACITY);
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        AnnotationKind::Line { points } => {
            let Some(path) = geometry::polyline_path(points) else {
                return;
            };
            let paint = ink_paint(color, 1.0);
            let stroke = round_stroke(annotation.thickness);
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        AnnotationKind::Arrow { start, end } => {
            paint_arrow(pixmap, *start, *end, annotation.thickness, color);
        }
        AnnotationKind::XMark { center } => {
            if let Some(path) = geometry::xmark_path(*center, annotation.size / 2.0) {
                let paint = ink_paint(color, 1.0);
                let stroke = round_stroke(stroke::xmark_width(annotation.size));
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        AnnotationKind::Question { center } => {
            if let Some(path) = text::centered_path("?", annotation.size * 2.0, true, *center) {
                let paint = ink_paint(color, 1.0);
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                let stroke = round_stroke(stroke::QUESTION_OUTLINE);
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        AnnotationKind::Text {
            start,
            text,
            width,
            height,
        } => {
            let rect = Rect::from_xywh(start.x, start.y, *width, *height);
            paint_text_box(pixmap, rect, text, color, annotation.size, None);
        }
    }
}

/// Shaft from `start` to `end` plus a filled head
pub fn paint_arrow(pixmap: &mut Pixmap, start: Point, end: Point, thickness: f32, color: InkColor) {
    let paint = ink_paint(color, 1.0);

    let mut pb = PathBuilder::new();
    pb.move_to(start.x, start.y);
    pb.line_to(end.x, end.y);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &round_stroke(thickness), Transform::identity(), None);
    }

    let Some((left, right)) = arrow::head_points(start, end, arrow::head_length(thickness))
    else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(end.x, end.y);
    pb.line_to(left.x, left.y);
    pb.line_to(right.x, right.y);
    pb.close();
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Text inside a translucent panel, wrapped and clipped to `rect`
///
/// `caret` is a byte offset into `content`; when set a caret bar is drawn.
pub fn paint_text_box(
    pixmap: &mut Pixmap,
    rect: Rect,
    content: &str,
    color: InkColor,
    size: f32,
    caret: Option<usize>,
) {
    let Some(box_rect) = geometry::to_skia_rect(rect) else {
        return;
    };
    let [r, g, b, a] = chrome::TEXT_PANEL;
    let mut panel = Paint::default();
    panel.set_color_rgba8(r, g, b, a);
    pixmap.fill_rect(box_rect, &panel, Transform::identity(), None);

    let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else {
        return;
    };
    mask.fill_path(
        &PathBuilder::from_rect(box_rect),
        FillRule::Winding,
        false,
        Transform::identity(),
    );

    let paint = ink_paint(color, 1.0);
    let line_height = size * LINE_HEIGHT;
    let max_width = rect.width() - PAD_X * 2.0;
    let measure = |s: &str| text::measure_text(s, size, false);
    for (i, line) in text::wrap_lines(content, max_width, measure).iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let top_left = Point::new(
            rect.left + PAD_X,
            rect.top + PAD_Y + i as f32 * line_height,
        );
        if let Some(path) = text::line_path(line, size, false, top_left) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), Some(&mask));
        }
    }

    let Some(caret) = caret else {
        return;
    };
    let prefix = &content[..caret.min(content.len())];
    let lines = text::wrap_lines(prefix, max_width, measure);
    let row = lines.len().saturating_sub(1);
    let mut x = lines.last().map_or(0.0, |l| measure(l));
    if prefix.ends_with(' ') {
        x += measure(" ");
    }
    let x = rect.left + PAD_X + x;
    let y = rect.top + PAD_Y + row as f32 * line_height;
    let mut pb = PathBuilder::new();
    pb.move_to(x, y);
    pb.line_to(x, y + size);
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: 1.5,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), Some(&mask));
    }
}

/// Dashed outline around the text being edited
pub fn paint_edit_frame(pixmap: &mut Pixmap, rect: Rect) {
    let Some(box_rect) = geometry::to_skia_rect(rect) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 128);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: 1.0,
        dash: StrokeDash::new(chrome::SELECTION_DASH.to_vec(), 0.0),
        ..Default::default()
    };
    pixmap.stroke_path(
        &PathBuilder::from_rect(box_rect),
        &paint,
        &stroke,
        Transform::identity(),
        None,
    );
}

/// Selection feedback for the selected annotation
///
/// Arrows show their two endpoint handles, text its resize corner, and
/// everything else a dashed bounding box.
pub fn paint_selection(pixmap: &mut Pixmap, annotation: &Annotation) {
    let accent = ink_paint(annotation.color, 1.0);
    let mut white = Paint::default();
    white.set_color_rgba8(255, 255, 255, 255);
    white.anti_alias = true;
    let outline = Stroke {
        width: 2.0,
        ..Default::default()
    };

    match &annotation.kind {
        AnnotationKind::Arrow { start, end } => {
            for p in [start, end] {
                if let Some(path) = PathBuilder::from_circle(p.x, p.y, chrome::HANDLE_RADIUS) {
                    pixmap.fill_path(&path, &white, FillRule::Winding, Transform::identity(), None);
                    pixmap.stroke_path(&path, &accent, &outline, Transform::identity(), None);
                }
            }
        }
        AnnotationKind::Text {
            start,
            width,
            height,
            ..
        } => {
            let half = chrome::RESIZE_HANDLE_SIZE / 2.0;
            let corner = start.translate(*width, *height);
            let handle = Rect::from_xywh(
                corner.x - half,
                corner.y - half,
                chrome::RESIZE_HANDLE_SIZE,
                chrome::RESIZE_HANDLE_SIZE,
            );
            if let Some(r) = geometry::to_skia_rect(handle) {
                pixmap.fill_rect(r, &white, Transform::identity(), None);
                let path = PathBuilder::from_rect(r);
                pixmap.stroke_path(&path, &accent, &outline, Transform::identity(), None);
            }
        }
        AnnotationKind::Highlighter { .. }
        | AnnotationKind::Line { .. }
        | AnnotationKind::XMark { .. }
        | AnnotationKind::Question { .. } => {
            let padding = chrome::SELECTION_PADDING + stroke_extent(annotation);
            let Some(r) = geometry::to_skia_rect(annotation.bounds().inflate(padding)) else {
                return;
            };
            let mut paint = white.clone();
            paint.set_color_rgba8(255, 255, 255, 230);
            let stroke = Stroke {
                width: 1.0,
                dash: StrokeDash::new(chrome::SELECTION_DASH.to_vec(), 0.0),
                ..Default::default()
            };
            pixmap.stroke_path(
                &PathBuilder::from_rect(r),
                &paint,
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }
}

/// Half the painted stroke width, so the dashed box clears the ink
fn stroke_extent(annotation: &Annotation) -> f32 {
    match annotation.kind {
        AnnotationKind::Highlighter { .. } => {
            annotation.thickness * stroke::HIGHLIGHTER_WIDTH_FACTOR / 2.0
        }
        AnnotationKind::Line { .. } => annotation.thickness / 2.0,
        AnnotationKind::XMark { .. } => stroke::xmark_width(annotation.size) / 2.0,
        AnnotationKind::Question { .. } => annotation.size / 2.0,
        AnnotationKind::Arrow { .. } | AnnotationKind::Text { .. } => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Style, Tool};

    fn blank(w: u32, h: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(w, h).unwrap();
        pixmap.fill(tiny_skia::Color::WHITE);
        pixmap
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    fn line(tool: Tool, points: &[(f32, f32)], thickness: f32) -> Annotation {
        let style = Style {
            thickness,
            ..Style::default()
        };
        let mut a = Annotation::new(1, tool, Point::default(), style);
        let points = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        a.kind = match tool {
            Tool::Highlighter => AnnotationKind::Highlighter { points },
            _ => AnnotationKind::Line { points },
        };
        a
    }

    #[test]
    fn test_pixmap_round_trip() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        let pixmap = rgba_to_pixmap(&img).unwrap();
        assert_eq!(pixmap_to_rgba(&pixmap), img);
    }

    #[test]
    fn test_line_paints_full_ink() {
        let mut pixmap = blank(40, 40);
        paint_annotation(&mut pixmap, &line(Tool::Line, &[(5.0, 20.0), (35.0, 20.0)], 6.0));
        assert_eq!(pixel(&pixmap, 20, 20), [0xFF, 0x00, 0x55, 255]);
        assert_eq!(pixel(&pixmap, 20, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_highlighter_is_translucent_and_wide() {
        let mut pixmap = blank(60, 60);
        paint_annotation(
            &mut pixmap,
            &line(Tool::Highlighter, &[(5.0, 30.0), (55.0, 30.0)], 4.0),
        );
        // 16px wide band: y = 24 is inside, y = 10 is not
        let inside = pixel(&pixmap, 30, 24);
        assert!(inside[1] > 100 && inside[1] < 200, "{:?}", inside);
        assert_eq!(pixel(&pixmap, 30, 10), [255, 255, 255, 255]);
        // flat caps: nothing painted before the first point
        assert_eq!(pixel(&pixmap, 2, 30), [255, 255, 255, 255]);
    }

    #[test]
    fn test_arrow_head_is_filled() {
        let mut pixmap = blank(100, 40);
        paint_arrow(
            &mut pixmap,
            Point::new(10.0, 20.0),
            Point::new(90.0, 20.0),
            2.0,
            InkColor::new(0, 0, 255),
        );
        // inside the head triangle, off the 2px shaft
        assert_eq!(pixel(&pixmap, 84, 21), [0, 0, 255, 255]);
    }

    #[test]
    fn test_xmark_crosses_center() {
        let mut pixmap = blank(60, 60);
        let a = Annotation::new(1, Tool::XMark, Point::new(30.0, 30.0), Style::default());
        paint_annotation(&mut pixmap, &a);
        assert_eq!(pixel(&pixmap, 30, 30), [0xFF, 0x00, 0x55, 255]);
        assert_eq!(pixel(&pixmap, 30, 15), [255, 255, 255, 255]);
    }

    #[test]
    fn test_xmark_width_follows_stamp_size() {
        let mut pixmap = blank(80, 80);
        let a = Annotation::new(1, Tool::XMark, Point::new(40.0, 40.0), Style::default());
        paint_annotation(&mut pixmap, &a);
        // about 4.2px off the diagonal, inside the 12px arm
        assert_eq!(pixel(&pixmap, 51, 45), [0xFF, 0x00, 0x55, 255]);

        let glyph = crate::render::cursor::rasterize(Tool::XMark, a.color, a.size).unwrap();
        // same offset from the glyph hotspot (34, 34)
        assert!(glyph.pixmap.pixel(45, 39).unwrap().alpha() > 0);
    }

    #[test]
    fn test_selection_box_outside_ink() {
        let mut pixmap = blank(80, 80);
        let a = Annotation::new(1, Tool::XMark, Point::new(40.0, 40.0), Style::default());
        paint_selection(&mut pixmap, &a);
        assert_eq!(pixel(&pixmap, 40, 40), [255, 255, 255, 255]);
    }

    #[test]
    fn test_text_panel_is_drawn() {
        let mut pixmap = blank(100, 60);
        paint_text_box(
            &mut pixmap,
            Rect::from_xywh(10.0, 10.0, 80.0, 40.0),
            "",
            InkColor::default(),
            24.0,
            None,
        );
        let inside = pixel(&pixmap, 50, 30);
        assert!(inside[0] < 255 && inside[2] < 255);
        assert_eq!(pixel(&pixmap, 5, 5), [255, 255, 255, 255]);
    }
}
