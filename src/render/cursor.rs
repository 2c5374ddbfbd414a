//! Pointer glyphs for the drawing tools

use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry;
use super::text;
use crate::domain::{InkColor, Point, Tool};

/// Glyph opacity so the pointer never hides what is under it
const GLYPH_OPACITY: f32 = 0.5;

/// A rasterised pointer image and its hotspot
#[derive(Debug, Clone)]
pub struct CursorGlyph {
    pub pixmap: Pixmap,
    pub hotspot: (u32, u32),
}

/// Render the pointer glyph for `tool`
///
/// The canvas is `2 * size + 20` pixels square with the hotspot centered.
pub fn rasterize(tool: Tool, color: InkColor, size: f32) -> Option<CursorGlyph> {
    let side = (size * 2.0 + 20.0).round().max(1.0) as u32;
    let mut pixmap = Pixmap::new(side, side)?;
    let c = side as f32 / 2.0;
    let center = Point::new(c, c);

    let [r, g, b, a] = color.to_rgba_u8(GLYPH_OPACITY);
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let fill = |pixmap: &mut Pixmap, path: Option<tiny_skia::Path>| {
        if let Some(path) = path {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    };
    let stroke_with = |pixmap: &mut Pixmap, path: Option<tiny_skia::Path>, width: f32| {
        if let Some(path) = path {
            let stroke = Stroke {
                width,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    };

    let half = size / 2.0;
    match tool {
        Tool::Highlighter => fill(&mut pixmap, PathBuilder::from_circle(c, c, half.max(0.5))),
        Tool::Line => fill(&mut pixmap, PathBuilder::from_circle(c, c, (size / 4.0).max(1.0))),
        Tool::Text => fill(&mut pixmap, text::centered_path("T", size, true, center)),
        Tool::Question => fill(&mut pixmap, text::centered_path("?", size * 2.0, true, center)),
        Tool::XMark => stroke_with(
            &mut pixmap,
            geometry::xmark_path(center, half),
            geometry::stroke::xmark_width(size),
        ),
        Tool::Arrow => {
            let mut pb = PathBuilder::new();
            pb.move_to(c - half, c + half);
            pb.line_to(c + half, c - half);
            pb.move_to(c + half, c - half);
            pb.line_to(c, c - half);
            pb.move_to(c + half, c - half);
            pb.line_to(c + half, c);
            stroke_with(&mut pixmap, pb.finish(), (size / 4.0).max(2.0));
        }
    }

    Some(CursorGlyph {
        pixmap,
        hotspot: (side / 2, side / 2),
    })
}
