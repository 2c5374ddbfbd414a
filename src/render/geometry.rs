//! Shared geometry calculations for painting
//!
//! This module contains constants and path math shared between the
//! canvas, the exported image and the cursor glyphs.

use tiny_skia::{Path, PathBuilder};

use crate::domain::{Point, Rect};
use crate::focus::FocusClip;

/// Arrow geometry constants
pub mod arrow {
    use crate::domain::Point;

    /// Shortest arrowhead in logical pixels
    pub const MIN_HEAD: f32 = 10.0;
    /// Head length per unit of stroke thickness
    pub const HEAD_PER_THICKNESS: f32 = 3.0;
    /// Arrowhead half-angle from the shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = 0.523_598_8; // 30.0_f32.to_radians()

    pub fn head_length(thickness: f32) -> f32 {
        (thickness * HEAD_PER_THICKNESS).max(MIN_HEAD)
    }

    /// Calculate the two back corners of the arrowhead
    ///
    /// Returns None for a zero-length arrow, which has no direction.
    pub fn head_points(start: Point, end: Point, head_length: f32) -> Option<(Point, Point)> {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        let angle = dy.atan2(dx);

        let left = Point::new(
            end.x - head_length * (angle - HEAD_ANGLE).cos(),
            end.y - head_length * (angle - HEAD_ANGLE).sin(),
        );
        let right = Point::new(
            end.x - head_length * (angle + HEAD_ANGLE).cos(),
            end.y - head_length * (angle + HEAD_ANGLE).sin(),
        );
        Some((left, right))
    }
}

/// Canvas chrome constants
pub mod chrome {
    /// Alpha of the black dimming layer over the backdrop
    pub const DIM_ALPHA: f32 = 0.6;
    pub const BORDER_WIDTH: f32 = 2.0;
    pub const BORDER_ALPHA: f32 = 0.5;
    pub const ANCHOR_DOT_RADIUS: f32 = 4.0;
    pub const ANCHOR_DOT_ALPHA: f32 = 0.8;

    /// Gap between an annotation and its dashed selection box
    pub const SELECTION_PADDING: f32 = 6.0;
    pub const SELECTION_DASH: [f32; 2] = [6.0, 4.0];
    pub const HANDLE_RADIUS: f32 = 6.0;
    pub const RESIZE_HANDLE_SIZE: f32 = 10.0;

    /// Translucent panel behind text annotations, rgba(15,23,42,0.55)
    pub const TEXT_PANEL: [u8; 4] = [15, 23, 42, 140];
}

/// Per-kind stroke constants
pub mod stroke {
    /// Highlighter width per unit of thickness
    pub const HIGHLIGHTER_WIDTH_FACTOR: f32 = 4.0;
    pub const HIGHLIGHTER_OPACITY: f32 = 0.4;
    pub const XMARK_MIN_WIDTH: f32 = 2.0;
    /// Outline stroked over the question glyph for weight
    pub const QUESTION_OUTLINE: f32 = 2.0;

    /// Arm width of an X mark at stamp `size`
    pub fn xmark_width(size: f32) -> f32 {
        (size / 2.0).max(XMARK_MIN_WIDTH)
    }
}

pub fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.left, rect.top, rect.right, rect.bottom)
}

/// Outline path of the focus window
pub fn focus_path(clip: FocusClip) -> Option<Path> {
    match clip {
        FocusClip::Circle { center, radius } => {
            PathBuilder::from_circle(center.x, center.y, radius.max(0.5))
        }
        FocusClip::Rect(rect) => to_skia_rect(rect).map(PathBuilder::from_rect),
    }
}

/// Open polyline through `points`; a single point becomes a zero-length segment
pub fn polyline_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    if rest.is_empty() {
        pb.line_to(first.x, first.y);
    }
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

/// Two crossing diagonals of half-length `half` around `center`
pub fn xmark_path(center: Point, half: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(center.x - half, center.y - half);
    pb.line_to(center.x + half, center.y + half);
    pb.move_to(center.x + half, center.y - half);
    pb.line_to(center.x - half, center.y + half);
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_length_floor() {
        assert_eq!(arrow::head_length(1.0), 10.0);
        assert_eq!(arrow::head_length(4.0), 12.0);
        assert_eq!(arrow::head_length(20.0), 60.0);
    }

    #[test]
    fn test_head_points_symmetric() {
        let (left, right) =
            arrow::head_points(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 10.0).unwrap();
        assert!((left.x - right.x).abs() < 1e-4);
        assert!((left.y + right.y).abs() < 1e-4);
        assert!(left.x < 100.0);
        assert!((left.distance(Point::new(100.0, 0.0)) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_length_arrow_has_no_head() {
        let p = Point::new(3.0, 3.0);
        assert!(arrow::head_points(p, p, 10.0).is_none());
    }

    #[test]
    fn test_single_point_polyline() {
        assert!(polyline_path(&[Point::new(1.0, 1.0)]).is_some());
        assert!(polyline_path(&[]).is_none());
    }
}
