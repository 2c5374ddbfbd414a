//! Backdrop composition
//!
//! The backdrop is the full-frame image shown outside the focus window:
//! the capture, optionally blurred, under a fixed dimming layer. It is
//! built once and reused for every repaint.

use image::{RgbaImage, imageops};
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

use super::geometry::chrome;
use super::image::rgba_to_pixmap;

/// Build the backdrop; `blur_sigma` of None or 0 skips the blur pass
pub fn compose_backdrop(source: &RgbaImage, blur_sigma: Option<f32>) -> Option<Pixmap> {
    let mut pixmap = match blur_sigma {
        Some(sigma) if sigma > 0.0 => {
            log::debug!("Blurring backdrop with sigma {}", sigma);
            rgba_to_pixmap(&imageops::blur(source, sigma))?
        }
        _ => rgba_to_pixmap(source)?,
    };

    let dim = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)?;
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba(0.0, 0.0, 0.0, chrome::DIM_ALPHA)?);
    pixmap.fill_rect(dim, &paint, Transform::identity(), None);
    Some(pixmap)
}
