//! Glyph outlines and text layout
//!
//! Fonts are located once with fontdb and outlined with rusttype. When no
//! system font is found, text is measured with a fixed advance and drawn as
//! nothing.

use std::fs;
use std::sync::OnceLock;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::{Font, OutlineBuilder, Scale, point as rt_point};
use tiny_skia::{Path, PathBuilder, Transform};

use crate::domain::Point;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT: f32 = 1.2;
/// Horizontal padding inside a text box, each side
pub const PAD_X: f32 = 8.0;
/// Top padding inside a text box
pub const PAD_Y: f32 = 4.0;
/// Advance per character used when no font is available
const FALLBACK_ADVANCE: f32 = 0.55;

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        db
    })
}

/// Sans-serif system font, or None if the system has none
pub fn font(bold: bool) -> Option<&'static Font<'static>> {
    static REGULAR: OnceLock<Option<Font<'static>>> = OnceLock::new();
    static BOLD: OnceLock<Option<Font<'static>>> = OnceLock::new();
    let cell = if bold { &BOLD } else { &REGULAR };
    cell.get_or_init(|| {
        let font = load_system_font(bold);
        if font.is_none() {
            log::warn!("No sans-serif system font found (bold={}); text will not render", bold);
        }
        font
    })
    .as_ref()
}

fn load_system_font(bold: bool) -> Option<Font<'static>> {
    let query = Query {
        families: &[Family::SansSerif],
        weight: if bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db().query(&query)?;
    let face = db().face(id)?;

    match &face.source {
        fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => {
            let bytes = fs::read(path).ok()?;
            Font::try_from_vec_and_index(bytes, face.index)
        }
        fontdb::Source::Binary(bytes) => {
            Font::try_from_vec_and_index(bytes.as_ref().as_ref().to_vec(), face.index)
        }
    }
}

/// Width of a single line of text at `size`
pub fn measure_text(text: &str, size: f32, bold: bool) -> f32 {
    let Some(font) = font(bold) else {
        return text.chars().count() as f32 * size * FALLBACK_ADVANCE;
    };
    font.layout(text, Scale::uniform(size), rt_point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Adapts rusttype outlines to a tiny-skia path
struct SkiaOutline {
    pb: PathBuilder,
}

impl OutlineBuilder for SkiaOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.pb.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.pb.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.pb.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.pb.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

/// Outline of one line of text whose top-left corner is at `top_left`
pub fn line_path(text: &str, size: f32, bold: bool, top_left: Point) -> Option<Path> {
    let font = font(bold)?;
    let scale = Scale::uniform(size);
    let ascent = font.v_metrics(scale).ascent;
    let mut outline = SkiaOutline {
        pb: PathBuilder::new(),
    };
    for glyph in font.layout(text, scale, rt_point(top_left.x, top_left.y + ascent)) {
        glyph.build_outline(&mut outline);
    }
    outline.pb.finish()
}

/// Outline of `text` with its ink bounds centered on `center`
pub fn centered_path(text: &str, size: f32, bold: bool, center: Point) -> Option<Path> {
    let path = line_path(text, size, bold, Point::default())?;
    let bounds = path.bounds();
    let dx = center.x - (bounds.left() + bounds.width() / 2.0);
    let dy = center.y - (bounds.top() + bounds.height() / 2.0);
    path.transform(Transform::from_translate(dx, dy))
}

/// Greedy word wrap
///
/// Explicit newlines always break. Words are appended while the line fits
/// in `max_width`; a single word wider than the box gets a line to itself.
/// An empty paragraph yields an empty line.
pub fn wrap_lines(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for (i, word) in paragraph.split(' ').enumerate() {
            let candidate = format!("{}{} ", line, word);
            if i > 0 && measure(&candidate) > max_width {
                lines.push(line.trim_end().to_string());
                line = format!("{} ", word);
            } else {
                line = candidate;
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_per_char(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let lines = wrap_lines("aa bb cc", 60.0, ten_per_char);
        assert_eq!(lines, vec!["aa bb", "cc"]);
    }

    #[test]
    fn test_wrap_keeps_long_word_whole() {
        let lines = wrap_lines("abcdefghij k", 50.0, ten_per_char);
        assert_eq!(lines, vec!["abcdefghij", "k"]);
    }

    #[test]
    fn test_wrap_explicit_newlines() {
        let lines = wrap_lines("one\n\ntwo", 500.0, ten_per_char);
        assert_eq!(lines, vec!["one", "", "two"]);
        assert_eq!(wrap_lines("", 500.0, ten_per_char), vec![""]);
    }

    #[test]
    fn test_measure_is_monotonic() {
        let short = measure_text("ab", 24.0, false);
        let long = measure_text("abcd", 24.0, false);
        assert!(long > short);
        assert_eq!(measure_text("", 24.0, false), 0.0);
    }
}
