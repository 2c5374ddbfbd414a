//! Annotation types for drawing on captures
//!
//! All annotation types store coordinates in viewport pixel coordinates.

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};

/// Stroke width bounds
pub const THICKNESS_MIN: f32 = 1.0;
pub const THICKNESS_MAX: f32 = 20.0;
/// Stamp and font size bounds
pub const SIZE_MIN: f32 = 4.0;
pub const SIZE_MAX: f32 = 200.0;

/// Minimum text box dimensions when resizing
pub const TEXT_MIN_WIDTH: f32 = 50.0;
pub const TEXT_MIN_HEIGHT: f32 = 30.0;

/// Identifier of a committed annotation, monotonic and never reused within a session
pub type AnnotationId = u64;

/// Annotation tool selectable from the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Highlighter,
    Line,
    Arrow,
    XMark,
    Question,
    Text,
}

impl Tool {
    /// Stroke tools are resized through thickness, the rest through size
    pub fn adjusts_thickness(self) -> bool {
        matches!(self, Tool::Highlighter | Tool::Line | Tool::Arrow)
    }
}

/// RGB ink color, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for InkColor {
    fn default() -> Self {
        // #FF0055
        Self {
            r: 0xFF,
            g: 0x00,
            b: 0x55,
        }
    }
}

impl InkColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to RGBA with the given opacity (0.0-1.0)
    pub fn to_rgba_u8(self, opacity: f32) -> [u8; 4] {
        [
            self.r,
            self.g,
            self.b,
            (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

impl TryFrom<String> for InkColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid color {:?}, expected #RRGGBB", value))
    }
}

impl From<InkColor> for String {
    fn from(color: InkColor) -> Self {
        color.to_hex()
    }
}

pub fn clamp_thickness(value: f32) -> f32 {
    value.clamp(THICKNESS_MIN, THICKNESS_MAX)
}

pub fn clamp_size(value: f32) -> f32 {
    value.clamp(SIZE_MIN, SIZE_MAX)
}

/// Style applied to newly created annotations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: InkColor,
    pub thickness: f32,
    pub size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: InkColor::default(),
            thickness: 4.0,
            size: 24.0,
        }
    }
}

/// Kind-specific payload of an annotation
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationKind {
    /// Wide translucent freehand stroke
    Highlighter { points: Vec<Point> },
    /// Freehand ink stroke
    Line { points: Vec<Point> },
    Arrow { start: Point, end: Point },
    XMark { center: Point },
    Question { center: Point },
    /// Text box; `start` is the top-left corner
    Text {
        start: Point,
        text: String,
        width: f32,
        height: f32,
    },
}

/// A single vector mark in the document
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub color: InkColor,
    pub thickness: f32,
    pub size: f32,
    pub kind: AnnotationKind,
}

impl Annotation {
    /// Create an annotation at `point` for the given tool
    ///
    /// Text annotations start with an empty minimum-size box.
    pub fn new(id: AnnotationId, tool: Tool, point: Point, style: Style) -> Self {
        let kind = match tool {
            Tool::Highlighter => AnnotationKind::Highlighter {
                points: vec![point],
            },
            Tool::Line => AnnotationKind::Line {
                points: vec![point],
            },
            Tool::Arrow => AnnotationKind::Arrow {
                start: point,
                end: point,
            },
            Tool::XMark => AnnotationKind::XMark { center: point },
            Tool::Question => AnnotationKind::Question { center: point },
            Tool::Text => AnnotationKind::Text {
                start: point,
                text: String::new(),
                width: TEXT_MIN_WIDTH,
                height: TEXT_MIN_HEIGHT,
            },
        };
        Self {
            id,
            color: style.color,
            thickness: clamp_thickness(style.thickness),
            size: clamp_size(style.size),
            kind,
        }
    }

    pub fn tool(&self) -> Tool {
        match self.kind {
            AnnotationKind::Highlighter { .. } => Tool::Highlighter,
            AnnotationKind::Line { .. } => Tool::Line,
            AnnotationKind::Arrow { .. } => Tool::Arrow,
            AnnotationKind::XMark { .. } => Tool::XMark,
            AnnotationKind::Question { .. } => Tool::Question,
            AnnotationKind::Text { .. } => Tool::Text,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, AnnotationKind::Text { .. })
    }

    /// Check if this is a single-click stamp
    pub fn is_stamp(&self) -> bool {
        matches!(
            self.kind,
            AnnotationKind::XMark { .. } | AnnotationKind::Question { .. }
        )
    }

    /// Translate the whole annotation
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match &mut self.kind {
            AnnotationKind::Highlighter { points } | AnnotationKind::Line { points } => {
                for p in points.iter_mut() {
                    *p = p.translate(dx, dy);
                }
            }
            AnnotationKind::Arrow { start, end } => {
                *start = start.translate(dx, dy);
                *end = end.translate(dx, dy);
            }
            AnnotationKind::XMark { center } | AnnotationKind::Question { center } => {
                *center = center.translate(dx, dy);
            }
            AnnotationKind::Text { start, .. } => *start = start.translate(dx, dy),
        }
    }

    /// Point near which the label invitation is offered
    pub fn anchor(&self) -> Point {
        match &self.kind {
            AnnotationKind::Highlighter { points } | AnnotationKind::Line { points } => {
                match (points.first(), points.last()) {
                    (Some(first), Some(last)) => first.midpoint(*last),
                    _ => Point::default(),
                }
            }
            AnnotationKind::Arrow { start, .. } => *start,
            AnnotationKind::XMark { center } | AnnotationKind::Question { center } => *center,
            AnnotationKind::Text { start, .. } => *start,
        }
    }

    /// Geometric extent of the annotation, without stroke width
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            AnnotationKind::Highlighter { points } | AnnotationKind::Line { points } => {
                Rect::bounding(points).unwrap_or_default()
            }
            AnnotationKind::Arrow { start, end } => Rect::from_corners(*start, *end),
            AnnotationKind::XMark { center } | AnnotationKind::Question { center } => {
                let half = self.size / 2.0;
                Rect::from_corners(center.translate(-half, -half), center.translate(half, half))
            }
            AnnotationKind::Text {
                start,
                width,
                height,
                ..
            } => Rect::from_xywh(start.x, start.y, *width, *height),
        }
    }
}
