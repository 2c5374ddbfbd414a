//! Focus region controller
//!
//! Owns the adjustable preview window and its one-way transition into the
//! locked state that enables annotation.

use crate::config::{BLUR_MAX, FOCUS_RADIUS_MAX, FOCUS_RADIUS_MIN, FocusShape};
use crate::domain::{Point, Rect};

/// Resolved clip geometry of the focus window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusClip {
    Circle { center: Point, radius: f32 },
    Rect(Rect),
}

/// What a lock transition requires from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockResult {
    /// Already locked, or a custom box without both corners
    Ignored,
    Locked,
    /// Locked a custom box; the backdrop was unblurred and must be rebuilt
    LockedRebuildBackdrop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusRegion {
    shape: FocusShape,
    radius: f32,
    blur_radius: f32,
    custom_box_start: Option<Point>,
    custom_box_end: Option<Point>,
    locked: bool,
    lock_center: Point,
}

impl FocusRegion {
    pub fn new(shape: FocusShape, radius: f32, blur_radius: f32) -> Self {
        Self {
            shape,
            radius: radius.clamp(FOCUS_RADIUS_MIN, FOCUS_RADIUS_MAX),
            blur_radius: blur_radius.clamp(0.0, BLUR_MAX),
            custom_box_start: None,
            custom_box_end: None,
            locked: false,
            lock_center: Point::default(),
        }
    }

    pub fn shape(&self) -> FocusShape {
        self.shape
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn blur_radius(&self) -> f32 {
        self.blur_radius
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock position; only meaningful once locked
    pub fn lock_center(&self) -> Point {
        self.lock_center
    }

    pub fn custom_box_start(&self) -> Option<Point> {
        self.custom_box_start
    }

    pub fn is_custom_box(&self) -> bool {
        self.shape == FocusShape::CustomBox
    }

    /// Change the preview shape
    ///
    /// Refused once locked, or while a custom box anchor is pending.
    pub fn set_shape(&mut self, shape: FocusShape) -> bool {
        if self.locked || self.custom_box_start.is_some() || self.shape == shape {
            return false;
        }
        self.shape = shape;
        true
    }

    /// Grow or shrink the preview window, saturating at the bounds
    ///
    /// Returns true if the radius changed.
    pub fn adjust_radius(&mut self, delta: f32) -> bool {
        if self.locked || self.is_custom_box() {
            return false;
        }
        let radius = (self.radius + delta).clamp(FOCUS_RADIUS_MIN, FOCUS_RADIUS_MAX);
        let changed = radius != self.radius;
        self.radius = radius;
        changed
    }

    /// Place the first custom box corner
    pub fn begin_custom_box(&mut self, point: Point) -> bool {
        if self.locked || !self.is_custom_box() || self.custom_box_start.is_some() {
            return false;
        }
        self.custom_box_start = Some(point);
        true
    }

    /// Drop a pending first corner; no-op if none is pending
    pub fn cancel_custom_box(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.custom_box_start.take().is_some()
    }

    /// Place the second corner and lock
    pub fn complete_custom_box(&mut self, point: Point) -> LockResult {
        if self.locked || !self.is_custom_box() || self.custom_box_start.is_none() {
            return LockResult::Ignored;
        }
        self.custom_box_end = Some(point);
        self.lock(point)
    }

    /// Freeze the focus geometry
    ///
    /// Non-custom shapes lock around `point`; a custom box locks around the
    /// midpoint of its corners.
    pub fn lock(&mut self, point: Point) -> LockResult {
        if self.locked {
            return LockResult::Ignored;
        }
        if self.is_custom_box() {
            let (Some(start), Some(end)) = (self.custom_box_start, self.custom_box_end) else {
                return LockResult::Ignored;
            };
            self.lock_center = start.midpoint(end);
            self.locked = true;
            log::info!(
                "Focus locked: custom box {:?} -> {:?}",
                (start.x, start.y),
                (end.x, end.y)
            );
            return LockResult::LockedRebuildBackdrop;
        }
        self.lock_center = point;
        self.locked = true;
        log::info!(
            "Focus locked: {:?} r={} at ({}, {})",
            self.shape,
            self.radius,
            point.x,
            point.y
        );
        LockResult::Locked
    }

    /// Whether the backdrop should be blurred in the current state
    ///
    /// An unlocked custom box shows real pixels so the user can aim the box.
    pub fn wants_blur(&self) -> bool {
        self.blur_radius > 0.0 && !(self.is_custom_box() && !self.locked)
    }

    /// Anchor dot shown while drawing a custom box
    pub fn anchor_dot(&self) -> Option<Point> {
        if self.locked || !self.is_custom_box() {
            return None;
        }
        self.custom_box_start
    }

    /// Clip geometry for the current state
    ///
    /// While unlocked the window follows `pointer`; once locked `pointer` is
    /// ignored. `None` means no window is visible (custom box with no anchor).
    pub fn clip(&self, pointer: Point) -> Option<FocusClip> {
        if self.is_custom_box() {
            let start = self.custom_box_start?;
            let end = if self.locked {
                self.custom_box_end?
            } else {
                pointer
            };
            return Some(FocusClip::Rect(Rect::from_corners(start, end)));
        }
        let center = if self.locked {
            self.lock_center
        } else {
            pointer
        };
        Some(shape_clip(self.shape, center, self.radius))
    }
}

fn shape_clip(shape: FocusShape, center: Point, r: f32) -> FocusClip {
    match shape {
        FocusShape::Circle => FocusClip::Circle { center, radius: r },
        FocusShape::Square => FocusClip::Rect(Rect::from_xywh(
            center.x - r,
            center.y - r,
            r * 2.0,
            r * 2.0,
        )),
        FocusShape::Rectangle | FocusShape::CustomBox => FocusClip::Rect(Rect::from_xywh(
            center.x - r * 1.5,
            center.y - r,
            r * 3.0,
            r * 2.0,
        )),
    }
}
