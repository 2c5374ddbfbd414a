//! Selection state for committed annotations

use super::annotation::AnnotationId;
use super::geometry::Point;

/// Which part of the selected annotation a drag manipulates
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    #[default]
    None,
    /// Whole-annotation translation
    Move,
    /// Arrow start point
    Start,
    /// Arrow end point
    End,
    /// Text box bottom-right corner
    Resize,
}

/// Current selection and drag state
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Selection {
    pub selected_id: Option<AnnotationId>,
    pub active_handle: Handle,
    /// Pointer position at the previous drag sample
    pub drag_anchor: Point,
}

impl Selection {
    pub fn select(&mut self, id: AnnotationId, handle: Handle, at: Point) {
        self.selected_id = Some(id);
        self.active_handle = handle;
        self.drag_anchor = at;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check if a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.selected_id.is_some() && self.active_handle != Handle::None
    }

    /// Drop the selection if `exists` says the id is gone
    pub fn retain(&mut self, exists: impl Fn(AnnotationId) -> bool) {
        if let Some(id) = self.selected_id
            && !exists(id)
        {
            self.clear();
        }
    }
}
