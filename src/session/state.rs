use std::time::{Duration, Instant};

use image::RgbaImage;
use tiny_skia::Pixmap;

use crate::annotations::handlers::GestureState;
use crate::annotations::store::AnnotationStore;
use crate::config::{AutonateConfig, DefaultAction, FocusShape};
use crate::domain::{AnnotationId, InkColor, Point, Selection, Style, Tool};
use crate::focus::FocusRegion;
use crate::render::composite::{Renderer, Scene};
use crate::render::image::pixmap_to_rgba;
use crate::session::messages::Redraw;
use crate::text_edit::TextEdit;

/// Delay before the label editor is offered after a commit
pub const LABEL_DELAY: Duration = Duration::from_millis(150);
/// Offset of the label editor from the annotation's anchor
pub const LABEL_OFFSET: f32 = 20.0;

/// Session parameters taken from the preference store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub shape: FocusShape,
    pub blur_radius: f32,
    pub focus_radius: f32,
    pub default_action: DefaultAction,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&AutonateConfig::default())
    }
}

impl From<&AutonateConfig> for SessionOptions {
    fn from(config: &AutonateConfig) -> Self {
        Self {
            shape: config.shape,
            blur_radius: config.blur_radius,
            focus_radius: config.focus_radius,
            default_action: config.default_action,
        }
    }
}

/// Palette state: active tool and the style for new annotations
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToolState {
    /// None is select mode
    pub tool: Option<Tool>,
    pub style: Style,
}

/// A label invitation waiting for its delay to pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingLabel {
    pub at: Point,
    pub due: Instant,
}

/// Pointer glyph the host should show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorKind {
    /// Preview of a fixed shape; the focus window is the pointer
    Hidden,
    Crosshair,
    Default,
    /// Tool glyph, see `render::cursor::rasterize`
    Tool {
        tool: Tool,
        color: InkColor,
        size: f32,
    },
}

/// One annotation session over a single capture
pub struct Session {
    pub(super) capture: RgbaImage,
    pub(super) renderer: Renderer,
    pub(super) focus: FocusRegion,
    pub(super) store: AnnotationStore,
    pub(super) selection: Selection,
    pub(super) tools: ToolState,
    pub(super) text_edit: Option<TextEdit>,
    pub(super) pending_label: Option<PendingLabel>,
    pub(super) gesture: GestureState,
    pub(super) pointer: Point,
    pub(super) frame_pending: bool,
    pub(super) default_action: DefaultAction,
    pub(super) ended: bool,
}

impl Session {
    /// Start a session; the viewport is the size of `capture`
    pub fn new(capture: RgbaImage, options: SessionOptions) -> anyhow::Result<Self> {
        let focus = FocusRegion::new(options.shape, options.focus_radius, options.blur_radius);
        let renderer = Renderer::new(&capture, &focus).ok_or_else(|| {
            anyhow::anyhow!(
                "cannot annotate an empty capture ({}x{})",
                capture.width(),
                capture.height()
            )
        })?;
        log::info!(
            "Session started: {}x{}, shape {:?}, radius {}",
            capture.width(),
            capture.height(),
            focus.shape(),
            focus.radius()
        );
        let pointer = Point::new(capture.width() as f32 / 2.0, capture.height() as f32 / 2.0);
        Ok(Self {
            capture,
            renderer,
            focus,
            store: AnnotationStore::new(),
            selection: Selection::default(),
            tools: ToolState::default(),
            text_edit: None,
            pending_label: None,
            gesture: GestureState::default(),
            pointer,
            frame_pending: false,
            default_action: options.default_action,
            ended: false,
        })
    }

    pub fn focus(&self) -> &FocusRegion {
        &self.focus
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn selected_id(&self) -> Option<AnnotationId> {
        self.selection.selected_id
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    pub fn pending_label(&self) -> Option<&PendingLabel> {
        self.pending_label.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.renderer.width() as f32, self.renderer.height() as f32)
    }

    /// Deferred animation callback
    ///
    /// Paints once if a frame was requested since the last call.
    pub fn on_frame(&mut self) -> Option<Pixmap> {
        if !std::mem::take(&mut self.frame_pending) || self.ended {
            return None;
        }
        Some(self.render())
    }

    /// Paint the current state immediately
    pub fn render(&self) -> Pixmap {
        self.renderer.render(&Scene {
            focus: &self.focus,
            pointer: self.pointer,
            annotations: self.store.annotations(),
            in_progress: self.store.in_progress(),
            selected: self.selection.selected_id.and_then(|id| self.store.get(id)),
            text_edit: self.text_edit.as_ref(),
        })
    }

    /// Paint the document for export, without any editing chrome
    pub(super) fn render_export(&self) -> RgbaImage {
        let frame = self.renderer.render(&Scene {
            focus: &self.focus,
            pointer: self.pointer,
            annotations: self.store.annotations(),
            in_progress: None,
            selected: None,
            text_edit: None,
        });
        pixmap_to_rgba(&frame)
    }

    /// Open the label editor once its delay has passed
    pub fn tick(&mut self, now: Instant) -> Redraw {
        let Some(pending) = self.pending_label else {
            return Redraw::None;
        };
        if self.ended || now < pending.due {
            return Redraw::None;
        }
        self.pending_label = None;
        if self.text_edit.is_some() || !self.focus.is_locked() {
            return Redraw::None;
        }
        log::debug!("Offering label at ({}, {})", pending.at.x, pending.at.y);
        self.text_edit = Some(TextEdit::new_text(
            pending.at,
            self.tools.style,
            true,
            self.viewport(),
        ));
        Redraw::Now
    }

    pub(super) fn schedule_label(&mut self, id: AnnotationId, now: Instant) {
        let Some(annotation) = self.store.get(id) else {
            return;
        };
        if annotation.is_text() {
            return;
        }
        let at = annotation.anchor().translate(LABEL_OFFSET, LABEL_OFFSET);
        self.pending_label = Some(PendingLabel {
            at,
            due: now + LABEL_DELAY,
        });
    }

    pub fn cursor(&self) -> CursorKind {
        if !self.focus.is_locked() {
            return if self.focus.is_custom_box() {
                CursorKind::Crosshair
            } else {
                CursorKind::Hidden
            };
        }
        let Some(tool) = self.tools.tool else {
            return CursorKind::Default;
        };
        let style = self.tools.style;
        let size = if tool.adjusts_thickness() {
            style.thickness * 4.0
        } else {
            style.size
        };
        CursorKind::Tool {
            tool,
            color: style.color,
            size,
        }
    }

    /// Tear down all editing state
    pub(super) fn end(&mut self) {
        self.store.clear();
        self.selection.clear();
        self.text_edit = None;
        self.pending_label = None;
        self.gesture.reset();
        self.frame_pending = false;
        self.ended = true;
    }
}
