//! Message types for an annotation session
//!
//! This module contains:
//! - `Msg`, the input stream delivered by the host
//! - `Command`, what keyboard shortcuts resolve to
//! - `Outcome`, what the host must do after a message was handled

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::{AutonateConfig, DefaultAction, FocusShape};
use crate::domain::{InkColor, Tool};

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS, Super elsewhere
    pub logo: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        logo: false,
    };

    /// Ctrl or Cmd
    pub fn command(&self) -> bool {
        self.ctrl || self.logo
    }
}

/// Named (non-printable) keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Named {
    Escape,
    Enter,
    Backspace,
    Delete,
    Tab,
    Space,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Named(Named),
    Character(String),
}

impl Key {
    pub fn character(c: &str) -> Self {
        Key::Character(c.to_string())
    }
}

/// Everything the host can deliver to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerDown {
        x: f32,
        y: f32,
        button: MouseButton,
    },
    PointerUp {
        x: f32,
        y: f32,
        button: MouseButton,
    },
    /// Wheel scroll; negative is away from the user
    Wheel {
        delta_y: f32,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Palette: choose a tool, or `None` for select mode
    SelectTool {
        tool: Option<Tool>,
    },
    /// Palette: choose the ink color
    SetColor {
        color: InkColor,
    },
    /// Preview: choose the focus shape
    SetShape {
        shape: FocusShape,
    },
}

impl Msg {
    pub fn pointer_move(x: f32, y: f32) -> Self {
        Msg::PointerMove { x, y }
    }

    pub fn pointer_down(x: f32, y: f32) -> Self {
        Msg::PointerDown {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Msg::PointerUp {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    pub fn right_click(x: f32, y: f32) -> Self {
        Msg::PointerDown {
            x,
            y,
            button: MouseButton::Right,
        }
    }

    pub fn wheel(delta_y: f32) -> Self {
        Msg::Wheel { delta_y }
    }

    pub fn key(key: Key, modifiers: Modifiers) -> Self {
        Msg::Key { key, modifiers }
    }

    pub fn named(named: Named) -> Self {
        Msg::Key {
            key: Key::Named(named),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn select_tool(tool: Option<Tool>) -> Self {
        Msg::SelectTool { tool }
    }
}

/// Session-level actions bound to keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// End the session without exporting
    Close,
    Undo,
    Redo,
    DeleteSelection,
    SelectTool(Option<Tool>),
    CycleShape,
    Export(DefaultAction),
}

// ============================================================================
// Output
// ============================================================================

/// Repaint request attached to an outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Redraw {
    #[default]
    None,
    /// Paint on the next display refresh via `Session::on_frame`
    NextFrame,
    /// Paint synchronously now
    Now,
}

/// Preferences the host should write back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreferenceUpdate {
    pub focus_radius: f32,
    pub shape: FocusShape,
}

impl PreferenceUpdate {
    pub fn apply(&self, config: &mut AutonateConfig) {
        config.focus_radius = self.focus_radius;
        config.shape = self.shape;
    }
}

/// Why a session ended
#[derive(Debug, Clone)]
pub enum SessionEnd {
    Cancelled,
    /// Deliver `image` to the sink selected by `action`
    Export {
        action: DefaultAction,
        image: RgbaImage,
    },
}

/// Host-side effects of handling one message
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub redraw: Redraw,
    /// The pointer glyph must be reinstalled
    pub cursor_changed: bool,
    pub persist: Option<PreferenceUpdate>,
    pub end: Option<SessionEnd>,
}

impl Outcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw(redraw: Redraw) -> Self {
        Self {
            redraw,
            ..Default::default()
        }
    }

    pub fn now() -> Self {
        Self::redraw(Redraw::Now)
    }

    pub fn with_cursor(mut self) -> Self {
        self.cursor_changed = true;
        self
    }

    pub fn with_persist(mut self, update: PreferenceUpdate) -> Self {
        self.persist = Some(update);
        self
    }

    pub fn ended(end: SessionEnd) -> Self {
        Self {
            end: Some(end),
            ..Default::default()
        }
    }
}
