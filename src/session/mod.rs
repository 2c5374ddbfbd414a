//! Annotation session
//!
//! This module contains:
//! - Session state and rendering entry points
//! - Message types for session input and host effects
//! - Keyboard shortcut mapping
//! - The interaction router that dispatches input by mode

pub mod messages;
pub mod router;
pub mod shortcuts;
pub mod state;

pub use messages::{
    Command, Key, Modifiers, MouseButton, Msg, Named, Outcome, PreferenceUpdate, Redraw,
    SessionEnd,
};
pub use state::{CursorKind, PendingLabel, Session, SessionOptions, ToolState};
