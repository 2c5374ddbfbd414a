use crate::config::DefaultAction;
use crate::domain::Tool;
use crate::session::messages::{Command, Key, Modifiers, Named};

/// Map a keystroke to a session command
///
/// Only called when no text overlay holds the keyboard.
pub fn handle_key_event(locked: bool, key: &Key, modifiers: Modifiers) -> Option<Command> {
    let command = modifiers.command();

    match key {
        Key::Named(Named::Escape) => Some(Command::Close),
        // Undo/redo shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case("z") && command && !modifiers.shift => {
            Some(Command::Undo)
        }
        Key::Character(c)
            if (c.eq_ignore_ascii_case("y") && command)
                || (c.eq_ignore_ascii_case("z") && command && modifiers.shift) =>
        {
            Some(Command::Redo)
        }
        // Export shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case("c") && command && locked => {
            Some(Command::Export(DefaultAction::Copy))
        }
        Key::Character(c) if c.eq_ignore_ascii_case("s") && command && locked => {
            Some(Command::Export(DefaultAction::Save))
        }
        Key::Named(Named::Tab) if !locked => Some(Command::CycleShape),
        Key::Named(Named::Delete | Named::Backspace) if locked => Some(Command::DeleteSelection),
        // Palette shortcuts
        Key::Character(c) if locked && !command && !modifiers.alt => {
            let tool = match c.as_str() {
                "0" => None,
                "1" => Some(Tool::Highlighter),
                "2" => Some(Tool::Line),
                "3" => Some(Tool::Arrow),
                "4" => Some(Tool::Text),
                "5" => Some(Tool::XMark),
                "6" => Some(Tool::Question),
                _ => return None,
            };
            Some(Command::SelectTool(tool))
        }
        _ => None,
    }
}
