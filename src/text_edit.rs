//! Text-edit overlay
//!
//! A single editable text box placed over the canvas, used both by the text
//! tool and for editing existing text annotations. Keystrokes are handled
//! here directly (caret, insertion, deletion); the box commits on Enter or
//! loss of focus and cancels on Escape.

use crate::annotations::store::AnnotationStore;
use crate::domain::{
    Annotation, AnnotationId, AnnotationKind, InkColor, Point, Rect, Style, TEXT_MIN_WIDTH,
};
use crate::render::text::{self, LINE_HEIGHT, PAD_X, PAD_Y};
use crate::session::messages::{Key, Modifiers, Named};

/// Distance kept from the viewport edges when sizing a new box
const EDGE_MARGIN: f32 = 20.0;

/// What the edited text will be written into
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditTarget {
    /// A new text annotation; `invited` marks an automatic label offer
    New { style: Style, invited: bool },
    Existing(AnnotationId),
}

/// Result of a keystroke delivered to the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Edited,
    Commit,
    Cancel,
    Ignored,
}

/// Result of committing the overlay into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommit {
    Nothing,
    Created(AnnotationId),
    Updated(AnnotationId),
    Deleted(AnnotationId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    target: EditTarget,
    origin: Point,
    text: String,
    /// Byte offset of the caret, always on a char boundary
    caret: usize,
    color: InkColor,
    size: f32,
    width: f32,
    height: f32,
    /// New boxes grow with their content; existing ones keep their width
    auto_size: bool,
    max_width: f32,
    max_height: f32,
    touched: bool,
}

impl TextEdit {
    /// Open an empty box at `origin` for a new text annotation
    pub fn new_text(origin: Point, style: Style, invited: bool, viewport: (f32, f32)) -> Self {
        let max_width = (viewport.0 - origin.x - EDGE_MARGIN).max(TEXT_MIN_WIDTH);
        let max_height = (viewport.1 - origin.y - EDGE_MARGIN).max(style.size + 10.0);
        let mut edit = Self {
            target: EditTarget::New { style, invited },
            origin,
            text: String::new(),
            caret: 0,
            color: style.color,
            size: style.size,
            width: TEXT_MIN_WIDTH,
            height: style.size + 10.0,
            auto_size: true,
            max_width,
            max_height,
            touched: false,
        };
        edit.fit(&|s: &str, size: f32| text::measure_text(s, size, false));
        edit
    }

    /// Open a box pre-filled from an existing text annotation
    pub fn edit_existing(annotation: &Annotation, viewport: (f32, f32)) -> Option<Self> {
        let AnnotationKind::Text {
            start,
            text,
            width,
            height,
        } = &annotation.kind
        else {
            return None;
        };
        Some(Self {
            target: EditTarget::Existing(annotation.id),
            origin: *start,
            text: text.clone(),
            caret: text.len(),
            color: annotation.color,
            size: annotation.size,
            width: *width,
            height: *height,
            auto_size: false,
            max_width: (viewport.0 - start.x - EDGE_MARGIN).max(*width),
            max_height: (viewport.1 - start.y - EDGE_MARGIN).max(*height),
            touched: false,
        })
    }

    /// Annotation hidden from the canvas while this box shows it
    pub fn editing_id(&self) -> Option<AnnotationId> {
        match self.target {
            EditTarget::Existing(id) => Some(id),
            EditTarget::New { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn color(&self) -> InkColor {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::from_xywh(self.origin.x, self.origin.y, self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect().contains_point(p)
    }

    /// An automatic label offer nobody typed into
    pub fn is_untouched_invitation(&self) -> bool {
        matches!(self.target, EditTarget::New { invited: true, .. }) && !self.touched
    }

    pub fn set_color(&mut self, color: InkColor) {
        self.color = color;
    }

    /// Deliver a keystroke
    pub fn handle_key(&mut self, key: &Key, modifiers: Modifiers) -> EditKey {
        match key {
            Key::Named(Named::Escape) => EditKey::Cancel,
            Key::Named(Named::Enter) if modifiers.shift => self.insert("\n"),
            Key::Named(Named::Enter) => EditKey::Commit,
            Key::Named(Named::Space) => self.insert(" "),
            Key::Named(Named::Tab) => EditKey::Ignored,
            Key::Named(Named::Backspace) => {
                let Some(prev) = self.text[..self.caret].chars().next_back() else {
                    return EditKey::Ignored;
                };
                self.caret -= prev.len_utf8();
                self.text.remove(self.caret);
                self.edited()
            }
            Key::Named(Named::Delete) => {
                if self.caret >= self.text.len() {
                    return EditKey::Ignored;
                }
                self.text.remove(self.caret);
                self.edited()
            }
            Key::Named(Named::ArrowLeft) => {
                if let Some(prev) = self.text[..self.caret].chars().next_back() {
                    self.caret -= prev.len_utf8();
                }
                EditKey::Edited
            }
            Key::Named(Named::ArrowRight) => {
                if let Some(next) = self.text[self.caret..].chars().next() {
                    self.caret += next.len_utf8();
                }
                EditKey::Edited
            }
            Key::Named(Named::Home) => {
                self.caret = self.text[..self.caret].rfind('\n').map_or(0, |i| i + 1);
                EditKey::Edited
            }
            Key::Named(Named::End) => {
                self.caret = self.text[self.caret..]
                    .find('\n')
                    .map_or(self.text.len(), |i| self.caret + i);
                EditKey::Edited
            }
            Key::Character(_) if modifiers.command() || modifiers.alt => EditKey::Ignored,
            Key::Character(c) => self.insert(c),
        }
    }

    fn insert(&mut self, s: &str) -> EditKey {
        self.text.insert_str(self.caret, s);
        self.caret += s.len();
        self.edited()
    }

    fn edited(&mut self) -> EditKey {
        self.touched = true;
        self.fit(&|s: &str, size: f32| text::measure_text(s, size, false));
        EditKey::Edited
    }

    /// Resize the box to its content
    pub fn fit(&mut self, measure: &dyn Fn(&str, f32) -> f32) {
        let size = self.size;
        let line_height = size * LINE_HEIGHT;
        if self.auto_size {
            let widest = self
                .text
                .split('\n')
                .map(|line| measure(line, size))
                .fold(0.0_f32, f32::max);
            self.width = (widest + PAD_X * 2.0)
                .max(TEXT_MIN_WIDTH)
                .min(self.max_width);
        }
        let lines = text::wrap_lines(&self.text, self.width - PAD_X * 2.0, |s| measure(s, size));
        let needed = lines.len().max(1) as f32 * line_height + PAD_Y * 2.0;
        let floor = if self.auto_size {
            size + 10.0
        } else {
            self.height
        };
        self.height = needed.max(floor).min(self.max_height.max(floor));
    }

    /// Write the edit into the store
    ///
    /// Whitespace-only content creates nothing for a new box and deletes an
    /// existing annotation.
    pub fn commit(self, store: &mut AnnotationStore) -> TextCommit {
        let empty = self.text.trim().is_empty();
        match self.target {
            EditTarget::New { style, .. } => {
                if empty {
                    return TextCommit::Nothing;
                }
                let style = Style {
                    color: self.color,
                    ..style
                };
                TextCommit::Created(store.add_text(
                    self.origin,
                    self.text,
                    self.width,
                    self.height,
                    style,
                ))
            }
            EditTarget::Existing(id) => {
                if empty {
                    return if store.delete(id) {
                        TextCommit::Deleted(id)
                    } else {
                        TextCommit::Nothing
                    };
                }
                if store.update_text(id, self.text, self.width, self.height) {
                    TextCommit::Updated(id)
                } else {
                    TextCommit::Nothing
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: (f32, f32) = (800.0, 600.0);

    fn type_str(edit: &mut TextEdit, s: &str) {
        for c in s.chars() {
            edit.handle_key(&Key::Character(c.to_string()), Modifiers::NONE);
        }
    }

    #[test]
    fn test_empty_new_text_commits_nothing() {
        let mut store = AnnotationStore::new();
        let mut edit = TextEdit::new_text(Point::new(10.0, 10.0), Style::default(), false, VIEWPORT);
        type_str(&mut edit, "   ");
        assert_eq!(edit.commit(&mut store), TextCommit::Nothing);
        assert!(store.annotations().is_empty());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_new_text_creates_annotation() {
        let mut store = AnnotationStore::new();
        let mut edit = TextEdit::new_text(Point::new(10.0, 10.0), Style::default(), false, VIEWPORT);
        type_str(&mut edit, "hello");
        assert_eq!(edit.handle_key(&Key::Named(Named::Enter), Modifiers::NONE), EditKey::Commit);
        let TextCommit::Created(id) = edit.commit(&mut store) else {
            panic!("expected a created annotation");
        };
        match &store.get(id).unwrap().kind {
            AnnotationKind::Text { start, text, .. } => {
                assert_eq!(*start, Point::new(10.0, 10.0));
                assert_eq!(text, "hello");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_clearing_existing_text_deletes_it() {
        let mut store = AnnotationStore::new();
        let id = store.add_text(Point::new(0.0, 0.0), "ab".into(), 100.0, 40.0, Style::default());
        let mut edit = TextEdit::edit_existing(store.get(id).unwrap(), VIEWPORT).unwrap();
        edit.handle_key(&Key::Named(Named::Backspace), Modifiers::NONE);
        edit.handle_key(&Key::Named(Named::Backspace), Modifiers::NONE);
        assert_eq!(edit.text(), "");
        assert_eq!(edit.commit(&mut store), TextCommit::Deleted(id));
        assert!(store.annotations().is_empty());
    }

    #[test]
    fn test_caret_editing() {
        let mut edit = TextEdit::new_text(Point::new(0.0, 0.0), Style::default(), false, VIEWPORT);
        type_str(&mut edit, "héllo");
        edit.handle_key(&Key::Named(Named::Home), Modifiers::NONE);
        edit.handle_key(&Key::Named(Named::ArrowRight), Modifiers::NONE);
        edit.handle_key(&Key::Named(Named::ArrowRight), Modifiers::NONE);
        edit.handle_key(&Key::Named(Named::Backspace), Modifiers::NONE);
        assert_eq!(edit.text(), "hllo");
        edit.handle_key(&Key::Named(Named::Delete), Modifiers::NONE);
        assert_eq!(edit.text(), "hlo");
        edit.handle_key(&Key::Named(Named::Enter), Modifiers { shift: true, ..Modifiers::NONE });
        assert_eq!(edit.text(), "h\nlo");
        edit.handle_key(&Key::Named(Named::End), Modifiers::NONE);
        assert_eq!(edit.caret(), edit.text().len());
    }

    #[test]
    fn test_auto_size_bounds() {
        let mut edit = TextEdit::new_text(Point::new(700.0, 0.0), Style::default(), false, VIEWPORT);
        let fixed = |s: &str, _size: f32| s.chars().count() as f32 * 10.0;
        edit.text = "a very long line of text that overflows".into();
        edit.fit(&fixed);
        // capped at viewport width - x - 20
        assert_eq!(edit.rect().width(), 80.0);
        assert!(edit.rect().height() > Style::default().size + 10.0);

        edit.text = "a".into();
        edit.fit(&fixed);
        assert_eq!(edit.rect().width(), TEXT_MIN_WIDTH);
        // one line: 24 * 1.2 + 8
        assert!((edit.rect().height() - 36.8).abs() < 1e-3);
    }

    #[test]
    fn test_untouched_invitation() {
        let mut edit = TextEdit::new_text(Point::new(0.0, 0.0), Style::default(), true, VIEWPORT);
        assert!(edit.is_untouched_invitation());
        type_str(&mut edit, "x");
        assert!(!edit.is_untouched_invitation());
    }
}
