//! Text buffer abstraction for rich-text fields.
//!
//! The `TextBuffer` trait is the seam to the structured text engine: edits
//! are applied through it, so any buffer that can insert, delete and slice
//! by char offset can back a text field. `TextDocument` is the ropey-backed
//! implementation stored in manuscripts.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::{SmolStr, ToSmolStr};

/// A text buffer that supports efficient editing.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Replace char range with text.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    /// Get a slice as SmolStr. Returns None if range is invalid.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Clamp both ends into `0..=len`.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

/// A rich-text field value: content plus the selection within it.
///
/// Clones are cheap (the rope shares its nodes), which is what lets
/// manuscripts be updated copy-on-write. Equality is content equality; the
/// selection is view state and never compared.
#[derive(Clone, Default)]
pub struct TextDocument {
    rope: ropey::Rope,
    selection: Selection,
}

impl TextDocument {
    pub fn new(text: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(text),
            selection: Selection::default(),
        }
    }

    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection, clamped to the document bounds.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.rope.len_chars());
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.set_selection(selection);
        self
    }

    /// Content equality: same text, regardless of selection or identity.
    pub fn content_eq(&self, other: &TextDocument) -> bool {
        self.rope == other.rope
    }
}

impl TextBuffer for TextDocument {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        self.rope.remove(char_range);
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.rope.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

impl PartialEq for TextDocument {
    fn eq(&self, other: &Self) -> bool {
        self.content_eq(other)
    }
}

impl fmt::Debug for TextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextDocument")
            .field("text", &self.rope.to_string())
            .field("selection", &self.selection)
            .finish()
    }
}

impl From<&str> for TextDocument {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// Wire form is the bare content string.
impl Serialize for TextDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.rope.to_string())
    }
}

impl<'de> Deserialize<'de> for TextDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::new(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_buffer_ops() {
        let mut doc = TextDocument::new("hello");
        doc.insert(5, " world");
        assert_eq!(TextBuffer::to_string(&doc), "hello world");
        doc.delete(0..6);
        assert_eq!(TextBuffer::to_string(&doc), "world");
        doc.replace(0..5, "rust");
        assert_eq!(TextBuffer::to_string(&doc), "rust");
    }

    #[test]
    fn test_slice_bounds() {
        let doc = TextDocument::new("héllo");
        assert_eq!(doc.slice(1..3).as_deref(), Some("él"));
        assert_eq!(doc.slice(3..9), None);
    }

    #[test]
    fn test_content_equality_ignores_selection() {
        let a = TextDocument::new("abc").with_selection(Selection::new(0, 2));
        let b = TextDocument::new("abc");
        assert_eq!(a, b);
        assert_ne!(a, TextDocument::new("abd"));
    }

    #[test]
    fn test_selection_clamped() {
        let doc = TextDocument::new("ab").with_selection(Selection::new(1, 10));
        assert_eq!(doc.selection(), Selection::new(1, 2));
    }
}
