//! Case-insensitive substring filter over title and content.
//!
//! # Invariants
//! - Only `title` and `content` are matched; `date` and `id` never are.
//! - Only the empty query matches every note; whitespace is matched literally.
//! - Input order is preserved.

use crate::model::note::Note;

/// Normalized search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteQuery {
    needle: String,
}

impl NoteQuery {
    /// Builds a query from user text, matched verbatim apart from case.
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
        }
    }

    /// Whether this query matches every note.
    pub fn is_match_all(&self) -> bool {
        self.needle.is_empty()
    }

    /// Whether `note` matches this query.
    pub fn matches(&self, note: &Note) -> bool {
        self.is_match_all()
            || note.title.to_lowercase().contains(&self.needle)
            || note.content.to_lowercase().contains(&self.needle)
    }
}

/// Returns the notes in `notes` matching `text`, in input order.
pub fn filter_notes(notes: &[Note], text: &str) -> Vec<Note> {
    let query = NoteQuery::new(text);
    if query.is_match_all() {
        return notes.to_vec();
    }
    notes
        .iter()
        .filter(|note| query.matches(note))
        .cloned()
        .collect()
}
