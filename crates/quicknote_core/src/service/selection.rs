//! Bulk-select bookkeeping.
//!
//! # Responsibility
//! - Track which note ids the user has chosen for bulk actions.
//!
//! # Invariants
//! - The selection is a set; toggling twice restores the prior state.
//! - Selection never touches storage.

use crate::model::note::{Note, NoteId};
use std::collections::HashSet;

/// Set of selected note ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<NoteId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Selects every note in `notes`.
    pub fn select_all(&mut self, notes: &[Note]) {
        self.ids = notes.iter().map(|note| note.id.clone()).collect();
    }

    /// Selects everything unless everything is already selected, then clears.
    pub fn toggle_all(&mut self, notes: &[Note]) {
        if self.is_all_selected(notes) {
            self.clear();
        } else {
            self.select_all(notes);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops ids that no longer exist in `notes`.
    pub fn retain_existing(&mut self, notes: &[Note]) {
        let live: HashSet<&str> = notes.iter().map(|note| note.id.as_str()).collect();
        self.ids.retain(|id| live.contains(id.as_str()));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether every note in a non-empty `notes` is selected.
    pub fn is_all_selected(&self, notes: &[Note]) -> bool {
        !notes.is_empty() && notes.iter().all(|note| self.ids.contains(&note.id))
    }

    /// Selected ids, for `delete_many` and export.
    pub fn ids(&self) -> &HashSet<NoteId> {
        &self.ids
    }
}

impl FromIterator<NoteId> for Selection {
    fn from_iter<I: IntoIterator<Item = NoteId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
