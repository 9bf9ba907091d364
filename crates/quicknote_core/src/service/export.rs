//! Export payload for the "write to file and share" collaborator.
//!
//! The core only builds the payload; writing and sharing happen outside.

use crate::model::note::Note;
use chrono::{DateTime, Utc};

/// MIME type advertised to share sheets.
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// Serialized export ready to be written by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    /// Suggested file name, `notes-<epoch_ms>.json`.
    pub file_name: String,
    pub mime_type: &'static str,
    /// Pretty-printed JSON array of notes.
    pub json: String,
    pub note_count: usize,
}

/// Encodes notes as a pretty-printed JSON array.
pub fn encode_export(notes: &[Note]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(notes)
}

/// Suggested export file name for a given instant.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("notes-{}.json", at.timestamp_millis())
}

pub(crate) fn build_bundle(notes: &[Note], at: DateTime<Utc>) -> serde_json::Result<ExportBundle> {
    Ok(ExportBundle {
        file_name: export_file_name(at),
        mime_type: EXPORT_MIME_TYPE,
        json: encode_export(notes)?,
        note_count: notes.len(),
    })
}
