//! Note domain model.
//!
//! # Responsibility
//! - Define the record shape shared by storage, service and export.
//! - Format and parse the `date` string that drives list ordering.
//!
//! # Invariants
//! - `id` is assigned once and never changes for the lifetime of a note.
//! - `date` written by this crate always parses back via `parse_note_date`.
//! - The canonical body field is `content`; `subtitle` is a read-only alias.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque note identifier.
///
/// Kept as a string alias: ids written by older app builds are
/// timestamp-derived, new ids are UUID v4 text.
pub type NoteId = String;

/// Day-level display form, e.g. `Fri Oct 16 2026`.
const DISPLAY_DATE_FORMAT: &str = "%a %b %d %Y";
const PLAIN_DATE_FORMAT: &str = "%Y-%m-%d";

/// One persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable id, unique within the collection.
    pub id: NoteId,
    /// Free-form title, may be empty.
    #[serde(default)]
    pub title: String,
    /// Free-form body, may be empty.
    #[serde(default, alias = "subtitle")]
    pub content: String,
    /// Creation/modification timestamp, overwritten on every edit.
    pub date: String,
}

impl Note {
    /// Creates a note with a freshly generated id stamped at `now`.
    pub fn new(title: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_id(generate_note_id(), title, content, format_note_date(now))
    }

    /// Creates a note with a caller-provided id and raw date string.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: impl Into<NoteId>,
        title: impl Into<String>,
        content: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            date: date.into(),
        }
    }

    /// Overwrites editable fields and restamps `date`; `id` is untouched.
    pub fn revise(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.title = title.into();
        self.content = content.into();
        self.date = format_note_date(now);
    }

    /// Parsed `date`, or `None` when the stored string is not a known form.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_note_date(&self.date)
    }

    /// Date rendered for list views; unparseable values are shown verbatim.
    pub fn display_date(&self) -> String {
        match self.parsed_date() {
            Some(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
            None => self.date.clone(),
        }
    }
}

/// Generates a new note id.
pub fn generate_note_id() -> NoteId {
    Uuid::new_v4().to_string()
}

/// Formats a timestamp as stored in `Note::date` (RFC 3339, UTC, millis).
pub fn format_note_date(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored `Note::date` value.
///
/// Accepted forms, in order:
/// - RFC 3339 (`2026-10-16T09:30:00.123Z`), any offset.
/// - Display form (`Fri Oct 16 2026`), written by older app builds.
/// - Plain date (`2026-10-16`).
///
/// Day-only forms resolve to midnight UTC.
pub fn parse_note_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(value.with_timezone(&Utc));
    }

    [DISPLAY_DATE_FORMAT, PLAIN_DATE_FORMAT]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
