//! Durable note collection store.
//!
//! # Responsibility
//! - Load and replace the whole collection as one JSON blob under one key.
//! - Classify storage failures into read, write and corrupt-state errors.
//!
//! # Invariants
//! - Absent (or blank) value means an empty collection, never an error.
//! - Corrupt values fail unless the caller opted into `ResetToEmpty`.
//! - `save` performs exactly one medium write per call.

use crate::model::note::Note;
use crate::repo::kv_store::{KvError, KvStore};
use log::{debug, error, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed key holding the serialized collection.
pub const NOTES_KEY: &str = "notes";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while loading or saving the collection.
#[derive(Debug)]
pub enum StoreError {
    /// Stored value exists but is not a valid note collection.
    CorruptState { key: &'static str, message: String },
    /// Medium failed while reading.
    StorageRead(KvError),
    /// Medium rejected or failed the write.
    StorageWrite(KvError),
    /// Collection could not be serialized.
    Encode(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptState { key, message } => {
                write!(f, "stored notes under `{key}` are corrupt: {message}")
            }
            Self::StorageRead(err) => write!(f, "failed to read notes: {err}"),
            Self::StorageWrite(err) => write!(f, "failed to write notes: {err}"),
            Self::Encode(message) => write!(f, "failed to encode notes: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageRead(err) | Self::StorageWrite(err) => Some(err),
            Self::CorruptState { .. } | Self::Encode(_) => None,
        }
    }
}

/// What `load_with` does when the stored value is corrupt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptStatePolicy {
    /// Surface `StoreError::CorruptState`.
    #[default]
    Fail,
    /// Treat the collection as empty. The corrupt value stays in place until
    /// the next `save` overwrites it.
    ResetToEmpty,
}

/// Whole-collection store over a key-value medium.
pub struct NoteStore<S: KvStore> {
    kv: S,
}

impl<S: KvStore> NoteStore<S> {
    /// Creates a store on top of the given medium.
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Loads the collection exactly as stored, failing on corrupt state.
    pub fn load(&self) -> StoreResult<Vec<Note>> {
        self.load_with(CorruptStatePolicy::Fail)
    }

    /// Loads the collection using an explicit corrupt-state policy.
    pub fn load_with(&self, policy: CorruptStatePolicy) -> StoreResult<Vec<Note>> {
        let Some(raw) = self.load_raw()? else {
            debug!("event=notes_load module=store status=ok state=absent note_count=0");
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            debug!("event=notes_load module=store status=ok state=blank note_count=0");
            return Ok(Vec::new());
        }

        match decode_collection(&raw) {
            Ok(notes) => {
                debug!(
                    "event=notes_load module=store status=ok note_count={} bytes={}",
                    notes.len(),
                    raw.len()
                );
                Ok(notes)
            }
            Err(message) => match policy {
                CorruptStatePolicy::Fail => {
                    error!(
                        "event=notes_load module=store status=error error_code=corrupt_state bytes={}",
                        raw.len()
                    );
                    Err(StoreError::CorruptState {
                        key: NOTES_KEY,
                        message,
                    })
                }
                CorruptStatePolicy::ResetToEmpty => {
                    warn!(
                        "event=notes_load module=store status=recovered error_code=corrupt_state bytes={}",
                        raw.len()
                    );
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Returns the raw stored value for diagnostics.
    pub fn load_raw(&self) -> StoreResult<Option<String>> {
        self.kv.get(NOTES_KEY).map_err(|err| {
            error!("event=notes_load module=store status=error error_code=read_failed error={err}");
            StoreError::StorageRead(err)
        })
    }

    /// Replaces the stored collection with `notes`.
    pub fn save(&mut self, notes: &[Note]) -> StoreResult<()> {
        let raw = serde_json::to_string(notes).map_err(|err| StoreError::Encode(err.to_string()))?;
        match self.kv.set(NOTES_KEY, &raw) {
            Ok(()) => {
                debug!(
                    "event=notes_save module=store status=ok note_count={} bytes={}",
                    notes.len(),
                    raw.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=notes_save module=store status=error error_code=write_failed note_count={} error={err}",
                    notes.len()
                );
                Err(StoreError::StorageWrite(err))
            }
        }
    }

    /// Borrows the underlying medium.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Consumes the store and returns the underlying medium.
    pub fn into_inner(self) -> S {
        self.kv
    }
}

fn decode_collection(raw: &str) -> Result<Vec<Note>, String> {
    let notes: Vec<Note> = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    let mut seen = HashSet::with_capacity(notes.len());
    for note in &notes {
        if !seen.insert(note.id.as_str()) {
            return Err(format!("duplicate note id `{}`", note.id));
        }
    }
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::{CorruptStatePolicy, NoteStore, StoreError, NOTES_KEY};
    use crate::model::note::Note;
    use crate::repo::kv_store::{KvStore, MemoryKvStore};

    fn store_with_raw(raw: &str) -> NoteStore<MemoryKvStore> {
        let mut kv = MemoryKvStore::new();
        kv.set(NOTES_KEY, raw).unwrap();
        NoteStore::new(kv)
    }

    #[test]
    fn absent_and_blank_values_load_as_empty() {
        assert!(NoteStore::new(MemoryKvStore::new()).load().unwrap().is_empty());
        assert!(store_with_raw("  ").load().unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_are_corrupt_state() {
        let store = store_with_raw(
            r#"[{"id":"a","title":"","content":"","date":""},
                {"id":"a","title":"","content":"","date":""}]"#,
        );
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::CorruptState { key: "notes", .. }));
    }

    #[test]
    fn reset_policy_is_opt_in_and_keeps_raw_value() {
        let store = store_with_raw("{not json");
        assert!(matches!(
            store.load(),
            Err(StoreError::CorruptState { .. })
        ));

        let recovered = store.load_with(CorruptStatePolicy::ResetToEmpty).unwrap();
        assert!(recovered.is_empty());
        assert_eq!(store.load_raw().unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn save_writes_content_as_canonical_field() {
        let mut store = NoteStore::new(MemoryKvStore::new());
        store
            .save(&[Note::with_id("1", "t", "body", "2024-03-01")])
            .unwrap();

        let raw = store.load_raw().unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["content"], "body");
        assert_eq!(value[0]["id"], "1");
    }
}
