//! Note collection use-case service.
//!
//! # Responsibility
//! - Provide list/create/update/delete/query/export over the whole collection.
//! - Run every mutation as one load + one save against `NoteStore`.
//!
//! # Invariants
//! - `list` is sorted by parsed `date` descending; ties keep stored order.
//! - Created notes are prepended and carry an id unique in the collection.
//! - `update` never changes `id`; a missing id is `NotFound`.
//! - `delete` is idempotent; `delete_many` does a single round trip.
//! - Mutations take `&mut self`, so one service instance never interleaves
//!   two read-modify-write cycles.

use crate::model::note::{format_note_date, generate_note_id, Note, NoteId};
use crate::repo::kv_store::{KvError, KvStore};
use crate::repo::note_store::{CorruptStatePolicy, NoteStore, StoreError};
use crate::search::substring::filter_notes;
use crate::service::export::{build_bundle, encode_export, ExportBundle};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fresh ids tried before giving up with `DuplicateId`.
const MAX_ID_ATTEMPTS: usize = 8;

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NotFound(NoteId),
    /// Id generation kept colliding with existing notes.
    DuplicateId(NoteId),
    /// Stored collection exists but cannot be decoded.
    CorruptState(String),
    /// Medium rejected the write; nothing was buffered.
    StorageWrite(KvError),
    /// Other persistence-layer failure.
    Store(StoreError),
    /// Export payload could not be encoded.
    Export(String),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateId(id) => write!(f, "generated note id collides: {id}"),
            Self::CorruptState(message) => write!(f, "{message}"),
            Self::StorageWrite(err) => write!(f, "failed to write notes: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Export(message) => write!(f, "failed to encode export: {message}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageWrite(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            corrupt @ StoreError::CorruptState { .. } => Self::CorruptState(corrupt.to_string()),
            StoreError::StorageWrite(err) => Self::StorageWrite(err),
            other => Self::Store(other),
        }
    }
}

type Clock = Box<dyn FnMut() -> DateTime<Utc> + Send>;
type IdSource = Box<dyn FnMut() -> NoteId + Send>;

/// Collection façade over an injected note store.
pub struct NoteCollectionService<S: KvStore> {
    store: NoteStore<S>,
    corrupt_policy: CorruptStatePolicy,
    clock: Clock,
    next_id: IdSource,
}

impl<S: KvStore> NoteCollectionService<S> {
    /// Creates a service using the system clock and UUID v4 ids.
    pub fn new(store: NoteStore<S>) -> Self {
        Self {
            store,
            corrupt_policy: CorruptStatePolicy::Fail,
            clock: Box::new(Utc::now),
            next_id: Box::new(generate_note_id),
        }
    }

    /// Replaces the time source used to stamp `date`.
    pub fn with_clock(mut self, clock: impl FnMut() -> DateTime<Utc> + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the id source used by `create`.
    pub fn with_id_source(mut self, next_id: impl FnMut() -> NoteId + Send + 'static) -> Self {
        self.next_id = Box::new(next_id);
        self
    }

    /// Opts into a corrupt-state policy for every load. Default is `Fail`.
    pub fn with_corrupt_policy(mut self, policy: CorruptStatePolicy) -> Self {
        self.corrupt_policy = policy;
        self
    }

    /// Returns all notes, newest first.
    pub fn list(&self) -> ServiceResult<Vec<Note>> {
        let mut notes = self.load()?;
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    /// Gets one note by id.
    pub fn get(&self, id: &str) -> ServiceResult<Option<Note>> {
        Ok(self.load()?.into_iter().find(|note| note.id == id))
    }

    /// Creates a note stamped now and prepends it to the collection.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ServiceResult<Note> {
        let mut notes = self.load()?;
        let id = self.fresh_id(&notes)?;
        let note = Note::with_id(id, title, content, format_note_date((self.clock)()));

        notes.insert(0, note.clone());
        self.store.save(&notes)?;
        info!(
            "event=note_create module=service status=ok note_count={}",
            notes.len()
        );
        Ok(note)
    }

    /// Overwrites title/content of an existing note and restamps its date.
    pub fn update(
        &mut self,
        id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ServiceResult<Note> {
        let mut notes = self.load()?;
        let Some(index) = notes.iter().position(|note| note.id == id) else {
            warn!("event=note_update module=service status=error error_code=not_found");
            return Err(NoteServiceError::NotFound(id.to_string()));
        };

        let now = (self.clock)();
        notes[index].revise(title, content, now);
        let updated = notes[index].clone();
        self.store.save(&notes)?;
        info!(
            "event=note_update module=service status=ok note_count={}",
            notes.len()
        );
        Ok(updated)
    }

    /// Removes a note if present. Returns whether a note was removed.
    pub fn delete(&mut self, id: &str) -> ServiceResult<bool> {
        let mut notes = self.load()?;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        let removed = notes.len() != before;

        self.store.save(&notes)?;
        info!(
            "event=note_delete module=service status=ok removed={} note_count={}",
            removed,
            notes.len()
        );
        Ok(removed)
    }

    /// Removes every note whose id is in `ids` with one load and one save.
    ///
    /// Returns the number of notes removed. An empty `ids` touches nothing.
    pub fn delete_many(&mut self, ids: &HashSet<NoteId>) -> ServiceResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut notes = self.load()?;
        let before = notes.len();
        notes.retain(|note| !ids.contains(&note.id));
        let removed = before - notes.len();

        self.store.save(&notes)?;
        info!(
            "event=note_delete_many module=service status=ok requested={} removed={} note_count={}",
            ids.len(),
            removed,
            notes.len()
        );
        Ok(removed)
    }

    /// Case-insensitive substring search over title and content.
    pub fn query(&self, text: &str) -> ServiceResult<Vec<Note>> {
        Ok(filter_notes(&self.list()?, text))
    }

    /// Returns the notes named by `ids`, newest first. Unknown ids are skipped.
    pub fn export(&self, ids: &HashSet<NoteId>) -> ServiceResult<Vec<Note>> {
        let mut notes = self.list()?;
        notes.retain(|note| ids.contains(&note.id));
        Ok(notes)
    }

    /// Same selection as `export`, encoded as a pretty-printed JSON array.
    pub fn export_json(&self, ids: &HashSet<NoteId>) -> ServiceResult<String> {
        let notes = self.export(ids)?;
        encode_export(&notes).map_err(|err| NoteServiceError::Export(err.to_string()))
    }

    /// Export payload with a suggested file name for the share collaborator.
    pub fn export_bundle(&mut self, ids: &HashSet<NoteId>) -> ServiceResult<ExportBundle> {
        let notes = self.export(ids)?;
        let now = (self.clock)();
        let bundle =
            build_bundle(&notes, now).map_err(|err| NoteServiceError::Export(err.to_string()))?;
        info!(
            "event=note_export module=service status=ok note_count={}",
            bundle.note_count
        );
        Ok(bundle)
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    /// Consumes the service and returns the underlying store.
    pub fn into_store(self) -> NoteStore<S> {
        self.store
    }

    fn load(&self) -> ServiceResult<Vec<Note>> {
        Ok(self.store.load_with(self.corrupt_policy)?)
    }

    fn fresh_id(&mut self, notes: &[Note]) -> ServiceResult<NoteId> {
        let taken: HashSet<&str> = notes.iter().map(|note| note.id.as_str()).collect();
        let mut candidate = (self.next_id)();
        for _ in 1..MAX_ID_ATTEMPTS {
            if !taken.contains(candidate.as_str()) {
                return Ok(candidate);
            }
            candidate = (self.next_id)();
        }
        if taken.contains(candidate.as_str()) {
            warn!("event=note_create module=service status=error error_code=duplicate_id");
            return Err(NoteServiceError::DuplicateId(candidate));
        }
        Ok(candidate)
    }
}

/// Stable sort by parsed `date`, newest first; unparseable dates go last.
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by_cached_key(|note| Reverse(note.parsed_date()));
}
