//! Core domain logic for QuickNote.
//! This crate owns note persistence, ordering, search and export invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{CoreConfig, LogLevel};
pub use logging::{init_logging, logging_status};
pub use model::note::{format_note_date, parse_note_date, Note, NoteId};
pub use repo::kv_store::{KvError, KvResult, KvStore, MemoryKvStore, SqliteKvStore};
pub use repo::note_store::{CorruptStatePolicy, NoteStore, StoreError, StoreResult, NOTES_KEY};
pub use search::substring::{filter_notes, NoteQuery};
pub use service::export::{ExportBundle, EXPORT_MIME_TYPE};
pub use service::note_service::{NoteCollectionService, NoteServiceError, ServiceResult};
pub use service::selection::Selection;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
