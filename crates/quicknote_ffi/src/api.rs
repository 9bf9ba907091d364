//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list/create/update/delete/search/export to Dart via FRB.
//! - Turn core errors into message envelopes the UI can show directly.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call that touches the collection holds `COLLECTION_LOCK` for its
//!   whole load-modify-save cycle, so concurrent Dart isolates cannot lose
//!   each other's writes.

use log::warn;
use quicknote_core::db::open_db;
use quicknote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, Note, NoteCollectionService, NoteStore, ServiceResult, SqliteKvStore,
};
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock, PoisonError};

static CORE_CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static COLLECTION_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note projection handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Raw stored timestamp.
    pub date: String,
    /// Day-level label for list cards, e.g. `Fri Oct 16 2026`.
    pub display_date: String,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        let display_date = note.display_date();
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            date: note.date,
            display_date,
        }
    }
}

/// List/search response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Notes newest first (empty on failure).
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Single-note response envelope for get/create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    pub note: Option<NoteItem>,
    pub message: String,
}

/// Delete response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesDeleteResponse {
    pub ok: bool,
    pub removed: u32,
    pub message: String,
}

/// Export payload for the Dart side to write and share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesExportResponse {
    pub ok: bool,
    pub file_name: String,
    pub mime_type: String,
    pub json: String,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Note) -> Self {
        Self {
            ok: true,
            note: Some(note.into()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

impl NotesListResponse {
    fn from_result(operation: &str, result: Result<Vec<Note>, String>) -> Self {
        match result {
            Ok(notes) => {
                let message = if notes.is_empty() {
                    "No notes.".to_string()
                } else {
                    format!("Found {} note(s).", notes.len())
                };
                Self {
                    ok: true,
                    items: notes.into_iter().map(NoteItem::from).collect(),
                    message,
                }
            }
            Err(err) => Self {
                ok: false,
                items: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Lists all notes newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    NotesListResponse::from_result("notes_list", with_note_service(|service| service.list()))
}

/// Searches titles and contents (case-insensitive substring).
#[flutter_rust_bridge::frb(sync)]
pub fn notes_search(text: String) -> NotesListResponse {
    NotesListResponse::from_result(
        "notes_search",
        with_note_service(|service| service.query(text.as_str())),
    )
}

/// Loads one note for the edit form.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_get(id: String) -> NoteActionResponse {
    match with_note_service(|service| service.get(id.as_str())) {
        Ok(Some(note)) => NoteActionResponse::success("Note loaded.", note),
        Ok(None) => NoteActionResponse::failure(format!("notes_get failed: note not found: {id}")),
        Err(err) => NoteActionResponse::failure(format!("notes_get failed: {err}")),
    }
}

/// Creates a note from the add form. Title and content are trimmed.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create(title: String, content: String) -> NoteActionResponse {
    match with_note_service(|service| service.create(title.trim(), content.trim())) {
        Ok(note) => NoteActionResponse::success("Note created.", note),
        Err(err) => NoteActionResponse::failure(format!("notes_create failed: {err}")),
    }
}

/// Saves the edit form over an existing note. Title and content are trimmed.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_update(id: String, title: String, content: String) -> NoteActionResponse {
    match with_note_service(|service| {
        service.update(id.as_str(), title.trim(), content.trim())
    }) {
        Ok(note) => NoteActionResponse::success("Note updated.", note),
        Err(err) => NoteActionResponse::failure(format!("notes_update failed: {err}")),
    }
}

/// Deletes one note; deleting a missing note still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(id: String) -> NotesDeleteResponse {
    delete_response(
        "notes_delete",
        with_note_service(|service| service.delete(id.as_str()).map(usize::from)),
    )
}

/// Deletes every selected note in one storage round trip.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete_many(ids: Vec<String>) -> NotesDeleteResponse {
    let ids: HashSet<String> = ids.into_iter().collect();
    delete_response(
        "notes_delete_many",
        with_note_service(|service| service.delete_many(&ids)),
    )
}

/// Builds the JSON export for the selected notes.
///
/// Fails when the selection is empty so the UI can prompt for a selection.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_export_json(ids: Vec<String>) -> NotesExportResponse {
    let ids: HashSet<String> = ids.into_iter().collect();
    let failure = |message: String| NotesExportResponse {
        ok: false,
        file_name: String::new(),
        mime_type: String::new(),
        json: String::new(),
        message,
    };
    if ids.is_empty() {
        return failure("notes_export_json failed: select at least one note".to_string());
    }

    match with_note_service(|service| service.export_bundle(&ids)) {
        Ok(bundle) => NotesExportResponse {
            ok: true,
            message: format!("Exported {} note(s).", bundle.note_count),
            file_name: bundle.file_name,
            mime_type: bundle.mime_type.to_string(),
            json: bundle.json,
        },
        Err(err) => failure(format!("notes_export_json failed: {err}")),
    }
}

fn delete_response(operation: &str, result: Result<usize, String>) -> NotesDeleteResponse {
    match result {
        Ok(removed) => NotesDeleteResponse {
            ok: true,
            removed: u32::try_from(removed).unwrap_or(u32::MAX),
            message: format!("Deleted {removed} note(s)."),
        },
        Err(err) => NotesDeleteResponse {
            ok: false,
            removed: 0,
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn core_config() -> &'static CoreConfig {
    CORE_CONFIG.get_or_init(CoreConfig::from_env)
}

fn with_note_service<T>(
    f: impl FnOnce(&mut NoteCollectionService<SqliteKvStore<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let _guard = COLLECTION_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=collection_lock module=ffi status=recovered error_code=poisoned");
        PoisonError::into_inner(poisoned)
    });

    let config = core_config();
    let conn = open_db(&config.db_path).map_err(|err| format!("notes DB open failed: {err}"))?;
    let kv = SqliteKvStore::try_new(&conn).map_err(|err| format!("notes store init failed: {err}"))?;
    let mut service =
        NoteCollectionService::new(NoteStore::new(kv)).with_corrupt_policy(config.corrupt_policy);
    f(&mut service).map_err(|err| err.to_string())
}
