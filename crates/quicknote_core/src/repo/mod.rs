//! Persistence layer: the key-value medium and the note collection store.
//!
//! # Responsibility
//! - Define the key-value contract the note store is written against.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - The note collection lives under exactly one key.
//! - Read paths reject corrupt persisted state instead of masking it.

pub mod kv_store;
pub mod note_store;
