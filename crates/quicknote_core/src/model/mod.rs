//! Domain model for the note collection.
//!
//! # Responsibility
//! - Define the canonical `Note` record persisted by the store.
//! - Own timestamp formatting/parsing used for list ordering.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - The whole collection is the unit of persistence; notes have no relations.

pub mod note;
