//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate read-modify-write cycles over the note store.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod export;
pub mod note_service;
pub mod selection;
