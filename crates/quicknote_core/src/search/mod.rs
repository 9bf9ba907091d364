//! Client-side note search.
//!
//! # Responsibility
//! - Filter an already-loaded collection by substring.
//! - Keep matching rules in one place for service and FFI callers.

pub mod substring;
