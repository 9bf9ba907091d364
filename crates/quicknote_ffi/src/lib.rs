//! Flutter bridge crate for QuickNote core.

pub mod api;
