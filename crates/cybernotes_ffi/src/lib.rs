//! Flutter-facing bridge over `cybernotes_core`.

pub mod api;
