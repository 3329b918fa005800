//! Note use-case services.
//!
//! # Responsibility
//! - Turn UI intents (create, edit, delete, list) into repository calls.
//! - Keep UI/FFI layers decoupled from store details.

pub mod note_service;
