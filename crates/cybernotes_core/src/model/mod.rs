//! Domain model for user notes.
//!
//! # Responsibility
//! - Define the immutable `Note` value shared by every store.
//! - Keep default values (`color`, `importance`) in one place so the codec
//!   and the stores agree on them.
//!
//! # Invariants
//! - A note is identified by its `uid`; the uid never changes after creation.
//! - "Editing" a note always produces a new value with the same uid.

pub mod note;
