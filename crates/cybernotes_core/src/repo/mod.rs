//! Two-source note repository.
//!
//! # Responsibility
//! - Compose the local and remote stores behind one note collection.
//! - Expose the local store's change stream as the canonical notes view.
//!
//! # Invariants
//! - Writes go to local first, then remote; both are always attempted.
//! - Reads prefer local; remote is only a fallback.
//! - Divergence between the stores is reported, never reconciled here.

pub mod note_repo;
