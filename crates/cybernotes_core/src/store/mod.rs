//! Note stores and their shared contract.
//!
//! # Responsibility
//! - Define `NoteDataSource`, the one interface both stores implement.
//! - Define outcome values that replace errors at the store boundary.
//!
//! # Invariants
//! - Store operations never panic and never return `Err`; every failure is an
//!   outcome value (`Rejected`, `NotFound`, `MemoryOnly`, `None`).
//! - Every successful mutation publishes the full snapshot on the store's
//!   change stream, in the order mutations were applied.
//! - `uid` is unique within one store's collection.

pub mod local_store;
pub mod remote_store;
pub mod transport;

use crate::model::note::Note;
use crate::stream::snapshot::{NotesSnapshot, NotesSubscription};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Whether an accepted change also reached durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// The change is stored by the backing medium (file or remote service).
    Persisted,
    /// The change is applied in memory only; the durable write failed.
    MemoryOnly,
}

/// Result of `add_note` / `update_note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The store now holds the note.
    Accepted(Durability),
    /// The store did not apply the change.
    Rejected(String),
}

impl WriteOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Accepted(Durability::Persisted))
    }
}

/// Result of `remove_note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Durability),
    NotFound,
    /// The store could not be asked (e.g. remote unreachable).
    Rejected(String),
}

impl RemoveOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed(_))
    }
}

/// Common contract of the local and remote note stores.
pub trait NoteDataSource: Send + Sync {
    /// Inserts a note. An existing entry with the same uid is replaced in place.
    fn add_note(&self, note: Note) -> WriteOutcome;
    /// Removes the note with `uid`, reporting `NotFound` when absent.
    fn remove_note(&self, uid: &str) -> RemoveOutcome;
    /// Replaces the note with the same uid, or inserts it when absent.
    fn update_note(&self, note: Note) -> WriteOutcome;
    /// Pure lookup; never publishes.
    fn get_note_by_uid(&self, uid: &str) -> Option<Note>;
    /// Subscribes to full snapshots; the latest one is delivered immediately.
    fn subscribe(&self) -> NotesSubscription;
    /// Latest published snapshot, read without registering a subscriber.
    fn snapshot(&self) -> Option<NotesSnapshot>;
}

/// Failure to mirror the in-memory collection to disk.
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Encode(serde_json::Error),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "notes file write failed: {err}"),
            Self::Encode(err) => write!(f, "note record encode failed: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Inserts or replaces by uid, keeping the position of an existing entry.
///
/// Returns `true` when an existing entry was replaced.
pub(crate) fn upsert(notes: &mut Vec<Note>, note: Note) -> bool {
    match notes.iter().position(|existing| existing.uid() == note.uid()) {
        Some(index) => {
            notes[index] = note;
            true
        }
        None => {
            notes.push(note);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{upsert, Durability, RemoveOutcome, WriteOutcome};
    use crate::model::note::Note;

    #[test]
    fn upsert_replaces_in_place() {
        let mut notes = vec![
            Note::with_uid("a", "A", ""),
            Note::with_uid("b", "B", ""),
        ];
        assert!(upsert(&mut notes, Note::with_uid("a", "A2", "")));
        assert!(!upsert(&mut notes, Note::with_uid("c", "C", "")));
        let titles: Vec<&str> = notes.iter().map(|n| n.title()).collect();
        assert_eq!(titles, vec!["A2", "B", "C"]);
    }

    #[test]
    fn outcome_helpers() {
        assert!(WriteOutcome::Accepted(Durability::MemoryOnly).is_accepted());
        assert!(!WriteOutcome::Accepted(Durability::MemoryOnly).is_persisted());
        assert!(!WriteOutcome::Rejected("offline".into()).is_accepted());
        assert!(RemoveOutcome::Removed(Durability::Persisted).is_removed());
        assert!(!RemoveOutcome::NotFound.is_removed());
    }
}
