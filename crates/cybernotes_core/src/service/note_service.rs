//! Note use-case service.
//!
//! # Responsibility
//! - Build new notes from drafts and edited notes from field overrides.
//! - Route every change through `NoteRepository`.
//!
//! # Invariants
//! - Edits keep the note's uid.
//! - A change the local store rejects is an error; a remote rejection is not
//!   (the local write is the durability guarantee).

use crate::model::note::{Importance, Note, NoteUid, DEFAULT_NOTE_COLOR};
use crate::repo::note_repo::{DualRemove, DualWrite, NoteRepository};
use crate::store::{NoteDataSource, RemoveOutcome, WriteOutcome};
use crate::stream::snapshot::NotesSubscription;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteServiceError {
    NoteNotFound(NoteUid),
    /// The local store refused the change.
    Rejected { uid: NoteUid, reason: String },
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(uid) => write!(f, "note not found: {uid}"),
            Self::Rejected { uid, reason } => write!(f, "note {uid} rejected: {reason}"),
        }
    }
}

impl Error for NoteServiceError {}

/// Input for a new note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub color: i32,
    pub importance: Importance,
    pub self_destruct_date: Option<NaiveDate>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            color: DEFAULT_NOTE_COLOR,
            importance: Importance::Normal,
            self_destruct_date: None,
        }
    }

    fn into_note(self) -> Note {
        Note::create(self.title, self.content)
            .with_color(self.color)
            .with_importance(self.importance)
            .with_self_destruct_date(self.self_destruct_date)
    }
}

/// Field overrides for an existing note. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<i32>,
    pub importance: Option<Importance>,
    /// `Some(None)` clears the expiry date.
    pub self_destruct_date: Option<Option<NaiveDate>>,
}

impl NoteEdit {
    pub fn apply(self, note: Note) -> Note {
        let mut note = note;
        if let Some(title) = self.title {
            note = note.with_title(title);
        }
        if let Some(content) = self.content {
            note = note.with_content(content);
        }
        if let Some(color) = self.color {
            note = note.with_color(color);
        }
        if let Some(importance) = self.importance {
            note = note.with_importance(importance);
        }
        if let Some(date) = self.self_destruct_date {
            note = note.with_self_destruct_date(date);
        }
        note
    }
}

pub struct NoteService<L: NoteDataSource, R: NoteDataSource> {
    repo: NoteRepository<L, R>,
}

impl<L: NoteDataSource, R: NoteDataSource> NoteService<L, R> {
    pub fn new(repo: NoteRepository<L, R>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &NoteRepository<L, R> {
        &self.repo
    }

    /// Creates a note with a fresh uid and stores it in both sources.
    pub fn create_note(&self, draft: NoteDraft) -> Result<Note, NoteServiceError> {
        let note = draft.into_note();
        let outcome = self.repo.add_note(note.clone());
        ensure_local_accepted(&note, &outcome)?;
        Ok(note)
    }

    /// Applies `edit` to the stored note and upserts the result.
    pub fn edit_note(&self, uid: &str, edit: NoteEdit) -> Result<Note, NoteServiceError> {
        let current = self
            .repo
            .get_note_by_uid(uid)
            .ok_or_else(|| NoteServiceError::NoteNotFound(uid.to_string()))?;
        let edited = edit.apply(current);
        let outcome = self.repo.update_note(edited.clone());
        ensure_local_accepted(&edited, &outcome)?;
        Ok(edited)
    }

    /// Removes from both sources. Fails only when neither source had the note.
    pub fn delete_note(&self, uid: &str) -> Result<DualRemove, NoteServiceError> {
        let outcome = self.repo.remove_note_detailed(uid);
        if matches!(
            (&outcome.local, &outcome.remote),
            (RemoveOutcome::NotFound, RemoveOutcome::NotFound)
        ) {
            return Err(NoteServiceError::NoteNotFound(uid.to_string()));
        }
        Ok(outcome)
    }

    pub fn get_note(&self, uid: &str) -> Option<Note> {
        self.repo.get_note_by_uid(uid)
    }

    /// Latest canonical (local) snapshot.
    pub fn list_notes(&self) -> Vec<Note> {
        self.repo
            .notes_snapshot()
            .map(|snapshot| snapshot.notes.to_vec())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> NotesSubscription {
        self.repo.notes_stream()
    }
}

fn ensure_local_accepted(note: &Note, outcome: &DualWrite) -> Result<(), NoteServiceError> {
    match &outcome.local {
        WriteOutcome::Accepted(_) => Ok(()),
        WriteOutcome::Rejected(reason) => Err(NoteServiceError::Rejected {
            uid: note.uid().to_string(),
            reason: reason.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::NoteEdit;
    use crate::model::note::{Importance, Note};
    use chrono::NaiveDate;

    #[test]
    fn edit_applies_only_given_fields() {
        let date = NaiveDate::from_ymd_opt(2031, 5, 6);
        let note = Note::with_uid("u", "title", "body").with_self_destruct_date(date);
        let edit = NoteEdit {
            content: Some("new body".to_string()),
            importance: Some(Importance::Low),
            ..NoteEdit::default()
        };

        let edited = edit.apply(note);
        assert_eq!(edited.uid(), "u");
        assert_eq!(edited.title(), "title");
        assert_eq!(edited.content(), "new body");
        assert_eq!(edited.importance(), Importance::Low);
        assert_eq!(edited.self_destruct_date(), date);
    }

    #[test]
    fn edit_can_clear_expiry() {
        let note = Note::with_uid("u", "t", "c")
            .with_self_destruct_date(NaiveDate::from_ymd_opt(2031, 1, 1));
        let edit = NoteEdit {
            self_destruct_date: Some(None),
            ..NoteEdit::default()
        };
        assert_eq!(edit.apply(note).self_destruct_date(), None);
    }
}
