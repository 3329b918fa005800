use crate::model::note::Note;
use crate::store::{NoteDataSource, RemoveOutcome, WriteOutcome};
use crate::stream::snapshot::{NotesSnapshot, NotesSubscription};
use log::warn;

/// Per-store outcomes of one fanned-out write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualWrite {
    pub local: WriteOutcome,
    pub remote: WriteOutcome,
}

impl DualWrite {
    /// Both stores hold the note.
    pub fn is_consistent(&self) -> bool {
        self.local.is_accepted() && self.remote.is_accepted()
    }
}

/// Per-store outcomes of one fanned-out removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualRemove {
    pub local: RemoveOutcome,
    pub remote: RemoveOutcome,
}

impl DualRemove {
    /// Removed from both stores.
    pub fn is_removed(&self) -> bool {
        self.local.is_removed() && self.remote.is_removed()
    }

    /// Both stores ended up agreeing: removed on both sides or absent on both.
    pub fn is_consistent(&self) -> bool {
        matches!(
            (&self.local, &self.remote),
            (RemoveOutcome::Removed(_), RemoveOutcome::Removed(_))
                | (RemoveOutcome::NotFound, RemoveOutcome::NotFound)
        )
    }
}

/// Note collection backed by a local and a remote store.
///
/// The two-sided write is not transactional. A failure on one side leaves the
/// stores diverged; callers see it in `DualWrite`/`DualRemove` and in the
/// `dual_*_diverged` log events. No retry queue exists.
pub struct NoteRepository<L: NoteDataSource, R: NoteDataSource> {
    local: L,
    remote: R,
}

impl<L: NoteDataSource, R: NoteDataSource> NoteRepository<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self { local, remote }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Canonical notes view: the local store's change stream, unchanged.
    pub fn notes_stream(&self) -> NotesSubscription {
        self.local.subscribe()
    }

    /// Latest canonical snapshot without opening a subscription.
    pub fn notes_snapshot(&self) -> Option<NotesSnapshot> {
        self.local.snapshot()
    }

    /// Writes to local, then remote. A remote failure does not roll back local.
    pub fn add_note(&self, note: Note) -> DualWrite {
        let uid = note.uid().to_string();
        let local = self.local.add_note(note.clone());
        let remote = self.remote.add_note(note);
        report_write("add", &uid, DualWrite { local, remote })
    }

    /// Upserts into both stores independently.
    pub fn update_note(&self, note: Note) -> DualWrite {
        let uid = note.uid().to_string();
        let local = self.local.update_note(note.clone());
        let remote = self.remote.update_note(note);
        report_write("update", &uid, DualWrite { local, remote })
    }

    /// Returns `true` only when the note was removed from both stores.
    pub fn remove_note(&self, uid: &str) -> bool {
        self.remove_note_detailed(uid).is_removed()
    }

    pub fn remove_note_detailed(&self, uid: &str) -> DualRemove {
        let outcome = DualRemove {
            local: self.local.remove_note(uid),
            remote: self.remote.remove_note(uid),
        };
        if !outcome.is_consistent() {
            warn!(
                "event=dual_remove_diverged module=repo status=error uid={uid} local={:?} remote={:?}",
                outcome.local, outcome.remote
            );
        }
        outcome
    }

    /// Local result if present, else the remote one.
    pub fn get_note_by_uid(&self, uid: &str) -> Option<Note> {
        self.local
            .get_note_by_uid(uid)
            .or_else(|| self.remote.get_note_by_uid(uid))
    }
}

fn report_write(op: &str, uid: &str, outcome: DualWrite) -> DualWrite {
    if !outcome.is_consistent() {
        warn!(
            "event=dual_write_diverged module=repo status=error op={op} uid={uid} local={:?} remote={:?}",
            outcome.local, outcome.remote
        );
    }
    outcome
}
