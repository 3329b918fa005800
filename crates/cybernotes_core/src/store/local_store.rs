//! File-backed note store.
//!
//! # Responsibility
//! - Keep the device's authoritative note list in memory.
//! - Mirror it to one file, one JSON record per line.
//! - Publish the full list after every mutation.
//!
//! # Invariants
//! - Every write rewrites the whole file through a temp file in the same
//!   directory renamed over the target; there is no append path and no
//!   partially written notes file.
//! - A corrupt line is skipped on load and never aborts the rest of the file.
//! - A failed file write leaves the in-memory change in place and is reported
//!   as `Durability::MemoryOnly`, never as an error.
//! - The backing file has exactly one owning store per process.

use super::{upsert, Durability, NoteDataSource, PersistError, RemoveOutcome, WriteOutcome};
use crate::codec::{decode_line, encode_line};
use crate::config::NotesPathProvider;
use crate::model::note::Note;
use crate::stream::snapshot::{NotesSnapshot, NotesSubscription, SnapshotPublisher};
use log::{error, info, warn};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Counters reported by one file load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Local note store backed by a line-oriented JSON file.
pub struct LocalNoteStore {
    path: PathBuf,
    notes: Mutex<Vec<Note>>,
    publisher: SnapshotPublisher,
    load_report: LoadReport,
}

impl LocalNoteStore {
    /// Opens the store and loads the backing file.
    ///
    /// A missing or unreadable file yields an empty store. The loaded list is
    /// published as the first snapshot.
    pub fn open<P: NotesPathProvider + ?Sized>(provider: &P) -> Self {
        let path = provider.notes_file_path();
        let (notes, load_report) = load_notes(&path);
        let publisher = SnapshotPublisher::new();
        publisher.publish(notes.clone());
        Self {
            path,
            notes: Mutex::new(notes),
            publisher,
            load_report,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    /// Current in-memory list, in insertion order.
    pub fn notes(&self) -> Vec<Note> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Live change-stream subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.publisher.subscriber_count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Note>> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persists and publishes. Must be called while holding the list lock so
    /// file contents and snapshots follow mutation order.
    fn commit(&self, notes: &[Note]) -> Durability {
        let started_at = Instant::now();
        let durability = match persist_notes(&self.path, notes) {
            Ok(()) => {
                info!(
                    "event=notes_persist module=local_store status=ok count={} duration_ms={}",
                    notes.len(),
                    started_at.elapsed().as_millis()
                );
                Durability::Persisted
            }
            Err(err) => {
                error!(
                    "event=notes_persist module=local_store status=error count={} path={} error={}",
                    notes.len(),
                    self.path.display(),
                    err
                );
                Durability::MemoryOnly
            }
        };
        self.publisher.publish(notes.to_vec());
        durability
    }
}

impl NoteDataSource for LocalNoteStore {
    fn add_note(&self, note: Note) -> WriteOutcome {
        let mut notes = self.lock();
        let uid = note.uid().to_string();
        let replaced = upsert(&mut notes, note);
        info!(
            "event=note_add module=local_store status=ok uid={uid} mode={}",
            if replaced { "replace" } else { "insert" }
        );
        WriteOutcome::Accepted(self.commit(&notes))
    }

    fn remove_note(&self, uid: &str) -> RemoveOutcome {
        let mut notes = self.lock();
        let Some(index) = notes.iter().position(|note| note.uid() == uid) else {
            info!(
                "event=note_remove module=local_store status=skip reason=not_found uid={uid}"
            );
            return RemoveOutcome::NotFound;
        };
        notes.remove(index);
        info!("event=note_remove module=local_store status=ok uid={uid}");
        RemoveOutcome::Removed(self.commit(&notes))
    }

    fn update_note(&self, note: Note) -> WriteOutcome {
        let mut notes = self.lock();
        let uid = note.uid().to_string();
        let replaced = upsert(&mut notes, note);
        info!(
            "event=note_update module=local_store status=ok uid={uid} mode={}",
            if replaced { "replace" } else { "insert" }
        );
        WriteOutcome::Accepted(self.commit(&notes))
    }

    fn get_note_by_uid(&self, uid: &str) -> Option<Note> {
        self.lock().iter().find(|note| note.uid() == uid).cloned()
    }

    fn subscribe(&self) -> NotesSubscription {
        self.publisher.subscribe()
    }

    fn snapshot(&self) -> Option<NotesSnapshot> {
        self.publisher.latest()
    }
}

fn load_notes(path: &Path) -> (Vec<Note>, LoadReport) {
    let started_at = Instant::now();
    info!(
        "event=notes_load module=local_store status=start path={}",
        path.display()
    );

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                "event=notes_load module=local_store status=skip reason=file_missing path={}",
                path.display()
            );
            return (Vec::new(), LoadReport::default());
        }
        Err(err) => {
            error!(
                "event=notes_load module=local_store status=error path={} error={}",
                path.display(),
                err
            );
            return (Vec::new(), LoadReport::default());
        }
    };

    let mut notes = Vec::new();
    let mut report = LoadReport::default();
    for (index, raw_line) in bytes.split(|byte| *byte == b'\n').enumerate() {
        let raw_line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
        if raw_line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let decoded = std::str::from_utf8(raw_line).ok().and_then(decode_line);
        match decoded {
            Some(note) => {
                if upsert(&mut notes, note) {
                    report.duplicates += 1;
                }
            }
            None => {
                report.skipped += 1;
                warn!(
                    "event=note_record_skipped module=local_store status=skip line={}",
                    index + 1
                );
            }
        }
    }
    report.loaded = notes.len();

    info!(
        "event=notes_load module=local_store status=ok loaded={} skipped={} duplicates={} duration_ms={}",
        report.loaded,
        report.skipped,
        report.duplicates,
        started_at.elapsed().as_millis()
    );
    (notes, report)
}

fn persist_notes(path: &Path, notes: &[Note]) -> Result<(), PersistError> {
    let mut body = String::new();
    for note in notes {
        body.push_str(&encode_line(note)?);
        body.push('\n');
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    // Write next to the target and rename over it, so a reader or a crash
    // sees either the old file or the new one.
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(body.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
