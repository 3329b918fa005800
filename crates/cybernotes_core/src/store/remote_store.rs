//! Remote note store over a `NoteTransport`.
//!
//! # Responsibility
//! - Present the remote service through the same `NoteDataSource` contract as
//!   the local store.
//! - Map transport failures to outcome values.
//! - Publish the remote collection after every successful mutation.
//!
//! # Invariants
//! - A transport error on a mutation yields `Rejected`; nothing is published.
//! - A transport error on lookup yields `None`.
//! - Snapshots come from a `List` request issued after the mutation, so they
//!   reflect what the service actually holds.

use super::transport::{NoteTransport, TransportError, TransportRequest, TransportResponse};
use super::{Durability, NoteDataSource, RemoveOutcome, WriteOutcome};
use crate::codec::{decode, encode};
use crate::model::note::Note;
use crate::stream::snapshot::{NotesSnapshot, NotesSubscription, SnapshotPublisher};
use log::{info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct RemoteNoteStore<T: NoteTransport> {
    transport: T,
    publisher: SnapshotPublisher,
    // Serializes mutations so publishes follow request order.
    write_lock: Mutex<()>,
}

impl<T: NoteTransport> RemoteNoteStore<T> {
    /// Wraps a transport. Publishes an empty initial snapshot.
    pub fn new(transport: T) -> Self {
        let publisher = SnapshotPublisher::new();
        publisher.publish(Vec::new());
        Self {
            transport,
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches the whole remote collection, skipping undecodable records.
    pub fn fetch_all(&self) -> Result<Vec<Note>, TransportError> {
        match self.request(TransportRequest::List)? {
            TransportResponse::Records(records) => Ok(records.iter().filter_map(decode).collect()),
            other => Err(unexpected("list", &other)),
        }
    }

    fn request(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let op = request.op();
        match self.transport.send(request) {
            Ok(response) => {
                info!("event=remote_request module=remote_store status=ok op={op}");
                Ok(response)
            }
            Err(err) => {
                warn!("event=remote_request module=remote_store status=error op={op} error={err}");
                Err(err)
            }
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_remote_state(&self) {
        match self.fetch_all() {
            Ok(notes) => {
                self.publisher.publish(notes);
            }
            Err(err) => {
                warn!("event=remote_publish module=remote_store status=skip error={err}");
            }
        }
    }

    fn write(&self, request: TransportRequest) -> WriteOutcome {
        let _guard = self.lock_writes();
        let op = request.op();
        match self.request(request) {
            Ok(TransportResponse::Ack) => {
                self.publish_remote_state();
                WriteOutcome::Accepted(Durability::Persisted)
            }
            Ok(other) => WriteOutcome::Rejected(unexpected(op, &other).to_string()),
            Err(err) => WriteOutcome::Rejected(err.to_string()),
        }
    }
}

impl<T: NoteTransport> NoteDataSource for RemoteNoteStore<T> {
    fn add_note(&self, note: Note) -> WriteOutcome {
        match encode(&note) {
            Ok(record) => self.write(TransportRequest::Add { record }),
            Err(err) => WriteOutcome::Rejected(err.to_string()),
        }
    }

    fn remove_note(&self, uid: &str) -> RemoveOutcome {
        let _guard = self.lock_writes();
        match self.request(TransportRequest::Remove {
            uid: uid.to_string(),
        }) {
            Ok(TransportResponse::Removed(true)) => {
                self.publish_remote_state();
                RemoveOutcome::Removed(Durability::Persisted)
            }
            Ok(TransportResponse::Removed(false)) => RemoveOutcome::NotFound,
            Ok(other) => RemoveOutcome::Rejected(unexpected("remove", &other).to_string()),
            Err(err) => RemoveOutcome::Rejected(err.to_string()),
        }
    }

    fn update_note(&self, note: Note) -> WriteOutcome {
        match encode(&note) {
            Ok(record) => self.write(TransportRequest::Update { record }),
            Err(err) => WriteOutcome::Rejected(err.to_string()),
        }
    }

    fn get_note_by_uid(&self, uid: &str) -> Option<Note> {
        match self.request(TransportRequest::Get {
            uid: uid.to_string(),
        }) {
            Ok(TransportResponse::Record(record)) => record.as_ref().and_then(decode),
            Ok(other) => {
                warn!(
                    "event=remote_request module=remote_store status=error op=get error={}",
                    unexpected("get", &other)
                );
                None
            }
            Err(_) => None,
        }
    }

    fn subscribe(&self) -> NotesSubscription {
        self.publisher.subscribe()
    }

    fn snapshot(&self) -> Option<NotesSnapshot> {
        self.publisher.latest()
    }
}

fn unexpected(op: &str, response: &TransportResponse) -> TransportError {
    TransportError::Protocol(format!("unexpected response to {op}: {response:?}"))
}
