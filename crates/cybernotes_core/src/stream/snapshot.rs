//! Replay-of-one snapshot publisher over crossbeam channels.

use crate::model::note::Note;
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Complete state of one store after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesSnapshot {
    /// Publish sequence number, starting at 0 for the first snapshot.
    pub version: u64,
    pub notes: Arc<[Note]>,
}

impl NotesSnapshot {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn find(&self, uid: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.uid() == uid)
    }
}

#[derive(Default)]
struct PublisherState {
    latest: Option<NotesSnapshot>,
    next_version: u64,
    subscribers: Vec<Sender<NotesSnapshot>>,
}

/// Subject holding the latest snapshot and the active subscribers.
#[derive(Default)]
pub struct SnapshotPublisher {
    state: Mutex<PublisherState>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a full snapshot to all live subscribers.
    ///
    /// Returns the version assigned to the snapshot. Subscribers whose
    /// receiving side was dropped are removed.
    pub fn publish(&self, notes: Vec<Note>) -> u64 {
        let mut state = self.lock();
        let snapshot = NotesSnapshot {
            version: state.next_version,
            notes: notes.into(),
        };
        state.next_version += 1;
        state
            .subscribers
            .retain(|sender| sender.send(snapshot.clone()).is_ok());
        state.latest = Some(snapshot.clone());
        snapshot.version
    }

    /// Registers a subscriber and immediately queues the latest snapshot.
    ///
    /// Replay and registration happen under one lock, so a concurrent
    /// `publish` is either replayed or delivered, never both and never lost.
    pub fn subscribe(&self) -> NotesSubscription {
        let (sender, receiver) = unbounded();
        let mut state = self.lock();
        if let Some(latest) = state.latest.clone() {
            // Receiver is alive in this scope.
            let _ = sender.send(latest);
        }
        state.subscribers.push(sender);
        NotesSubscription { receiver }
    }

    pub fn latest(&self) -> Option<NotesSnapshot> {
        self.lock().latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, PublisherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving side of a store's change stream.
pub struct NotesSubscription {
    receiver: Receiver<NotesSnapshot>,
}

impl NotesSubscription {
    /// Blocks until the next snapshot. Returns `None` once the publisher is gone.
    pub fn recv(&self) -> Option<NotesSnapshot> {
        self.receiver.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<NotesSnapshot> {
        match self.receiver.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<NotesSnapshot> {
        match self.receiver.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything queued and returns the most recent snapshot.
    pub fn latest(&self) -> Option<NotesSnapshot> {
        self.receiver.try_iter().last()
    }

    /// Drains everything queued, oldest first.
    pub fn drain(&self) -> Vec<NotesSnapshot> {
        self.receiver.try_iter().collect()
    }
}
