//! Request/response seam to the remote notes service.
//!
//! # Responsibility
//! - Define the network-shaped contract `RemoteNoteStore` talks through.
//! - Provide `InMemoryTransport`, a stand-in service with the same contract.
//!
//! # Invariants
//! - Records on the wire are codec objects (`crate::codec::encode`).
//! - Every request resolves to a response or a `TransportError`; timeouts and
//!   cancellation are the transport's concern and surface as errors.

use crate::model::note::NoteUid;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub enum TransportRequest {
    Add { record: Value },
    Update { record: Value },
    Remove { uid: NoteUid },
    Get { uid: NoteUid },
    List,
}

impl TransportRequest {
    /// Short operation label for logs.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Remove { .. } => "remove",
            Self::Get { .. } => "get",
            Self::List => "list",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportResponse {
    Ack,
    Removed(bool),
    Record(Option<Value>),
    Records(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Unavailable(String),
    Timeout,
    /// The service answered with something the request did not expect.
    Protocol(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "remote unavailable: {reason}"),
            Self::Timeout => write!(f, "remote request timed out"),
            Self::Protocol(details) => write!(f, "remote protocol error: {details}"),
        }
    }
}

impl Error for TransportError {}

/// Network-shaped collaborator behind the remote store.
pub trait NoteTransport: Send + Sync {
    fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// In-process stand-in for the remote notes service.
///
/// Stores raw records keyed by their `uid`, in insertion order.
#[derive(Default)]
pub struct InMemoryTransport {
    records: Mutex<Vec<(NoteUid, Value)>>,
    offline: AtomicBool,
    failures_pending: AtomicUsize,
    requests_served: AtomicUsize,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every request fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes the next `count` requests fail with `Timeout`.
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Number of requests that reached the service (failed ones excluded).
    pub fn requests_served(&self) -> usize {
        self.requests_served.load(Ordering::SeqCst)
    }

    /// Raw stored records, bypassing failure injection.
    pub fn records(&self) -> Vec<Value> {
        self.lock().iter().map(|(_, record)| record.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(NoteUid, Value)>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_injected_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                pending.checked_sub(1)
            })
            .is_ok()
    }

    fn upsert_record(&self, record: Value) -> Result<TransportResponse, TransportError> {
        let uid = record
            .get("uid")
            .and_then(Value::as_str)
            .ok_or_else(|| TransportError::Protocol("record has no string uid".to_string()))?
            .to_string();
        let mut records = self.lock();
        match records.iter_mut().find(|(existing, _)| *existing == uid) {
            Some(entry) => entry.1 = record,
            None => records.push((uid, record)),
        }
        Ok(TransportResponse::Ack)
    }
}

impl NoteTransport for InMemoryTransport {
    fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("service offline".to_string()));
        }
        if self.take_injected_failure() {
            return Err(TransportError::Timeout);
        }
        self.requests_served.fetch_add(1, Ordering::SeqCst);

        match request {
            TransportRequest::Add { record } | TransportRequest::Update { record } => {
                self.upsert_record(record)
            }
            TransportRequest::Remove { uid } => {
                let mut records = self.lock();
                let before = records.len();
                records.retain(|(existing, _)| *existing != uid);
                Ok(TransportResponse::Removed(records.len() != before))
            }
            TransportRequest::Get { uid } => Ok(TransportResponse::Record(
                self.lock()
                    .iter()
                    .find(|(existing, _)| *existing == uid)
                    .map(|(_, record)| record.clone()),
            )),
            TransportRequest::List => Ok(TransportResponse::Records(self.records())),
        }
    }
}
