//! Core note persistence and synchronization for CyberNotes.
//! This crate is the single source of truth for note invariants.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod stream;

pub use config::{ConfigError, NotesConfig, NotesPathProvider};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::note::{generate_uid, Importance, Note, NoteUid, DEFAULT_NOTE_COLOR};
pub use repo::note_repo::{DualRemove, DualWrite, NoteRepository};
pub use service::note_service::{NoteDraft, NoteEdit, NoteService, NoteServiceError};
pub use store::local_store::{LoadReport, LocalNoteStore};
pub use store::remote_store::RemoteNoteStore;
pub use store::transport::{
    InMemoryTransport, NoteTransport, TransportError, TransportRequest, TransportResponse,
};
pub use store::{Durability, NoteDataSource, PersistError, RemoveOutcome, WriteOutcome};
pub use stream::snapshot::{NotesSnapshot, NotesSubscription, SnapshotPublisher};

/// Repository shape used by the app: file-backed local store plus the
/// in-memory stand-in for the remote service.
pub type AppNoteRepository = NoteRepository<LocalNoteStore, RemoteNoteStore<InMemoryTransport>>;

/// Opens the local store at `config` and pairs it with a fresh remote stand-in.
pub fn open_app_repository<P: NotesPathProvider + ?Sized>(config: &P) -> AppNoteRepository {
    NoteRepository::new(
        LocalNoteStore::open(config),
        RemoteNoteStore::new(InMemoryTransport::new()),
    )
}

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
