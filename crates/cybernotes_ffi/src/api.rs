//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list/create/update/delete/get to Dart via FRB.
//! - Own the one process-wide note repository.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The notes directory is fixed by the first successful `notes_init`.

use chrono::NaiveDate;
use cybernotes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_app_repository,
    ping as ping_inner, Importance, InMemoryTransport, LocalNoteStore, Note, NoteDraft, NoteEdit,
    NoteService, NotesConfig, RemoteNoteStore,
};
use log::info;
use std::path::PathBuf;
use std::sync::OnceLock;

struct NotesRuntime {
    files_dir: PathBuf,
    service: NoteService<LocalNoteStore, RemoteNoteStore<InMemoryTransport>>,
}

static NOTES_RUNTIME: OnceLock<NotesRuntime> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Opens the notes file inside `files_dir` (the app's private files dir).
///
/// # FFI contract
/// - Idempotent for the same directory.
/// - A different directory after a successful init is rejected.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_init(files_dir: String) -> String {
    let config = match NotesConfig::new(files_dir.trim()) {
        Ok(config) => config,
        Err(err) => return err.to_string(),
    };
    let runtime = NOTES_RUNTIME.get_or_init(|| {
        info!(
            "event=notes_init module=ffi status=ok files_dir={}",
            config.files_dir().display()
        );
        NotesRuntime {
            files_dir: config.files_dir().to_path_buf(),
            service: NoteService::new(open_app_repository(&config)),
        }
    });
    if runtime.files_dir != config.files_dir() {
        return format!(
            "notes already initialized at `{}`; refusing to switch to `{}`",
            runtime.files_dir.display(),
            config.files_dir().display()
        );
    }
    String::new()
}

/// Flat note view for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub uid: String,
    pub title: String,
    pub content: String,
    /// Packed ARGB.
    pub color: i32,
    /// `LOW|NORMAL|HIGH`.
    pub importance: String,
    /// ISO-8601 date (`YYYY-MM-DD`), absent when the note never expires.
    pub self_destruct_date: Option<String>,
}

impl From<&Note> for NoteItem {
    fn from(note: &Note) -> Self {
        Self {
            uid: note.uid().to_string(),
            title: note.title().to_string(),
            content: note.content().to_string(),
            color: note.color(),
            importance: note.importance().as_str().to_string(),
            self_destruct_date: note
                .self_destruct_date()
                .map(|date| date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    pub note: Option<NoteItem>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            note,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

/// Latest local snapshot. Empty before `notes_init`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> Vec<NoteItem> {
    match NOTES_RUNTIME.get() {
        Some(runtime) => runtime.service.list_notes().iter().map(NoteItem::from).collect(),
        None => Vec::new(),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_get(uid: String) -> Option<NoteItem> {
    let runtime = NOTES_RUNTIME.get()?;
    runtime.service.get_note(uid.trim()).as_ref().map(NoteItem::from)
}

/// Creates a note. `importance` and `self_destruct_date` are optional; an
/// unknown importance name or malformed date fails the call.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(
    title: String,
    content: String,
    color: Option<i32>,
    importance: Option<String>,
    self_destruct_date: Option<String>,
) -> NoteActionResponse {
    let Some(runtime) = NOTES_RUNTIME.get() else {
        return NoteActionResponse::failure("notes_init has not been called");
    };
    let mut draft = NoteDraft::new(title, content);
    if let Some(color) = color {
        draft.color = color;
    }
    match parse_importance(importance.as_deref()) {
        Ok(Some(value)) => draft.importance = value,
        Ok(None) => {}
        Err(message) => return NoteActionResponse::failure(message),
    }
    match parse_date(self_destruct_date.as_deref()) {
        Ok(date) => draft.self_destruct_date = date,
        Err(message) => return NoteActionResponse::failure(message),
    }

    match runtime.service.create_note(draft) {
        Ok(note) => NoteActionResponse::success("note created", Some(NoteItem::from(&note))),
        Err(err) => NoteActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Updates fields of an existing note; `None` keeps the current value.
///
/// `clear_self_destruct` removes the expiry date and wins over
/// `self_destruct_date`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(
    uid: String,
    title: Option<String>,
    content: Option<String>,
    color: Option<i32>,
    importance: Option<String>,
    self_destruct_date: Option<String>,
    clear_self_destruct: bool,
) -> NoteActionResponse {
    let Some(runtime) = NOTES_RUNTIME.get() else {
        return NoteActionResponse::failure("notes_init has not been called");
    };
    let importance = match parse_importance(importance.as_deref()) {
        Ok(value) => value,
        Err(message) => return NoteActionResponse::failure(message),
    };
    let date = match parse_date(self_destruct_date.as_deref()) {
        Ok(date) => date,
        Err(message) => return NoteActionResponse::failure(message),
    };
    let edit = NoteEdit {
        title,
        content,
        color,
        importance,
        self_destruct_date: if clear_self_destruct {
            Some(None)
        } else {
            date.map(Some)
        },
    };

    match runtime.service.edit_note(uid.trim(), edit) {
        Ok(note) => NoteActionResponse::success("note updated", Some(NoteItem::from(&note))),
        Err(err) => NoteActionResponse::failure(format!("note_update failed: {err}")),
    }
}

/// Deletes a note from both stores.
///
/// `ok` is true only when both stores removed it; a one-sided removal is
/// reported in `message`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(uid: String) -> NoteActionResponse {
    let Some(runtime) = NOTES_RUNTIME.get() else {
        return NoteActionResponse::failure("notes_init has not been called");
    };
    match runtime.service.delete_note(uid.trim()) {
        Ok(outcome) if outcome.is_removed() => NoteActionResponse::success("note deleted", None),
        Ok(outcome) => NoteActionResponse::failure(format!(
            "note removed from one store only: local={:?} remote={:?}",
            outcome.local, outcome.remote
        )),
        Err(err) => NoteActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

fn parse_importance(value: Option<&str>) -> Result<Option<Importance>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Importance::from_name(&raw.to_ascii_uppercase())
            .map(Some)
            .ok_or_else(|| format!("unsupported importance `{raw}`; expected LOW|NORMAL|HIGH")),
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|err| format!("invalid self_destruct_date `{raw}`: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_create, note_delete, note_get, note_update, notes_init,
        notes_list, parse_date, parse_importance, ping,
    };
    use cybernotes_core::Importance;
    use std::path::PathBuf;
    use std::sync::OnceLock;

    // One notes dir per test process; the runtime cannot be re-pointed.
    fn init_once() {
        static DIR: OnceLock<PathBuf> = OnceLock::new();
        let dir = DIR.get_or_init(|| {
            std::env::temp_dir().join(format!(
                "cybernotes-ffi-{}-{}",
                std::process::id(),
                cybernotes_core::generate_uid()
            ))
        });
        let error = notes_init(dir.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn notes_init_rejects_switching_dir() {
        init_once();
        let error = notes_init("/definitely/another/dir".to_string());
        assert!(error.contains("refusing to switch"));
        assert!(!notes_init("  ".to_string()).is_empty());
    }

    #[test]
    fn create_update_delete_roundtrip() {
        init_once();
        let created = note_create(
            "System Alert".to_string(),
            "sector 7".to_string(),
            Some(-65536),
            Some("high".to_string()),
            Some("2031-02-03".to_string()),
        );
        assert!(created.ok, "{}", created.message);
        let item = created.note.expect("created note");
        assert_eq!(item.importance, "HIGH");
        assert_eq!(item.self_destruct_date.as_deref(), Some("2031-02-03"));
        assert!(notes_list().iter().any(|listed| listed.uid == item.uid));

        let updated = note_update(
            item.uid.clone(),
            Some("Resolved".to_string()),
            None,
            None,
            None,
            None,
            true,
        );
        assert!(updated.ok, "{}", updated.message);
        let updated_item = updated.note.expect("updated note");
        assert_eq!(updated_item.title, "Resolved");
        assert_eq!(updated_item.color, -65536);
        assert_eq!(updated_item.self_destruct_date, None);
        assert_eq!(note_get(item.uid.clone()), Some(updated_item));

        let deleted = note_delete(item.uid.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert_eq!(note_get(item.uid.clone()), None);
        assert!(!note_delete(item.uid).ok);
    }

    #[test]
    fn create_rejects_bad_arguments() {
        init_once();
        let bad_importance = note_create(
            "t".to_string(),
            "c".to_string(),
            None,
            Some("urgent".to_string()),
            None,
        );
        assert!(!bad_importance.ok);
        let bad_date = note_create(
            "t".to_string(),
            "c".to_string(),
            None,
            None,
            Some("31/12/2030".to_string()),
        );
        assert!(!bad_date.ok);
    }

    #[test]
    fn argument_parsers() {
        assert_eq!(parse_importance(None), Ok(None));
        assert_eq!(parse_importance(Some(" low ")), Ok(Some(Importance::Low)));
        assert!(parse_importance(Some("meh")).is_err());
        assert_eq!(parse_date(Some("")), Ok(None));
        assert!(parse_date(Some("2030-02-30")).is_err());
    }
}
