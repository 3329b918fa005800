use cybernotes_core::{
    Durability, Importance, LocalNoteStore, Note, NoteDataSource, NotesConfig, RemoveOutcome,
    WriteOutcome,
};
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn store_in(dir: &tempfile::TempDir) -> LocalNoteStore {
    LocalNoteStore::open(&NotesConfig::new(dir.path()).unwrap())
}

fn file_lines(store: &LocalNoteStore) -> Vec<String> {
    std::fs::read_to_string(store.path())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.is_empty());
    assert!(!store.path().exists());
    assert_eq!(store.load_report().loaded, 0);
}

#[test]
fn two_default_notes_persist_as_two_minimal_lines() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.add_note(Note::create("A", "x"));
    store.add_note(Note::create("B", "y"));

    let lines = file_lines(&store);
    assert_eq!(lines.len(), 2);
    for (line, title) in lines.iter().zip(["A", "B"]) {
        let record: Value = serde_json::from_str(line).unwrap();
        let keys: HashSet<&str> = record
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, HashSet::from(["uid", "title", "content"]));
        assert_eq!(record["title"], title);
    }
}

#[test]
fn corrupt_line_does_not_lose_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(cybernotes_core::config::DEFAULT_DATA_FILE_NAME);
    std::fs::write(
        &path,
        concat!(
            "{\"uid\":\"1\",\"title\":\"one\",\"content\":\"a\"}\n",
            "{\"uid\":\"2\",\"title\":\"two\",\"content\":\"b\"}\n",
            "{not json at all\n",
            "{\"uid\":\"3\",\"title\":\"three\",\"content\":\"c\",\"importance\":\"HIGH\"}\n",
        ),
    )
    .unwrap();

    let store = LocalNoteStore::open(&path);
    assert_eq!(store.len(), 3);
    assert_eq!(store.load_report().skipped, 1);
    assert_eq!(
        store.get_note_by_uid("3").unwrap().importance(),
        Importance::High
    );
}

#[test]
fn record_missing_content_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(
        &path,
        "{\"title\":\"T\"}\n{\"uid\":\"ok\",\"title\":\"T\",\"content\":\"C\"}\n",
    )
    .unwrap();

    let store = LocalNoteStore::open(&path);
    assert_eq!(store.len(), 1);
    assert!(store.get_note_by_uid("ok").is_some());
}

#[test]
fn reopen_restores_persisted_notes() {
    let dir = tempfile::tempdir().unwrap();
    let note = Note::create("keep", "me").with_color(-256);
    {
        let store = store_in(&dir);
        assert_eq!(
            store.add_note(note.clone()),
            WriteOutcome::Accepted(Durability::Persisted)
        );
    }
    let reopened = store_in(&dir);
    assert_eq!(reopened.notes(), vec![note]);
}

#[test]
fn add_and_update_never_duplicate_uids() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let first = Note::create("first", "");
    let second = Note::create("second", "");

    store.add_note(first.clone());
    store.add_note(second.clone());
    store.update_note(first.clone().with_title("first v2"));
    store.add_note(first.clone().with_title("first v3"));
    store.update_note(second.clone().with_content("changed"));

    let notes = store.notes();
    let uids: HashSet<&str> = notes.iter().map(Note::uid).collect();
    assert_eq!(notes.len(), 2);
    assert_eq!(uids.len(), 2);
    assert_eq!(notes[0].title(), "first v3");
    assert_eq!(notes[1].content(), "changed");
}

#[test]
fn update_of_unknown_uid_matches_add() {
    let added_dir = tempfile::tempdir().unwrap();
    let updated_dir = tempfile::tempdir().unwrap();
    let seed = Note::with_uid("seed", "seed", "");
    let note = Note::with_uid("new", "new", "body").with_importance(Importance::Low);

    let added = store_in(&added_dir);
    added.add_note(seed.clone());
    added.add_note(note.clone());

    let updated = store_in(&updated_dir);
    updated.add_note(seed);
    updated.update_note(note);

    assert_eq!(added.notes(), updated.notes());
    assert_eq!(file_lines(&added), file_lines(&updated));
}

#[test]
fn update_keeps_position() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    for uid in ["a", "b", "c"] {
        store.add_note(Note::with_uid(uid, uid, ""));
    }
    store.update_note(Note::with_uid("b", "B!", ""));
    let titles: Vec<String> = store.notes().iter().map(|n| n.title().to_string()).collect();
    assert_eq!(titles, vec!["a", "B!", "c"]);
}

#[test]
fn remove_reports_not_found_without_touching_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let subscription = store.subscribe();
    subscription.drain();

    assert_eq!(store.remove_note("missing"), RemoveOutcome::NotFound);
    assert!(!store.path().exists());
    assert!(subscription.try_recv().is_none());

    let note = Note::create("t", "c");
    store.add_note(note.clone());
    assert_eq!(
        store.remove_note(note.uid()),
        RemoveOutcome::Removed(Durability::Persisted)
    );
    assert!(store.is_empty());
    assert!(file_lines(&store).is_empty());
}

#[test]
fn get_by_uid_does_not_publish() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let note = Note::create("t", "c");
    store.add_note(note.clone());
    let subscription = store.subscribe();
    subscription.drain();

    assert_eq!(store.get_note_by_uid(note.uid()), Some(note));
    assert_eq!(store.get_note_by_uid("nope"), None);
    assert!(subscription.try_recv().is_none());
}

#[test]
fn snapshot_reads_latest_without_subscribing() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert_eq!(store.snapshot().map(|snapshot| snapshot.len()), Some(0));

    store.add_note(Note::with_uid("a", "t", "c"));
    for _ in 0..100 {
        let snapshot = store.snapshot().expect("published on open");
        assert_eq!(snapshot.notes.to_vec(), store.notes());
    }
    assert_eq!(store.subscriber_count(), 0);

    let _subscription = store.subscribe();
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn late_subscriber_sees_latest_then_every_change() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let early = store.subscribe();

    for index in 0..3 {
        store.add_note(Note::with_uid(format!("n{index}"), "t", ""));
    }

    let late = store.subscribe();
    let replay = late.try_recv().expect("latest snapshot replayed");
    assert_eq!(replay.len(), 3);
    assert_eq!(replay.notes.to_vec(), store.notes());
    assert!(late.try_recv().is_none());

    store.remove_note("n1");
    let next = late.try_recv().expect("change after subscribe");
    assert_eq!(next.len(), 2);
    assert!(next.version > replay.version);

    let early_versions: Vec<u64> = early.drain().iter().map(|s| s.version).collect();
    assert_eq!(early_versions, vec![0, 1, 2, 3, 4]);
}

#[test]
fn write_failure_keeps_change_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be read or written as the notes file.
    let path: PathBuf = dir.path().to_path_buf();
    let store = LocalNoteStore::open(&path);
    let subscription = store.subscribe();
    subscription.drain();
    let note = Note::create("volatile", "");

    let outcome = store.add_note(note.clone());

    assert_eq!(outcome, WriteOutcome::Accepted(Durability::MemoryOnly));
    assert!(outcome.is_accepted());
    assert!(!outcome.is_persisted());
    assert_eq!(store.get_note_by_uid(note.uid()), Some(note.clone()));
    assert_eq!(subscription.try_recv().unwrap().len(), 1);
    assert_eq!(
        store.remove_note(note.uid()),
        RemoveOutcome::Removed(Durability::MemoryOnly)
    );
}

#[test]
fn concurrent_writers_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(store_in(&dir));
    let subscription = store.subscribe();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for index in 0..10 {
                    store.add_note(Note::with_uid(format!("w{worker}-{index}"), "t", ""));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 40);
    assert_eq!(file_lines(&store).len(), 40);
    let snapshots = subscription.drain();
    assert!(snapshots.windows(2).all(|pair| pair[0].version < pair[1].version));
    assert!(snapshots.windows(2).all(|pair| pair[0].len() + 1 == pair[1].len()));
    assert_eq!(snapshots.last().unwrap().len(), 40);
}
