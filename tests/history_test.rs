//! Journal save/list/delete against the JSON data file
//!
//! Walks one session from form entry to deletion, reopening the file
//! between steps the way separate CLI invocations do.

use chrono::NaiveDate;
use jurnal_bimbingan::file_store::FileBackend;
use jurnal_common::input::{InputEvent, PointerPhase, SurfaceOffset};
use jurnal_common::notify::{messages, Toast};
use jurnal_common::record::{FormField, SignatureRole};
use jurnal_common::{history, Error, FormSession, RecordStore, DRAFT_KEY};
use jurnal_common::store::KeyValueBackend;
use std::path::Path;
use std::time::Instant;
use tempfile::tempdir;

fn open(path: &Path) -> FormSession<FileBackend> {
    let backend = FileBackend::open(path).expect("open data file");
    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    FormSession::new(RecordStore::new(backend), 400, 200, today)
}

fn sign(session: &mut FormSession<FileBackend>, role: SignatureRole) {
    let target = session.surface(role).id();
    let offset = SurfaceOffset::new(0.0, 0.0);
    let now = Instant::now();
    for event in [
        InputEvent::pointer(PointerPhase::Down, 20.0, 20.0),
        InputEvent::pointer(PointerPhase::Move, 120.0, 80.0),
        InputEvent::pointer(PointerPhase::Up, 120.0, 80.0),
    ] {
        session.handle_input(target, &event, offset, now);
    }
}

fn fill(session: &mut FormSession<FileBackend>, name: &str, class: &str) {
    let now = Instant::now();
    for (field, value) in [
        (FormField::StudentName, name),
        (FormField::Class, class),
        (FormField::SessionDate, "2024-01-10"),
        (FormField::FocusArea, "Belajar"),
        (FormField::Problem, "Sulit berkonsentrasi saat pelajaran matematika"),
        (FormField::Goal, "Meningkatkan fokus"),
        (FormField::Activity, "Teknik pomodoro"),
        (FormField::Outcome, "Siswa mau mencoba"),
        (FormField::TeacherNote, "Pantau dua minggu"),
        (FormField::TeacherName, "Bu Sari"),
    ] {
        session.edit_field(field, value, now);
    }
    sign(session, SignatureRole::Student);
    sign(session, SignatureRole::Teacher);
}

/// Save, list, view and delete one record
#[test]
fn test_save_list_delete_cycle() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");

    let mut toasts: Vec<Toast> = Vec::new();
    let key = {
        let mut session = open(&path);
        fill(&mut session, "Ani", "X-1");
        session.flush_draft().unwrap();
        let key = session.save(&mut toasts).expect("save");
        // saving starts a fresh form and drops the draft
        assert!(session.form().student_name.is_empty());
        assert!(session.surface(SignatureRole::Student).is_empty());
        key
    };
    assert_eq!(toasts, vec![Toast::info(messages::SAVED)]);
    assert!(key.starts_with("record:"));

    let mut session = open(&path);
    assert!(session.store().backend().get_item(DRAFT_KEY).unwrap().is_none());

    let listing = session.list_history().unwrap();
    assert_eq!(listing.len(), 1);
    let entry = &listing.entries[0];
    assert_eq!(entry.key, key);
    assert_eq!(entry.record.student_name, "Ani");
    assert_eq!(entry.record.class, "X-1");
    assert_eq!(entry.record.session_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert!(entry.summary().ends_with("..."));

    let doc = session.view_history(&key, &mut toasts).unwrap();
    assert!(doc.to_text().contains("10 Januari 2024"));

    let mut yes = |_: &str| true;
    assert!(session.delete_history(&key, &mut yes, &mut toasts).unwrap());
    assert_eq!(toasts.last(), Some(&Toast::info(messages::DELETED)));

    let session = open(&path);
    assert!(session.list_history().unwrap().is_empty());
}

/// Newest first, and search narrows by name or class
#[test]
fn test_listing_order_and_search() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");
    let mut toasts: Vec<Toast> = Vec::new();

    let mut session = open(&path);
    fill(&mut session, "Ani", "X-1");
    let first = session.save(&mut toasts).unwrap();
    fill(&mut session, "Budi", "XI-2");
    let second = session.save(&mut toasts).unwrap();
    assert_ne!(first, second);

    let store = open(&path);
    let listing = store.list_history().unwrap();
    let keys: Vec<_> = listing.entries.iter().map(|e| e.key.clone()).collect();
    assert_eq!(keys, vec![second, first]);

    let found = history::filter(&listing.entries, "xi");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].record.student_name, "Budi");
    assert_eq!(history::filter(&listing.entries, "").len(), 2);
}

/// A corrupt entry is skipped, the rest still listed
#[test]
fn test_corrupt_record_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");
    let mut toasts: Vec<Toast> = Vec::new();

    let mut session = open(&path);
    fill(&mut session, "Ani", "X-1");
    session.save(&mut toasts).unwrap();
    session
        .store_mut()
        .backend_mut()
        .set_item("record:2024-01-01T00:00:00.000Z", "{broken")
        .unwrap();

    let listing = open(&path).list_history().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing.skipped, vec!["record:2024-01-01T00:00:00.000Z".to_string()]);
}

/// Clearing history keeps the draft and foreign keys
#[test]
fn test_clear_keeps_draft() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");
    let mut toasts: Vec<Toast> = Vec::new();

    let mut session = open(&path);
    fill(&mut session, "Ani", "X-1");
    session.save(&mut toasts).unwrap();
    fill(&mut session, "Budi", "XI-2");
    session.flush_draft().unwrap();
    session.store_mut().backend_mut().set_item("theme", "dark").unwrap();

    let mut yes = |_: &str| true;
    assert_eq!(session.clear_history(&mut yes, &mut toasts).unwrap(), Some(1));

    let backend = FileBackend::open(&path).unwrap();
    let mut keys = backend.keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec![DRAFT_KEY.to_string(), "theme".to_string()]);
}

/// Cancelling a delete changes nothing
#[test]
fn test_cancelled_delete() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");
    let mut toasts: Vec<Toast> = Vec::new();

    let mut session = open(&path);
    fill(&mut session, "Ani", "X-1");
    let key = session.save(&mut toasts).unwrap();

    let mut no = |_: &str| false;
    assert!(!session.delete_history(&key, &mut no, &mut toasts).unwrap());
    assert_eq!(open(&path).list_history().unwrap().len(), 1);
}

/// Deleting a key that was never saved reports it and leaves the file alone
#[test]
fn test_delete_missing_key() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jurnal.json");
    let mut toasts: Vec<Toast> = Vec::new();

    let mut session = open(&path);
    fill(&mut session, "Ani", "X-1");
    let key = session.save(&mut toasts).unwrap();

    let mut yes = |_: &str| true;
    let err = session
        .delete_history("record:2023-12-31T00:00:00.000Z", &mut yes, &mut toasts)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(toasts.last(), Some(&Toast::error(messages::NOT_FOUND)));

    let listing = open(&path).list_history().unwrap();
    assert_eq!(listing.entries[0].key, key);
}
