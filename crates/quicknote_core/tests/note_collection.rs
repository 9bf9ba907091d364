mod common;

use common::{stepping_clock, ProbeKv};
use quicknote_core::db::open_db_in_memory;
use quicknote_core::{
    CorruptStatePolicy, KvError, KvStore, MemoryKvStore, Note, NoteCollectionService,
    NoteServiceError, NoteStore, SqliteKvStore, NOTES_KEY,
};
use std::collections::HashSet;

fn memory_service() -> NoteCollectionService<MemoryKvStore> {
    NoteCollectionService::new(NoteStore::new(MemoryKvStore::new())).with_clock(stepping_clock())
}

fn seeded_service(notes: &[Note]) -> NoteCollectionService<MemoryKvStore> {
    let mut store = NoteStore::new(MemoryKvStore::new());
    store.save(notes).unwrap();
    NoteCollectionService::new(store).with_clock(stepping_clock())
}

fn ids(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.id.as_str()).collect()
}

fn id_set(values: &[&str]) -> HashSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn create_then_list_puts_new_note_first() {
    let mut service = memory_service();
    let older = service.create("older", "").unwrap();
    let created = service.create("A", "B").unwrap();

    let listed = service.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0], created);
    assert_eq!(listed[0].title, "A");
    assert_eq!(listed[0].content, "B");
    assert_eq!(listed[1].id, older.id);
    assert_ne!(created.id, older.id);
}

#[test]
fn create_prepends_in_stored_order() {
    let mut service = memory_service();
    let first = service.create("first", "").unwrap();
    let second = service.create("second", "").unwrap();

    let stored = service.store().load().unwrap();
    assert_eq!(ids(&stored), vec![second.id.as_str(), first.id.as_str()]);
}

#[test]
fn update_preserves_id_and_leaves_other_notes_alone() {
    let mut service = memory_service();
    let target = service.create("draft", "old body").unwrap();
    let other = service.create("other", "untouched").unwrap();

    let updated = service.update(&target.id, "final", "new body").unwrap();
    assert_eq!(updated.id, target.id);
    assert!(updated.parsed_date() > target.parsed_date());

    let listed = service.list().unwrap();
    let found = listed.iter().find(|note| note.id == target.id).unwrap();
    assert_eq!(found.title, "final");
    assert_eq!(found.content, "new body");
    assert!(listed.contains(&other));
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, target.id);
}

#[test]
fn update_of_missing_id_is_not_found_and_writes_nothing() {
    let mut service = NoteCollectionService::new(NoteStore::new(ProbeKv::default()));
    service.create("kept", "").unwrap();

    let err = service.update("missing", "t", "c").unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(ref id) if id == "missing"));
    assert_eq!(service.store().kv().writes, 1);
}

#[test]
fn delete_is_idempotent() {
    let mut service = seeded_service(&[
        Note::with_id("a", "", "", "2024-03-02"),
        Note::with_id("b", "", "", "2024-03-01"),
    ]);

    assert!(service.delete("a").unwrap());
    let after_once = service.list().unwrap();
    assert!(!service.delete("a").unwrap());
    assert_eq!(service.list().unwrap(), after_once);
    assert_eq!(ids(&after_once), vec!["b"]);
}

#[test]
fn delete_many_matches_sequential_deletes() {
    let seed = [
        Note::with_id("a", "", "", "2024-03-03"),
        Note::with_id("b", "", "", "2024-03-02"),
        Note::with_id("c", "", "", "2024-03-01"),
    ];

    let mut bulk = seeded_service(&seed);
    let removed = bulk.delete_many(&id_set(&["a", "b", "zzz"])).unwrap();
    assert_eq!(removed, 2);

    let mut sequential = seeded_service(&seed);
    sequential.delete("a").unwrap();
    sequential.delete("b").unwrap();

    assert_eq!(ids(&bulk.list().unwrap()), vec!["c"]);
    assert_eq!(bulk.list().unwrap(), sequential.list().unwrap());
}

#[test]
fn delete_many_uses_one_read_and_one_write() {
    let mut service = NoteCollectionService::new(NoteStore::new(ProbeKv::default()));
    let a = service.create("a", "").unwrap();
    let b = service.create("b", "").unwrap();
    service.create("c", "").unwrap();

    let reads_before = service.store().kv().reads.get();
    let writes_before = service.store().kv().writes;
    let selection: HashSet<String> = [a.id, b.id].into_iter().collect();
    assert_eq!(service.delete_many(&selection).unwrap(), 2);

    assert_eq!(service.store().kv().reads.get() - reads_before, 1);
    assert_eq!(service.store().kv().writes - writes_before, 1);

    assert_eq!(service.delete_many(&HashSet::new()).unwrap(), 0);
    assert_eq!(service.store().kv().writes - writes_before, 1);
}

#[test]
fn query_matches_title_or_content_case_insensitively() {
    let service = seeded_service(&[
        Note::with_id("1", "Shopping", "milk", "2024-03-02"),
        Note::with_id("2", "Work", "email boss", "2024-03-01"),
    ]);

    assert_eq!(ids(&service.query("mil").unwrap()), vec!["1"]);
    assert_eq!(ids(&service.query("").unwrap()), vec!["1", "2"]);
    assert_eq!(ids(&service.query("MILK").unwrap()), vec!["1"]);
    assert_eq!(ids(&service.query("boss").unwrap()), vec!["2"]);
    assert!(service.query("2024").unwrap().is_empty());
}

#[test]
fn query_treats_whitespace_as_part_of_the_substring() {
    let service = seeded_service(&[
        Note::with_id("1", "Shopping", "milk", "2024-03-02"),
        Note::with_id("2", "Work", "email boss", "2024-03-01"),
    ]);

    assert_eq!(ids(&service.query(" ").unwrap()), vec!["2"]);
    assert!(service.query("boss ").unwrap().is_empty());
}

#[test]
fn list_keeps_stored_order_for_equal_dates() {
    let service = seeded_service(&[
        Note::with_id("older", "", "", "2024-03-01T08:00:00.000Z"),
        Note::with_id("tie-first", "", "", "2024-03-05T08:00:00.000Z"),
        Note::with_id("tie-second", "", "", "2024-03-05T08:00:00.000Z"),
    ]);

    assert_eq!(
        ids(&service.list().unwrap()),
        vec!["tie-first", "tie-second", "older"]
    );
}

#[test]
fn corrupt_state_fails_by_default_and_recovers_only_on_opt_in() {
    let mut kv = MemoryKvStore::new();
    kv.set(NOTES_KEY, "[{broken").unwrap();

    let mut strict = NoteCollectionService::new(NoteStore::new(kv.clone()));
    assert!(matches!(
        strict.list().unwrap_err(),
        NoteServiceError::CorruptState(_)
    ));
    assert!(matches!(
        strict.create("t", "c").unwrap_err(),
        NoteServiceError::CorruptState(_)
    ));
    assert_eq!(
        strict.store().load_raw().unwrap().as_deref(),
        Some("[{broken")
    );

    let mut lenient = NoteCollectionService::new(NoteStore::new(kv))
        .with_corrupt_policy(CorruptStatePolicy::ResetToEmpty);
    assert!(lenient.list().unwrap().is_empty());
    let created = lenient.create("fresh", "").unwrap();
    assert_eq!(lenient.store().load().unwrap(), vec![created]);
}

#[test]
fn rejected_write_surfaces_storage_write_and_keeps_previous_state() {
    let mut service = NoteCollectionService::new(NoteStore::new(ProbeKv::default()));
    let kept = service.create("kept", "").unwrap();

    let mut kv = service.into_store().into_inner();
    kv.reject_writes = true;
    let mut service = NoteCollectionService::new(NoteStore::new(kv));

    let err = service.create("lost", "").unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::StorageWrite(KvError::Rejected(_))
    ));
    assert!(matches!(
        service.delete(&kept.id).unwrap_err(),
        NoteServiceError::StorageWrite(_)
    ));
    assert_eq!(service.list().unwrap(), vec![kept]);
}

#[test]
fn colliding_ids_are_regenerated() {
    let mut candidates = vec!["fresh".to_string(), "taken".to_string()];
    let mut service = seeded_service(&[Note::with_id("taken", "", "", "2024-03-01")])
        .with_id_source(move || candidates.pop().unwrap_or_default());

    let created = service.create("new", "").unwrap();
    assert_eq!(created.id, "fresh");
}

#[test]
fn exhausted_id_source_is_duplicate_id() {
    let mut service = seeded_service(&[Note::with_id("taken", "", "", "2024-03-01")])
        .with_id_source(|| "taken".to_string());

    let err = service.create("new", "").unwrap_err();
    assert!(matches!(err, NoteServiceError::DuplicateId(ref id) if id == "taken"));
    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn legacy_collection_lists_newest_first() {
    let mut kv = MemoryKvStore::new();
    kv.set(
        NOTES_KEY,
        r#"[
            {"id":"1699900000000","title":"old","subtitle":"a","date":"Tue Nov 14 2023"},
            {"id":"1709300000000","title":"new","content":"b","date":"Sat Mar 02 2024"}
        ]"#,
    )
    .unwrap();
    let service = NoteCollectionService::new(NoteStore::new(kv));

    let listed = service.list().unwrap();
    assert_eq!(ids(&listed), vec!["1709300000000", "1699900000000"]);
    assert_eq!(listed[1].content, "a");
}

#[test]
fn sqlite_backed_service_round_trips_mutations() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::try_new(&conn).unwrap();
    let mut service = NoteCollectionService::new(NoteStore::new(kv)).with_clock(stepping_clock());

    let a = service.create("a", "alpha").unwrap();
    let b = service.create("b", "beta").unwrap();
    service.update(&a.id, "a2", "alpha2").unwrap();
    service.delete(&b.id).unwrap();

    let listed = service.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "a2");
    assert_eq!(service.get(&a.id).unwrap().unwrap().content, "alpha2");
    assert!(service.get(&b.id).unwrap().is_none());
}
