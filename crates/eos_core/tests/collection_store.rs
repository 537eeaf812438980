use eos_core::db::{open_db, open_db_in_memory, DbError, SCHEMA_VERSION};
use eos_core::{
    Collection, CollectionStore, ConsistencyEngine, EngineError, Note, NoteType, Project,
    SqliteCollectionStore, StoreError, StoreOptions, Task,
};
use rusqlite::{Connection, OpenFlags};

#[test]
fn absent_collections_load_empty() {
    let conn = open_db_in_memory().unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    assert!(engine.get_projects().unwrap().is_empty());
    assert!(engine.get_tasks().unwrap().is_empty());
    assert!(engine.get_notes().unwrap().is_empty());
    assert!(!engine.store().contains(Collection::Tasks).unwrap());
}

#[test]
fn corrupt_payload_loads_as_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO collections (name, payload) VALUES ('eos_tasks', '{not json');",
        [],
    )
    .unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    assert!(engine.get_tasks().unwrap().is_empty());

    let saved = engine.save_task(Task::new("rebuild list")).unwrap();
    let tasks = engine.get_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_id, saved.task_id);
}

#[test]
fn non_text_payload_loads_empty_and_is_overwritten_on_save() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO collections (name, payload) VALUES ('eos_tasks', X'FFFE00');",
        [],
    )
    .unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    assert!(engine.get_tasks().unwrap().is_empty());
    let saved = engine.save_task(Task::new("start over")).unwrap();
    let tasks = engine.get_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_id, saved.task_id);
}

#[test]
fn invalid_utf8_payload_loads_empty() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO collections (name, payload) VALUES ('eos_notes', CAST(X'5B22FF225D' AS TEXT));",
        [],
    )
    .unwrap();
    let store = SqliteCollectionStore::try_new(&conn).unwrap();

    assert!(matches!(
        store.read(Collection::Notes),
        Err(StoreError::CorruptPayload {
            collection: Collection::Notes,
            ..
        })
    ));

    let engine = ConsistencyEngine::new(&store);
    assert!(engine.get_notes().unwrap().is_empty());
    engine.save_note(Note::new("Fresh start", NoteType::Idea)).unwrap();
    assert_eq!(engine.get_notes().unwrap().len(), 1);
}

#[test]
fn payload_uses_stable_json_field_names() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollectionStore::try_new(&conn).unwrap();
    let engine = ConsistencyEngine::new(&store);

    engine.save_task(Task::new("water plants")).unwrap();
    let payload = store.read(Collection::Tasks).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

    let record = &value[0];
    assert_eq!(record["TaskName"], "water plants");
    assert_eq!(record["Status"], "Inbox");
    assert!(record["TaskID"].is_string());
    assert!(record["CreatedDate"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn quota_overflow_is_reported_and_keeps_prior_state() {
    let conn = open_db_in_memory().unwrap();
    let store =
        SqliteCollectionStore::with_options(&conn, StoreOptions::with_quota_bytes(2_048)).unwrap();
    let engine = ConsistencyEngine::new(store);

    let small = engine
        .save_project(Project::new("Small", "fits in the quota"))
        .unwrap();

    let mut big = Project::new("Big", "does not fit");
    big.project_notes = "x".repeat(4_096);
    let err = engine.save_project(big).unwrap_err();

    match err {
        EngineError::Storage(StoreError::QuotaExceeded {
            collection,
            limit_bytes,
            ..
        }) => {
            assert_eq!(collection, Collection::Projects);
            assert_eq!(limit_bytes, Some(2_048));
        }
        other => panic!("unexpected error: {other}"),
    }

    let projects = engine.get_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].project_id, small.project_id);
}

#[test]
fn quota_counts_other_collections() {
    let conn = open_db_in_memory().unwrap();
    let store =
        SqliteCollectionStore::with_options(&conn, StoreOptions::with_quota_bytes(1_024)).unwrap();
    let engine = ConsistencyEngine::new(store);

    let mut note = Note::new("Long", NoteType::Reflection);
    note.content = "y".repeat(800);
    engine.save_note(note).unwrap();

    let mut task = Task::new("fill the rest");
    task.notes = "z".repeat(400);
    let err = engine.save_task(task).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Storage(StoreError::QuotaExceeded { .. })
    ));
}

#[test]
fn read_only_database_reports_write_denied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eos.db");
    drop(open_db(&path).unwrap());

    let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    let err = engine
        .save_note(Note::new("Cannot land", NoteType::Idea))
        .unwrap_err();
    assert!(err.to_string().starts_with("Data Save Failed."));
    match err {
        EngineError::Storage(StoreError::WriteDenied { collection, .. }) => {
            assert_eq!(collection, Collection::Notes);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn connection_without_schema_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCollectionStore::try_new(&conn) {
        Err(StoreError::Db(DbError::SchemaMismatch { expected, found })) => {
            assert_eq!(expected, SCHEMA_VERSION);
            assert_eq!(found, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("blank connection should be rejected"),
    }
}

#[test]
fn broken_medium_is_not_mistaken_for_empty() {
    let conn = open_db_in_memory().unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());
    conn.execute_batch("DROP TABLE collections;").unwrap();

    assert!(matches!(
        engine.get_projects(),
        Err(EngineError::Storage(StoreError::ReadFailed { .. }))
    ));
}

#[test]
fn records_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eos.db");

    let saved = {
        let conn = open_db(&path).unwrap();
        let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());
        let saved = engine
            .save_project(Project::new("Durable", "still here after restart"))
            .unwrap();
        saved
    };

    let conn = open_db(&path).unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());
    assert_eq!(engine.get_project(&saved.project_id).unwrap(), Some(saved));
}
