use chrono::{Duration, TimeZone, Utc};
use eos_core::db::open_db_in_memory;
use eos_core::{
    Clock, Collection, CollectionStore, ConsistencyEngine, EstimatedTime, ManualClock,
    SqliteCollectionStore, Task, TaskPriority, TaskStatus, ValidationError,
};

fn scheduled(name: &str) -> Task {
    Task::scheduled(name, "p1", TaskPriority::new(3).unwrap(), EstimatedTime::Min30)
}

fn start_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap())
}

#[test]
fn task_names_need_three_characters() {
    let conn = open_db_in_memory().unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    let err = engine.save_task(Task::new("ab")).unwrap_err();
    assert_eq!(err.violation(), Some(ValidationError::NameTooShort));
    assert_eq!(err.to_string(), "System Law: No vague task names.");

    engine.save_task(Task::new("abc")).unwrap();
    assert_eq!(engine.get_tasks().unwrap().len(), 1);
}

#[test]
fn only_one_task_can_be_doing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCollectionStore::try_new(&conn).unwrap();
    let engine = ConsistencyEngine::new(&store);

    let mut first = scheduled("draft outline");
    first.status = TaskStatus::Doing;
    let first = engine.save_task(first).unwrap();
    let before = store.read(Collection::Tasks).unwrap();

    let mut second = scheduled("review budget");
    second.status = TaskStatus::Doing;
    let err = engine.save_task(second.clone()).unwrap_err();
    assert_eq!(err.violation(), Some(ValidationError::SingleActiveTask));
    assert_eq!(store.read(Collection::Tasks).unwrap(), before);

    // Re-saving the current Doing task is not a second one.
    engine.save_task(first.clone()).unwrap();

    let mut finished = first;
    finished.status = TaskStatus::Done;
    engine.save_task(finished).unwrap();
    engine.save_task(second).unwrap();

    let doing = engine
        .get_tasks()
        .unwrap()
        .into_iter()
        .filter(|task| task.status == TaskStatus::Doing)
        .count();
    assert_eq!(doing, 1);
}

#[test]
fn scheduling_requires_project_priority_and_estimate() {
    let conn = open_db_in_memory().unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    let mut no_project = scheduled("pay invoice");
    no_project.project_id.clear();
    let mut no_priority = scheduled("pay invoice");
    no_priority.priority = None;
    let mut no_estimate = scheduled("pay invoice");
    no_estimate.estimated_time = None;
    no_estimate.status = TaskStatus::Doing;

    for task in [no_project, no_priority, no_estimate] {
        assert_eq!(
            engine.save_task(task).unwrap_err().violation(),
            Some(ValidationError::IncompleteDefinition)
        );
    }
    assert!(engine.get_tasks().unwrap().is_empty());

    let mut blocked = Task::new("pay invoice");
    blocked.status = TaskStatus::Blocked;
    engine.save_task(blocked).unwrap();
}

#[test]
fn laws_apply_in_order() {
    let conn = open_db_in_memory().unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    let mut doing = scheduled("deep work");
    doing.status = TaskStatus::Doing;
    engine.save_task(doing).unwrap();

    let mut vague = Task::new("x");
    vague.status = TaskStatus::Doing;
    assert_eq!(
        engine.save_task(vague).unwrap_err().violation(),
        Some(ValidationError::NameTooShort)
    );

    let mut undefined = Task::new("second focus");
    undefined.status = TaskStatus::Doing;
    assert_eq!(
        engine.save_task(undefined).unwrap_err().violation(),
        Some(ValidationError::SingleActiveTask)
    );
}

#[test]
fn blocked_date_tracks_blocked_status() {
    let conn = open_db_in_memory().unwrap();
    let engine =
        ConsistencyEngine::with_clock(SqliteCollectionStore::try_new(&conn).unwrap(), start_clock());
    let first_block = engine.clock().now();

    let mut task = scheduled("wait on legal");
    task.status = TaskStatus::Blocked;
    let task = engine.save_task(task).unwrap();
    assert_eq!(task.blocked_date, Some(first_block));

    engine.clock().advance(Duration::hours(1));
    let still_blocked = engine.save_task(task.clone()).unwrap();
    assert_eq!(still_blocked.blocked_date, Some(first_block));

    engine.clock().advance(Duration::days(1));
    let mut unblocked = still_blocked;
    unblocked.status = TaskStatus::Next;
    let unblocked = engine.save_task(unblocked).unwrap();
    assert_eq!(unblocked.blocked_date, None);

    engine.clock().advance(Duration::days(1));
    let mut reblocked = unblocked;
    reblocked.status = TaskStatus::Blocked;
    let reblocked = engine.save_task(reblocked).unwrap();
    let fresh = reblocked.blocked_date.unwrap();
    assert!(fresh > first_block);
    assert_eq!(fresh, engine.clock().now());

    let stored = engine.get_task(&reblocked.task_id).unwrap().unwrap();
    assert_eq!(stored.blocked_date, Some(fresh));
}

#[test]
fn stale_blocked_date_is_replaced_when_entering_blocked() {
    let conn = open_db_in_memory().unwrap();
    let engine =
        ConsistencyEngine::with_clock(SqliteCollectionStore::try_new(&conn).unwrap(), start_clock());

    let task = engine.save_task(scheduled("call supplier")).unwrap();
    engine.clock().advance(Duration::days(2));

    let mut blocked = task;
    blocked.status = TaskStatus::Blocked;
    blocked.blocked_date = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    let blocked = engine.save_task(blocked).unwrap();
    assert_eq!(blocked.blocked_date, Some(engine.clock().now()));
}

#[test]
fn created_date_is_set_once() {
    let conn = open_db_in_memory().unwrap();
    let engine =
        ConsistencyEngine::with_clock(SqliteCollectionStore::try_new(&conn).unwrap(), start_clock());
    let created_at = engine.clock().now();

    let task = engine.save_task(Task::new("plan sprint")).unwrap();
    assert_eq!(task.created_date, Some(created_at));

    engine.clock().advance(Duration::days(3));
    let mut edited = task.clone();
    edited.notes = "include retro items".to_string();
    edited.created_date = None;
    let edited = engine.save_task(edited).unwrap();
    assert_eq!(edited.created_date, Some(created_at));

    let mut tampered = edited;
    tampered.created_date = Some(engine.clock().now());
    let tampered = engine.save_task(tampered).unwrap();
    assert_eq!(tampered.created_date, Some(created_at));

    let stored = engine.get_task(&task.task_id).unwrap().unwrap();
    assert_eq!(stored.created_date, Some(created_at));
}

#[test]
fn imported_created_date_is_kept_for_new_tasks() {
    let conn = open_db_in_memory().unwrap();
    let engine =
        ConsistencyEngine::with_clock(SqliteCollectionStore::try_new(&conn).unwrap(), start_clock());
    let imported = Utc.with_ymd_and_hms(2023, 12, 24, 18, 30, 0).unwrap();

    let mut task = Task::new("wrap presents");
    task.created_date = Some(imported);
    assert_eq!(engine.save_task(task).unwrap().created_date, Some(imported));
}

#[test]
fn delete_task_leaves_related_notes_dangling() {
    use eos_core::{Note, NoteType};

    let conn = open_db_in_memory().unwrap();
    let engine = ConsistencyEngine::new(SqliteCollectionStore::try_new(&conn).unwrap());

    let task = engine.save_task(Task::new("write retro")).unwrap();
    let mut note = Note::new("Retro thoughts", NoteType::Reflection);
    note.related_task_id = Some(task.task_id.clone());
    engine.save_note(note).unwrap();

    assert!(engine.delete_task(&task.task_id).unwrap());
    assert!(!engine.delete_task(&task.task_id).unwrap());

    let notes = engine.get_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].related_task_id.as_deref(), Some(task.task_id.as_str()));
}
