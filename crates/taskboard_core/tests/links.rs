use std::time::Duration;
use taskboard_core::db::open_db;
use taskboard_core::db::tx::TxGuard;
use taskboard_core::{
    link, JoinTable, LinkError, LinkOutcome, LinkPhase, RepoError, Store, Tag, TagRepository,
    Task, TaskRepository, User, UserRepository,
};

fn user_and_task(store: &Store) -> (i64, i64) {
    let mut user = User::new("Ada");
    let user_id = store.users().unwrap().create_user(&mut user).unwrap();
    let mut task = Task::new("ship", None, user_id);
    let task_id = store.tasks().unwrap().create_task(&mut task).unwrap();
    (user_id, task_id)
}

#[test]
fn linking_twice_keeps_one_row() {
    let store = Store::open_in_memory().unwrap();
    let (_, task_id) = user_and_task(&store);
    let mut tag = Tag::new("urgent");
    let tag_id = store.tags().unwrap().create_tag(&mut tag).unwrap();
    let tasks = store.tasks().unwrap();

    assert_eq!(tasks.assign_tag(task_id, tag_id).unwrap(), LinkOutcome::Linked);
    assert_eq!(
        tasks.assign_tag(task_id, tag_id).unwrap(),
        LinkOutcome::AlreadyLinked
    );

    assert_eq!(tasks.tags_for_task(task_id).unwrap().len(), 1);
    let rows: i64 = store
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM task_tag WHERE task_id = ?1 AND tag_id = ?2;",
            [task_id, tag_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn tag_side_and_task_side_share_the_same_pair() {
    let store = Store::open_in_memory().unwrap();
    let (_, task_id) = user_and_task(&store);
    let tags = store.tags().unwrap();
    let mut tag = Tag::new("urgent");
    let tag_id = tags.create_tag(&mut tag).unwrap();

    tags.assign_task(tag_id, task_id).unwrap();
    let again = store.tasks().unwrap().assign_tag(task_id, tag_id).unwrap();

    assert_eq!(again, LinkOutcome::AlreadyLinked);
}

#[test]
fn owner_link_written_at_create_is_already_linked() {
    let store = Store::open_in_memory().unwrap();
    let (user_id, task_id) = user_and_task(&store);

    let outcome = store
        .users()
        .unwrap()
        .assign_task(user_id, task_id)
        .unwrap();

    assert_eq!(outcome, LinkOutcome::AlreadyLinked);
    assert_eq!(
        store.users().unwrap().tasks_for_user(user_id).unwrap().len(),
        1
    );
}

#[test]
fn insert_failure_reports_insert_phase() {
    let store = Store::open_in_memory().unwrap();
    let (user_id, _) = user_and_task(&store);

    let err = link(store.connection(), JoinTable::UserTasks, user_id, 404).unwrap_err();

    match err {
        RepoError::Link(LinkError {
            table,
            phase,
            left,
            right,
            ..
        }) => {
            assert_eq!(table, JoinTable::UserTasks);
            assert_eq!(phase, LinkPhase::Insert);
            assert_eq!((left, right), (user_id, 404));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.connection().is_autocommit());
}

#[test]
fn check_waits_for_the_write_lock_held_by_another_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");
    let holder = open_db(&path, Duration::from_millis(50)).unwrap();
    let contender = open_db(&path, Duration::from_millis(50)).unwrap();
    holder
        .execute_batch(
            "INSERT INTO users (id, name) VALUES (1, 'u');
             INSERT INTO tasks (id, title, assigned_user_id) VALUES (1, 't', 1);",
        )
        .unwrap();

    let guard = TxGuard::begin(&holder, "hold lock").unwrap();
    let err = link(&contender, JoinTable::UserTasks, 1, 1).unwrap_err();
    guard.rollback().unwrap();

    match err {
        RepoError::Link(LinkError {
            phase: LinkPhase::Check,
            source,
            ..
        }) => assert!(source.is_busy(), "unexpected cause: {source}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        link(&contender, JoinTable::UserTasks, 1, 1).unwrap(),
        LinkOutcome::Linked
    );
}

#[test]
fn skipped_insert_is_not_reported_as_linked() {
    let store = Store::open_in_memory().unwrap();
    let (_, task_id) = user_and_task(&store);
    let mut tag = Tag::new("urgent");
    let tag_id = store.tags().unwrap().create_tag(&mut tag).unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TEMP TRIGGER skip_task_tag BEFORE INSERT ON task_tag
             BEGIN
                 SELECT RAISE(IGNORE);
             END;",
        )
        .unwrap();

    let outcome = link(store.connection(), JoinTable::TaskTags, task_id, tag_id).unwrap();

    assert_eq!(outcome, LinkOutcome::AlreadyLinked);
    assert!(store.tasks().unwrap().tags_for_task(task_id).unwrap().is_empty());
    assert!(store.connection().is_autocommit());
}
