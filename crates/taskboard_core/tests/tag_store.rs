use taskboard_core::{
    EntityKind, RepoError, Store, Tag, TagPatch, TagRepository, Task, TaskRepository,
    UpdateOutcome, User, UserRepository,
};

fn seeded_task(store: &Store, title: &str) -> i64 {
    let mut user = User::new("owner");
    let user_id = store.users().unwrap().create_user(&mut user).unwrap();
    let mut task = Task::new(title, None, user_id);
    store.tasks().unwrap().create_task(&mut task).unwrap()
}

#[test]
fn create_then_get_round_trips_with_identity_populated() {
    let store = Store::open_in_memory().unwrap();
    let tags = store.tags().unwrap();

    let mut tag = Tag::new("urgent");
    let id = tags.create_tag(&mut tag).unwrap();

    assert_eq!(tag.id, Some(id));
    assert_eq!(tags.get_tag(id).unwrap(), Some(tag));
}

#[test]
fn get_tag_loads_linked_tasks_one_level_deep() {
    let store = Store::open_in_memory().unwrap();
    let tags = store.tags().unwrap();
    let task_id = seeded_task(&store, "ship");
    let mut tag = Tag::new("urgent");
    let tag_id = tags.create_tag(&mut tag).unwrap();

    tags.assign_task(tag_id, task_id).unwrap();

    let loaded = tags.get_tag(tag_id).unwrap().unwrap();
    assert_eq!(loaded.tasks.len(), 1);
    assert_eq!(loaded.tasks[0].id, Some(task_id));
    assert!(loaded.tasks[0].tags.is_empty());
    assert_eq!(tags.tasks_for_tag(tag_id).unwrap(), loaded.tasks);
}

#[test]
fn list_tags_groups_tasks_per_tag() {
    let store = Store::open_in_memory().unwrap();
    let tags = store.tags().unwrap();
    let first = seeded_task(&store, "first");
    let second = seeded_task(&store, "second");
    let mut busy = Tag::new("busy");
    let mut empty = Tag::new("empty");
    let busy_id = tags.create_tag(&mut busy).unwrap();
    tags.create_tag(&mut empty).unwrap();
    tags.assign_task(busy_id, second).unwrap();
    tags.assign_task(busy_id, first).unwrap();

    let listed = tags.list_tags().unwrap();

    assert_eq!(listed.len(), 2);
    let busy_tasks: Vec<_> = listed[0].tasks.iter().map(|task| task.id).collect();
    assert_eq!(busy_tasks, vec![Some(first), Some(second)]);
    assert!(listed[1].tasks.is_empty());
}

#[test]
fn rename_and_missing_tag_update() {
    let store = Store::open_in_memory().unwrap();
    let tags = store.tags().unwrap();
    let mut tag = Tag::new("urgent");
    let id = tags.create_tag(&mut tag).unwrap();

    let outcome = tags
        .update_tag(
            id,
            &TagPatch {
                name: Some("soon".to_string()),
            },
        )
        .unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            columns: vec!["name"]
        }
    );

    let err = tags.update_tag(id + 1, &TagPatch::default()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Tag,
            ..
        }
    ));
}

#[test]
fn delete_removes_tag_links_but_keeps_tasks() {
    let store = Store::open_in_memory().unwrap();
    let tags = store.tags().unwrap();
    let tasks = store.tasks().unwrap();
    let task_id = seeded_task(&store, "ship");
    let mut tag = Tag::new("urgent");
    let tag_id = tags.create_tag(&mut tag).unwrap();
    tags.assign_task(tag_id, task_id).unwrap();

    tags.delete_tag(tag_id).unwrap();

    assert_eq!(tags.get_tag(tag_id).unwrap(), None);
    assert!(tasks.tags_for_task(task_id).unwrap().is_empty());
    assert!(tasks.get_task(task_id).unwrap().is_some());

    let err = tags.delete_tag(tag_id).unwrap_err();
    assert!(err.is_not_found());
}
