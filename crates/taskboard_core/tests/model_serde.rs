use serde_json::json;
use taskboard_core::{EntityKind, Tag, Task, TaskPatch, User};

#[test]
fn task_serializes_with_nested_tags() {
    let mut task = Task::new("T1", Some("D1".to_string()), 5);
    task.id = Some(1);
    task.tags.push(Tag {
        id: Some(2),
        ..Tag::new("urgent")
    });

    let value = serde_json::to_value(&task).unwrap();

    assert_eq!(
        value,
        json!({
            "id": 1,
            "title": "T1",
            "description": "D1",
            "assigned_user_id": 5,
            "tags": [{"id": 2, "name": "urgent", "tasks": []}]
        })
    );
}

#[test]
fn missing_collections_deserialize_as_empty() {
    let user: User = serde_json::from_value(json!({"id": 3, "name": "Ada"})).unwrap();
    assert_eq!(user.id, Some(3));
    assert!(user.tasks.is_empty());
}

#[test]
fn patch_fields_default_to_no_change() {
    let patch: TaskPatch = serde_json::from_value(json!({"title": "T2"})).unwrap();
    assert_eq!(patch, TaskPatch::title("T2"));
}

#[test]
fn entity_kind_uses_snake_case_names() {
    assert_eq!(serde_json::to_value(EntityKind::Task).unwrap(), json!("task"));
    assert_eq!(EntityKind::Tag.to_string(), "tag");
    assert_eq!(EntityKind::User.table(), "users");
}
