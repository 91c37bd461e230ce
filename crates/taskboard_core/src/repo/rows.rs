//! Column lists and row mappers shared by the repositories.

use crate::model::entity::{Tag, Task, User};
use rusqlite::Row;

pub(crate) const USER_COLUMNS: &str = "id, name";
pub(crate) const TASK_COLUMNS: &str = "id, title, description, assigned_user_id";
pub(crate) const TAG_COLUMNS: &str = "id, name";

/// Task columns qualified by the `t` alias, for join queries.
pub(crate) const TASK_COLUMNS_T: &str = "t.id AS id,
    t.title AS title,
    t.description AS description,
    t.assigned_user_id AS assigned_user_id";

/// Tag columns qualified by the `g` alias, for join queries.
pub(crate) const TAG_COLUMNS_T: &str = "g.id AS id, g.name AS name";

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        tasks: Vec::new(),
    })
}

pub(crate) fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        assigned_user_id: row.get("assigned_user_id")?,
        tags: Vec::new(),
    })
}

pub(crate) fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        tasks: Vec::new(),
    })
}
