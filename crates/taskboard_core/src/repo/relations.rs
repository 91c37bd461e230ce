//! Join-table maintenance: idempotent linking, owner re-pointing, cascades
//! and linked-row reads.
//!
//! # Responsibility
//! - Own every statement that touches `user_tasks` or `task_tag`.
//! - Keep `tasks.assigned_user_id` and the task's `user_tasks` row in step.
//!
//! # Invariants
//! - A join pair exists at most once (composite primary key plus a checked,
//!   conflict-ignoring insert under one write lock).
//! - Cascades run on the caller's open transaction; this module never begins
//!   its own except for `link`.

use crate::db::tx::TxGuard;
use crate::db::DbError;
use crate::model::entity::{EntityId, EntityKind, Tag, TagId, Task, TaskId, UserId};
use crate::repo::error::{LinkError, RepoResult};
use crate::repo::rows::{tag_from_row, task_from_row, TAG_COLUMNS_T, TASK_COLUMNS_T};
use log::{debug, info};
use rusqlite::{params, Connection};
use std::collections::HashMap;

/// Many-to-many tables maintained by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinTable {
    /// `user_tasks(user_id, task_id)`
    UserTasks,
    /// `task_tag(task_id, tag_id)`
    TaskTags,
}

impl JoinTable {
    pub fn name(self) -> &'static str {
        match self {
            Self::UserTasks => "user_tasks",
            Self::TaskTags => "task_tag",
        }
    }

    /// `(left, right)` column names, in link argument order.
    pub fn columns(self) -> (&'static str, &'static str) {
        match self {
            Self::UserTasks => ("user_id", "task_id"),
            Self::TaskTags => ("task_id", "tag_id"),
        }
    }

    /// Join tables holding a column that references `kind`.
    pub fn referencing(kind: EntityKind) -> &'static [JoinTable] {
        match kind {
            EntityKind::User => &[Self::UserTasks],
            EntityKind::Task => &[Self::UserTasks, Self::TaskTags],
            EntityKind::Tag => &[Self::TaskTags],
        }
    }

    fn column_for(self, kind: EntityKind) -> Option<&'static str> {
        match (self, kind) {
            (Self::UserTasks, EntityKind::User) => Some("user_id"),
            (Self::UserTasks, EntityKind::Task) | (Self::TaskTags, EntityKind::Task) => {
                Some("task_id")
            }
            (Self::TaskTags, EntityKind::Tag) => Some("tag_id"),
            _ => None,
        }
    }
}

/// Step of `link` that was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    Check,
    Insert,
}

/// Result of a successful `link` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new pair row was written.
    Linked,
    /// The pair already existed; nothing was written.
    AlreadyLinked,
}

impl LinkOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Linked => "linked",
            Self::AlreadyLinked => "already_linked",
        }
    }
}

/// Links `(left, right)` in `table` unless the pair already exists.
///
/// The existence check and the insert share one `IMMEDIATE` transaction, so a
/// concurrent caller on another connection waits for the write lock instead of
/// racing past the check.
pub fn link(
    conn: &Connection,
    table: JoinTable,
    left: EntityId,
    right: EntityId,
) -> RepoResult<LinkOutcome> {
    let link_error = |phase: LinkPhase, source: DbError| LinkError {
        table,
        phase,
        left,
        right,
        source,
    };
    let (left_column, right_column) = table.columns();

    let guard =
        TxGuard::begin(conn, "link").map_err(|err| link_error(LinkPhase::Check, err))?;

    let existing: i64 = guard
        .conn()
        .query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {left_column} = ?1 AND {right_column} = ?2;",
                table.name()
            ),
            params![left, right],
            |row| row.get(0),
        )
        .map_err(|err| link_error(LinkPhase::Check, err.into()))?;

    if existing > 0 {
        guard
            .commit()
            .map_err(|err| link_error(LinkPhase::Check, err))?;
        debug!(
            "event=link module=link status=ok table={} left={left} right={right} outcome={}",
            table.name(),
            LinkOutcome::AlreadyLinked.as_str()
        );
        return Ok(LinkOutcome::AlreadyLinked);
    }

    let inserted = guard
        .conn()
        .execute(
            &format!(
                "INSERT INTO {} ({left_column}, {right_column}) VALUES (?1, ?2)
                 ON CONFLICT DO NOTHING;",
                table.name()
            ),
            params![left, right],
        )
        .map_err(|err| link_error(LinkPhase::Insert, err.into()))?;
    guard
        .commit()
        .map_err(|err| link_error(LinkPhase::Insert, err))?;

    // Zero rows means the insert was skipped, so nothing new was linked.
    let outcome = if inserted == 0 {
        LinkOutcome::AlreadyLinked
    } else {
        LinkOutcome::Linked
    };
    info!(
        "event=link module=link status=ok table={} left={left} right={right} outcome={}",
        table.name(),
        outcome.as_str()
    );
    Ok(outcome)
}

/// Points the task's ownership link at `user_id`, dropping every previous
/// `user_tasks` row for the task.
pub(crate) fn repoint_task_owner(
    conn: &Connection,
    task_id: TaskId,
    user_id: UserId,
) -> rusqlite::Result<()> {
    let removed = conn.execute("DELETE FROM user_tasks WHERE task_id = ?1;", [task_id])?;
    conn.execute(
        "INSERT INTO user_tasks (user_id, task_id) VALUES (?1, ?2);",
        params![user_id, task_id],
    )?;
    debug!(
        "event=task_owner_repoint module=link status=ok task_id={task_id} user_id={user_id} removed={removed}"
    );
    Ok(())
}

/// Deletes every join row mentioning `id` from the tables that reference
/// `kind`. Returns the number of rows removed.
pub(crate) fn purge_links(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
) -> rusqlite::Result<usize> {
    let mut removed = 0;
    for table in JoinTable::referencing(kind) {
        let Some(column) = table.column_for(kind) else {
            continue;
        };
        removed += conn.execute(
            &format!("DELETE FROM {} WHERE {column} = ?1;", table.name()),
            [id],
        )?;
    }
    Ok(removed)
}

/// Clears ownership on tasks assigned to `user_id`.
pub(crate) fn release_owned_tasks(conn: &Connection, user_id: UserId) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE tasks SET assigned_user_id = NULL WHERE assigned_user_id = ?1;",
        [user_id],
    )
}

pub(crate) fn tasks_linked_to_user(
    conn: &Connection,
    user_id: UserId,
) -> rusqlite::Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS_T}
         FROM tasks t
         INNER JOIN user_tasks ut ON ut.task_id = t.id
         WHERE ut.user_id = ?1
         ORDER BY t.id ASC;"
    ))?;
    let rows = stmt.query_map([user_id], task_from_row)?;
    rows.collect()
}

pub(crate) fn tags_linked_to_task(
    conn: &Connection,
    task_id: TaskId,
) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TAG_COLUMNS_T}
         FROM tags g
         INNER JOIN task_tag tt ON tt.tag_id = g.id
         WHERE tt.task_id = ?1
         ORDER BY g.id ASC;"
    ))?;
    let rows = stmt.query_map([task_id], tag_from_row)?;
    rows.collect()
}

pub(crate) fn tasks_linked_to_tag(
    conn: &Connection,
    tag_id: TagId,
) -> rusqlite::Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS_T}
         FROM tasks t
         INNER JOIN task_tag tt ON tt.task_id = t.id
         WHERE tt.tag_id = ?1
         ORDER BY t.id ASC;"
    ))?;
    let rows = stmt.query_map([tag_id], task_from_row)?;
    rows.collect()
}

/// All user->task links in one query, grouped by user id.
pub(crate) fn tasks_grouped_by_user(
    conn: &Connection,
) -> rusqlite::Result<HashMap<UserId, Vec<Task>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT ut.user_id AS owner_id, {TASK_COLUMNS_T}
         FROM tasks t
         INNER JOIN user_tasks ut ON ut.task_id = t.id
         ORDER BY ut.user_id ASC, t.id ASC;"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, EntityId>("owner_id")?, task_from_row(row)?))
    })?;
    group_rows(rows)
}

/// All task->tag links in one query, grouped by task id.
pub(crate) fn tags_grouped_by_task(
    conn: &Connection,
) -> rusqlite::Result<HashMap<TaskId, Vec<Tag>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT tt.task_id AS owner_id, {TAG_COLUMNS_T}
         FROM tags g
         INNER JOIN task_tag tt ON tt.tag_id = g.id
         ORDER BY tt.task_id ASC, g.id ASC;"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, EntityId>("owner_id")?, tag_from_row(row)?))
    })?;
    group_rows(rows)
}

/// All tag->task links in one query, grouped by tag id.
pub(crate) fn tasks_grouped_by_tag(
    conn: &Connection,
) -> rusqlite::Result<HashMap<TagId, Vec<Task>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT tt.tag_id AS owner_id, {TASK_COLUMNS_T}
         FROM tasks t
         INNER JOIN task_tag tt ON tt.task_id = t.id
         ORDER BY tt.tag_id ASC, t.id ASC;"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, EntityId>("owner_id")?, task_from_row(row)?))
    })?;
    group_rows(rows)
}

fn group_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<(EntityId, T)>>,
) -> rusqlite::Result<HashMap<EntityId, Vec<T>>> {
    let mut grouped: HashMap<EntityId, Vec<T>> = HashMap::new();
    for row in rows {
        let (owner_id, item) = row?;
        grouped.entry(owner_id).or_default().push(item);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::JoinTable;
    use crate::model::entity::EntityKind;

    #[test]
    fn every_entity_kind_is_referenced_by_some_join_table() {
        for kind in [EntityKind::User, EntityKind::Task, EntityKind::Tag] {
            let tables = JoinTable::referencing(kind);
            assert!(!tables.is_empty());
            for table in tables {
                assert!(table.column_for(kind).is_some());
            }
        }
    }

    #[test]
    fn task_deletes_cascade_through_both_join_tables() {
        assert_eq!(
            JoinTable::referencing(EntityKind::Task),
            &[JoinTable::UserTasks, JoinTable::TaskTags]
        );
    }
}
