//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist task rows together with their ownership link in `user_tasks`.
//! - Apply partial updates and re-point ownership only when it changes.
//!
//! # Invariants
//! - After any successful create/update, `tasks.assigned_user_id` and the
//!   task's `user_tasks` ownership row name the same user.
//! - Deleting a task removes its `user_tasks` and `task_tag` rows and the task
//!   row in one transaction.

use crate::db::tx::with_transaction;
use crate::model::entity::{EntityKind, Tag, TagId, Task, TaskId};
use crate::model::patch::TaskPatch;
use crate::repo::ensure_schema_ready;
use crate::repo::error::{PersistContext, RepoError, RepoResult};
use crate::repo::relations::{self, JoinTable, LinkOutcome};
use crate::repo::rows::{task_from_row, TASK_COLUMNS};
use crate::repo::update_plan::{UpdateOutcome, UpdatePlan};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for task persistence.
pub trait TaskRepository {
    /// Inserts `task` and its ownership link, writes the generated id back
    /// into it and returns it.
    fn create_task(&self, task: &mut Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<UpdateOutcome>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn assign_tag(&self, task_id: TaskId, tag_id: TagId) -> RepoResult<LinkOutcome>;
    fn tags_for_task(&self, task_id: TaskId) -> RepoResult<Vec<Tag>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &mut Task) -> RepoResult<TaskId> {
        let id = with_transaction::<_, RepoError, _>(self.conn, "create task", |tx| {
            let id: TaskId = tx
                .query_row(
                    "INSERT INTO tasks (title, description, assigned_user_id)
                     VALUES (?1, ?2, ?3)
                     RETURNING id;",
                    params![
                        task.title.as_str(),
                        task.description.as_deref(),
                        task.assigned_user_id,
                    ],
                    |row| row.get(0),
                )
                .persist("create task")?;

            if let Some(user_id) = task.assigned_user_id {
                tx.execute(
                    "INSERT INTO user_tasks (user_id, task_id) VALUES (?1, ?2);",
                    params![user_id, id],
                )
                .persist("create task owner link")?;
            }
            Ok(id)
        })?;

        task.id = Some(id);
        info!("event=task_create module=repo status=ok task_id={id}");
        Ok(id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let Some(mut task) = load_task_row(self.conn, id).persist("get task")? else {
            return Ok(None);
        };
        task.tags = relations::tags_linked_to_task(self.conn, id).persist("get task tags")?;
        Ok(Some(task))
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC;"))
            .persist("list tasks")?;
        let mut tasks = stmt
            .query_map([], task_from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .persist("list tasks")?;

        let mut tags_by_task =
            relations::tags_grouped_by_task(self.conn).persist("list task tags")?;
        for task in &mut tasks {
            if let Some(id) = task.id {
                task.tags = tags_by_task.remove(&id).unwrap_or_default();
            }
        }
        Ok(tasks)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<UpdateOutcome> {
        let outcome = with_transaction::<_, RepoError, _>(self.conn, "update task", |tx| {
            let persisted = load_task_row(tx, id)
                .persist("update task")?
                .ok_or_else(|| RepoError::not_found(EntityKind::Task, id))?;

            let mut plan = UpdatePlan::new("tasks");
            plan.set_if_changed("title", patch.title.as_ref(), Some(&persisted.title))
                .set_if_changed(
                    "description",
                    patch.description.as_ref(),
                    persisted.description.as_ref(),
                )
                .set_if_changed(
                    "assigned_user_id",
                    patch.assigned_user_id.as_ref(),
                    persisted.assigned_user_id.as_ref(),
                );

            let outcome = plan.execute(tx, id).persist("update task")?;
            if let (true, Some(user_id)) =
                (plan.changes("assigned_user_id"), patch.assigned_user_id)
            {
                relations::repoint_task_owner(tx, id, user_id)
                    .persist("update task owner link")?;
            }
            Ok(outcome)
        })?;

        info!(
            "event=task_update module=repo status=ok task_id={id} owner_changed={}",
            outcome.changed("assigned_user_id")
        );
        Ok(outcome)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let unlinked = with_transaction(self.conn, "delete task", |tx| {
            let unlinked =
                relations::purge_links(tx, EntityKind::Task, id).persist("delete task links")?;
            let deleted = tx
                .execute("DELETE FROM tasks WHERE id = ?1;", [id])
                .persist("delete task")?;
            if deleted == 0 {
                return Err(RepoError::not_found(EntityKind::Task, id));
            }
            Ok(unlinked)
        })?;

        info!("event=task_delete module=repo status=ok task_id={id} unlinked={unlinked}");
        Ok(())
    }

    fn assign_tag(&self, task_id: TaskId, tag_id: TagId) -> RepoResult<LinkOutcome> {
        relations::link(self.conn, JoinTable::TaskTags, task_id, tag_id)
    }

    fn tags_for_task(&self, task_id: TaskId) -> RepoResult<Vec<Tag>> {
        relations::tags_linked_to_task(self.conn, task_id).persist("get task tags")
    }
}

fn load_task_row(conn: &Connection, id: TaskId) -> rusqlite::Result<Option<Task>> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1;"),
        [id],
        task_from_row,
    )
    .optional()
}
