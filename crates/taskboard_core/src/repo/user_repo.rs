//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist user rows and read them with their linked tasks.
//! - Link users to tasks through `user_tasks`.
//!
//! # Invariants
//! - `get_user`/`list_users` return users with their `user_tasks` collection.
//! - Deleting a user removes its `user_tasks` rows, clears
//!   `tasks.assigned_user_id` where it pointed at the user, then removes the
//!   user row, all in one transaction.

use crate::db::tx::with_transaction;
use crate::model::entity::{EntityKind, Task, TaskId, User, UserId};
use crate::model::patch::UserPatch;
use crate::repo::ensure_schema_ready;
use crate::repo::error::{PersistContext, RepoError, RepoResult};
use crate::repo::relations::{self, JoinTable, LinkOutcome};
use crate::repo::rows::{user_from_row, USER_COLUMNS};
use crate::repo::update_plan::{UpdateOutcome, UpdatePlan};
use log::info;
use rusqlite::{Connection, OptionalExtension};

/// Repository interface for user persistence.
pub trait UserRepository {
    /// Inserts `user`, writes the generated id back into it and returns it.
    fn create_user(&self, user: &mut User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<UpdateOutcome>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    fn assign_task(&self, user_id: UserId, task_id: TaskId) -> RepoResult<LinkOutcome>;
    fn tasks_for_user(&self, user_id: UserId) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &mut User) -> RepoResult<UserId> {
        let id: UserId = self
            .conn
            .query_row(
                "INSERT INTO users (name) VALUES (?1) RETURNING id;",
                [user.name.as_str()],
                |row| row.get(0),
            )
            .persist("create user")?;

        user.id = Some(id);
        info!("event=user_create module=repo status=ok user_id={id}");
        Ok(id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let Some(mut user) = load_user_row(self.conn, id).persist("get user")? else {
            return Ok(None);
        };
        user.tasks = relations::tasks_linked_to_user(self.conn, id).persist("get user tasks")?;
        Ok(Some(user))
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC;"))
            .persist("list users")?;
        let mut users = stmt
            .query_map([], user_from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .persist("list users")?;

        let mut tasks_by_user =
            relations::tasks_grouped_by_user(self.conn).persist("list user tasks")?;
        for user in &mut users {
            if let Some(id) = user.id {
                user.tasks = tasks_by_user.remove(&id).unwrap_or_default();
            }
        }
        Ok(users)
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<UpdateOutcome> {
        with_transaction(self.conn, "update user", |tx| {
            let persisted = load_user_row(tx, id)
                .persist("update user")?
                .ok_or_else(|| RepoError::not_found(EntityKind::User, id))?;

            let mut plan = UpdatePlan::new("users");
            plan.set_if_changed("name", patch.name.as_ref(), Some(&persisted.name));
            plan.execute(tx, id).persist("update user")
        })
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let (unlinked, released) = with_transaction(self.conn, "delete user", |tx| {
            let unlinked =
                relations::purge_links(tx, EntityKind::User, id).persist("delete user links")?;
            let released =
                relations::release_owned_tasks(tx, id).persist("release user tasks")?;
            let deleted = tx
                .execute("DELETE FROM users WHERE id = ?1;", [id])
                .persist("delete user")?;
            if deleted == 0 {
                return Err(RepoError::not_found(EntityKind::User, id));
            }
            Ok((unlinked, released))
        })?;

        info!(
            "event=user_delete module=repo status=ok user_id={id} unlinked={unlinked} released_tasks={released}"
        );
        Ok(())
    }

    fn assign_task(&self, user_id: UserId, task_id: TaskId) -> RepoResult<LinkOutcome> {
        relations::link(self.conn, JoinTable::UserTasks, user_id, task_id)
    }

    fn tasks_for_user(&self, user_id: UserId) -> RepoResult<Vec<Task>> {
        relations::tasks_linked_to_user(self.conn, user_id).persist("get user tasks")
    }
}

fn load_user_row(conn: &Connection, id: UserId) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1;"),
        [id],
        user_from_row,
    )
    .optional()
}
