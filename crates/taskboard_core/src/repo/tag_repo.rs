//! Tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - `get_tag`/`list_tags` return tags with their `task_tag` collection.
//! - Deleting a tag removes its `task_tag` rows and the tag row in one
//!   transaction.
//! - Blank names are rejected above this layer; the repository stores what it
//!   is given.

use crate::db::tx::with_transaction;
use crate::model::entity::{EntityKind, Tag, TagId, Task, TaskId};
use crate::model::patch::TagPatch;
use crate::repo::ensure_schema_ready;
use crate::repo::error::{PersistContext, RepoError, RepoResult};
use crate::repo::relations::{self, JoinTable, LinkOutcome};
use crate::repo::rows::{tag_from_row, TAG_COLUMNS};
use crate::repo::update_plan::{UpdateOutcome, UpdatePlan};
use log::info;
use rusqlite::{Connection, OptionalExtension};

/// Repository interface for tag persistence.
pub trait TagRepository {
    /// Inserts `tag`, writes the generated id back into it and returns it.
    fn create_tag(&self, tag: &mut Tag) -> RepoResult<TagId>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    fn update_tag(&self, id: TagId, patch: &TagPatch) -> RepoResult<UpdateOutcome>;
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
    fn assign_task(&self, tag_id: TagId, task_id: TaskId) -> RepoResult<LinkOutcome>;
    fn tasks_for_tag(&self, tag_id: TagId) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn create_tag(&self, tag: &mut Tag) -> RepoResult<TagId> {
        let id: TagId = self
            .conn
            .query_row(
                "INSERT INTO tags (name) VALUES (?1) RETURNING id;",
                [tag.name.as_str()],
                |row| row.get(0),
            )
            .persist("create tag")?;

        tag.id = Some(id);
        info!("event=tag_create module=repo status=ok tag_id={id}");
        Ok(id)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let Some(mut tag) = load_tag_row(self.conn, id).persist("get tag")? else {
            return Ok(None);
        };
        tag.tasks = relations::tasks_linked_to_tag(self.conn, id).persist("get tag tasks")?;
        Ok(Some(tag))
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY id ASC;"))
            .persist("list tags")?;
        let mut tags = stmt
            .query_map([], tag_from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .persist("list tags")?;

        let mut tasks_by_tag =
            relations::tasks_grouped_by_tag(self.conn).persist("list tag tasks")?;
        for tag in &mut tags {
            if let Some(id) = tag.id {
                tag.tasks = tasks_by_tag.remove(&id).unwrap_or_default();
            }
        }
        Ok(tags)
    }

    fn update_tag(&self, id: TagId, patch: &TagPatch) -> RepoResult<UpdateOutcome> {
        with_transaction(self.conn, "update tag", |tx| {
            let persisted = load_tag_row(tx, id)
                .persist("update tag")?
                .ok_or_else(|| RepoError::not_found(EntityKind::Tag, id))?;

            let mut plan = UpdatePlan::new("tags");
            plan.set_if_changed("name", patch.name.as_ref(), Some(&persisted.name));
            plan.execute(tx, id).persist("update tag")
        })
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        let unlinked = with_transaction(self.conn, "delete tag", |tx| {
            let unlinked =
                relations::purge_links(tx, EntityKind::Tag, id).persist("delete tag links")?;
            let deleted = tx
                .execute("DELETE FROM tags WHERE id = ?1;", [id])
                .persist("delete tag")?;
            if deleted == 0 {
                return Err(RepoError::not_found(EntityKind::Tag, id));
            }
            Ok(unlinked)
        })?;

        info!("event=tag_delete module=repo status=ok tag_id={id} unlinked={unlinked}");
        Ok(())
    }

    fn assign_task(&self, tag_id: TagId, task_id: TaskId) -> RepoResult<LinkOutcome> {
        relations::link(self.conn, JoinTable::TaskTags, task_id, tag_id)
    }

    fn tasks_for_tag(&self, tag_id: TagId) -> RepoResult<Vec<Task>> {
        relations::tasks_linked_to_tag(self.conn, tag_id).persist("get tag tasks")
    }
}

fn load_tag_row(conn: &Connection, id: TagId) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1;"),
        [id],
        tag_from_row,
    )
    .optional()
}
