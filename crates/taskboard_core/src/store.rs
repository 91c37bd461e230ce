//! Owned store handle.
//!
//! # Responsibility
//! - Own the single connection every repository borrows.
//! - Open that connection from a [`StoreConfig`].
//!
//! # Invariants
//! - A `Store` always holds a fully migrated connection.
//! - Repositories handed out by a `Store` never outlive it.

use crate::config::{DatabaseLocation, StoreConfig};
use crate::db::migrations::schema_version;
use crate::db::{open_db, open_db_in_memory, open_db_in_memory_with, DbResult};
use crate::model::entity::EntityKind;
use crate::repo::error::RepoResult;
use crate::repo::tag_repo::SqliteTagRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use crate::repo::user_repo::SqliteUserRepository;
use rusqlite::Connection;

/// Explicit handle to one taskboard database.
pub struct Store {
    conn: Connection,
}

/// Row counts per entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub users: u64,
    pub tasks: u64,
    pub tags: u64,
}

impl Store {
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let conn = match &config.database {
            DatabaseLocation::File(path) => open_db(path, config.busy_timeout)?,
            DatabaseLocation::Memory => open_db_in_memory_with(config.busy_timeout)?,
        };
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Raw connection for callers that need to run their own statements.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn users(&self) -> RepoResult<SqliteUserRepository<'_>> {
        SqliteUserRepository::try_new(&self.conn)
    }

    pub fn tasks(&self) -> RepoResult<SqliteTaskRepository<'_>> {
        SqliteTaskRepository::try_new(&self.conn)
    }

    pub fn tags(&self) -> RepoResult<SqliteTagRepository<'_>> {
        SqliteTagRepository::try_new(&self.conn)
    }

    pub fn schema_version(&self) -> DbResult<u32> {
        schema_version(&self.conn)
    }

    pub fn stats(&self) -> DbResult<StoreStats> {
        Ok(StoreStats {
            users: self.count(EntityKind::User)?,
            tasks: self.count(EntityKind::Task)?,
            tags: self.count(EntityKind::Tag)?,
        })
    }

    fn count(&self, kind: EntityKind) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", kind.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
