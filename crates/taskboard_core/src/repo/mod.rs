//! Repository layer: entity stores, join-table maintenance and partial
//! update planning.
//!
//! # Responsibility
//! - Define per-entity persistence contracts.
//! - Keep SQL details and transaction scoping inside the persistence boundary.
//!
//! # Invariants
//! - Repositories are only constructed over connections at the latest schema
//!   version.
//! - Repository APIs return semantic errors (`NotFound`, `Link`) in addition to
//!   wrapped storage failures.

use crate::db::migrations::{latest_version, schema_version};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Connection;

pub mod error;
pub mod relations;
mod rows;
pub mod tag_repo;
pub mod task_repo;
pub mod update_plan;
pub mod user_repo;

pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version =
        schema_version(conn).map_err(|err| RepoError::persistence("schema check", err))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
