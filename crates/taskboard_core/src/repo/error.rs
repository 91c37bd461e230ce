//! Repository error taxonomy.
//!
//! # Invariants
//! - Raw `rusqlite::Error` values never cross the repository boundary; they
//!   are wrapped with the failing operation name.
//! - A rollback failure is recorded next to the primary error, never in its
//!   place.

use crate::db::tx::TxFailure;
use crate::db::DbError;
use crate::model::entity::{EntityId, EntityKind};
use crate::repo::relations::{JoinTable, LinkPhase};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors surfaced by user/task/tag repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Update/delete targeted an id with no row.
    NotFound { kind: EntityKind, id: EntityId },
    /// Storage-level failure during create/read/update/delete.
    Persistence(PersistenceError),
    /// Failure while checking or inserting a join-table pair.
    Link(LinkError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

/// Storage failure with the operation it interrupted.
#[derive(Debug)]
pub struct PersistenceError {
    pub operation: &'static str,
    pub source: DbError,
    /// Set when rolling back the enclosing transaction failed as well.
    pub rollback_error: Option<DbError>,
}

/// Join-table link failure, tagged with the phase that failed.
#[derive(Debug)]
pub struct LinkError {
    pub table: JoinTable,
    pub phase: LinkPhase,
    pub left: EntityId,
    pub right: EntityId,
    pub source: DbError,
}

impl RepoError {
    pub(crate) fn not_found(kind: EntityKind, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }

    pub(crate) fn persistence(operation: &'static str, source: impl Into<DbError>) -> Self {
        Self::Persistence(PersistenceError {
            operation,
            source: source.into(),
            rollback_error: None,
        })
    }

    /// Returns true when this error reports a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Link(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "database error during {}: {}", self.operation, self.source)?;
        if let Some(rollback_error) = &self.rollback_error {
            write!(f, " (rollback also failed: {rollback_error})")?;
        }
        Ok(())
    }
}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let step = match self.phase {
            LinkPhase::Check => "checking",
            LinkPhase::Insert => "inserting",
        };
        write!(
            f,
            "link error while {step} {} ({}, {}): {}",
            self.table.name(),
            self.left,
            self.right,
            self.source
        )
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Link(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl Error for LinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl From<PersistenceError> for RepoError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<LinkError> for RepoError {
    fn from(value: LinkError) -> Self {
        Self::Link(value)
    }
}

impl TxFailure for RepoError {
    fn from_tx_failure(operation: &'static str, source: DbError) -> Self {
        Self::persistence(operation, source)
    }

    fn with_rollback_failure(self, rollback_error: DbError) -> Self {
        match self {
            Self::Persistence(mut err) => {
                err.rollback_error = Some(rollback_error);
                Self::Persistence(err)
            }
            other => other,
        }
    }
}

/// Attaches an operation name to statement-level failures.
pub(crate) trait PersistContext<T> {
    fn persist(self, operation: &'static str) -> RepoResult<T>;
}

impl<T> PersistContext<T> for rusqlite::Result<T> {
    fn persist(self, operation: &'static str) -> RepoResult<T> {
        self.map_err(|err| RepoError::persistence(operation, err))
    }
}
