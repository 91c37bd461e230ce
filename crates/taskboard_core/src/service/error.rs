//! Service-layer error and shared input checks.

use crate::model::entity::{EntityId, EntityKind};
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error for user/task/tag use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller input violates a field rule.
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },
    /// Target entity does not exist.
    NotFound { kind: EntityKind, id: EntityId },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Repo(other),
        }
    }
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn non_blank(field: &'static str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput {
            field,
            reason: "must not be blank",
        });
    }
    Ok(trimmed.to_string())
}

/// Applies `non_blank` to an optional patch field.
pub(crate) fn non_blank_patch(
    field: &'static str,
    value: Option<&String>,
) -> ServiceResult<Option<String>> {
    value.map(|value| non_blank(field, value)).transpose()
}
