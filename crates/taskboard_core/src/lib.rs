//! Core persistence logic for the taskboard store.
//! Users, tasks and tags live here together with the join tables linking them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, ConfigResult, DatabaseLocation, StoreConfig};
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{EntityId, EntityKind, Tag, TagId, Task, TaskId, User, UserId};
pub use model::patch::{TagPatch, TaskPatch, UserPatch};
pub use repo::error::{LinkError, PersistenceError, RepoError, RepoResult};
pub use repo::relations::{link, JoinTable, LinkOutcome, LinkPhase};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::update_plan::UpdateOutcome;
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::error::{ServiceError, ServiceResult};
pub use service::tag_service::TagService;
pub use service::task_service::{NewTask, TaskService};
pub use service::user_service::UserService;
pub use store::{Store, StoreStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
