//! User, task and tag records.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Surrogate row identity assigned by the store.
pub type EntityId = i64;
pub type UserId = EntityId;
pub type TaskId = EntityId;
pub type TagId = EntityId;

/// Entity families persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Task,
    Tag,
}

impl EntityKind {
    /// Base table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Task => "tasks",
            Self::Tag => "tags",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::User => "user",
            Self::Task => "task",
            Self::Tag => "tag",
        };
        f.write_str(label)
    }
}

/// A person tasks can be assigned to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
    /// Tasks linked through `user_tasks`. Nested tasks carry no tags.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            tasks: Vec::new(),
        }
    }
}

/// A unit of work owned by exactly one user at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: Option<String>,
    /// Mirrors the single `user_tasks` row that records ownership.
    ///
    /// `None` only after the owning user was deleted.
    pub assigned_user_id: Option<UserId>,
    /// Tags linked through `task_tag`. Nested tags carry no tasks.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        assigned_user_id: UserId,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description,
            assigned_user_id: Some(assigned_user_id),
            tags: Vec::new(),
        }
    }
}

/// A label attachable to any number of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<TagId>,
    pub name: String,
    /// Tasks linked through `task_tag`. Nested tasks carry no tags.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            tasks: Vec::new(),
        }
    }
}
