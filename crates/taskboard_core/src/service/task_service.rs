//! Task use-case service.
//!
//! # Invariants
//! - Titles are trimmed and must not be blank.
//! - A task is always created with an owning user.

use crate::model::entity::{Tag, TagId, Task, TaskId, UserId};
use crate::model::patch::TaskPatch;
use crate::repo::relations::LinkOutcome;
use crate::repo::task_repo::TaskRepository;
use crate::repo::update_plan::UpdateOutcome;
use crate::service::error::{non_blank, non_blank_patch, ServiceResult};

/// Input for creating one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_user_id: UserId,
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task owned by `request.assigned_user_id`.
    pub fn create_task(&self, request: &NewTask) -> ServiceResult<Task> {
        let mut task = Task::new(
            non_blank("title", &request.title)?,
            request.description.clone(),
            request.assigned_user_id,
        );
        self.repo.create_task(&mut task)?;
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> ServiceResult<Option<Task>> {
        Ok(self.repo.get_task(id)?)
    }

    pub fn list_tasks(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.repo.list_tasks()?)
    }

    pub fn update_task(&self, id: TaskId, patch: &TaskPatch) -> ServiceResult<UpdateOutcome> {
        let patch = TaskPatch {
            title: non_blank_patch("title", patch.title.as_ref())?,
            ..patch.clone()
        };
        Ok(self.repo.update_task(id, &patch)?)
    }

    pub fn delete_task(&self, id: TaskId) -> ServiceResult<()> {
        Ok(self.repo.delete_task(id)?)
    }

    pub fn assign_tag(&self, task_id: TaskId, tag_id: TagId) -> ServiceResult<LinkOutcome> {
        Ok(self.repo.assign_tag(task_id, tag_id)?)
    }

    pub fn tags_for_task(&self, task_id: TaskId) -> ServiceResult<Vec<Tag>> {
        Ok(self.repo.tags_for_task(task_id)?)
    }
}
