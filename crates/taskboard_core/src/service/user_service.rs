//! User use-case service.
//!
//! # Invariants
//! - User names are trimmed and must not be blank.

use crate::model::entity::{Task, TaskId, User, UserId};
use crate::model::patch::UserPatch;
use crate::repo::relations::LinkOutcome;
use crate::repo::update_plan::UpdateOutcome;
use crate::repo::user_repo::UserRepository;
use crate::service::error::{non_blank, non_blank_patch, ServiceResult};

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a user and returns it with its generated id.
    pub fn create_user(&self, name: &str) -> ServiceResult<User> {
        let mut user = User::new(non_blank("name", name)?);
        self.repo.create_user(&mut user)?;
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.repo.get_user(id)?)
    }

    pub fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_users()?)
    }

    pub fn update_user(&self, id: UserId, patch: &UserPatch) -> ServiceResult<UpdateOutcome> {
        let patch = UserPatch {
            name: non_blank_patch("name", patch.name.as_ref())?,
        };
        Ok(self.repo.update_user(id, &patch)?)
    }

    pub fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        Ok(self.repo.delete_user(id)?)
    }

    pub fn assign_task(&self, user_id: UserId, task_id: TaskId) -> ServiceResult<LinkOutcome> {
        Ok(self.repo.assign_task(user_id, task_id)?)
    }

    pub fn tasks_for_user(&self, user_id: UserId) -> ServiceResult<Vec<Task>> {
        Ok(self.repo.tasks_for_user(user_id)?)
    }
}
