//! Tag use-case service.

use crate::model::entity::{Tag, TagId, Task, TaskId};
use crate::model::patch::TagPatch;
use crate::repo::relations::LinkOutcome;
use crate::repo::tag_repo::TagRepository;
use crate::repo::update_plan::UpdateOutcome;
use crate::service::error::{non_blank, non_blank_patch, ServiceResult};

/// Tag service facade over repository implementations.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a tag with a trimmed, non-blank name.
    pub fn create_tag(&self, name: &str) -> ServiceResult<Tag> {
        let mut tag = Tag::new(non_blank("name", name)?);
        self.repo.create_tag(&mut tag)?;
        Ok(tag)
    }

    pub fn get_tag(&self, id: TagId) -> ServiceResult<Option<Tag>> {
        Ok(self.repo.get_tag(id)?)
    }

    pub fn list_tags(&self) -> ServiceResult<Vec<Tag>> {
        Ok(self.repo.list_tags()?)
    }

    pub fn update_tag(&self, id: TagId, patch: &TagPatch) -> ServiceResult<UpdateOutcome> {
        let patch = TagPatch {
            name: non_blank_patch("name", patch.name.as_ref())?,
        };
        Ok(self.repo.update_tag(id, &patch)?)
    }

    pub fn delete_tag(&self, id: TagId) -> ServiceResult<()> {
        Ok(self.repo.delete_tag(id)?)
    }

    pub fn assign_task(&self, tag_id: TagId, task_id: TaskId) -> ServiceResult<LinkOutcome> {
        Ok(self.repo.assign_task(tag_id, task_id)?)
    }

    pub fn tasks_for_tag(&self, tag_id: TagId) -> ServiceResult<Vec<Task>> {
        Ok(self.repo.tasks_for_tag(tag_id)?)
    }
}
