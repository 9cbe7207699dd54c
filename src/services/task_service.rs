use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::database::models::{Task, TaskFields};
use crate::database::{DatabaseError, TaskRepository};
use crate::validator::{FieldError, Validator};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("task not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Task CRUD scoped to the authenticated owner.
///
/// `owner_id` always comes from the verified session, never from the request body.
/// A task owned by someone else is reported as `NotFound`.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    validator: Arc<dyn Validator<TaskFields>>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, validator: Arc<dyn Validator<TaskFields>>) -> Self {
        Self { tasks, validator }
    }

    pub async fn list_all(&self, owner_id: i64) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.list_for_owner(owner_id).await?)
    }

    pub async fn get_by_id(&self, owner_id: i64, task_id: i64) -> Result<Task, TaskError> {
        self.tasks
            .find_for_owner(owner_id, task_id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn create(&self, owner_id: i64, fields: TaskFields) -> Result<Task, TaskError> {
        self.check(&fields)?;
        let task = self.tasks.insert(owner_id, &fields.title).await?;
        debug!(owner_id, task_id = task.id, "task created");
        Ok(task)
    }

    pub async fn update(&self, owner_id: i64, task_id: i64, fields: TaskFields) -> Result<Task, TaskError> {
        self.check(&fields)?;
        let task = self
            .tasks
            .update_for_owner(owner_id, task_id, &fields.title)
            .await?
            .ok_or(TaskError::NotFound)?;
        debug!(owner_id, task_id, "task updated");
        Ok(task)
    }

    pub async fn delete(&self, owner_id: i64, task_id: i64) -> Result<(), TaskError> {
        if !self.tasks.delete_for_owner(owner_id, task_id).await? {
            return Err(TaskError::NotFound);
        }
        debug!(owner_id, task_id, "task deleted");
        Ok(())
    }

    fn check(&self, fields: &TaskFields) -> Result<(), TaskError> {
        let errors = self.validator.validate(fields);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TaskError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_task_service, MemoryStore};

    const ALICE: i64 = 1;
    const BOB: i64 = 2;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let service = test_task_service(&MemoryStore::new());

        let created = service.create(ALICE, TaskFields::new("abc")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.owner_id, ALICE);

        let fetched = service.get_by_id(ALICE, created.id).await.unwrap();
        assert_eq!(fetched.title, "abc");
        assert_eq!(fetched.owner_id, ALICE);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let service = test_task_service(&MemoryStore::new());
        assert!(service.list_all(ALICE).await.unwrap().is_empty());

        service.create(ALICE, TaskFields::new("one")).await.unwrap();
        service.create(BOB, TaskFields::new("theirs")).await.unwrap();
        service.create(ALICE, TaskFields::new("two")).await.unwrap();

        let titles: Vec<_> = service
            .list_all(ALICE)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn foreign_task_is_not_found() {
        let service = test_task_service(&MemoryStore::new());
        let task = service.create(ALICE, TaskFields::new("private")).await.unwrap();

        assert!(matches!(service.get_by_id(BOB, task.id).await, Err(TaskError::NotFound)));
        assert!(matches!(
            service.update(BOB, task.id, TaskFields::new("hijack")).await,
            Err(TaskError::NotFound)
        ));
        assert!(matches!(service.delete(BOB, task.id).await, Err(TaskError::NotFound)));

        // Untouched for the owner
        let still = service.get_by_id(ALICE, task.id).await.unwrap();
        assert_eq!(still.title, "private");
    }

    #[tokio::test]
    async fn update_replaces_title_and_keeps_owner() {
        let service = test_task_service(&MemoryStore::new());
        let task = service.create(ALICE, TaskFields::new("before")).await.unwrap();

        let updated = service.update(ALICE, task.id, TaskFields::new("after")).await.unwrap();
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.owner_id, ALICE);
        assert_eq!(updated.title, "after");
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected() {
        let service = test_task_service(&MemoryStore::new());

        let err = service.create(ALICE, TaskFields::new("toolongtitle!")).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(ref e) if e[0].field == "title"));

        let task = service.create(ALICE, TaskFields::new("ok")).await.unwrap();
        let err = service.update(ALICE, task.id, TaskFields::new("")).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert_eq!(service.get_by_id(ALICE, task.id).await.unwrap().title, "ok");
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let service = test_task_service(&MemoryStore::new());
        let task = service.create(ALICE, TaskFields::new("gone")).await.unwrap();

        service.delete(ALICE, task.id).await.unwrap();
        assert!(matches!(service.delete(ALICE, task.id).await, Err(TaskError::NotFound)));
        assert!(matches!(service.get_by_id(ALICE, task.id).await, Err(TaskError::NotFound)));
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let service = test_task_service(&MemoryStore::new());
        assert!(matches!(service.get_by_id(ALICE, 999).await, Err(TaskError::NotFound)));
        assert!(matches!(
            service.update(ALICE, 999, TaskFields::new("x")).await,
            Err(TaskError::NotFound)
        ));
    }
}
