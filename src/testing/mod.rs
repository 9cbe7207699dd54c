//! In-memory store and wiring helpers for tests that should not need PostgreSQL.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::app::AppState;
use crate::auth::{Argon2Hasher, TokenIssuer};
use crate::config::{AppConfig, PasswordPolicy};
use crate::database::models::{Task, User};
use crate::database::{DatabaseError, HealthCheck, TaskRepository, UserRepository};
use crate::services::{CredentialService, TaskService};
use crate::validator::{TaskValidator, UserValidator};

pub const TEST_SECRET: &str = "test-signing-secret";

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_task_id: i64,
}

/// Users and tasks held in memory with the same uniqueness and ownership rules as the
/// SQL schema. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        inner.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Task>, DatabaseError> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.created_at, t.id));
        Ok(tasks)
    }

    async fn find_for_owner(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&task_id)
            .filter(|t| t.owner_id == owner_id)
            .cloned())
    }

    async fn insert(&self, owner_id: i64, title: &str) -> Result<Task, DatabaseError> {
        let mut inner = self.inner.write().await;
        inner.next_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.next_task_id,
            owner_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_for_owner(
        &self,
        owner_id: i64,
        task_id: i64,
        title: &str,
    ) -> Result<Option<Task>, DatabaseError> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner.tasks.get_mut(&task_id).filter(|t| t.owner_id == owner_id) else {
            return Ok(None);
        };
        task.title = title.to_string();
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_for_owner(&self, owner_id: i64, task_id: i64) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        let owned = inner.tasks.get(&task_id).is_some_and(|t| t.owner_id == owner_id);
        if owned {
            inner.tasks.remove(&task_id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Cheapest Argon2 parameters the crate accepts; keeps tests fast.
pub fn cheap_password_policy() -> PasswordPolicy {
    PasswordPolicy {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.url = "postgres://localhost/tasks_test".to_string();
    config.security.token_secret = TEST_SECRET.to_string();
    config.security.api_domain = Some("api.example.com".to_string());
    config.security.cors_origins = vec!["http://localhost:5173".to_string()];
    config.security.password = cheap_password_policy();
    config
}

pub fn test_token_issuer() -> Arc<TokenIssuer> {
    let issuer = TokenIssuer::new(TEST_SECRET.as_bytes(), Duration::hours(12))
        .unwrap_or_else(|e| panic!("test issuer: {e}"));
    Arc::new(issuer)
}

pub fn test_credential_service(store: &MemoryStore) -> CredentialService {
    let hasher = Argon2Hasher::new(cheap_password_policy()).unwrap_or_else(|e| panic!("test hasher: {e}"));
    CredentialService::new(
        Arc::new(store.clone()),
        Arc::new(hasher),
        test_token_issuer(),
        Arc::new(UserValidator),
    )
}

pub fn test_task_service(store: &MemoryStore) -> TaskService {
    TaskService::new(Arc::new(store.clone()), Arc::new(TaskValidator))
}

/// Full application state over `store` using [`test_config`].
pub fn test_state(store: &MemoryStore) -> AppState {
    let config = test_config();
    AppState::from_parts(
        &config,
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    )
    .unwrap_or_else(|e| panic!("test state: {e}"))
}
