use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Task, User};

/// Persistence for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A second account with the same email fails with
    /// `DatabaseError::UniqueViolation`.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

/// Persistence for tasks. Every query is filtered by `owner_id`; a row that
/// belongs to someone else is indistinguishable from a missing row.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Task>, DatabaseError>;

    async fn find_for_owner(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, DatabaseError>;

    async fn insert(&self, owner_id: i64, title: &str) -> Result<Task, DatabaseError>;

    async fn update_for_owner(
        &self,
        owner_id: i64,
        task_id: i64,
        title: &str,
    ) -> Result<Option<Task>, DatabaseError>;

    /// Returns whether a row was removed.
    async fn delete_for_owner(&self, owner_id: i64, task_id: i64) -> Result<bool, DatabaseError>;
}

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str = "id, owner_id, title, created_at, updated_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY created_at, id"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_for_owner(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert(&self, owner_id: i64, title: &str) -> Result<Task, DatabaseError> {
        let sql = format!(
            "INSERT INTO tasks (owner_id, title) VALUES ($1, $2) RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_for_owner(
        &self,
        owner_id: i64,
        task_id: i64,
        title: &str,
    ) -> Result<Option<Task>, DatabaseError> {
        // Ownership check and write are one statement
        let sql = format!(
            "UPDATE tasks SET title = $1, updated_at = now() \
             WHERE id = $2 AND owner_id = $3 \
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(title)
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_for_owner(&self, owner_id: i64, task_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
