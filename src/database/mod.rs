pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager, HealthCheck};
pub use repository::{PgTaskRepository, PgUserRepository, TaskRepository, UserRepository};
