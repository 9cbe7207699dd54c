pub mod credential_service;
pub mod task_service;

pub use credential_service::{CredentialError, CredentialService};
pub use task_service::{TaskError, TaskService};
