pub mod task;
pub mod user;

pub use task::{Task, TaskFields};
pub use user::{User, UserResponse};
