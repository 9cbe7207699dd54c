use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-editable task fields. Anything else in the request body, an owner
/// id included, is dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFields {
    #[serde(default)]
    pub title: String,
}

impl TaskFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}
