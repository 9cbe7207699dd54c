use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::app::AppState;
use crate::database::models::{Task, TaskFields};
use crate::middleware::{ApiResponse, ApiResult, Identity};

/// GET /tasks - All tasks owned by the caller
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<Task>> {
    let tasks = state.tasks.list_all(identity.owner_id).await?;
    Ok(ApiResponse::success(tasks))
}

/// GET /tasks/:id - One task, 404 when absent or owned by someone else
pub async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    task_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Task> {
    let Path(task_id) = task_id?;
    let task = state.tasks.get_by_id(identity.owner_id, task_id).await?;
    Ok(ApiResponse::success(task))
}

/// POST /tasks - Create a task owned by the caller
///
/// Expected Input:
/// ```json
/// { "title": "abc" }
/// ```
///
/// Any owner field in the body is ignored.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<TaskFields>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(fields) = payload?;
    let task = state.tasks.create(identity.owner_id, fields).await?;
    Ok(ApiResponse::created(task))
}

/// PUT /tasks/:id - Replace the mutable fields of a task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    task_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskFields>, JsonRejection>,
) -> ApiResult<Task> {
    let Path(task_id) = task_id?;
    let Json(fields) = payload?;
    let task = state.tasks.update(identity.owner_id, task_id, fields).await?;
    Ok(ApiResponse::created(task))
}

/// DELETE /tasks/:id - Remove a task; a second delete answers 404
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    task_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(task_id) = task_id?;
    state.tasks.delete(identity.owner_id, task_id).await?;
    Ok(ApiResponse::no_content())
}
