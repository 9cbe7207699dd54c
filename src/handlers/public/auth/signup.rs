use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::CredentialsRequest;
use crate::app::AppState;
use crate::database::models::UserResponse;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /signup - Register a new account
///
/// Expected Input:
/// ```json
/// { "email": "a@x.com", "password": "secret123" }
/// ```
///
/// Expected Output (200):
/// ```json
/// { "id": 1, "email": "a@x.com" }
/// ```
///
/// Fails with 400 on field validation and 409 when the email is taken.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(request) = payload?;
    let user = state.credentials.sign_up(request.into()).await?;
    Ok(ApiResponse::success(user))
}
