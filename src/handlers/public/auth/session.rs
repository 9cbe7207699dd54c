use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::CredentialsRequest;
use crate::app::AppState;
use crate::error::ApiError;

/// POST /login - Authenticate and receive the session cookie
///
/// On success the body is empty and the signed token travels only in the
/// `token` cookie. Unknown email and wrong password both answer 401 with the
/// same message.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let issued = state.credentials.login(request.into()).await?;

    let cookie = state.cookies.session_cookie(&issued).map_err(|e| {
        tracing::error!("Failed to build session cookie: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    Ok((StatusCode::OK, [(SET_COOKIE, cookie)]).into_response())
}

/// POST /logout - Clear the session cookie
///
/// Nothing is revoked server-side; a copied token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> Response {
    match state.cookies.clear_cookie() {
        Ok(cookie) => (StatusCode::OK, [(SET_COOKIE, cookie)]).into_response(),
        Err(e) => {
            tracing::error!("Failed to build clearing cookie: {}", e);
            StatusCode::OK.into_response()
        }
    }
}
