use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::session::extract_session_token;

/// Owner identity bound to a request after its session token verified
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub owner_id: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            owner_id: claims.user_id,
        }
    }
}

/// Session authentication middleware that verifies the token cookie and attaches the
/// caller's identity. Requests without a valid token never reach the handler.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_session_token(request.headers()) else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    let claims = match state.tokens.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            // Reason only; the token itself stays out of the logs
            debug!(reason = %e, "session token rejected");
            return ApiError::unauthorized("Invalid or expired session").into_response();
        }
    };

    request.extensions_mut().insert(Identity::from(claims));
    next.run(request).await
}
