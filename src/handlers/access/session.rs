use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{AccessSession, ApiResponse, ApiResult};
use crate::server::AppState;

/// DELETE /api/access/session - Log out
///
/// Clears every identity-scoped value held for the token and refuses the
/// token afterwards, so a still-valid JWT cannot bring the session back.
pub async fn session_delete(
    State(state): State<AppState>,
    Extension(session): Extension<AccessSession>,
) -> ApiResult<Value> {
    let Some(token) = session.token.as_deref() else {
        return Err(ApiError::unauthorized("No session to log out"));
    };

    let had_session = state.registry.revoke(token);
    tracing::info!("Session logged out (active={})", had_session);

    Ok(ApiResponse::success(json!({ "logged_out": true })))
}
