use axum::{extract::Query, Extension};
use serde::Deserialize;

use crate::access::RouteDecision;
use crate::error::ApiError;
use crate::middleware::{AccessSession, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub path: String,
}

/// GET /api/access/route?path=/dashboard - Redirect decision for a client-side route
///
/// Stateful per session: the same navigation is returned once, then `stay`
/// until the session or profile changes or the client reports another path.
/// Reporting the landing page and then `/` again yields the navigation anew.
pub async fn route_get(
    Extension(session): Extension<AccessSession>,
    Query(query): Query<RouteQuery>,
) -> ApiResult<RouteDecision> {
    if !query.path.starts_with('/') {
        return Err(ApiError::bad_request("path must start with '/'"));
    }

    let decision = session.controller.route(&query.path);
    tracing::debug!("Route decision for {}: {:?}", query.path, decision);
    Ok(ApiResponse::success(decision))
}
