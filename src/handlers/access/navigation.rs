use axum::Extension;

use crate::access::NavItem;
use crate::middleware::{AccessSession, ApiResponse, ApiResult};

/// GET /api/access/navigation - Sidebar entries the caller may see
pub async fn navigation_get(Extension(session): Extension<AccessSession>) -> ApiResult<Vec<NavItem>> {
    Ok(ApiResponse::success(session.controller.navigation()))
}
