use axum::Extension;
use serde::Serialize;

use crate::access::{AccessSnapshot, BusinessSwitcher};
use crate::middleware::{AccessSession, ApiResponse, ApiResult};
use crate::types::{BusinessId, Role};

#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub authenticated: bool,
    /// Role the redirect engine acts on; absent until the profile resolves
    pub effective_role: Option<Role>,
    pub active_business_id: Option<BusinessId>,
    pub switcher: BusinessSwitcher,
    #[serde(flatten)]
    pub snapshot: AccessSnapshot,
}

/// GET /api/access/whoami - Session and profile state of the caller
///
/// Always 200: an anonymous caller is a valid answer, not an error.
pub async fn whoami(Extension(session): Extension<AccessSession>) -> ApiResult<WhoamiResponse> {
    let controller = &session.controller;
    let snapshot = controller.snapshot();

    Ok(ApiResponse::success(WhoamiResponse {
        authenticated: snapshot.session.identity().is_some(),
        effective_role: snapshot.profile.effective_role(),
        active_business_id: controller.active_business(),
        switcher: controller.switcher(),
        snapshot,
    }))
}
