use axum::{Extension, Json};
use serde::Deserialize;

use crate::access::{ActiveBusinessSelection, BusinessSwitcher};
use crate::error::ApiError;
use crate::middleware::{AccessSession, ApiResponse, ApiResult};
use crate::types::BusinessId;

#[derive(Debug, Deserialize)]
pub struct SelectBusinessRequest {
    #[serde(alias = "businessId")]
    pub business_id: BusinessId,
}

/// GET /api/access/business - Business switcher for the caller's memberships
pub async fn business_get(Extension(session): Extension<AccessSession>) -> ApiResult<BusinessSwitcher> {
    Ok(ApiResponse::success(session.controller.switcher()))
}

/// PUT /api/access/business - Select the active business
///
/// Expected Input:
/// ```json
/// { "business_id": 42 }
/// ```
pub async fn business_put(
    Extension(session): Extension<AccessSession>,
    Json(request): Json<SelectBusinessRequest>,
) -> ApiResult<ActiveBusinessSelection> {
    if session.controller.snapshot().session.identity().is_none() {
        return Err(ApiError::unauthorized("Sign in to select a business"));
    }

    let selection = session.controller.select_business(request.business_id)?;
    Ok(ApiResponse::success(selection))
}
