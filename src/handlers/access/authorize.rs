use axum::{extract::Path, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{AccessSession, ApiResponse, ApiResult};
use crate::types::BusinessId;

/// GET /api/access/business/:business_id/authorize - Guard check for client-rendered admin views
///
/// 200 when authorized, 202 while access is still resolving, 403 when denied.
pub async fn authorize_get(
    Extension(session): Extension<AccessSession>,
    Path(business_id): Path<String>,
) -> ApiResult<Value> {
    let decision = session.controller.authorize_business(&business_id);
    let id: BusinessId = business_id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("'{}' is not a business id", business_id)))?;

    if decision.clone().into_result(id)? {
        Ok(ApiResponse::success(json!({ "business_id": id, "decision": decision })))
    } else {
        Ok(ApiResponse::accepted(json!({ "business_id": id, "decision": decision })))
    }
}
