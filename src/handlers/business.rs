// handlers/business.rs - pages under /business/:business_id, behind the business-admin guard
use axum::{extract::Path, Extension};
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{AccessSession, ApiResponse, ApiResult, AuthorizedBusiness};
use crate::types::{BusinessId, MembershipRole};

#[derive(Debug, Serialize)]
pub struct BusinessPage {
    pub view: String,
    pub business_id: BusinessId,
    pub business_name: Option<String>,
    /// `None` for super admins viewing a business they are not a member of
    pub role_within_business: Option<MembershipRole>,
}

/// GET /business/:business_id/:page
pub async fn business_page(
    Path((_business_id, page)): Path<(String, String)>,
    Extension(AuthorizedBusiness(business_id)): Extension<AuthorizedBusiness>,
    Extension(session): Extension<AccessSession>,
) -> ApiResult<BusinessPage> {
    let snapshot = session.controller.snapshot();
    let Some(Some(profile)) = snapshot.profile.resolved() else {
        return Err(ApiError::internal_server_error("Guard authorized without a profile"));
    };
    let membership = profile.membership(business_id);

    Ok(ApiResponse::success(BusinessPage {
        view: page,
        business_id,
        business_name: membership.map(|m| m.business_name.clone()),
        role_within_business: membership.map(|m| m.role_within_business),
    }))
}
