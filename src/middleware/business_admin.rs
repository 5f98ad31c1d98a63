use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde_json::json;
use std::collections::HashMap;

use crate::access::GuardDecision;
use crate::error::ApiError;
use crate::middleware::response::ApiResponse;
use crate::middleware::session::AccessSession;
use crate::types::BusinessId;

/// Business the guard authorized for this request
#[derive(Clone, Copy, Debug)]
pub struct AuthorizedBusiness(pub BusinessId);

/// Guard for `/business/:business_id/...` views.
///
/// Pending renders a neutral loading body, never the page and never a
/// redirect; denial redirects to the default landing page.
pub async fn business_admin_middleware(
    Path(params): Path<HashMap<String, String>>,
    Extension(session): Extension<AccessSession>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(route_id) = params.get("business_id") else {
        return ApiError::internal_server_error("business guard mounted on a route without :business_id")
            .into_response();
    };

    match session.controller.authorize_business(route_id) {
        GuardDecision::Pending => ApiResponse::accepted(json!({ "view": "loading" })).into_response(),
        GuardDecision::Unauthorized { redirect } => Redirect::to(&redirect.to).into_response(),
        GuardDecision::Authorized => {
            if let Ok(business_id) = route_id.parse::<BusinessId>() {
                request.extensions_mut().insert(AuthorizedBusiness(business_id));
            }
            next.run(request).await
        }
    }
}
