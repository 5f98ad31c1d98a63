// handlers/pages.rs - entry and role dashboards
//
// Requests are stateless, so pages apply the pure decision; the
// once-per-state engine backs /api/access/route instead.
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Serialize;

use crate::access::{decide, RouteDecision};
use crate::middleware::{AccessSession, ApiResponse};
use crate::types::{BusinessId, Role};

#[derive(Debug, Serialize)]
pub struct PageView {
    pub view: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_business_id: Option<BusinessId>,
}

impl PageView {
    fn new(view: &'static str, path: &str) -> Self {
        Self {
            view,
            path: path.to_string(),
            role: None,
            active_business_id: None,
        }
    }
}

/// GET /, /dashboard, /admin-dashboard, /data-entry-dashboard
pub async fn page(Extension(session): Extension<AccessSession>, uri: Uri) -> Response {
    let path = uri.path();
    let snapshot = session.controller.snapshot();

    match decide(&snapshot.session, &snapshot.profile, path) {
        RouteDecision::Navigate(navigation) => {
            tracing::debug!("Redirecting {} -> {}", path, navigation.to);
            Redirect::to(&navigation.to).into_response()
        }
        RouteDecision::Unauthenticated => {
            ApiResponse::with_status(PageView::new("login", path), StatusCode::UNAUTHORIZED).into_response()
        }
        RouteDecision::Wait | RouteDecision::Loading => {
            ApiResponse::accepted(PageView::new("loading", path)).into_response()
        }
        RouteDecision::Stay => {
            let view = PageView {
                role: snapshot.profile.effective_role(),
                active_business_id: session.controller.active_business(),
                ..PageView::new("page", path)
            };
            ApiResponse::success(view).into_response()
        }
    }
}
