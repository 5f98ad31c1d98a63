// handlers/public.rs - service info and health, no session involved
use axum::response::IntoResponse;
use serde_json::json;

use crate::middleware::ApiResponse;

/// GET /api - Service description and endpoint map
pub async fn service_info() -> impl IntoResponse {
    ApiResponse::success(json!({
        "name": "Finance Access",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Authorization and multi-tenant routing for the finance dashboard",
        "endpoints": {
            "health": "/health (public)",
            "whoami": "GET /api/access/whoami",
            "route": "GET /api/access/route?path=",
            "navigation": "GET /api/access/navigation",
            "business": "GET|PUT /api/access/business",
            "session": "DELETE /api/access/session",
            "pages": "/, /dashboard, /admin-dashboard, /data-entry-dashboard",
            "business_pages": "/business/:business_id/:page (business admins)",
        }
    }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
