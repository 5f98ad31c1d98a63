use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::access::SessionRegistry;
use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::{business_admin_middleware, session_middleware};

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(registry: Arc<SessionRegistry>, config: AppConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        .merge(page_routes())
        .merge(business_routes())
        .merge(access_routes())
        // Every route above sees a resolved session
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        // Public
        .route("/api", get(handlers::public::service_info))
        .route("/health", get(handlers::public::health))
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        router
    }
}

fn page_routes() -> Router<AppState> {
    use handlers::pages;

    Router::new()
        .route("/", get(pages::page))
        .route("/dashboard", get(pages::page))
        .route("/admin-dashboard", get(pages::page))
        .route("/data-entry-dashboard", get(pages::page))
}

fn business_routes() -> Router<AppState> {
    Router::new()
        .route("/business/:business_id/:page", get(handlers::business::business_page))
        .route_layer(middleware::from_fn(business_admin_middleware))
}

fn access_routes() -> Router<AppState> {
    use handlers::access;

    Router::new()
        .route("/api/access/whoami", get(access::whoami))
        .route("/api/access/route", get(access::route_get))
        .route("/api/access/navigation", get(access::navigation_get))
        .route(
            "/api/access/business",
            get(access::business_get).put(access::business_put),
        )
        .route("/api/access/business/:business_id/authorize", get(access::authorize_get))
        .route("/api/access/session", axum::routing::delete(access::session_delete))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::PUT, Method::DELETE])
            .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE]),
    )
}
