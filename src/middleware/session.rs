use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::access::AccessController;
use crate::server::AppState;

/// Access state of the visitor making the request
#[derive(Clone)]
pub struct AccessSession {
    pub controller: Arc<AccessController>,
    pub token: Option<String>,
}

/// Resolves the visitor's session and profile before any handler runs.
///
/// A missing or malformed Authorization header is an anonymous visitor, not an error.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_bearer(request.headers());
    let controller = state.registry.resolve(token.as_deref()).await;

    let snapshot = controller.snapshot();
    tracing::debug!(
        "Access resolved: authenticated={} role={:?}",
        snapshot.session.identity().is_some(),
        snapshot.profile.effective_role()
    );

    request.extensions_mut().insert(AccessSession { controller, token });
    next.run(request).await
}

/// Extract bearer token from Authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
        _ => {
            tracing::debug!("Ignoring Authorization header without a bearer token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc.def"));

        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);
    }
}
