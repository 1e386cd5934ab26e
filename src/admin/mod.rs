//! Admin API for inspecting and resetting resilience policies.
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::resilience::ResilienceRegistry;

pub struct AdminState {
    pub registry: Arc<ResilienceRegistry>,
    pub api_key: String,
}

pub fn setup_admin_router(registry: Arc<ResilienceRegistry>, api_key: &str) -> Router {
    let state = Arc::new(AdminState {
        registry,
        api_key: api_key.to_string(),
    });

    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/resilience", get(get_resilience))
        .route("/admin/resilience/{name}/reset", post(reset_policy))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        let registry = Arc::new(ResilienceRegistry::from_config(&ServiceConfig::default().policies));
        setup_admin_router(registry, "secret")
    }

    fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let response = router().oneshot(request("GET", "/admin/status", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router()
            .oneshot(request("GET", "/admin/status", Some("wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router()
            .oneshot(request("GET", "/admin/status", Some("secret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_lists_policies() {
        let response = router()
            .oneshot(request("GET", "/admin/resilience", Some("secret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body[0]["name"], "address");
        assert_eq!(body[0]["circuit_breaker"]["state"], "CLOSED");
        assert_eq!(body[2]["name"], "flaky");
        assert_eq!(body[2]["retry_max_attempts"], 3);
    }

    #[tokio::test]
    async fn test_reset() {
        let response = router()
            .oneshot(request("POST", "/admin/resilience/address/reset", Some("secret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router()
            .oneshot(request("POST", "/admin/resilience/nope/reset", Some("secret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
