use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use forge_core_health_contracts::HealthService;
use serde::Serialize;

pub fn router(service: Arc<impl HealthService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health))
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    http: bool,
    email: bool,
}

async fn health(service: State<Arc<impl HealthService>>) -> Response {
    let status = service.get_status().await;

    let code = if status.ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let response = HealthResponse {
        http: true,
        email: status.email,
    };

    (code, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use forge_core_health_contracts::{HealthStatus, MockHealthService};
    use tower::ServiceExt;

    use super::*;

    async fn get_health(service: MockHealthService) -> (StatusCode, serde_json::Value) {
        let response = router(Arc::new(service))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn healthy() {
        let service = MockHealthService::new().with_get_status(HealthStatus { email: true });

        let (status, body) = get_health(service).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"http": true, "email": true}));
    }

    #[tokio::test]
    async fn smtp_unreachable() {
        let service = MockHealthService::new().with_get_status(HealthStatus { email: false });

        let (status, body) = get_health(service).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"http": true, "email": false}));
    }
}
