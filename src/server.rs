use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use crate::handlers;
use crate::state::AppState;

/// Build the HTTP server with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/tasks", get(handlers::tasks_handler))
        .route("/api/timesheets", post(handlers::timesheets_handler))
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erp::MockGateway;
    use crate::models::UserRecord;
    use crate::odoo::Many2one;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(gateway: &MockGateway) -> Router {
        build_router(AppState::new(Arc::new(gateway.clone()), Some("coclock".to_string())))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app(&MockGateway::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_endpoint_offline() {
        let gateway = MockGateway::new();
        gateway.set_offline(true);

        let response = app(&gateway)
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_tasks_without_key() {
        let response = app(&MockGateway::new())
            .oneshot(Request::builder().uri("/api/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert!(body["id"].is_null());
        assert_eq!(body["result"]["status"], "error");
        assert_eq!(body["result"]["message"], "No API key provided");
        assert_eq!(body["result"]["code"], 401);
    }

    #[tokio::test]
    async fn test_tasks_with_bad_key() {
        let gateway = MockGateway::new();
        gateway.add_api_key("coclock", "key", 6);

        let response = app(&gateway)
            .oneshot(
                Request::builder()
                    .uri("/api/tasks")
                    .header("authorization", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["result"]["message"], "API key problem");
        assert_eq!(body["result"]["code"], 403);
    }

    #[tokio::test]
    async fn test_tasks_echoes_request_id() {
        let gateway = MockGateway::new();
        gateway.add_api_key("coclock", "key", 6);
        gateway.add_user(UserRecord { id: 6, company_id: Some(Many2one(1, "YourCompany".to_string())) });

        let response = app(&gateway)
            .oneshot(
                Request::builder()
                    .uri("/api/tasks")
                    .header("authorization", "key")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"jsonrpc": "2.0", "id": 42, "params": {}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["id"], 42);
        assert_eq!(body["result"]["status"], "success");
        assert_eq!(body["result"]["tasks"], json!([]));
    }

    #[tokio::test]
    async fn test_timesheets_roundtrip() {
        let gateway = MockGateway::new();
        gateway.add_api_key("coclock", "key", 6);
        gateway.add_employee(14, "marc@example.com", true);

        let request_body = json!({
            "timesheets": [{
                "employee": {"email": "marc@example.com"},
                "coclock_instance_id": "cc-1",
                "description": "Call",
                "duration": 30,
                "project_id": 3,
                "task_id": 12,
                "start_time": "2024-05-02"
            }]
        });

        let response = app(&gateway)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/timesheets")
                    .header("authorization", "coclock:key")
                    .header("content-type", "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["result"]["status"], "success");
        assert_eq!(body["result"]["timesheets"], 1);
        assert_eq!(gateway.lines()[0].1.unit_amount, 0.5);
    }

    #[tokio::test]
    async fn test_timesheets_missing_parameter() {
        let response = app(&MockGateway::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/timesheets")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["result"]["message"], "Missing parameter: timesheets");
        assert_eq!(body["result"]["code"], 404);
    }

    #[tokio::test]
    async fn test_timesheets_malformed_body() {
        let response = app(&MockGateway::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/timesheets")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["result"]["code"], 400);
    }

    #[tokio::test]
    async fn test_timesheets_rejects_get() {
        let response = app(&MockGateway::new())
            .oneshot(Request::builder().uri("/api/timesheets").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
