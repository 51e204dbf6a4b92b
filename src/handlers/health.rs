use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use crate::state::AppState;

/// Liveness check, never touches Odoo
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "coclock-odoo"
    }))
}

/// Readiness check: 503 until Odoo answers `common.version`
pub async fn ready_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.gateway.version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "odoo_version": version.get("server_version").cloned().unwrap_or(Value::Null),
            })),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Odoo is unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "error": err.to_string(),
                })),
            )
        }
    }
}
