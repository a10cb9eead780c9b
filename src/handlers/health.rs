use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    Json,
};
use serde_json::{json, Value};

use crate::db::CheckinRepository;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "checkin-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.checkins.repository().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": { "store": "ok" },
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "checks": { "store": "failed" },
                })),
            )
        }
    }
}

/// Route index for humans poking at the API.
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "message": "Check-in API is running",
        "availableRoutes": {
            "checkins": {
                "create": "POST /api/checkins",
                "list": "GET /api/checkins?limit=&skip=",
            }
        }
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "attempted": format!("{method} {}", uri.path()),
            "availableEndpoints": [
                "GET /health",
                "GET /readyz",
                "GET /api",
                "POST /api/checkins",
                "GET /api/checkins",
            ],
        })),
    )
}
