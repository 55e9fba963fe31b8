// handlers/root.rs - GET /, GET /health and the 404 fallback

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn index() -> Json<Value> {
    Json(json!({ "message": "animals api v1" }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable",
                    "version": env!("CARGO_PKG_VERSION"),
                })),
            )
        }
    }
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("🔍 - Not Found - {}", uri))
}
