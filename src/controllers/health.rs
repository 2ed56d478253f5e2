use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use crate::infrastructure::config::Config;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(config): State<Arc<Config>>) -> impl IntoResponse {
    let cache = if config.tts_cache_enabled { "enabled" } else { "disabled" };

    if config.is_tts_configured() {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "tts": "configured",
                "cache": cache
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "tts": "not_configured",
                "cache": cache
            })),
        )
    }
}
