//! Liveness endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use super::super::AppState;

#[derive(Debug, Serialize)]
pub struct LlmHealth {
    pub model: String,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm: LlmHealth,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        llm: LlmHealth {
            model: state.assistant.model_name().to_string(),
            available: state.assistant.is_available().await,
        },
    })
}
