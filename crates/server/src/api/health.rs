//! Liveness and a redacted view of the running configuration.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub categorizer_ready: bool,
    pub blobs: usize,
    pub config: serde_json::Value,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        categorizer_ready: state.categorizer.is_some(),
        blobs: state.blobs().len(),
        config: state.config.redacted_summary(),
    })
}
