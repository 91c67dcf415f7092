//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub index: String,
    pub ontology_terms: usize,
    pub version: String,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.engine();
    Json(HealthResponse {
        status: "healthy".to_string(),
        index: engine.index().index_name().to_string(),
        ontology_terms: engine.ontology().len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
