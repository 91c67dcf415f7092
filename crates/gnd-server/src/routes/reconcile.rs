//! Manifest, reconciliation and data extension.
//!
//! Clients send JSON inside the `queries`, `query` or `extend` parameter,
//! either in the query string (GET) or a form body (POST). Without any of
//! them the service manifest is returned.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Form, Json,
};
use gnd_core::{ExtensionRequest, ReconciliationQuery, ReconciliationResponse};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Protocol parameters shared by GET and POST.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileParams {
    /// Batch of keyed queries.
    pub queries: Option<String>,
    /// One query, as JSON or plain text.
    pub query: Option<String>,
    /// Data extension request.
    pub extend: Option<String>,
}

/// GET /reconcile
pub async fn reconcile_get(
    State(state): State<AppState>,
    Query(params): Query<ReconcileParams>,
) -> ApiResult<Response> {
    dispatch(&state, params).await
}

/// POST /reconcile
pub async fn reconcile_post(
    State(state): State<AppState>,
    Form(params): Form<ReconcileParams>,
) -> ApiResult<Response> {
    dispatch(&state, params).await
}

async fn dispatch(state: &AppState, params: ReconcileParams) -> ApiResult<Response> {
    let engine = state.engine();

    if let Some(raw) = non_blank(params.queries) {
        let queries: BTreeMap<String, ReconciliationQuery> = parse_param("queries", &raw)?;
        tracing::debug!(queries = queries.len(), "Reconciling batch");
        let responses = engine.reconciler().reconcile_batch(&queries).await?;
        return Ok(Json(responses).into_response());
    }

    if let Some(raw) = non_blank(params.query) {
        let query = if raw.trim_start().starts_with('{') {
            parse_param("query", &raw)?
        } else {
            ReconciliationQuery::new(raw)
        };
        let result = engine.reconciler().reconcile(&query).await?;
        return Ok(Json(ReconciliationResponse { result }).into_response());
    }

    if let Some(raw) = non_blank(params.extend) {
        let request: ExtensionRequest = parse_param("extend", &raw)?;
        tracing::debug!(
            ids = request.ids.len(),
            properties = request.properties.len(),
            "Extending"
        );
        let response = engine.extension().extend(&request).await?;
        return Ok(Json(response).into_response());
    }

    Ok(Json(engine.manifest()).into_response())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_param<T: DeserializeOwned>(name: &str, raw: &str) -> ApiResult<T> {
    serde_json::from_str(raw)
        .map_err(|e| ApiError::bad_request(format!("Invalid '{}' parameter: {}", name, e)))
}
