//! Suggest, flyout and property proposal endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use gnd_core::{Flyout, ProposedProperties, SuggestResponse};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters of the suggest endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub prefix: String,
    #[serde(rename = "type")]
    pub type_id: Option<String>,
    pub limit: Option<String>,
}

impl SuggestParams {
    fn type_id(&self) -> Option<&str> {
        self.type_id.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Unparseable limits are ignored.
    fn limit(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|l| l.trim().parse().ok())
    }
}

#[derive(Debug, Deserialize)]
pub struct FlyoutParams {
    pub id: String,
}

/// GET /reconcile/suggest/entity
pub async fn suggest_entity(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> ApiResult<Json<SuggestResponse>> {
    let result = state
        .engine()
        .suggest()
        .suggest_entity(&params.prefix, params.type_id(), params.limit())
        .await?;
    Ok(Json(SuggestResponse { result }))
}

/// GET /reconcile/suggest/type
pub async fn suggest_type(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<SuggestResponse> {
    let mut result = state.engine().suggest().suggest_type(&params.prefix);
    if let Some(limit) = params.limit().filter(|l| *l > 0) {
        result.truncate(limit);
    }
    Json(SuggestResponse { result })
}

/// GET /reconcile/suggest/property
pub async fn suggest_property(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<SuggestResponse> {
    let mut result = state
        .engine()
        .suggest()
        .suggest_property(&params.prefix, params.type_id());
    if let Some(limit) = params.limit().filter(|l| *l > 0) {
        result.truncate(limit);
    }
    Json(SuggestResponse { result })
}

/// GET /reconcile/flyout/entity
pub async fn flyout_entity(
    State(state): State<AppState>,
    Query(params): Query<FlyoutParams>,
) -> ApiResult<Json<Flyout>> {
    state
        .engine()
        .suggest()
        .flyout(&params.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Entity '{}' not found", params.id)))
}

/// GET /reconcile/properties
pub async fn propose_properties(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> ApiResult<Json<ProposedProperties>> {
    let type_id = params
        .type_id()
        .ok_or_else(|| ApiError::bad_request("Missing 'type' parameter"))?;
    Ok(Json(
        state
            .engine()
            .extension()
            .propose_properties(type_id, params.limit()),
    ))
}
