//! Route definitions for the reconciliation API.

mod health;
mod reconcile;
mod suggest;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Manifest, reconciliation and data extension
        .route(
            "/reconcile",
            get(reconcile::reconcile_get).post(reconcile::reconcile_post),
        )
        // Suggest services
        .route("/reconcile/suggest/entity", get(suggest::suggest_entity))
        .route("/reconcile/suggest/type", get(suggest::suggest_type))
        .route("/reconcile/suggest/property", get(suggest::suggest_property))
        .route("/reconcile/flyout/entity", get(suggest::flyout_entity))
        .route("/reconcile/properties", get(suggest::propose_properties))
        // Attach state
        .with_state(state)
}

pub use health::*;
pub use reconcile::*;
pub use suggest::*;
