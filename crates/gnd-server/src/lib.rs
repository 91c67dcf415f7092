//! gnd-server - Reconciliation API server for gnd.
//!
//! Serves the reconciliation, suggest, flyout and data extension
//! protocols over HTTP on top of a [`gnd_core::Engine`].
//!
//! # Example
//!
//! ```ignore
//! use gnd_server::{create_server, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let index = IndexFactory::create(&config.index)?;
//!     let state = AppState::new(Engine::new(config, index)?);
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod loader;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
