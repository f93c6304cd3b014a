//! # Catalog Server
//!
//! HTTP front end for [`catalog_core`]. Exposes:
//!
//! - `POST /api/search`: run a catalog search, body is a
//!   [`SearchCriteria`](catalog_core::SearchCriteria) JSON object
//! - `GET /ping`: liveness probe

pub mod handlers;
pub mod infra;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use infra::app_state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping_handler))
        .route("/api/search", post(handlers::search::search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
