//! REST interface to the fulfillment dashboard.
//!
//! Upload a CSV, then request dashboards for any filter combination.

pub mod handlers;
pub mod service;

pub use service::DashboardService;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(service: Arc<DashboardService>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/upload", post(handlers::upload))
        .route("/api/v1/options", get(handlers::get_options))
        .route("/api/v1/dashboard", get(handlers::get_dashboard))
        .with_state(service)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
