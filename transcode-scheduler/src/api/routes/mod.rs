//! API route modules.

pub mod health;
pub mod hosts;
pub mod jobs;
pub mod logging;
pub mod presets;

use axum::Router;

use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/jobs", jobs::router())
        .nest("/api/presets", presets::router())
        .nest("/api/hosts", hosts::router())
        .nest("/api/logging", logging::router())
        .nest("/api/health", health::router())
        .with_state(state)
}
