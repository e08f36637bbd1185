//! HTTP handlers module
//!
//! This module contains the dashboard's routes organized by type:
//! - Page handlers returning view models
//! - Form action handlers for mutations
//! - Auth hand-off routes and the health check

pub mod actions;
pub mod auth;
pub mod health;
pub mod pages;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::{log_requests, rate_limit};
use crate::services::AppState;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(pages::routes())
        .merge(actions::routes())
        .merge(auth::routes())
        .route("/health", get(health::health))
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(axum::middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
