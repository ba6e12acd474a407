//! HTTP surface of the agency site: CMS content, client cases, lead capture
//! and visitor geolocation.

pub mod config;
pub mod crm;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::state::AppState;

/// Router with every route group and the standard middleware stack.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config().body_limit_bytes;
    routes::build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer())
}
