pub mod auth;
pub mod clients;
pub mod contact;
pub mod content;
pub mod geo;
pub mod health;
pub mod seo;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(seo::routes())
        .merge(content::routes())
        .merge(clients::routes())
        .merge(contact::routes())
        .merge(geo::routes())
        .with_state(state)
}
