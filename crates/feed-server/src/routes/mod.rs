//! Route definitions for the HTTP API.

pub mod events;
pub mod health;
pub mod msgs;
pub mod profiles;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(msgs::routes())
        .merge(profiles::routes())
        .merge(events::routes())
        .with_state(state)
}
