//! feed-server: HTTP API server for the feed service
//!
//! This crate provides:
//! - REST endpoints for messages, timelines, likes, shares, replies and profiles
//! - Caller identity from EdDSA bearer tokens (or a dev header)
//! - Server-Sent Events (SSE) for live updates
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - `{ "err": ... }` error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use feed_server::{AppState, ServerConfig, app};
//! use feed_store::Store;
//!
//! let state = AppState::new(Store::in_memory(), ServerConfig::from_env()?);
//! axum::serve(listener, app(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use crate::middleware::request_id::{propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use events::{EventBroadcaster, FeedEvent};
pub use extract::CallerIdentity;
pub use state::AppState;

// Re-export dependent crates
pub use feed_core;
pub use feed_store;

/// Build the full application: routes plus the middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config().cors_allowed_origins);

    routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build CORS layer from configuration.
fn build_cors_layer(allowed_origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allowed_origins {
        CorsOrigins::Any => layer.allow_origin(Any),
        CorsOrigins::List(origins) => layer.allow_origin(origins.clone()),
    }
}
