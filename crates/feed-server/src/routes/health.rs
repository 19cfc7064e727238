//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Storage backend in use ("memory" or "postgres").
    pub backend: &'static str,
    /// Number of stored messages.
    pub msgs: u64,
}

/// GET /health - Health check endpoint.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let store = state.messages().store();
    let msgs = store.count_msgs().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        backend: store.backend_name(),
        msgs,
    }))
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use feed_store::Store;

    #[tokio::test]
    async fn test_health_check() {
        let state = AppState::new(Store::in_memory(), ServerConfig::default());
        let Json(response) = health_check(State(state)).await.unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.backend, "memory");
        assert_eq!(response.msgs, 0);
    }
}
