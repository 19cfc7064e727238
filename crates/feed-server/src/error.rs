//! API error types with `{ "err": ... }` responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feed_core::RpcResult;
use feed_store::StoreError;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store or service error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(StoreError::MsgNotFound(_)) => "NOT_FOUND",
            Self::Store(StoreError::InvalidContent(_)) => "INVALID_CONTENT",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => match e {
                StoreError::MsgNotFound(_) => StatusCode::NOT_FOUND,
                StoreError::InvalidContent(_) => StatusCode::BAD_REQUEST,
                StoreError::DuplicateMsg(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Backend failures are logged in full but reported generically.
    fn public_message(&self) -> String {
        match self {
            Self::Store(e) if !e.is_caller_error() => "storage error".to_string(),
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::warn!(error = %self, code = self.code(), "Request rejected");
        }

        let body: RpcResult<()> = RpcResult::Err(self.public_message());
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use feed_core::{ContentError, MsgId};

    #[test]
    fn test_store_errors_map_to_statuses() {
        let not_found = ApiError::from(StoreError::MsgNotFound(MsgId::from("x")));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "NOT_FOUND");

        let invalid = ApiError::from(StoreError::InvalidContent(ContentError::Empty));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.code(), "INVALID_CONTENT");

        let corrupt = ApiError::from(StoreError::Corrupt("row".into()));
        assert_eq!(corrupt.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_backend_details_are_hidden() {
        let err = ApiError::from(StoreError::Corrupt("secret row detail".into()));
        assert_eq!(err.public_message(), "storage error");

        let err = ApiError::from(StoreError::MsgNotFound(MsgId::from("abc")));
        assert_eq!(err.public_message(), "message not found: abc");
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::Unauthorized("no identity".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
