//! Caller identity extraction from a JWT Bearer token or X-Identity header (dev mode).

use axum::{extract::FromRequestParts, http::request::Parts};
use feed_core::Identity;
use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Issuer expected in bearer tokens.
pub const TOKEN_ISSUER: &str = "feed-auth";

/// Header carrying a hex identity when dev identities are allowed.
pub const IDENTITY_HEADER: &str = "X-Identity";

/// JWT claims structure.
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// Subject: the caller identity as a 64-char hex string.
    pub sub: String,
    #[serde(default)]
    pub iss: Option<String>,
}

/// The identity of the caller making a request.
///
/// Priority:
/// 1. `Authorization: Bearer <jwt>`: signature checked, `sub` is the identity.
/// 2. `X-Identity` header, only if `allow_dev_identity` is set.
/// 3. No credentials and `allow_dev_identity` set: the anonymous identity.
/// 4. Otherwise `Unauthorized`.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Identity);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_caller(parts, state.config()).map(CallerIdentity)
    }
}

fn resolve_caller(parts: &Parts, config: &ServerConfig) -> Result<Identity, ApiError> {
    if let Some(auth_header) = parts.headers.get(http::header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| {
            ApiError::Unauthorized("Authorization header contains invalid characters".into())
        })?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return identity_from_jwt(token.trim(), config);
        }
    }

    if config.allow_dev_identity {
        return identity_from_dev_header(parts);
    }

    Err(ApiError::Unauthorized(
        "Missing Authorization: Bearer <jwt> header".into(),
    ))
}

/// Validate a JWT and read the caller identity from its `sub` claim.
fn identity_from_jwt(token: &str, config: &ServerConfig) -> Result<Identity, ApiError> {
    if config.jwt_public_key.is_empty() {
        return Err(ApiError::Internal(
            "JWT_PUBLIC_KEY not configured on server".into(),
        ));
    }

    let key = DecodingKey::from_ed_pem(config.jwt_public_key.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse JWT public key");
        ApiError::Internal("Invalid JWT public key configuration".into())
    })?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data: TokenData<Claims> =
        jsonwebtoken::decode(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            ApiError::Unauthorized(format!("Invalid token: {}", e))
        })?;

    token_data
        .claims
        .sub
        .parse::<Identity>()
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token subject: {}", e)))
}

/// Read the identity from the X-Identity header, falling back to anonymous.
fn identity_from_dev_header(parts: &Parts) -> Result<Identity, ApiError> {
    let Some(header_value) = parts.headers.get(IDENTITY_HEADER) else {
        tracing::debug!("No credentials provided, using anonymous identity (dev mode)");
        return Ok(Identity::anonymous());
    };

    let hex_str = header_value.to_str().map_err(|_| {
        ApiError::BadRequest("X-Identity header contains invalid characters".to_string())
    })?;

    let identity = hex_str
        .trim()
        .parse::<Identity>()
        .map_err(|e| ApiError::BadRequest(format!("Invalid X-Identity header: {}", e)))?;

    tracing::debug!(identity = %identity, "Using dev identity from X-Identity header");
    Ok(identity)
}
