//! Profile routes.
//!
//! - GET /profiles/{identity} - Anyone's profile, or null
//! - GET /profile - The caller's own profile, or null
//! - PUT /profile - Set the caller's username
//! - GET /whoami - The identity the server resolved for the caller

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use feed_core::{Identity, UserProfile};

use crate::error::{ApiError, ApiResult};
use crate::extract::CallerIdentity;
use crate::routes::msgs::{json_body, path_param};
use crate::state::AppState;

/// Request body for PUT /profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name. Not validated; may be empty.
    pub username: String,
}

/// Response for GET /whoami.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub identity: Identity,
    pub username: Option<String>,
}

/// GET /profiles/{identity} - Look up a profile by identity hex.
async fn get_profile_of(
    State(state): State<AppState>,
    identity: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Option<UserProfile>>> {
    let who: Identity = path_param(identity)?
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid identity: {}", e)))?;

    let profile = state.profiles().get_user_profile(&who).await?;
    Ok(Json(profile))
}

/// GET /profile - The caller's profile.
async fn get_own_profile(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Option<UserProfile>>> {
    let profile = state.profiles().get_user_profile(&caller).await?;
    Ok(Json(profile))
}

/// PUT /profile - Create or replace the caller's profile.
async fn update_profile(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let request = json_body(payload)?;

    state
        .profiles()
        .update_user_profile(caller, &request.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /whoami - Echo the resolved caller identity and its username.
async fn whoami(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<WhoAmIResponse>> {
    let username = state.profiles().username_of(&caller).await?;
    Ok(Json(WhoAmIResponse {
        identity: caller,
        username,
    }))
}

/// Build profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profiles/{identity}", get(get_profile_of))
        .route("/profile", get(get_own_profile).put(update_profile))
        .route("/whoami", get(whoami))
}
