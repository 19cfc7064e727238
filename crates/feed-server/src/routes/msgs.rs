//! Message routes.
//!
//! - POST /msgs - Post a message
//! - GET /timeline - Every message, most recent first
//! - GET /msgs?category= - Messages in one category
//! - GET /feed?category= - Messages with author usernames
//! - GET /msgs/{id} - One message
//! - GET /msgs/{id}/replies - Replies to a message
//! - POST /msgs/{id}/replies - Reply to a message
//! - POST /msgs/{id}/like - Like a message
//! - POST /msgs/{id}/share - Share a message

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use feed_core::{Category, FeedItem, Msg, MsgId, RpcResult};

use crate::error::{ApiError, ApiResult};
use crate::extract::CallerIdentity;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Request body for POST /msgs and POST /msgs/{id}/replies.
#[derive(Debug, Deserialize)]
pub struct PostMsgRequest {
    /// Message text; must not be blank.
    pub content: String,
    /// Category name, case-insensitive. Defaults to `All`.
    #[serde(default)]
    pub category: Option<String>,
}

/// Query string accepted by the listing routes.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub category: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse an optional category name; absent means `All`.
pub(crate) fn parse_category(raw: Option<&str>) -> ApiResult<Category> {
    match raw {
        None => Ok(Category::All),
        Some(name) => name
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("{}", e))),
    }
}

/// Unwrap a JSON body, reporting malformed input as a 400 `{err}` body.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Unwrap a query string, reporting malformed input as a 400 `{err}` body.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Unwrap a path parameter, reporting undecodable segments as a 400 `{err}` body.
pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> ApiResult<T> {
    path.map(|Path(param)| param)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

type Created<T> = (StatusCode, Json<RpcResult<T>>);

// ============================================================================
// Handlers
// ============================================================================

/// POST /msgs - Post a new message as the caller.
async fn create_msg(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    payload: Result<Json<PostMsgRequest>, JsonRejection>,
) -> ApiResult<Created<Msg>> {
    let request = json_body(payload)?;
    let category = parse_category(request.category.as_deref())?;

    let msg = state
        .messages()
        .create_msg(caller, &request.content, category)
        .await?;
    state.broadcaster().publish_msg(&msg).await;

    Ok((StatusCode::CREATED, Json(RpcResult::Ok(msg))))
}

/// GET /timeline - Every message, most recent first.
async fn get_timeline(State(state): State<AppState>) -> ApiResult<Json<Vec<Msg>>> {
    let msgs = state.messages().get_timeline().await?;
    Ok(Json(msgs))
}

/// GET /msgs?category= - Messages in a category (absent means `All`).
async fn get_msgs_by_category(
    State(state): State<AppState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Msg>>> {
    let query = query_params(query)?;
    let category = parse_category(query.category.as_deref())?;
    let msgs = state.messages().get_msgs_by_category(category).await?;
    Ok(Json(msgs))
}

/// GET /feed?category= - Messages paired with their author's username.
async fn get_feed(
    State(state): State<AppState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<FeedItem>>> {
    let query = query_params(query)?;
    let category = parse_category(query.category.as_deref())?;
    let items = state.messages().get_feed(category).await?;
    Ok(Json(items))
}

/// GET /msgs/{id} - A single message.
async fn get_msg(
    State(state): State<AppState>,
    id: Result<Path<MsgId>, PathRejection>,
) -> ApiResult<Json<RpcResult<Msg>>> {
    let id = path_param(id)?;
    let msg = state.messages().get_msg(&id).await?;
    Ok(Json(RpcResult::Ok(msg)))
}

/// GET /msgs/{id}/replies - Replies to a message, oldest first.
async fn get_replies(
    State(state): State<AppState>,
    id: Result<Path<MsgId>, PathRejection>,
) -> ApiResult<Json<RpcResult<Vec<Msg>>>> {
    let id = path_param(id)?;
    let replies = state.messages().get_replies(&id).await?;
    Ok(Json(RpcResult::Ok(replies)))
}

/// POST /msgs/{id}/replies - Reply to a message as the caller.
async fn reply_to_msg(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    id: Result<Path<MsgId>, PathRejection>,
    payload: Result<Json<PostMsgRequest>, JsonRejection>,
) -> ApiResult<Created<Msg>> {
    let id = path_param(id)?;
    let request = json_body(payload)?;
    let category = parse_category(request.category.as_deref())?;

    let reply = state
        .messages()
        .reply_to_msg(caller, &id, &request.content, category)
        .await?;
    state.broadcaster().publish_reply(&id, &reply).await;

    Ok((StatusCode::CREATED, Json(RpcResult::Ok(reply))))
}

/// POST /msgs/{id}/like - Add a like.
async fn like_msg(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    id: Result<Path<MsgId>, PathRejection>,
) -> ApiResult<Json<RpcResult<Msg>>> {
    let id = path_param(id)?;
    let msg = state.messages().like_msg(&id).await?;
    tracing::debug!(msg_id = %id, caller = %caller, "Like recorded");
    state.broadcaster().publish_like(&msg).await;
    Ok(Json(RpcResult::Ok(msg)))
}

/// POST /msgs/{id}/share - Add a share.
async fn share_msg(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    id: Result<Path<MsgId>, PathRejection>,
) -> ApiResult<Json<RpcResult<Msg>>> {
    let id = path_param(id)?;
    let msg = state.messages().share_msg(&id).await?;
    tracing::debug!(msg_id = %id, caller = %caller, "Share recorded");
    state.broadcaster().publish_share(&msg).await;
    Ok(Json(RpcResult::Ok(msg)))
}

/// Build message routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/msgs", post(create_msg).get(get_msgs_by_category))
        .route("/timeline", get(get_timeline))
        .route("/feed", get(get_feed))
        .route("/msgs/{id}", get(get_msg))
        .route("/msgs/{id}/replies", get(get_replies).post(reply_to_msg))
        .route("/msgs/{id}/like", post(like_msg))
        .route("/msgs/{id}/share", post(share_msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category(None).unwrap(), Category::All);
        assert_eq!(parse_category(Some("news")).unwrap(), Category::News);
        assert_eq!(parse_category(Some("Crypto")).unwrap(), Category::Crypto);
        assert!(matches!(
            parse_category(Some("weather")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_post_request_category_is_optional() {
        let request: PostMsgRequest = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(request.content, "hi");
        assert!(request.category.is_none());
    }
}
