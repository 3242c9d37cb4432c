//! Handlers for `/messages`. All logic lives in [`MessagingService`].
//!
//! [`MessagingService`]: crate::services::MessagingService

use axum::extract::{Path, Query, State};
use axum::Json;
use collabbridge_core::types::DbId;
use collabbridge_db::models::messaging::{
    Conversation, ConversationSummary, MessageDetails, SendMessage, StartConversation,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSearchParams {
    pub q: String,
    pub conversation_id: Option<DbId>,
}

/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SendMessage>,
) -> AppResult<Json<ApiResponse<MessageDetails>>> {
    let message = state.messaging().send_message(auth.user_id, input).await?;
    Ok(Json(ApiResponse::ok(message).with_message("Message sent")))
}

/// GET /api/messages/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<ConversationSummary>>>> {
    let (items, pagination) = state
        .messaging()
        .get_conversations(auth.user_id, params.page_request())
        .await?;
    Ok(Json(ApiResponse::paginated(items, pagination)))
}

/// POST /api/messages/conversations
pub async fn start_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<StartConversation>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    let conversation = state
        .messaging()
        .get_or_create_conversation(auth.user_id, input.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(conversation)))
}

/// GET /api/messages/conversations/{id}
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<MessageDetails>>>> {
    let (items, pagination) = state
        .messaging()
        .get_messages(id, auth.user_id, params.page_request())
        .await?;
    Ok(Json(ApiResponse::paginated(items, pagination)))
}

/// PUT /api/messages/conversations/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let marked = state.messaging().mark_messages_as_read(id, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(json!({ "markedCount": marked }))))
}

/// GET /api/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let count = state.messaging().get_unread_count(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(json!({ "count": count }))))
}

/// GET /api/messages/search
pub async fn search_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<MessageSearchParams>,
) -> AppResult<Json<ApiResponse<Vec<MessageDetails>>>> {
    let results = state
        .messaging()
        .search_messages(auth.user_id, &params.q, params.conversation_id)
        .await?;
    Ok(Json(ApiResponse::ok(results)))
}

/// DELETE /api/messages/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.messaging().delete_message(id, auth.user_id).await?;
    Ok(Json(ApiResponse::message("Message deleted")))
}
