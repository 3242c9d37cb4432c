//! Handlers for `/notifications`.

use axum::extract::{Path, Query, State};
use axum::Json;
use collabbridge_core::pagination::PageRequest;
use collabbridge_core::types::DbId;
use collabbridge_db::models::notification::Notification;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<NotificationListParams>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let page = PageRequest::new(params.page, params.limit);
    let (items, pagination) = state
        .notifications()
        .get_users_notifications(auth.user_id, page, params.unread_only)
        .await?;
    Ok(Json(ApiResponse::paginated(items, pagination)))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = state
        .notifications()
        .mark_notification_as_read(id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let marked = state.notifications().mark_all_as_read(auth.user_id).await?;
    Ok(Json(
        ApiResponse::ok(json!({ "markedCount": marked }))
            .with_message("All notifications marked as read"),
    ))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let count = state.notifications().unread_count(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(json!({ "count": count }))))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .notifications()
        .delete_notification(id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::message("Notification deleted")))
}
