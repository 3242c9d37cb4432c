//! Handlers for `/portfolio`: projects and view analytics.

use axum::extract::{Path, Query, State};
use axum::http::{Extensions, HeaderMap};
use axum::Json;
use chrono::Utc;
use collabbridge_core::analytics::{trailing_window_start, RECENT_VIEW_WINDOW_HOURS};
use collabbridge_core::error::CoreError;
use collabbridge_core::types::DbId;
use collabbridge_db::models::portfolio::{
    CreatePortfolioProject, PortfolioAnalytics, PortfolioProject, RecordView,
};
use collabbridge_db::repositories::{PortfolioRepo, UserRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::client_ip;
use crate::middleware::rbac::RequireCreative;
use crate::response::ApiResponse;
use crate::state::AppState;

const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListParams {
    /// Whose projects to list; defaults to the caller.
    pub user_id: Option<DbId>,
}

/// GET /api/portfolio/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<ApiResponse<Vec<PortfolioProject>>>> {
    let owner_id = params.user_id.unwrap_or(auth.user_id);
    let projects = PortfolioRepo::list_projects(&state.pool, owner_id).await?;
    Ok(Json(ApiResponse::ok(projects)))
}

/// POST /api/portfolio/projects
pub async fn create_project(
    State(state): State<AppState>,
    RequireCreative(auth): RequireCreative,
    Json(mut input): Json<CreatePortfolioProject>,
) -> AppResult<Json<ApiResponse<PortfolioProject>>> {
    input.title = input.title.trim().to_string();
    let len = input.title.chars().count();
    if len == 0 || len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "title must be between 1 and {MAX_TITLE_LENGTH} characters"
        ))
        .into());
    }
    input.media_urls.retain(|url| !url.trim().is_empty());

    let project = PortfolioRepo::create_project(&state.pool, auth.user_id, &input).await?;
    tracing::info!(project_id = project.id, owner_id = auth.user_id, "Portfolio project created");
    Ok(Json(ApiResponse::ok(project).with_message("Project created")))
}

/// DELETE /api/portfolio/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let project = PortfolioRepo::find_project(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("PortfolioProject", id))?;
    if project.owner_id != auth.user_id {
        return Err(CoreError::Forbidden("You do not own this project".into()).into());
    }
    if !PortfolioRepo::delete_project(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::not_found("PortfolioProject", id).into());
    }
    Ok(Json(ApiResponse::message("Project deleted")))
}

/// POST /api/portfolio/{user_id}/views
///
/// Anonymous views are recorded by client IP. Owners viewing their own
/// portfolio are not counted.
pub async fn record_view(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(owner_id): Path<DbId>,
    headers: HeaderMap,
    extensions: Extensions,
    input: Option<Json<RecordView>>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let viewer_id = auth.map(|a| a.user_id);
    if viewer_id == Some(owner_id) {
        return Ok(Json(ApiResponse::ok(json!({ "recorded": false }))));
    }
    UserRepo::find_active(&state.pool, owner_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", owner_id))?;

    let project_id = input.and_then(|Json(view)| view.project_id);
    if let Some(project_id) = project_id {
        let belongs = PortfolioRepo::find_project(&state.pool, project_id)
            .await?
            .is_some_and(|p| p.owner_id == owner_id);
        if !belongs {
            return Err(CoreError::not_found("PortfolioProject", project_id).into());
        }
    }

    let ip = client_ip(&headers, &extensions, state.config.trust_proxy_headers);
    let view_id = PortfolioRepo::record_view(
        &state.pool,
        owner_id,
        project_id,
        viewer_id,
        ip.as_deref(),
        None,
    )
    .await?;
    Ok(Json(ApiResponse::ok(json!({ "recorded": true, "viewId": view_id }))))
}

/// GET /api/portfolio/analytics
pub async fn analytics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<PortfolioAnalytics>>> {
    let since = trailing_window_start(Utc::now(), RECENT_VIEW_WINDOW_HOURS);
    let totals = PortfolioRepo::view_totals(&state.pool, auth.user_id, since).await?;
    let projects = PortfolioRepo::project_view_counts(&state.pool, auth.user_id).await?;

    Ok(Json(ApiResponse::ok(PortfolioAnalytics {
        total_views: totals.total_views,
        recent_views: totals.recent_views,
        unique_viewers: totals.unique_viewers,
        window_hours: RECENT_VIEW_WINDOW_HOURS,
        projects,
    })))
}
