//! Handlers for `/applications`.

use axum::extract::{Path, Query, State};
use axum::Json;
use collabbridge_core::error::CoreError;
use collabbridge_core::event::{check_application_transition, ApplicationActor, ApplicationStatus};
use collabbridge_core::types::DbId;
use collabbridge_db::models::event::{ApplicationDetails, EventApplication, UpdateApplicationStatus};
use collabbridge_db::repositories::ApplicationRepo;
use collabbridge_events::{names, PlatformEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireCreative, RequirePlanner};
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/applications
///
/// Applications to the caller's own events.
pub async fn list_received(
    State(state): State<AppState>,
    RequirePlanner(auth): RequirePlanner,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<ApplicationDetails>>>> {
    let page = params.page_request();
    let items =
        ApplicationRepo::list_for_planner(&state.pool, auth.user_id, page.limit, page.offset())
            .await?;
    let total = ApplicationRepo::count_for_planner(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::paginated(items, page.paginate(total))))
}

/// GET /api/applications/my
pub async fn list_mine(
    State(state): State<AppState>,
    RequireCreative(auth): RequireCreative,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<ApplicationDetails>>>> {
    let page = params.page_request();
    let items =
        ApplicationRepo::list_for_applicant(&state.pool, auth.user_id, page.limit, page.offset())
            .await?;
    let total = ApplicationRepo::count_for_applicant(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::paginated(items, page.paginate(total))))
}

/// PUT /api/applications/{id}/status
///
/// The event owner accepts or rejects; the applicant withdraws. The write
/// is conditional on the status read here, so a concurrent change yields
/// 409.
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateApplicationStatus>,
) -> AppResult<Json<ApiResponse<EventApplication>>> {
    let target: ApplicationStatus = input.status.parse()?;
    let details = ApplicationRepo::find_details(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Application", id))?;

    let actor = if details.event_creator_id == auth.user_id || auth.is_admin() {
        ApplicationActor::EventOwner
    } else if details.applicant_id == auth.user_id {
        ApplicationActor::Applicant
    } else {
        return Err(CoreError::Forbidden("Not a party to this application".into()).into());
    };
    let current: ApplicationStatus = details.status.parse()?;
    check_application_transition(current, target, actor)?;

    let application =
        ApplicationRepo::update_status(&state.pool, id, current.as_str(), target.as_str())
            .await?
            .ok_or_else(|| CoreError::Conflict("Application status changed concurrently".into()))?;

    let name = match target {
        ApplicationStatus::Accepted => Some(names::APPLICATION_ACCEPTED),
        ApplicationStatus::Rejected => Some(names::APPLICATION_REJECTED),
        _ => None,
    };
    if let Some(name) = name {
        state.event_bus.publish(
            PlatformEvent::new(name)
                .with_source("application", id)
                .with_actor(auth.user_id),
        );
    }

    tracing::info!(application_id = id, status = %target, "Application status updated");
    Ok(Json(
        ApiResponse::ok(application).with_message(format!("Application {}", target.as_str().to_lowercase())),
    ))
}
