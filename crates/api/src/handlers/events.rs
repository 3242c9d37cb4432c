//! Handlers for `/events` and applications submitted to them.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use collabbridge_core::error::CoreError;
use collabbridge_core::event::{validate_budget, validate_schedule, EventStatus, EventType};
use collabbridge_core::pagination::PageRequest;
use collabbridge_core::types::DbId;
use collabbridge_db::models::event::{
    ApplicationDetails, CreateApplication, CreateEvent, Event, EventApplication, UpdateEvent,
};
use collabbridge_db::repositories::{ApplicationRepo, EventRepo, ProfileRepo};
use collabbridge_events::{names, PlatformEvent};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireCreative, RequirePlanner};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EventListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    /// `true` lists the caller's own events in every status.
    #[serde(default)]
    pub mine: bool,
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    RequirePlanner(auth): RequirePlanner,
    Json(input): Json<CreateEvent>,
) -> AppResult<Json<ApiResponse<Event>>> {
    if input.title.trim().is_empty() {
        return Err(CoreError::Validation("title is required".into()).into());
    }
    input.event_type.parse::<EventType>()?;
    if let Some(status) = input.status.as_deref() {
        status.parse::<EventStatus>()?;
    }
    validate_schedule(input.start_date, input.end_date, input.deadline_date)?;
    validate_budget(input.budget)?;

    let planner_profile_id = ProfileRepo::find_planner(&state.pool, auth.user_id)
        .await?
        .map(|p| p.id);
    let event = EventRepo::create(&state.pool, auth.user_id, planner_profile_id, &input).await?;

    tracing::info!(event_id = event.id, creator_id = auth.user_id, "Event created");
    Ok(Json(ApiResponse::ok(event).with_message("Event created")))
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Query(params): Query<EventListParams>,
) -> AppResult<Json<ApiResponse<Vec<Event>>>> {
    let page = PageRequest::new(params.page, params.limit);
    let status = match params.status.as_deref() {
        Some(raw) => Some(raw.parse::<EventStatus>()?),
        None => None,
    };
    let creator_id = match (&auth, params.mine) {
        (Some(auth), true) => Some(auth.user_id),
        (None, true) => {
            return Err(CoreError::Unauthorized("Sign in to list your own events".into()).into())
        }
        (_, false) => None,
    };
    let status = status.map(EventStatus::as_str);

    let events =
        EventRepo::list(&state.pool, creator_id, status, page.limit, page.offset()).await?;
    let total = EventRepo::count(&state.pool, creator_id, status).await?;
    Ok(Json(ApiResponse::paginated(events, page.paginate(total))))
}

/// GET /api/events/{id}
///
/// Drafts and private events are only visible to their owner and admins.
pub async fn get_event(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let event = load_event(&state, id).await?;
    let visible = (event.is_public && event.status == EventStatus::Published.as_str())
        || auth
            .as_ref()
            .is_some_and(|a| a.user_id == event.creator_id || a.is_admin());
    if !visible {
        return Err(CoreError::not_found("Event", id).into());
    }
    Ok(Json(ApiResponse::ok(event)))
}

/// PUT /api/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    RequirePlanner(auth): RequirePlanner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let existing = owned_event(&state, &auth, id).await?;

    if let Some(title) = input.title.as_deref() {
        if title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()).into());
        }
    }
    if let Some(event_type) = input.event_type.as_deref() {
        event_type.parse::<EventType>()?;
    }
    let new_status = match input.status.as_deref() {
        Some(raw) => Some(raw.parse::<EventStatus>()?),
        None => None,
    };
    validate_schedule(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.unwrap_or(existing.end_date),
        input.deadline_date.or(existing.deadline_date),
    )?;
    validate_budget(input.budget)?;

    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Event", id))?;

    let cancelled = new_status == Some(EventStatus::Cancelled)
        && existing.status != EventStatus::Cancelled.as_str();
    let name = if cancelled {
        names::EVENT_CANCELLED
    } else {
        names::EVENT_UPDATED
    };
    // Drafts have no participants to tell.
    if event.status != EventStatus::Draft.as_str() {
        state.event_bus.publish(
            PlatformEvent::new(name)
                .with_source("event", event.id)
                .with_actor(auth.user_id),
        );
    }

    tracing::info!(event_id = id, status = %event.status, "Event updated");
    Ok(Json(ApiResponse::ok(event).with_message("Event updated")))
}

/// DELETE /api/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    RequirePlanner(auth): RequirePlanner,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    owned_event(&state, &auth, id).await?;
    if !EventRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Event", id).into());
    }
    tracing::info!(event_id = id, "Event deleted");
    Ok(Json(ApiResponse::message("Event deleted")))
}

/// POST /api/events/{id}/apply
pub async fn apply_to_event(
    State(state): State<AppState>,
    RequireCreative(auth): RequireCreative,
    Path(id): Path<DbId>,
    Json(input): Json<CreateApplication>,
) -> AppResult<Json<ApiResponse<EventApplication>>> {
    let event = load_event(&state, id).await?;
    let status: EventStatus = event.status.parse()?;
    if !event.is_public || !status.accepts_applications() {
        return Err(CoreError::Conflict("Event is not accepting applications".into()).into());
    }
    if event.creator_id == auth.user_id {
        return Err(CoreError::Validation("Cannot apply to your own event".into()).into());
    }
    if event.deadline_date.is_some_and(|deadline| deadline < Utc::now()) {
        return Err(CoreError::Conflict("Application deadline has passed".into()).into());
    }
    if let Some(max) = event.max_applicants {
        let active = ApplicationRepo::count_active_for_event(&state.pool, id).await?;
        if active >= i64::from(max) {
            return Err(CoreError::Conflict("Event has reached its applicant limit".into()).into());
        }
    }
    validate_budget(input.proposed_rate)?;

    let application = ApplicationRepo::create(&state.pool, id, auth.user_id, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(names::APPLICATION_SUBMITTED)
            .with_source("application", application.id)
            .with_actor(auth.user_id),
    );

    tracing::info!(
        application_id = application.id,
        event_id = id,
        applicant_id = auth.user_id,
        "Application submitted"
    );
    Ok(Json(ApiResponse::ok(application).with_message("Application submitted")))
}

/// GET /api/events/{id}/applications
pub async fn list_event_applications(
    State(state): State<AppState>,
    RequirePlanner(auth): RequirePlanner,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Vec<ApplicationDetails>>>> {
    owned_event(&state, &auth, id).await?;
    let applications = ApplicationRepo::list_for_event(&state.pool, id).await?;
    Ok(Json(ApiResponse::ok(applications)))
}

async fn load_event(state: &AppState, id: DbId) -> AppResult<Event> {
    Ok(EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Event", id))?)
}

/// The event, provided the caller owns it or is an admin.
async fn owned_event(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Event> {
    let event = load_event(state, id).await?;
    if event.creator_id != auth.user_id && !auth.is_admin() {
        return Err(CoreError::Forbidden("You do not own this event".into()).into());
    }
    Ok(event)
}
