//! Handlers for `/bookings`.
//!
//! Status changes follow the lifecycle in [`collabbridge_core::booking`]
//! and publish one `booking.*` event per accepted change.

use axum::extract::{Path, Query, State};
use axum::Json;
use collabbridge_core::booking::{check_transition, BookingActor, BookingStatus};
use collabbridge_core::error::CoreError;
use collabbridge_core::pagination::PageRequest;
use collabbridge_core::profile::validate_rate;
use collabbridge_core::roles::Role;
use collabbridge_core::types::DbId;
use collabbridge_db::models::booking::{Booking, BookingDetails, CreateBooking, UpdateBookingStatus};
use collabbridge_db::repositories::{BookingRepo, EventRepo, UserRepo};
use collabbridge_events::{names, PlatformEvent};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequirePlanner;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BookingListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    RequirePlanner(auth): RequirePlanner,
    Json(input): Json<CreateBooking>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    if input.professional_id == auth.user_id {
        return Err(CoreError::Validation("Cannot book yourself".into()).into());
    }
    validate_rate(input.rate)?;
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(CoreError::Validation("endDate must be on or after startDate".into()).into());
        }
    }

    let event = EventRepo::find_by_id(&state.pool, input.event_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Event", input.event_id))?;
    if event.creator_id != auth.user_id && !auth.is_admin() {
        return Err(CoreError::Forbidden("You do not own this event".into()).into());
    }

    let professional = UserRepo::find_active(&state.pool, input.professional_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", input.professional_id))?;
    if professional.role.parse::<Role>()? != Role::CreativeProfessional {
        return Err(CoreError::Validation("Only creative professionals can be booked".into()).into());
    }

    let booking = BookingRepo::create(&state.pool, event.creator_id, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(names::BOOKING_REQUESTED)
            .with_source("booking", booking.id)
            .with_actor(auth.user_id),
    );

    tracing::info!(
        booking_id = booking.id,
        event_id = booking.event_id,
        professional_id = booking.professional_id,
        "Booking requested"
    );
    Ok(Json(ApiResponse::ok(booking).with_message("Booking requested")))
}

/// GET /api/bookings
///
/// Bookings where the caller is either party.
pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<BookingListParams>,
) -> AppResult<Json<ApiResponse<Vec<BookingDetails>>>> {
    let page = PageRequest::new(params.page, params.limit);
    let status = match params.status.as_deref() {
        Some(raw) => Some(raw.parse::<BookingStatus>()?.as_str()),
        None => None,
    };
    let items =
        BookingRepo::list_for_user(&state.pool, auth.user_id, status, page.limit, page.offset())
            .await?;
    let total = BookingRepo::count_for_user(&state.pool, auth.user_id, status).await?;
    Ok(Json(ApiResponse::paginated(items, page.paginate(total))))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<BookingDetails>>> {
    let details = BookingRepo::find_details(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Booking", id))?;
    booking_actor(&auth, details.planner_id, details.professional_id)?;
    Ok(Json(ApiResponse::ok(details)))
}

/// PUT /api/bookings/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBookingStatus>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let target: BookingStatus = input.status.parse()?;
    let booking = BookingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Booking", id))?;

    let actor = booking_actor(&auth, booking.planner_id, booking.professional_id)?;
    let current: BookingStatus = booking.status.parse()?;
    check_transition(current, target, actor)?;

    let updated = BookingRepo::update_status(&state.pool, id, current.as_str(), target.as_str())
        .await?
        .ok_or_else(|| CoreError::Conflict("Booking status changed concurrently".into()))?;

    if let Some(name) = status_event(target) {
        state.event_bus.publish(
            PlatformEvent::new(name)
                .with_source("booking", id)
                .with_actor(auth.user_id),
        );
    }

    tracing::info!(booking_id = id, from = %current, to = %target, "Booking status updated");
    Ok(Json(ApiResponse::ok(updated).with_message("Booking status updated")))
}

/// How the caller relates to a booking. Admins act as admin only when they
/// are not a party themselves.
fn booking_actor(
    auth: &AuthUser,
    planner_id: DbId,
    professional_id: DbId,
) -> Result<BookingActor, CoreError> {
    if auth.user_id == planner_id {
        Ok(BookingActor::Planner)
    } else if auth.user_id == professional_id {
        Ok(BookingActor::Professional)
    } else if auth.is_admin() {
        Ok(BookingActor::Admin)
    } else {
        Err(CoreError::Forbidden("Not a party to this booking".into()))
    }
}

fn status_event(status: BookingStatus) -> Option<&'static str> {
    match status {
        BookingStatus::Pending => None,
        BookingStatus::Accepted => Some(names::BOOKING_ACCEPTED),
        BookingStatus::Rejected => Some(names::BOOKING_REJECTED),
        BookingStatus::Completed => Some(names::BOOKING_COMPLETED),
        BookingStatus::Cancelled => Some(names::BOOKING_CANCELLED),
    }
}
