//! Handlers for `/reviews`.
//!
//! A review tied to a booking may only be written by one of its parties,
//! about the other party, once the booking is completed.

use axum::extract::{Path, Query, State};
use axum::Json;
use collabbridge_core::booking::BookingStatus;
use collabbridge_core::error::CoreError;
use collabbridge_core::review::{normalize_comment, validate_rating};
use collabbridge_core::types::DbId;
use collabbridge_db::models::review::{
    CreateReview, RatingSummary, Review, ReviewWithAuthor, UpdateReview,
};
use collabbridge_db::repositories::{BookingRepo, ReviewRepo, UserRepo};
use collabbridge_events::{names, PlatformEvent};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReviews {
    pub reviews: Vec<ReviewWithAuthor>,
    #[serde(flatten)]
    pub summary: RatingSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCheck {
    pub has_reviewed: bool,
    pub review: Option<Review>,
}

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<CreateReview>,
) -> AppResult<Json<ApiResponse<Review>>> {
    validate_rating(input.rating)?;
    input.comment = normalize_comment(input.comment.as_deref())?;
    if input.subject_id == auth.user_id {
        return Err(CoreError::Validation("Cannot review yourself".into()).into());
    }
    UserRepo::find_active(&state.pool, input.subject_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", input.subject_id))?;

    if let Some(booking_id) = input.booking_id {
        let booking = BookingRepo::find_by_id(&state.pool, booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;
        let counterpart = if booking.planner_id == auth.user_id {
            booking.professional_id
        } else if booking.professional_id == auth.user_id {
            booking.planner_id
        } else {
            return Err(CoreError::Forbidden("Not a party to this booking".into()).into());
        };
        if counterpart != input.subject_id {
            return Err(CoreError::Validation(
                "subjectId must be the other party of the booking".into(),
            )
            .into());
        }
        if booking.status != BookingStatus::Completed.as_str() {
            return Err(
                CoreError::Conflict("Only completed bookings can be reviewed".into()).into(),
            );
        }
        if ReviewRepo::find_for_booking(&state.pool, auth.user_id, booking_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict("You have already reviewed this booking".into()).into());
        }
        input.event_id = input.event_id.or(Some(booking.event_id));
    }

    let review = ReviewRepo::create(&state.pool, auth.user_id, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(names::REVIEW_CREATED)
            .with_source("review", review.id)
            .with_actor(auth.user_id),
    );

    tracing::info!(
        review_id = review.id,
        subject_id = review.subject_id,
        rating = review.rating,
        "Review created"
    );
    Ok(Json(ApiResponse::ok(review).with_message("Review submitted")))
}

/// GET /api/reviews/user/{id}
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<UserReviews>>> {
    let page = params.page_request();
    let reviews =
        ReviewRepo::list_for_subject(&state.pool, user_id, page.limit, page.offset()).await?;
    let summary = ReviewRepo::rating_summary(&state.pool, user_id).await?;
    let pagination = page.paginate(summary.review_count);
    Ok(Json(ApiResponse::paginated(
        UserReviews { reviews, summary },
        pagination,
    )))
}

/// PUT /api/reviews/{id}
pub async fn update_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateReview>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let existing = load_review(&state, id).await?;
    if existing.author_id != auth.user_id {
        return Err(CoreError::Forbidden("Only the author can edit a review".into()).into());
    }
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }
    if input.comment.is_some() {
        input.comment = normalize_comment(input.comment.as_deref())?;
    }

    let review = ReviewRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", id))?;
    Ok(Json(ApiResponse::ok(review).with_message("Review updated")))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let existing = load_review(&state, id).await?;
    if existing.author_id != auth.user_id && !auth.is_admin() {
        return Err(CoreError::Forbidden("Only the author can delete a review".into()).into());
    }
    if !ReviewRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Review", id).into());
    }
    tracing::info!(review_id = id, "Review deleted");
    Ok(Json(ApiResponse::message("Review deleted")))
}

/// GET /api/reviews/check/{booking_id}
pub async fn check_booking_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<DbId>,
) -> AppResult<Json<ApiResponse<ReviewCheck>>> {
    let review = ReviewRepo::find_for_booking(&state.pool, auth.user_id, booking_id).await?;
    Ok(Json(ApiResponse::ok(ReviewCheck {
        has_reviewed: review.is_some(),
        review,
    })))
}

async fn load_review(state: &AppState, id: DbId) -> AppResult<Review> {
    Ok(ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", id))?)
}
