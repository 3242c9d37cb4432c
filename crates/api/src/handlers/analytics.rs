//! Handlers for `/analytics`. Admin only.
//!
//! Every report takes optional `?from=&to=` bounds and compares against the
//! preceding period of equal length (the current month when omitted).

use axum::extract::{Query, State};
use axum::Json;
use collabbridge_db::models::analytics::{
    BookingAnalytics, EventAnalytics, PlatformStatistics, RevenueAnalytics, UsersAnalytics,
};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::DateRangeParams;
use crate::response::ApiResponse;
use crate::services::AnalyticsService;
use crate::state::AppState;

/// GET /api/analytics/platform
pub async fn platform(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<PlatformStatistics>>> {
    let (from, to) = params.bounds()?;
    let stats = AnalyticsService::new(state.pool.clone())
        .get_platform_statistics(from, to)
        .await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/analytics/users
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<UsersAnalytics>>> {
    let (from, to) = params.bounds()?;
    let report = AnalyticsService::new(state.pool.clone())
        .get_users_analytics(from, to)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/analytics/events
pub async fn events(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<EventAnalytics>>> {
    let (from, to) = params.bounds()?;
    let report = AnalyticsService::new(state.pool.clone())
        .get_event_analytics(from, to)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/analytics/bookings
pub async fn bookings(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<BookingAnalytics>>> {
    let (from, to) = params.bounds()?;
    let report = AnalyticsService::new(state.pool.clone())
        .get_booking_analytics(from, to)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/analytics/revenue
pub async fn revenue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<RevenueAnalytics>>> {
    let (from, to) = params.bounds()?;
    let report = AnalyticsService::new(state.pool.clone())
        .get_revenue_analytics(from, to)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}
