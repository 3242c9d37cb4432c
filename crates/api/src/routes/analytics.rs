//! Route definitions for platform analytics.

use axum::routing::get;
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::handlers::analytics;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Routes mounted at `/analytics`. Admin only, under the admin rate limit.
///
/// ```text
/// GET    /platform          -> platform
/// GET    /users             -> users
/// GET    /events            -> events
/// GET    /bookings          -> bookings
/// GET    /revenue           -> revenue
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/platform", get(analytics::platform))
        .route("/users", get(analytics::users))
        .route("/events", get(analytics::events))
        .route("/bookings", get(analytics::bookings))
        .route("/revenue", get(analytics::revenue))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::Admin),
            rate_limit::enforce,
        ))
}
