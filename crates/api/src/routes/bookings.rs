//! Route definitions for bookings.

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::handlers::bookings;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// GET    /                  -> list_bookings
/// POST   /                  -> create_booking (planner, booking limit)
/// GET    /{id}              -> get_booking (party or admin)
/// PUT    /{id}/status       -> update_status (party or admin)
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/", post(bookings::create_booking))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::Booking),
            rate_limit::enforce,
        ));

    Router::new()
        .route("/", get(bookings::list_bookings))
        .route("/{id}", get(bookings::get_booking))
        .route("/{id}/status", put(bookings::update_status))
        .merge(create)
}
