//! Route definitions for reviews.

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::handlers::reviews;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// POST   /                      -> create_review (review limit)
/// GET    /user/{id}             -> list_for_user (public)
/// PUT    /{id}                  -> update_review (author)
/// DELETE /{id}                  -> delete_review (author or admin)
/// GET    /check/{booking_id}    -> check_booking_review
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/", post(reviews::create_review))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::Review),
            rate_limit::enforce,
        ));

    Router::new()
        .route("/user/{id}", get(reviews::list_for_user))
        .route(
            "/{id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/check/{booking_id}", get(reviews::check_booking_review))
        .merge(create)
}
