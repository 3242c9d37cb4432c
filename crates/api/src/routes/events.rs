//! Route definitions for events and applying to them.

use axum::routing::{get, post};
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::handlers::events;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                  -> list_events (auth optional)
/// POST   /                  -> create_event (planner, eventCreation limit)
/// GET    /{id}              -> get_event (auth optional)
/// PUT    /{id}              -> update_event (owner)
/// DELETE /{id}              -> delete_event (owner)
/// POST   /{id}/apply        -> apply_to_event (creative)
/// GET    /{id}/applications -> list_event_applications (owner)
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/", post(events::create_event))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::EventCreation),
            rate_limit::enforce,
        ));

    Router::new()
        .route("/", get(events::list_events))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/apply", post(events::apply_to_event))
        .route("/{id}/applications", get(events::list_event_applications))
        .merge(create)
}
