pub mod analytics;
pub mod applications;
pub mod auth;
pub mod bookings;
pub mod events;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod portfolio;
pub mod reviews;
pub mod saved;
pub mod search;
pub mod upload;
pub mod users;

use axum::routing::get;
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::middleware::rate_limit;
use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                WebSocket (?token=)
///
/// /auth/register                     create user from identity token (auth limit)
/// /auth/me                           current user with profiles
/// /auth/verify                       token check
///
/// /users/...                         usernames, profiles, presence
/// /events/...                        events and applying to them
/// /applications/...                  application review and withdrawal
/// /bookings/...                      booking lifecycle
/// /messages/...                      conversations and messages
/// /notifications/...                 notification inbox
/// /reviews/...                       reviews and rating summaries
/// /search/...                        discovery (search limit)
/// /saved-professionals/...           bookmarks
/// /portfolio/...                     projects and view analytics
/// /analytics/...                     platform reports (admin, admin limit)
/// /upload                            media upload (upload limit)
/// ```
///
/// Every route also counts against the global budget.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest(
            "/auth",
            auth::router().route_layer(middleware::from_fn_with_state(
                (state.clone(), PolicyGroup::Auth),
                rate_limit::enforce,
            )),
        )
        .nest("/users", users::router())
        .nest("/events", events::router(state))
        .nest("/applications", applications::router())
        .nest("/bookings", bookings::router(state))
        .nest("/messages", messages::router(state))
        .nest("/notifications", notifications::router())
        .nest("/reviews", reviews::router(state))
        .nest("/search", search::router(state))
        .nest("/saved-professionals", saved::router())
        .nest("/portfolio", portfolio::router())
        .nest("/analytics", analytics::router(state))
        .nest("/upload", upload::router(state))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::Global),
            rate_limit::enforce,
        ))
}
