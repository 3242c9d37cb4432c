//! Route definitions for direct messaging.

use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::handlers::messages;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// POST   /                          -> send_message (message limit)
/// GET    /conversations             -> list_conversations
/// POST   /conversations             -> start_conversation
/// GET    /conversations/{id}        -> get_messages
/// PUT    /conversations/{id}/read   -> mark_read
/// GET    /unread-count              -> unread_count
/// GET    /search                    -> search_messages
/// DELETE /{id}                      -> delete_message (sender)
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    let send = Router::new()
        .route("/", post(messages::send_message))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::Message),
            rate_limit::enforce,
        ));

    Router::new()
        .route(
            "/conversations",
            get(messages::list_conversations).post(messages::start_conversation),
        )
        .route("/conversations/{id}", get(messages::get_messages))
        .route("/conversations/{id}/read", put(messages::mark_read))
        .route("/unread-count", get(messages::unread_count))
        .route("/search", get(messages::search_messages))
        .route("/{id}", delete(messages::delete_message))
        .merge(send)
}
