//! Route definitions for user profiles and usernames.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /username          -> get_username
/// PUT    /username          -> set_username
/// POST   /check-username    -> check_username (auth optional)
/// PUT    /profile           -> update_profile
/// PUT    /creative-profile  -> update_creative_profile (creative only)
/// PUT    /planner-profile   -> update_planner_profile (planner only)
/// GET    /{id}              -> get_user (public)
/// GET    /{id}/online       -> is_online
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/username", get(users::get_username).put(users::set_username))
        .route("/check-username", post(users::check_username))
        .route("/profile", put(users::update_profile))
        .route("/creative-profile", put(users::update_creative_profile))
        .route("/planner-profile", put(users::update_planner_profile))
        .route("/{id}", get(users::get_user))
        .route("/{id}/online", get(users::is_online))
}
