//! Route definitions for portfolio projects and views.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::portfolio;
use crate::state::AppState;

/// Routes mounted at `/portfolio`.
///
/// ```text
/// GET    /projects          -> list_projects (?userId=)
/// POST   /projects          -> create_project (creative)
/// DELETE /projects/{id}     -> delete_project (owner)
/// POST   /{user_id}/views   -> record_view (auth optional)
/// GET    /analytics         -> analytics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(portfolio::list_projects).post(portfolio::create_project),
        )
        .route("/projects/{id}", delete(portfolio::delete_project))
        .route("/{user_id}/views", post(portfolio::record_view))
        .route("/analytics", get(portfolio::analytics))
}
