//! Route definitions for event applications.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::applications;
use crate::state::AppState;

/// Routes mounted at `/applications`.
///
/// ```text
/// GET    /                  -> list_received (planner)
/// GET    /my                -> list_mine (creative)
/// PUT    /{id}/status       -> update_status (owner or applicant)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(applications::list_received))
        .route("/my", get(applications::list_mine))
        .route("/{id}/status", put(applications::update_status))
}
