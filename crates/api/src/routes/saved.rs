//! Route definitions for saved professionals.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::saved;
use crate::state::AppState;

/// Routes mounted at `/saved-professionals`.
///
/// ```text
/// GET    /                  -> list_saved
/// POST   /{id}              -> save_professional
/// DELETE /{id}              -> remove_saved
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(saved::list_saved))
        .route(
            "/{id}",
            post(saved::save_professional).delete(saved::remove_saved),
        )
}
