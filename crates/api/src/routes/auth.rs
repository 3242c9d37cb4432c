//! Route definitions for identity registration.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /register          -> register (identity token)
/// GET    /me                -> me
/// POST   /verify            -> verify (identity token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/me", get(auth::me))
        .route("/verify", post(auth::verify))
}
