//! Route definitions for media upload.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::handlers::upload;
use crate::middleware::rate_limit;
use crate::state::AppState;
use crate::upload::MAX_UPLOAD_BYTES;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Routes mounted at `/upload`.
///
/// ```text
/// POST   /                  -> upload_file (multipart, upload limit)
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(upload::upload_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::Upload),
            rate_limit::enforce,
        ))
}
