//! Route definitions for search and discovery.

use axum::routing::get;
use axum::{middleware, Router};
use collabbridge_core::rate_limit::PolicyGroup;

use crate::handlers::search;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Routes mounted at `/search`, all under the search rate limit.
///
/// ```text
/// GET    /professionals     -> search_professionals (auth optional)
/// GET    /events            -> search_events (auth optional)
/// GET    /categories        -> popular_categories
/// GET    /suggestions       -> suggestions
/// GET    /facets            -> facets
/// GET    /suggested         -> suggested_professionals
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/professionals", get(search::search_professionals))
        .route("/events", get(search::search_events))
        .route("/categories", get(search::popular_categories))
        .route("/suggestions", get(search::suggestions))
        .route("/facets", get(search::facets))
        .route("/suggested", get(search::suggested_professionals))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), PolicyGroup::Search),
            rate_limit::enforce,
        ))
}
