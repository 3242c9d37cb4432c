//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement with 403 Forbidden.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use collabbridge_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `ADMIN` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_view_platform_analytics() {
            return Err(forbidden("Admin role required"));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires a role that can own events: `EVENT_PLANNER` or `ADMIN`.
pub struct RequirePlanner(pub AuthUser);

impl FromRequestParts<AppState> for RequirePlanner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_manage_events() {
            return Err(forbidden("Event planner role required"));
        }
        Ok(RequirePlanner(user))
    }
}

/// Requires `CREATIVE_PROFESSIONAL`.
pub struct RequireCreative(pub AuthUser);

impl FromRequestParts<AppState> for RequireCreative {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_apply_to_events() {
            return Err(forbidden("Creative professional role required"));
        }
        Ok(RequireCreative(user))
    }
}

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.to_string()))
}
