//! Identity-token authentication extractors for Axum handlers.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use collabbridge_core::error::CoreError;
use collabbridge_core::roles::Role;
use collabbridge_core::types::DbId;
use collabbridge_db::repositories::UserRepo;

use crate::auth::identity::{IdentityClaims, IdentityError};
use crate::error::AppError;
use crate::state::AppState;

/// Registered, active user behind the request's Bearer token.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
    pub name: String,
    pub is_verified: bool,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A verified identity token, for flows that run before the user row
/// exists (registration, token checks).
#[derive(Debug, Clone)]
pub struct VerifiedIdentity(pub IdentityClaims);

/// Extract the Bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| unauthorized("Malformed Authorization header"))?;
    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized("Invalid Authorization format. Expected: Bearer <token>")
    })?;
    Ok(Some(token.trim()))
}

/// Verify `token` with the configured identity verifier.
pub async fn verify_identity(state: &AppState, token: &str) -> Result<IdentityClaims, AppError> {
    state.identity.verify(token).await.map_err(|e| match e {
        IdentityError::Expired => unauthorized("Token has expired"),
        IdentityError::Invalid(reason) => {
            tracing::debug!(reason = %reason, "Rejected identity token");
            unauthorized("Invalid or expired token")
        }
    })
}

/// Resolve a token to the registered, active user it belongs to.
pub async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = verify_identity(state, token).await?;

    let user = UserRepo::find_by_firebase_uid(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| unauthorized("User is not registered"))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role = user.role.parse::<Role>().map_err(|_| {
        AppError::InternalError(format!("user {} has unknown role '{}'", user.id, user.role))
    })?;

    Ok(AuthUser {
        user_id: user.id,
        role,
        name: user.name,
        is_verified: user.is_verified,
    })
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;
        authenticate(state, token).await
    }
}

/// Anonymous callers get `None`; a present but invalid token is still
/// rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(&parts.headers)? {
            Some(token) => authenticate(state, token).await.map(Some),
            None => Ok(None),
        }
    }
}

impl FromRequestParts<AppState> for VerifiedIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;
        verify_identity(state, token).await.map(VerifiedIdentity)
    }
}
