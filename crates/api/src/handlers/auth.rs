//! Handlers for `/auth`.
//!
//! Identity is proven by an identity-provider token; `register` creates the
//! local user row the first time a token is seen.

use axum::extract::State;
use axum::Json;
use collabbridge_core::error::CoreError;
use collabbridge_core::roles::Role;
use collabbridge_db::models::profile::{UpdateCreativeProfile, UpdatePlannerProfile};
use collabbridge_db::models::user::{CreateUser, User, UserProfileView};
use collabbridge_db::repositories::{ProfileRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::users::load_profile_view;
use crate::middleware::auth::{AuthUser, VerifiedIdentity};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub role: Role,
    pub name: Option<String>,
}

/// POST /api/auth/register
///
/// Idempotent: a repeated registration returns the existing user unchanged.
pub async fn register(
    State(state): State<AppState>,
    VerifiedIdentity(claims): VerifiedIdentity,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    if !input.role.is_self_assignable() {
        return Err(CoreError::Forbidden(format!("Role {} cannot be self-assigned", input.role)).into());
    }
    let email = claims
        .email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("Identity token carries no email".into()))?;
    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| claims.name.clone())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            firebase_uid: claims.sub.clone(),
            email,
            name,
            role: input.role.as_str().to_string(),
            avatar: claims.picture.clone(),
            is_verified: claims.email_verified,
        },
    )
    .await?;

    match user.role.parse::<Role>()? {
        Role::EventPlanner => {
            if ProfileRepo::find_planner(&state.pool, user.id).await?.is_none() {
                ProfileRepo::upsert_planner(&state.pool, user.id, &UpdatePlannerProfile::default())
                    .await?;
            }
        }
        Role::CreativeProfessional => {
            if ProfileRepo::find_creative(&state.pool, user.id).await?.is_none() {
                ProfileRepo::upsert_creative(&state.pool, user.id, &UpdateCreativeProfile::default())
                    .await?;
            }
        }
        Role::Admin => {}
    }

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok(Json(ApiResponse::ok(user).with_message("Registration successful")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfileView>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;
    Ok(Json(ApiResponse::ok(load_profile_view(&state, user).await?)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub email: Option<String>,
    pub email_verified: bool,
    /// Whether a local user exists for this identity.
    pub registered: bool,
}

/// POST /api/auth/verify
pub async fn verify(
    State(state): State<AppState>,
    VerifiedIdentity(claims): VerifiedIdentity,
) -> AppResult<Json<ApiResponse<VerifyResponse>>> {
    let registered = UserRepo::find_by_firebase_uid(&state.pool, &claims.sub)
        .await?
        .is_some();
    Ok(Json(ApiResponse::ok(VerifyResponse {
        valid: true,
        email: claims.email,
        email_verified: claims.email_verified,
        registered,
    })))
}
