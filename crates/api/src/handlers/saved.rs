//! Handlers for `/saved-professionals`.

use axum::extract::{Path, State};
use axum::Json;
use collabbridge_core::error::CoreError;
use collabbridge_core::roles::Role;
use collabbridge_core::types::DbId;
use collabbridge_db::models::saved::SavedProfessional;
use collabbridge_db::repositories::{SavedProfessionalRepo, UserRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/saved-professionals
pub async fn list_saved(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<SavedProfessional>>>> {
    let saved = SavedProfessionalRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(saved)))
}

/// POST /api/saved-professionals/{id}
///
/// Saving twice is a no-op.
pub async fn save_professional(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(professional_id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let professional = UserRepo::find_active(&state.pool, professional_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", professional_id))?;
    if professional.role.parse::<Role>()? != Role::CreativeProfessional {
        return Err(CoreError::Validation("Only creative professionals can be saved".into()).into());
    }

    let message = if SavedProfessionalRepo::save(&state.pool, auth.user_id, professional_id).await? {
        "Professional saved"
    } else {
        "Professional already saved"
    };
    Ok(Json(ApiResponse::message(message)))
}

/// DELETE /api/saved-professionals/{id}
pub async fn remove_saved(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(professional_id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !SavedProfessionalRepo::remove(&state.pool, auth.user_id, professional_id).await? {
        return Err(CoreError::not_found("SavedProfessional", professional_id).into());
    }
    Ok(Json(ApiResponse::message("Professional removed from saved list")))
}
