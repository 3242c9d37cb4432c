//! Handlers for `/users`: usernames, profiles, presence.

use axum::extract::{Path, State};
use axum::Json;
use collabbridge_core::error::CoreError;
use collabbridge_core::profile::{normalize_skills, parse_categories, validate_rate};
use collabbridge_core::roles::Role;
use collabbridge_core::types::{DbId, Timestamp};
use collabbridge_core::username::{normalize_username, username_candidates};
use collabbridge_db::models::profile::{
    CreativeProfile, PlannerProfile, UpdateCreativeProfile, UpdatePlannerProfile,
};
use collabbridge_db::models::user::{UpdateUserProfile, User, UserProfileView};
use collabbridge_db::repositories::{ProfileRepo, ReviewRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireCreative, RequirePlanner};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Alternatives offered when a username is taken.
const USERNAME_SUGGESTIONS: usize = 3;

/// Longest accepted display name.
const MAX_NAME_LENGTH: usize = 100;

/// Attach role profiles and the review summary to a user.
pub async fn load_profile_view(state: &AppState, user: User) -> AppResult<UserProfileView> {
    let (creative_profile, planner_profile) = match user.role.parse::<Role>()? {
        Role::CreativeProfessional => (ProfileRepo::find_creative(&state.pool, user.id).await?, None),
        Role::EventPlanner => (None, ProfileRepo::find_planner(&state.pool, user.id).await?),
        Role::Admin => (None, None),
    };
    let rating = ReviewRepo::rating_summary(&state.pool, user.id).await?;
    Ok(UserProfileView {
        user,
        creative_profile,
        planner_profile,
        average_rating: rating.average_rating,
        review_count: rating.review_count,
    })
}

/// Another user's profile as anyone may see it: no email.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: DbId,
    pub name: String,
    pub username: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: Timestamp,
    pub creative_profile: Option<CreativeProfile>,
    pub planner_profile: Option<PlannerProfile>,
    pub average_rating: f64,
    pub review_count: i64,
}

impl From<UserProfileView> for PublicProfile {
    fn from(view: UserProfileView) -> Self {
        let user = view.user;
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
            is_verified: user.is_verified,
            avatar: user.avatar,
            bio: user.bio,
            location: user.location,
            created_at: user.created_at,
            creative_profile: view.creative_profile,
            planner_profile: view.planner_profile,
            average_rating: view.average_rating,
            review_count: view.review_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Usernames
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameStatus {
    pub username: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// GET /api/users/username
pub async fn get_username(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;
    Ok(Json(ApiResponse::ok(serde_json::json!({
        "username": user.username,
    }))))
}

/// PUT /api/users/username
pub async fn set_username(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UsernameRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let username = normalize_username(&input.username)?;
    let user = UserRepo::set_username(&state.pool, auth.user_id, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;
    tracing::info!(user_id = user.id, username = %username, "Username set");
    Ok(Json(ApiResponse::ok(user).with_message("Username updated")))
}

/// POST /api/users/check-username
///
/// A taken name comes back unavailable with free alternatives. The
/// caller's own current username counts as available.
pub async fn check_username(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Json(input): Json<UsernameRequest>,
) -> AppResult<Json<ApiResponse<UsernameStatus>>> {
    let username = normalize_username(&input.username)?;

    let owner = UserRepo::find_by_username(&state.pool, &username).await?;
    let available = match (&owner, &auth) {
        (None, _) => true,
        (Some(owner), Some(auth)) => owner.id == auth.user_id,
        (Some(_), None) => false,
    };

    let suggestions = if available {
        Vec::new()
    } else {
        let candidates: Vec<String> = username_candidates(&username, USERNAME_SUGGESTIONS + 5)
            .into_iter()
            .filter(|c| normalize_username(c).is_ok())
            .collect();
        let taken = UserRepo::taken_usernames(&state.pool, &candidates).await?;
        candidates
            .into_iter()
            .filter(|c| !taken.contains(c))
            .take(USERNAME_SUGGESTIONS)
            .collect()
    };

    Ok(Json(ApiResponse::ok(UsernameStatus {
        username,
        available,
        suggestions,
    })))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let user = UserRepo::find_active(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    let view = load_profile_view(&state, user).await?;
    Ok(Json(ApiResponse::ok(PublicProfile::from(view))))
}

/// GET /api/users/{id}/online
pub async fn is_online(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let online = state.ws_manager.is_online(id).await;
    Ok(Json(ApiResponse::ok(serde_json::json!({
        "userId": id,
        "online": online,
    }))))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<UpdateUserProfile>,
) -> AppResult<Json<ApiResponse<User>>> {
    if let Some(name) = input.name.as_deref() {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "name must be between 1 and {MAX_NAME_LENGTH} characters"
            ))
            .into());
        }
        input.name = Some(name.to_string());
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;
    Ok(Json(ApiResponse::ok(user).with_message("Profile updated")))
}

/// PUT /api/users/creative-profile
pub async fn update_creative_profile(
    State(state): State<AppState>,
    RequireCreative(auth): RequireCreative,
    Json(mut input): Json<UpdateCreativeProfile>,
) -> AppResult<Json<ApiResponse<CreativeProfile>>> {
    validate_rate(input.hourly_rate)?;
    if let Some(categories) = input.categories.take() {
        input.categories = Some(
            parse_categories(&categories)?
                .into_iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        );
    }
    if let Some(skills) = input.skills.take() {
        input.skills = Some(normalize_skills(&skills));
    }

    let profile = ProfileRepo::upsert_creative(&state.pool, auth.user_id, &input).await?;
    Ok(Json(ApiResponse::ok(profile).with_message("Creative profile updated")))
}

/// PUT /api/users/planner-profile
pub async fn update_planner_profile(
    State(state): State<AppState>,
    RequirePlanner(auth): RequirePlanner,
    Json(input): Json<UpdatePlannerProfile>,
) -> AppResult<Json<ApiResponse<PlannerProfile>>> {
    let profile = ProfileRepo::upsert_planner(&state.pool, auth.user_id, &input).await?;
    Ok(Json(ApiResponse::ok(profile).with_message("Planner profile updated")))
}
