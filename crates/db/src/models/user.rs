//! User entity model and DTOs.

use collabbridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::profile::{CreativeProfile, PlannerProfile};

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    /// Identity-provider subject. Never exposed over the API.
    #[serde(skip_serializing)]
    pub firebase_uid: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub username: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public fields of another user, embedded in conversations, reviews, etc.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: DbId,
    pub name: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
    pub location: Option<String>,
}

/// A user together with their role profile and review summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileView {
    #[serde(flatten)]
    pub user: User,
    pub creative_profile: Option<CreativeProfile>,
    pub planner_profile: Option<PlannerProfile>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// DTO for creating a user on first authentication.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub firebase_uid: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
}

/// DTO for `PUT /users/profile`. All fields are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserProfile {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}
