//! Review models.

use collabbridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: DbId,
    pub booking_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub author_id: DbId,
    pub subject_id: DbId,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A review joined with its author's display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithAuthor {
    pub id: DbId,
    pub booking_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub author_id: DbId,
    pub subject_id: DbId,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

/// Average rating and review count for a user.
#[derive(Debug, Clone, Copy, Default, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: i64,
}

/// DTO for `POST /reviews`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub booking_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub subject_id: DbId,
    pub rating: i32,
    pub comment: Option<String>,
}

/// DTO for `PUT /reviews/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReview {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}
