//! Saved (bookmarked) professionals.

use collabbridge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A saved professional joined with their public profile fields.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProfessional {
    pub id: DbId,
    pub professional_id: DbId,
    pub saved_at: Timestamp,
    pub name: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub categories: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub is_available: bool,
}
