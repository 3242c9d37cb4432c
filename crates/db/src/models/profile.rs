//! Role profile models: event planners and creative professionals.

use collabbridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `event_planner_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `creative_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub categories: Vec<String>,
    pub skills: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub is_available: bool,
    pub experience: Option<String>,
    pub portfolio_links: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /users/planner-profile`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlannerProfile {
    pub company_name: Option<String>,
    pub website: Option<String>,
}

/// DTO for `PUT /users/creative-profile`.
///
/// `categories` and `skills` are normalized by the handler before they
/// reach the repository.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreativeProfile {
    pub categories: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub is_available: Option<bool>,
    pub experience: Option<String>,
    pub portfolio_links: Option<Vec<String>>,
}
