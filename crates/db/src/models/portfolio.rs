//! Portfolio projects and view analytics.

use collabbridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `portfolio_projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioProject {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub media_urls: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /portfolio/projects`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioProject {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for `POST /portfolio/{user_id}/views`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub project_id: Option<DbId>,
}

/// View count for one project.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectViewCount {
    pub project_id: DbId,
    pub title: String,
    pub views: i64,
}

/// Aggregate counters behind [`PortfolioAnalytics`].
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct ViewTotals {
    pub total_views: i64,
    pub recent_views: i64,
    pub unique_viewers: i64,
}

/// Response for `GET /portfolio/analytics`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalytics {
    pub total_views: i64,
    /// Views strictly newer than the trailing window start.
    pub recent_views: i64,
    pub unique_viewers: i64,
    pub window_hours: i64,
    pub projects: Vec<ProjectViewCount>,
}
