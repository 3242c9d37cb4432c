//! Search & discovery models: filters, result rows, facets, and the
//! search analytics log.

use collabbridge_core::search::{EventSort, ProfessionalSort};
use collabbridge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Parsed filters for professional search.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalFilters {
    pub q: Option<String>,
    pub categories: Vec<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rate: Option<f64>,
    pub available: Option<bool>,
    pub skills: Vec<String>,
    pub sort_by: ProfessionalSort,
}

/// Parsed filters for event search.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilters {
    pub q: Option<String>,
    pub event_type: Option<String>,
    pub location: Option<String>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub required_roles: Vec<String>,
    pub featured: Option<bool>,
    pub sort_by: EventSort,
}

/// One professional in search results, with computed rating.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalResult {
    pub id: DbId,
    pub name: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub is_verified: bool,
    pub categories: Vec<String>,
    pub skills: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub is_available: bool,
    pub experience: Option<String>,
    /// 0 when the professional has no reviews.
    pub average_rating: f64,
    pub review_count: i64,
    pub created_at: Timestamp,
}

/// One event in search results, with planner and activity counts.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResult {
    pub id: DbId,
    pub creator_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub location: Option<String>,
    pub budget: Option<f64>,
    pub currency: String,
    pub status: String,
    pub required_roles: Vec<String>,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub deadline_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub planner_name: String,
    pub company_name: Option<String>,
    pub application_count: i64,
    pub booking_count: i64,
}

/// Category with the number of professionals listing it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// A single facet value with its count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FacetValue {
    pub value: String,
    pub count: i64,
}

/// Facet counts for professional search refinement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchFacets {
    pub categories: Vec<FacetValue>,
    pub locations: Vec<FacetValue>,
    pub availability: Vec<FacetValue>,
}

/// Raw autocomplete candidate before ranking.
#[derive(Debug, Clone, FromRow)]
pub struct SuggestionRow {
    pub kind: String,
    pub text: String,
    pub entity_id: Option<DbId>,
}

/// Entry for the `search_queries` analytics log.
#[derive(Debug, Clone)]
pub struct SearchLogEntry {
    pub user_id: Option<DbId>,
    /// `professionals` or `events`.
    pub search_type: &'static str,
    pub query_text: Option<String>,
    pub filters: serde_json::Value,
    pub result_count: i64,
}
