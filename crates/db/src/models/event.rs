//! Event and event application models.

use collabbridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: DbId,
    pub creator_id: DbId,
    pub planner_profile_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub location: Option<String>,
    pub address: Option<String>,
    pub budget: Option<f64>,
    pub currency: String,
    pub status: String,
    pub required_roles: Vec<String>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub is_featured: bool,
    pub deadline_date: Option<Timestamp>,
    pub max_applicants: Option<i32>,
    pub reminder_sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub location: Option<String>,
    pub address: Option<String>,
    pub budget: Option<f64>,
    pub currency: Option<String>,
    /// Defaults to `DRAFT`.
    pub status: Option<String>,
    #[serde(default)]
    pub required_roles: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_public: Option<bool>,
    pub deadline_date: Option<Timestamp>,
    pub max_applicants: Option<i32>,
}

/// DTO for `PUT /events/{id}`. All fields are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub budget: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub required_roles: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub deadline_date: Option<Timestamp>,
    pub max_applicants: Option<i32>,
}

/// A row from the `event_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventApplication {
    pub id: DbId,
    pub event_id: DbId,
    pub applicant_id: DbId,
    pub status: String,
    pub message: Option<String>,
    pub proposed_rate: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An application joined with its event and applicant.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    pub id: DbId,
    pub event_id: DbId,
    pub applicant_id: DbId,
    pub status: String,
    pub message: Option<String>,
    pub proposed_rate: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub event_title: String,
    pub event_start_date: Timestamp,
    pub event_creator_id: DbId,
    pub applicant_name: String,
    pub applicant_avatar: Option<String>,
}

/// DTO for `POST /events/{id}/apply`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplication {
    pub message: Option<String>,
    pub proposed_rate: Option<f64>,
}

/// DTO for `PUT /applications/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateApplicationStatus {
    pub status: String,
}
