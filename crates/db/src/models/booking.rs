//! Booking models.

use collabbridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: DbId,
    pub event_id: DbId,
    pub planner_id: DbId,
    pub professional_id: DbId,
    pub status: String,
    pub rate: Option<f64>,
    pub notes: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A booking joined with its event and both parties' names.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub id: DbId,
    pub event_id: DbId,
    pub planner_id: DbId,
    pub professional_id: DbId,
    pub status: String,
    pub rate: Option<f64>,
    pub notes: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub event_title: String,
    pub event_start_date: Timestamp,
    pub planner_name: String,
    pub planner_avatar: Option<String>,
    pub professional_name: String,
    pub professional_avatar: Option<String>,
}

/// DTO for `POST /bookings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub event_id: DbId,
    pub professional_id: DbId,
    pub rate: Option<f64>,
    pub notes: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

/// DTO for `PUT /bookings/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: String,
}

/// An accepted booking whose event starts soon, for reminders.
#[derive(Debug, Clone, FromRow)]
pub struct UpcomingBooking {
    pub booking_id: DbId,
    pub event_id: DbId,
    pub planner_id: DbId,
    pub professional_id: DbId,
    pub planner_name: String,
}
