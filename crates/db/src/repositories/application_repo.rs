//! Repository for the `event_applications` table.

use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{ApplicationDetails, CreateApplication, EventApplication};

/// Column list for `event_applications` queries.
const COLUMNS: &str = "\
    id, event_id, applicant_id, status, message, proposed_rate, created_at, updated_at";

/// Application joined with event and applicant display fields.
const DETAILS_SELECT: &str = "\
    SELECT a.id, a.event_id, a.applicant_id, a.status, a.message, a.proposed_rate, \
           a.created_at, a.updated_at, \
           e.title AS event_title, e.start_date AS event_start_date, \
           e.creator_id AS event_creator_id, \
           u.name AS applicant_name, u.avatar AS applicant_avatar \
    FROM event_applications a \
    JOIN events e ON e.id = a.event_id \
    JOIN users u ON u.id = a.applicant_id";

pub struct ApplicationRepo;

impl ApplicationRepo {
    /// Apply to an event. A second application by the same user fails with a
    /// unique violation on `uq_event_applications_event_applicant`.
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        applicant_id: DbId,
        input: &CreateApplication,
    ) -> Result<EventApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_applications (event_id, applicant_id, message, proposed_rate) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventApplication>(&query)
            .bind(event_id)
            .bind(applicant_id)
            .bind(&input.message)
            .bind(input.proposed_rate)
            .fetch_one(pool)
            .await
    }

    pub async fn find_details(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ApplicationDetails>, sqlx::Error> {
        let query = format!("{DETAILS_SELECT} WHERE a.id = $1");
        sqlx::query_as::<_, ApplicationDetails>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All applications to one event, newest first.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<ApplicationDetails>, sqlx::Error> {
        let query = format!("{DETAILS_SELECT} WHERE a.event_id = $1 ORDER BY a.created_at DESC, a.id DESC");
        sqlx::query_as::<_, ApplicationDetails>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Applications submitted by a professional.
    pub async fn list_for_applicant(
        pool: &PgPool,
        applicant_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApplicationDetails>, sqlx::Error> {
        let query = format!(
            "{DETAILS_SELECT} WHERE a.applicant_id = $1 \
             ORDER BY a.created_at DESC, a.id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ApplicationDetails>(&query)
            .bind(applicant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_applicant(pool: &PgPool, applicant_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_applications WHERE applicant_id = $1")
            .bind(applicant_id)
            .fetch_one(pool)
            .await
    }

    /// Applications to events created by a planner.
    pub async fn list_for_planner(
        pool: &PgPool,
        planner_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApplicationDetails>, sqlx::Error> {
        let query = format!(
            "{DETAILS_SELECT} WHERE e.creator_id = $1 \
             ORDER BY a.created_at DESC, a.id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ApplicationDetails>(&query)
            .bind(planner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_planner(pool: &PgPool, planner_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_applications a \
             JOIN events e ON e.id = a.event_id WHERE e.creator_id = $1",
        )
        .bind(planner_id)
        .fetch_one(pool)
        .await
    }

    /// Applications that still occupy a slot (not rejected or withdrawn).
    pub async fn count_active_for_event(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_applications \
             WHERE event_id = $1 AND status IN ('PENDING', 'ACCEPTED')",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await
    }

    /// Move an application to `status` if it is still in `expected`.
    ///
    /// Returns `None` when the row changed concurrently.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
    ) -> Result<Option<EventApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE event_applications SET status = $3 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventApplication>(&query)
            .bind(id)
            .bind(expected)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
