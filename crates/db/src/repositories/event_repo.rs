//! Repository for the `events` table.

use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event, UpdateEvent};

/// Column list for `events` queries.
const COLUMNS: &str = "\
    id, creator_id, planner_profile_id, title, description, event_type, \
    start_date, end_date, location, address, budget, currency, status, \
    required_roles, tags, is_public, is_featured, deadline_date, max_applicants, \
    reminder_sent_at, created_at, updated_at";

/// Visibility filter shared by [`EventRepo::list`] and [`EventRepo::count`].
///
/// `$1` is the creator filter. Without it only public published events are
/// listed; with it, every event of that creator. `$2` optionally narrows by
/// status.
const LIST_FILTER: &str = "\
    WHERE (($1::BIGINT IS NULL AND is_public = true AND status = 'PUBLISHED') \
           OR creator_id = $1) \
      AND ($2::TEXT IS NULL OR status = $2)";

/// Provides CRUD and scheduling queries for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert an event. `input` must already be validated.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        planner_profile_id: Option<DbId>,
        input: &CreateEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events \
                (creator_id, planner_profile_id, title, description, event_type, start_date, \
                 end_date, location, address, budget, currency, status, required_roles, tags, \
                 is_public, deadline_date, max_applicants) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 'USD'), \
                     COALESCE($12, 'DRAFT'), $13, $14, COALESCE($15, true), $16, $17) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(creator_id)
            .bind(planner_profile_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.event_type)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(&input.address)
            .bind(input.budget)
            .bind(&input.currency)
            .bind(&input.status)
            .bind(&input.required_roles)
            .bind(&input.tags)
            .bind(input.is_public)
            .bind(input.deadline_date)
            .bind(input.max_applicants)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List events, soonest first. See [`LIST_FILTER`] for visibility.
    pub async fn list(
        pool: &PgPool,
        creator_id: Option<DbId>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events {LIST_FILTER} \
             ORDER BY start_date ASC, id ASC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(creator_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        creator_id: Option<DbId>,
        status: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM events {LIST_FILTER}");
        sqlx::query_scalar(&query)
            .bind(creator_id)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// Patch an event. Only non-`None` fields are changed.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                event_type = COALESCE($4, event_type), \
                start_date = COALESCE($5, start_date), \
                end_date = COALESCE($6, end_date), \
                location = COALESCE($7, location), \
                address = COALESCE($8, address), \
                budget = COALESCE($9, budget), \
                currency = COALESCE($10, currency), \
                status = COALESCE($11, status), \
                required_roles = COALESCE($12, required_roles), \
                tags = COALESCE($13, tags), \
                is_public = COALESCE($14, is_public), \
                deadline_date = COALESCE($15, deadline_date), \
                max_applicants = COALESCE($16, max_applicants) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.event_type)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(&input.address)
            .bind(input.budget)
            .bind(&input.currency)
            .bind(&input.status)
            .bind(&input.required_roles)
            .bind(&input.tags)
            .bind(input.is_public)
            .bind(input.deadline_date)
            .bind(input.max_applicants)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete an event; applications and bookings cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Published events starting within `within_hours` that have not been
    /// reminded yet.
    pub async fn upcoming_unreminded(
        pool: &PgPool,
        within_hours: i32,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE status = 'PUBLISHED' \
               AND reminder_sent_at IS NULL \
               AND start_date > NOW() \
               AND start_date <= NOW() + make_interval(hours => $1::INT) \
             ORDER BY start_date ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(within_hours)
            .fetch_all(pool)
            .await
    }

    /// Stamp `reminder_sent_at`. Returns `false` if another pass already
    /// claimed this event.
    pub async fn claim_reminder(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET reminder_sent_at = NOW() \
             WHERE id = $1 AND reminder_sent_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Users with an accepted application or an accepted booking for the
    /// event, excluding the creator.
    pub async fn participant_ids(pool: &PgPool, event_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT applicant_id FROM event_applications \
             WHERE event_id = $1 AND status = 'ACCEPTED' \
             UNION \
             SELECT professional_id FROM bookings \
             WHERE event_id = $1 AND status = 'ACCEPTED'",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }
}
