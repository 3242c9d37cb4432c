//! Repository for the `bookings` table.

use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::booking::{Booking, BookingDetails, CreateBooking, UpcomingBooking};

/// Column list for `bookings` queries.
const COLUMNS: &str = "\
    id, event_id, planner_id, professional_id, status, rate, notes, \
    start_date, end_date, created_at, updated_at";

const DETAILS_SELECT: &str = "\
    SELECT b.id, b.event_id, b.planner_id, b.professional_id, b.status, b.rate, b.notes, \
           b.start_date, b.end_date, b.created_at, b.updated_at, \
           e.title AS event_title, e.start_date AS event_start_date, \
           p.name AS planner_name, p.avatar AS planner_avatar, \
           c.name AS professional_name, c.avatar AS professional_avatar \
    FROM bookings b \
    JOIN events e ON e.id = b.event_id \
    JOIN users p ON p.id = b.planner_id \
    JOIN users c ON c.id = b.professional_id";

/// `$1` is the user (either party), `$2` an optional status.
const USER_FILTER: &str = "\
    WHERE (b.planner_id = $1 OR b.professional_id = $1) \
      AND ($2::TEXT IS NULL OR b.status = $2)";

pub struct BookingRepo;

impl BookingRepo {
    pub async fn create(
        pool: &PgPool,
        planner_id: DbId,
        input: &CreateBooking,
    ) -> Result<Booking, sqlx::Error> {
        let query = format!(
            "INSERT INTO bookings \
                (event_id, planner_id, professional_id, rate, notes, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(input.event_id)
            .bind(planner_id)
            .bind(input.professional_id)
            .bind(input.rate)
            .bind(&input.notes)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_details(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BookingDetails>, sqlx::Error> {
        let query = format!("{DETAILS_SELECT} WHERE b.id = $1");
        sqlx::query_as::<_, BookingDetails>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Bookings where the user is either party, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookingDetails>, sqlx::Error> {
        let query = format!(
            "{DETAILS_SELECT} {USER_FILTER} \
             ORDER BY b.created_at DESC, b.id DESC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, BookingDetails>(&query)
            .bind(user_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        status: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM bookings b {USER_FILTER}");
        sqlx::query_scalar(&query)
            .bind(user_id)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// Compare-and-set status change. Returns `None` when the booking is no
    /// longer in `expected`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET status = $3 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(expected)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Accepted bookings for an event, for reminders.
    pub async fn accepted_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<UpcomingBooking>, sqlx::Error> {
        sqlx::query_as::<_, UpcomingBooking>(
            "SELECT b.id AS booking_id, b.event_id, b.planner_id, b.professional_id, \
                    p.name AS planner_name \
             FROM bookings b JOIN users p ON p.id = b.planner_id \
             WHERE b.event_id = $1 AND b.status = 'ACCEPTED'",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }
}
