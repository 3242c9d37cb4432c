//! Read-only aggregation queries for the admin analytics dashboard.
//!
//! Ranges are half-open: `created_at >= from AND created_at < to`.

use collabbridge_core::analytics::DateRange;
use sqlx::PgPool;

use crate::models::analytics::{LabelCount, PlatformTotals, RevenueTotals};

/// Tables whose rows can be counted per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedTable {
    Users,
    Events,
    Bookings,
    Applications,
}

impl CountedTable {
    fn table(self) -> &'static str {
        match self {
            CountedTable::Users => "users",
            CountedTable::Events => "events",
            CountedTable::Bookings => "bookings",
            CountedTable::Applications => "event_applications",
        }
    }
}

/// Grouping dimensions for distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown {
    UserRole,
    EventType,
    EventStatus,
    BookingStatus,
}

impl Breakdown {
    fn table_and_column(self) -> (&'static str, &'static str) {
        match self {
            Breakdown::UserRole => ("users", "role"),
            Breakdown::EventType => ("events", "event_type"),
            Breakdown::EventStatus => ("events", "status"),
            Breakdown::BookingStatus => ("bookings", "status"),
        }
    }
}

pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// All-time platform totals.
    pub async fn platform_totals(pool: &PgPool) -> Result<PlatformTotals, sqlx::Error> {
        sqlx::query_as::<_, PlatformTotals>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS total_users, \
                (SELECT COUNT(*) FROM users WHERE is_active = true) AS active_users, \
                (SELECT COUNT(*) FROM events) AS total_events, \
                (SELECT COUNT(*) FROM events WHERE status = 'PUBLISHED') AS published_events, \
                (SELECT COUNT(*) FROM bookings) AS total_bookings, \
                (SELECT COUNT(*) FROM bookings WHERE status = 'COMPLETED') AS completed_bookings, \
                (SELECT COUNT(*) FROM reviews) AS total_reviews, \
                (SELECT COALESCE(AVG(rating)::DOUBLE PRECISION, 0) FROM reviews) AS average_rating, \
                (SELECT COUNT(*) FROM messages WHERE deleted_at IS NULL) AS total_messages",
        )
        .fetch_one(pool)
        .await
    }

    /// Rows created within `range`.
    pub async fn count_created(
        pool: &PgPool,
        table: CountedTable,
        range: &DateRange,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE created_at >= $1 AND created_at < $2",
            table.table()
        );
        sqlx::query_scalar(&query)
            .bind(range.from)
            .bind(range.to)
            .fetch_one(pool)
            .await
    }

    /// Total rows in a table.
    pub async fn count_all(pool: &PgPool, table: CountedTable) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", table.table());
        sqlx::query_scalar(&query).fetch_one(pool).await
    }

    pub async fn verified_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_verified = true")
            .fetch_one(pool)
            .await
    }

    /// Grouped counts for a breakdown. With a range, only rows created in
    /// it are counted.
    pub async fn breakdown(
        pool: &PgPool,
        breakdown: Breakdown,
        range: Option<&DateRange>,
    ) -> Result<Vec<LabelCount>, sqlx::Error> {
        let (table, column) = breakdown.table_and_column();
        let query = format!(
            "SELECT {column} AS label, COUNT(*) AS count FROM {table} \
             WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR created_at < $2) \
             GROUP BY {column}"
        );
        sqlx::query_as::<_, LabelCount>(&query)
            .bind(range.map(|r| r.from))
            .bind(range.map(|r| r.to))
            .fetch_all(pool)
            .await
    }

    /// Sum and count of completed booking rates, by booking update time.
    pub async fn completed_revenue(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<RevenueTotals, sqlx::Error> {
        sqlx::query_as::<_, RevenueTotals>(
            "SELECT COALESCE(SUM(rate), 0)::DOUBLE PRECISION AS revenue, COUNT(*) AS bookings \
             FROM bookings \
             WHERE status = 'COMPLETED' AND updated_at >= $1 AND updated_at < $2",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(pool)
        .await
    }
}
