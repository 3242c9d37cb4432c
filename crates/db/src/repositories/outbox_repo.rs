//! Repository for the `notification_outbox` table.

use collabbridge_core::notification::MAX_OUTBOX_ATTEMPTS;
use collabbridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::OutboxEntry;

/// Column list for `notification_outbox` queries.
const COLUMNS: &str = "\
    id, notification_id, user_id, channel, recipient, subject, body, attempts, \
    last_error, delivered_at, next_attempt_at, created_at";

/// Seconds a claimed row stays invisible to other pollers.
const CLAIM_LEASE_SECS: i32 = 300;

/// Pending email deliveries, written by the dispatcher and drained by the
/// outbox processor.
pub struct OutboxRepo;

impl OutboxRepo {
    pub async fn enqueue(
        pool: &PgPool,
        notification_id: Option<DbId>,
        user_id: DbId,
        channel: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notification_outbox \
                (notification_id, user_id, channel, recipient, subject, body) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(channel)
        .bind(recipient)
        .bind(subject)
        .bind(body)
        .fetch_one(pool)
        .await
    }

    /// Claim up to `limit` due rows, leasing them so a concurrent poller
    /// skips them.
    pub async fn claim_due(pool: &PgPool, limit: i64) -> Result<Vec<OutboxEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_outbox \
             SET next_attempt_at = NOW() + make_interval(secs => $3::INT) \
             WHERE id IN ( \
                 SELECT id FROM notification_outbox \
                 WHERE delivered_at IS NULL AND attempts < $2 AND next_attempt_at <= NOW() \
                 ORDER BY next_attempt_at ASC, id ASC \
                 LIMIT $1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(limit)
            .bind(MAX_OUTBOX_ATTEMPTS)
            .bind(CLAIM_LEASE_SECS)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_delivered(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_outbox \
             SET delivered_at = NOW(), attempts = attempts + 1, last_error = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed attempt and schedule the next one.
    pub async fn record_failure(
        pool: &PgPool,
        id: DbId,
        error: &str,
        retry_in_secs: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_outbox \
             SET attempts = attempts + 1, last_error = $2, \
                 next_attempt_at = NOW() + make_interval(secs => $3::DOUBLE PRECISION) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(retry_in_secs as f64)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Rows still waiting for delivery, including ones not yet due.
    pub async fn pending_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_outbox \
             WHERE delivered_at IS NULL AND attempts < $1",
        )
        .bind(MAX_OUTBOX_ATTEMPTS)
        .fetch_one(pool)
        .await
    }
}
