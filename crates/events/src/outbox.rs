//! Notification outbox processor.
//!
//! The dispatcher never sends email inline; it records an outbox row.
//! [`OutboxProcessor`] polls due rows, sends them through
//! [`EmailDelivery`], and reschedules failures with a per-row backoff until
//! [`MAX_OUTBOX_ATTEMPTS`] is reached.

use std::time::Duration;

use collabbridge_core::notification::{outbox_retry_delay_secs, MAX_OUTBOX_ATTEMPTS};
use collabbridge_db::models::notification::OutboxEntry;
use collabbridge_db::repositories::OutboxRepo;
use collabbridge_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::delivery::email::EmailDelivery;

/// How often the processor polls for due rows.
const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Rows claimed per poll.
const BATCH_SIZE: i64 = 50;

/// Counts from one processing pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutboxPass {
    pub delivered: usize,
    pub failed: usize,
    pub abandoned: usize,
}

/// Background service draining the email outbox.
pub struct OutboxProcessor {
    pool: DbPool,
    email: Option<EmailDelivery>,
}

impl OutboxProcessor {
    /// Without an [`EmailDelivery`] the processor leaves rows pending.
    pub fn new(pool: DbPool, email: Option<EmailDelivery>) -> Self {
        Self { pool, email }
    }

    /// Run the poll loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let Some(email) = &self.email else {
            tracing::warn!("SMTP not configured, email notifications stay queued in the outbox");
            cancel.cancelled().await;
            return;
        };

        let mut interval = tokio::time::interval(POLL_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Outbox processor cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.process_due(email).await {
                        Ok(pass) if pass != OutboxPass::default() => {
                            tracing::info!(
                                delivered = pass.delivered,
                                failed = pass.failed,
                                abandoned = pass.abandoned,
                                "Processed notification outbox",
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Failed to process outbox"),
                    }
                }
            }
        }
    }

    /// Claim and attempt one batch of due rows.
    pub async fn process_due(&self, email: &EmailDelivery) -> Result<OutboxPass, sqlx::Error> {
        let entries = OutboxRepo::claim_due(&self.pool, BATCH_SIZE).await?;
        let mut pass = OutboxPass::default();

        for entry in &entries {
            match email.deliver(&entry.recipient, &entry.subject, &entry.body).await {
                Ok(()) => {
                    OutboxRepo::mark_delivered(&self.pool, entry.id).await?;
                    pass.delivered += 1;
                }
                Err(e) => {
                    let retry_in = outbox_retry_delay_secs(entry.attempts);
                    OutboxRepo::record_failure(&self.pool, entry.id, &e.to_string(), retry_in)
                        .await?;
                    if is_final_attempt(entry) {
                        tracing::error!(
                            outbox_id = entry.id,
                            user_id = entry.user_id,
                            error = %e,
                            "Giving up on notification email",
                        );
                        pass.abandoned += 1;
                    } else {
                        tracing::warn!(
                            outbox_id = entry.id,
                            attempt = entry.attempts + 1,
                            retry_in_secs = retry_in,
                            error = %e,
                            "Notification email failed, will retry",
                        );
                        pass.failed += 1;
                    }
                }
            }
        }

        Ok(pass)
    }
}

/// Whether the attempt about to be recorded is the last one allowed.
fn is_final_attempt(entry: &OutboxEntry) -> bool {
    entry.attempts + 1 >= MAX_OUTBOX_ATTEMPTS
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(attempts: i32) -> OutboxEntry {
        OutboxEntry {
            id: 1,
            notification_id: Some(1),
            user_id: 1,
            channel: "email".into(),
            recipient: "ada@example.com".into(),
            subject: "s".into(),
            body: "b".into(),
            attempts,
            last_error: None,
            delivered_at: None,
            next_attempt_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fifth_failure_is_final() {
        assert!(!is_final_attempt(&entry(0)));
        assert!(!is_final_attempt(&entry(3)));
        assert!(is_final_attempt(&entry(4)));
    }
}
