//! Event reminder scheduler.
//!
//! [`ReminderScheduler`] wakes hourly, finds published events starting in
//! the next day that have not been reminded, claims each one, and publishes
//! [`names::EVENT_REMINDER`]. The notification router turns the event into
//! per-recipient notifications.

use std::sync::Arc;
use std::time::Duration;

use collabbridge_db::repositories::EventRepo;
use collabbridge_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::bus::{names, EventBus, PlatformEvent};

/// How often the scheduler scans for upcoming events.
const REMINDER_CHECK_INTERVAL: Duration = Duration::from_secs(3600);

/// Look-ahead window for reminders.
pub const REMINDER_WINDOW_HOURS: i32 = 24;

/// Background service that publishes one reminder per upcoming event.
pub struct ReminderScheduler {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl ReminderScheduler {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Run the scan loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(REMINDER_CHECK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.send_reminder_notifications().await {
                        tracing::error!(error = %e, "Failed to send event reminders");
                    }
                }
            }
        }
    }

    /// Publish reminders for every unclaimed upcoming event.
    ///
    /// Returns the number of events reminded in this pass. An event claimed
    /// by a concurrent pass is skipped, so each event is reminded once.
    pub async fn send_reminder_notifications(&self) -> Result<usize, sqlx::Error> {
        let events = EventRepo::upcoming_unreminded(&self.pool, REMINDER_WINDOW_HOURS).await?;
        let mut reminded = 0;

        for event in &events {
            if !EventRepo::claim_reminder(&self.pool, event.id).await? {
                continue;
            }

            self.bus.publish(
                PlatformEvent::new(names::EVENT_REMINDER)
                    .with_source("event", event.id)
                    .with_actor(event.creator_id)
                    .with_payload(serde_json::json!({
                        "eventTitle": event.title,
                        "startDate": event.start_date,
                    })),
            );
            reminded += 1;
        }

        if reminded > 0 {
            tracing::info!(count = reminded, "Published event reminders");
        }

        Ok(reminded)
    }
}
