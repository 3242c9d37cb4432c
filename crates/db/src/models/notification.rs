//! Notification and outbox models.

use collabbridge_core::notification::{NotificationPriority, NotificationType};
use collabbridge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub priority: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Input for creating a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: DbId,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub priority: NotificationPriority,
    pub send_email: bool,
}

impl NewNotification {
    pub fn new(
        user_id: DbId,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            notification_type,
            title: title.into(),
            message: message.into(),
            metadata: None,
            priority: NotificationPriority::default(),
            send_email: false,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_email(mut self, send_email: bool) -> Self {
        self.send_email = send_email;
        self
    }
}

/// A row from the `notification_outbox` table.
#[derive(Debug, Clone, FromRow)]
pub struct OutboxEntry {
    pub id: DbId,
    pub notification_id: Option<DbId>,
    pub user_id: DbId,
    pub channel: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub delivered_at: Option<Timestamp>,
    pub next_attempt_at: Timestamp,
    pub created_at: Timestamp,
}
