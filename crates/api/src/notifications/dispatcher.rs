//! Stores notifications, pushes them live, and queues email copies.

use std::sync::Arc;

use collabbridge_core::error::CoreError;
use collabbridge_core::notification::CHANNEL_EMAIL;
use collabbridge_core::notification_templates::{
    booking_template, event_template, message_template, review_template, BookingNotice,
    EventNotice, Template,
};
use collabbridge_core::pagination::{PageRequest, Pagination};
use collabbridge_core::roles::Role;
use collabbridge_core::types::DbId;
use collabbridge_db::models::notification::{NewNotification, Notification};
use collabbridge_db::repositories::{NotificationRepo, OutboxRepo, UserRepo};
use collabbridge_db::DbPool;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::ws::WsManager;

/// Live frame type for a new notification.
pub const FRAME_NOTIFICATION: &str = "notification";

/// Creates notifications for users.
///
/// Every `send_*` call inserts the row first; the live push and the email
/// copy are best-effort and never fail the call.
#[derive(Clone)]
pub struct NotificationDispatcher {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Store a notification and deliver it.
    ///
    /// With `send_email` set, an email copy is queued in the outbox for the
    /// `OutboxProcessor` rather than sent inline.
    pub async fn send_notification(
        &self,
        input: NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        let notification = NotificationRepo::create(&self.pool, &input).await?;

        let pushed = self
            .ws_manager
            .send_event(input.user_id, FRAME_NOTIFICATION, &notification)
            .await;
        tracing::debug!(
            notification_id = notification.id,
            user_id = input.user_id,
            notification_type = %input.notification_type,
            connections = pushed,
            "Notification stored",
        );

        if input.send_email {
            self.queue_email(&notification).await;
        }

        Ok(notification)
    }

    async fn queue_email(&self, notification: &Notification) {
        let user = match UserRepo::find_by_id(&self.pool, notification.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(user_id = notification.user_id, "No user for email notification");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = notification.user_id, "Failed to load email recipient");
                return;
            }
        };

        if let Err(e) = OutboxRepo::enqueue(
            &self.pool,
            Some(notification.id),
            notification.user_id,
            CHANNEL_EMAIL,
            &user.email,
            &notification.title,
            &notification.message,
        )
        .await
        {
            tracing::warn!(
                error = %e,
                notification_id = notification.id,
                "Failed to queue notification email",
            );
        }
    }

    async fn send_template(
        &self,
        user_id: DbId,
        template: Template,
        metadata: serde_json::Value,
    ) -> Result<Notification, sqlx::Error> {
        let input = NewNotification::new(
            user_id,
            template.notification_type,
            template.title,
            template.message,
        )
        .with_metadata(metadata)
        .with_priority(template.priority)
        .with_email(template.send_email);
        self.send_notification(input).await
    }

    /// Booking lifecycle notification. `counterpart` is the other party's
    /// display name.
    pub async fn send_booking_notification(
        &self,
        user_id: DbId,
        recipient: Role,
        notice: BookingNotice,
        booking_id: DbId,
        event_title: &str,
        counterpart: &str,
    ) -> Result<Notification, sqlx::Error> {
        let template = booking_template(notice, recipient, event_title, counterpart);
        self.send_template(user_id, template, json!({ "bookingId": booking_id }))
            .await
    }

    /// Event or application notification.
    #[allow(clippy::too_many_arguments)]
    pub async fn send_event_notification(
        &self,
        user_id: DbId,
        recipient: Role,
        notice: EventNotice,
        event_id: DbId,
        application_id: Option<DbId>,
        event_title: &str,
        counterpart: &str,
    ) -> Result<Notification, sqlx::Error> {
        let template = event_template(notice, recipient, event_title, counterpart);
        let mut metadata = json!({ "eventId": event_id });
        if let Some(application_id) = application_id {
            metadata["applicationId"] = json!(application_id);
        }
        self.send_template(user_id, template, metadata).await
    }

    pub async fn send_message_notification(
        &self,
        recipient_id: DbId,
        conversation_id: DbId,
        sender_name: &str,
        content: &str,
    ) -> Result<Notification, sqlx::Error> {
        let template = message_template(sender_name, content);
        self.send_template(
            recipient_id,
            template,
            json!({ "conversationId": conversation_id }),
        )
        .await
    }

    pub async fn send_review_notification(
        &self,
        subject_id: DbId,
        review_id: DbId,
        reviewer_name: &str,
        rating: i32,
    ) -> Result<Notification, sqlx::Error> {
        let template = review_template(reviewer_name, rating);
        self.send_template(
            subject_id,
            template,
            json!({ "reviewId": review_id, "rating": rating }),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Reading and housekeeping
    // -----------------------------------------------------------------------

    /// A page of the user's notifications, newest first.
    pub async fn get_users_notifications(
        &self,
        user_id: DbId,
        page: PageRequest,
        unread_only: bool,
    ) -> AppResult<(Vec<Notification>, Pagination)> {
        let notifications = NotificationRepo::list_for_user(
            &self.pool,
            user_id,
            unread_only,
            page.limit,
            page.offset(),
        )
        .await?;
        let total = NotificationRepo::count_for_user(&self.pool, user_id, unread_only).await?;
        Ok((notifications, page.paginate(total)))
    }

    /// Mark one of the user's notifications read. Already-read rows are
    /// returned unchanged; rows owned by someone else are not found.
    pub async fn mark_notification_as_read(
        &self,
        notification_id: DbId,
        user_id: DbId,
    ) -> AppResult<Notification> {
        NotificationRepo::mark_read(&self.pool, notification_id, user_id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("Notification", notification_id)))
    }

    pub async fn mark_all_as_read(&self, user_id: DbId) -> AppResult<u64> {
        Ok(NotificationRepo::mark_all_read(&self.pool, user_id).await?)
    }

    pub async fn unread_count(&self, user_id: DbId) -> AppResult<i64> {
        Ok(NotificationRepo::unread_count(&self.pool, user_id).await?)
    }

    pub async fn delete_notification(&self, notification_id: DbId, user_id: DbId) -> AppResult<()> {
        if NotificationRepo::delete(&self.pool, notification_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::not_found("Notification", notification_id)))
        }
    }
}
