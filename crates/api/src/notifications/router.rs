//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the platform event bus, works out
//! who each event concerns, and hands one notification per recipient to the
//! [`NotificationDispatcher`]. Flows publish and move on; nothing here can
//! fail the request that published the event.
//!
//! A failed delivery to one recipient is logged and skipped so the rest of
//! the fan-out still goes out. Only the lookups that decide the recipient
//! list abort routing.

use std::collections::HashSet;
use std::sync::Arc;

use collabbridge_core::notification_templates::{BookingNotice, EventNotice};
use collabbridge_core::roles::Role;
use collabbridge_core::types::DbId;
use collabbridge_db::models::booking::BookingDetails;
use collabbridge_db::repositories::{
    ApplicationRepo, BookingRepo, EventRepo, ReviewRepo, UserRepo,
};
use collabbridge_db::DbPool;
use collabbridge_events::{names, PlatformEvent};
use tokio::sync::broadcast;

use crate::notifications::dispatcher::NotificationDispatcher;
use crate::ws::WsManager;

/// One booking notification to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecipient {
    pub user_id: DbId,
    pub role: Role,
    pub counterpart: String,
}

/// Routes platform events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    dispatcher: NotificationDispatcher,
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        let dispatcher = NotificationDispatcher::new(pool.clone(), Arc::clone(&ws_manager));
        Self {
            pool,
            dispatcher,
            ws_manager,
        }
    }

    /// Run the routing loop until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event to every affected user.
    pub async fn route_event(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let Some(source_id) = event.source_entity_id else {
            tracing::warn!(event_type = %event.event_type, "Event without source entity");
            return Ok(());
        };

        match event.event_type.as_str() {
            t if t.starts_with("booking.") => self.route_booking(t, source_id, event).await,
            names::APPLICATION_SUBMITTED
            | names::APPLICATION_ACCEPTED
            | names::APPLICATION_REJECTED => self.route_application(event, source_id).await,
            names::EVENT_UPDATED | names::EVENT_CANCELLED => {
                self.route_event_change(event, source_id).await
            }
            names::EVENT_REMINDER => self.route_reminder(source_id).await,
            names::MESSAGE_RECEIVED => self.route_message(event).await,
            names::REVIEW_CREATED => self.route_review(source_id).await,
            other => {
                tracing::debug!(event_type = other, "No notification route for event");
                Ok(())
            }
        }
    }

    async fn route_booking(
        &self,
        event_type: &str,
        booking_id: DbId,
        event: &PlatformEvent,
    ) -> Result<(), sqlx::Error> {
        let Some(notice) = booking_notice(event_type) else {
            return Ok(());
        };
        let Some(booking) = BookingRepo::find_details(&self.pool, booking_id).await? else {
            tracing::warn!(booking_id, "Booking vanished before notification");
            return Ok(());
        };

        for recipient in booking_recipients(notice, &booking, event.actor_user_id) {
            let sent = self
                .dispatcher
                .send_booking_notification(
                    recipient.user_id,
                    recipient.role,
                    notice,
                    booking.id,
                    &booking.event_title,
                    &recipient.counterpart,
                )
                .await;
            delivered(sent, recipient.user_id, event_type);
        }
        Ok(())
    }

    async fn route_application(
        &self,
        event: &PlatformEvent,
        application_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let Some(application) = ApplicationRepo::find_details(&self.pool, application_id).await?
        else {
            tracing::warn!(application_id, "Application vanished before notification");
            return Ok(());
        };

        if event.event_type == names::APPLICATION_SUBMITTED {
            return self
                .dispatcher
                .send_event_notification(
                    application.event_creator_id,
                    Role::EventPlanner,
                    EventNotice::ApplicationReceived,
                    application.event_id,
                    Some(application.id),
                    &application.event_title,
                    &application.applicant_name,
                )
                .await
                .map(|_| ());
        }

        let notice = if event.event_type == names::APPLICATION_ACCEPTED {
            EventNotice::ApplicationAccepted
        } else {
            EventNotice::ApplicationRejected
        };
        let counterpart = self.display_name(event.actor_user_id).await?;
        self.dispatcher
            .send_event_notification(
                application.applicant_id,
                Role::CreativeProfessional,
                notice,
                application.event_id,
                Some(application.id),
                &application.event_title,
                &counterpart,
            )
            .await?;
        Ok(())
    }

    async fn route_event_change(
        &self,
        event: &PlatformEvent,
        event_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let Some(listing) = EventRepo::find_by_id(&self.pool, event_id).await? else {
            return Ok(());
        };
        let notice = if event.event_type == names::EVENT_CANCELLED {
            EventNotice::Cancelled
        } else {
            EventNotice::Updated
        };
        let counterpart = self.display_name(Some(listing.creator_id)).await?;

        for user_id in EventRepo::participant_ids(&self.pool, event_id).await? {
            if Some(user_id) == event.actor_user_id {
                continue;
            }
            let sent = self
                .dispatcher
                .send_event_notification(
                    user_id,
                    Role::CreativeProfessional,
                    notice,
                    listing.id,
                    None,
                    &listing.title,
                    &counterpart,
                )
                .await;
            delivered(sent, user_id, &event.event_type);
        }
        Ok(())
    }

    /// Reminders: the planner gets the event copy, booked professionals the
    /// booking copy, other accepted participants the event copy.
    async fn route_reminder(&self, event_id: DbId) -> Result<(), sqlx::Error> {
        let Some(listing) = EventRepo::find_by_id(&self.pool, event_id).await? else {
            return Ok(());
        };
        let planner_name = self.display_name(Some(listing.creator_id)).await?;

        let sent = self
            .dispatcher
            .send_event_notification(
                listing.creator_id,
                Role::EventPlanner,
                EventNotice::Reminder,
                listing.id,
                None,
                &listing.title,
                &planner_name,
            )
            .await;
        let mut failed = usize::from(!delivered(sent, listing.creator_id, names::EVENT_REMINDER));

        let mut notified = HashSet::from([listing.creator_id]);
        for booking in BookingRepo::accepted_for_event(&self.pool, event_id).await? {
            if !notified.insert(booking.professional_id) {
                continue;
            }
            let sent = self
                .dispatcher
                .send_booking_notification(
                    booking.professional_id,
                    Role::CreativeProfessional,
                    BookingNotice::Reminder,
                    booking.booking_id,
                    &listing.title,
                    &booking.planner_name,
                )
                .await;
            if !delivered(sent, booking.professional_id, names::EVENT_REMINDER) {
                failed += 1;
            }
        }

        for user_id in EventRepo::participant_ids(&self.pool, event_id).await? {
            if !notified.insert(user_id) {
                continue;
            }
            let sent = self
                .dispatcher
                .send_event_notification(
                    user_id,
                    Role::CreativeProfessional,
                    EventNotice::Reminder,
                    listing.id,
                    None,
                    &listing.title,
                    &planner_name,
                )
                .await;
            if !delivered(sent, user_id, names::EVENT_REMINDER) {
                failed += 1;
            }
        }

        tracing::info!(
            event_id,
            recipients = notified.len(),
            failed,
            "Event reminders sent"
        );
        Ok(())
    }

    async fn route_message(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let payload = &event.payload;
        let (Some(recipient_id), Some(conversation_id)) = (
            payload.get("recipientId").and_then(|v| v.as_i64()),
            payload.get("conversationId").and_then(|v| v.as_i64()),
        ) else {
            tracing::warn!("Message event without recipient or conversation");
            return Ok(());
        };

        // The recipient may have opened the conversation since publishing.
        if self
            .ws_manager
            .has_conversation_open(recipient_id, conversation_id)
            .await
        {
            return Ok(());
        }

        let sender_name = payload
            .get("senderName")
            .and_then(|v| v.as_str())
            .unwrap_or("Someone");
        let content = payload
            .get("content")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        self.dispatcher
            .send_message_notification(recipient_id, conversation_id, sender_name, content)
            .await?;
        Ok(())
    }

    async fn route_review(&self, review_id: DbId) -> Result<(), sqlx::Error> {
        let Some(review) = ReviewRepo::find_by_id(&self.pool, review_id).await? else {
            return Ok(());
        };
        let reviewer = self.display_name(Some(review.author_id)).await?;
        self.dispatcher
            .send_review_notification(review.subject_id, review.id, &reviewer, review.rating)
            .await?;
        Ok(())
    }

    async fn display_name(&self, user_id: Option<DbId>) -> Result<String, sqlx::Error> {
        let Some(user_id) = user_id else {
            return Ok("CollabBridge".to_string());
        };
        Ok(UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| "A user".to_string()))
    }
}

/// Log a failed per-recipient send. Returns whether it went through.
fn delivered<T>(result: Result<T, sqlx::Error>, user_id: DbId, event_type: &str) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(
                error = %e,
                user_id,
                event_type,
                "Failed to notify recipient, continuing"
            );
            false
        }
    }
}

/// Map a `booking.*` event name to its notice.
pub fn booking_notice(event_type: &str) -> Option<BookingNotice> {
    match event_type {
        names::BOOKING_REQUESTED => Some(BookingNotice::Requested),
        names::BOOKING_ACCEPTED => Some(BookingNotice::Accepted),
        names::BOOKING_REJECTED => Some(BookingNotice::Rejected),
        names::BOOKING_CANCELLED => Some(BookingNotice::Cancelled),
        names::BOOKING_COMPLETED => Some(BookingNotice::Completed),
        _ => None,
    }
}

/// Who hears about a booking change.
///
/// Requests go to the professional, answers to the planner, completions to
/// both. A cancellation goes to the party that did not cancel, or to both
/// when someone else (an admin) cancelled.
pub fn booking_recipients(
    notice: BookingNotice,
    booking: &BookingDetails,
    actor: Option<DbId>,
) -> Vec<BookingRecipient> {
    let to_professional = BookingRecipient {
        user_id: booking.professional_id,
        role: Role::CreativeProfessional,
        counterpart: booking.planner_name.clone(),
    };
    let to_planner = BookingRecipient {
        user_id: booking.planner_id,
        role: Role::EventPlanner,
        counterpart: booking.professional_name.clone(),
    };

    match notice {
        BookingNotice::Requested | BookingNotice::Reminder => vec![to_professional],
        BookingNotice::Accepted | BookingNotice::Rejected => vec![to_planner],
        BookingNotice::Completed => vec![to_planner, to_professional],
        BookingNotice::Cancelled => match actor {
            Some(id) if id == booking.planner_id => vec![to_professional],
            Some(id) if id == booking.professional_id => vec![to_planner],
            _ => vec![to_planner, to_professional],
        },
    }
}
