//! Canned notification copy, selected per (notice, recipient role).
//!
//! Flows describe *what happened*; these functions decide the title, body,
//! priority and whether an email copy goes out.

use crate::notification::{NotificationPriority, NotificationType};
use crate::roles::Role;

/// Maximum characters of a message body quoted in a notification.
pub const MESSAGE_PREVIEW_LENGTH: usize = 100;

/// Rendered notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub send_email: bool,
}

impl Template {
    fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            notification_type,
            title: title.into(),
            message: message.into(),
            priority: NotificationPriority::Normal,
            send_email: false,
        }
    }

    fn priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    fn with_email(mut self) -> Self {
        self.send_email = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingNotice {
    Requested,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
    Reminder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventNotice {
    ApplicationReceived,
    ApplicationAccepted,
    ApplicationRejected,
    Updated,
    Cancelled,
    Reminder,
}

/// Booking notifications. `counterpart` is the other party's display name.
pub fn booking_template(
    notice: BookingNotice,
    recipient: Role,
    event_title: &str,
    counterpart: &str,
) -> Template {
    use NotificationPriority::*;
    use NotificationType::*;

    match (notice, recipient) {
        (BookingNotice::Requested, _) => Template::new(
            BookingRequest,
            "New booking request",
            format!("{counterpart} would like to book you for \"{event_title}\""),
        )
        .priority(High)
        .with_email(),
        (BookingNotice::Accepted, _) => Template::new(
            BookingAccepted,
            "Booking accepted",
            format!("{counterpart} accepted your booking for \"{event_title}\""),
        )
        .priority(High)
        .with_email(),
        (BookingNotice::Rejected, _) => Template::new(
            BookingRejected,
            "Booking declined",
            format!("{counterpart} declined your booking for \"{event_title}\""),
        ),
        (BookingNotice::Cancelled, Role::CreativeProfessional) => Template::new(
            BookingCancelled,
            "Booking cancelled",
            format!("{counterpart} cancelled your booking for \"{event_title}\""),
        )
        .priority(High)
        .with_email(),
        (BookingNotice::Cancelled, _) => Template::new(
            BookingCancelled,
            "Booking cancelled",
            format!("{counterpart} cancelled the booking for \"{event_title}\""),
        )
        .priority(High)
        .with_email(),
        (BookingNotice::Completed, Role::CreativeProfessional) => Template::new(
            BookingCompleted,
            "Booking completed",
            format!("\"{event_title}\" is marked complete. Thanks for working with {counterpart}!"),
        ),
        (BookingNotice::Completed, _) => Template::new(
            BookingCompleted,
            "Booking completed",
            format!("\"{event_title}\" is complete. Leave a review for {counterpart}."),
        ),
        (BookingNotice::Reminder, Role::CreativeProfessional) => Template::new(
            BookingReminder,
            "Upcoming booking",
            format!("You are booked for \"{event_title}\" within the next 24 hours"),
        )
        .priority(High)
        .with_email(),
        (BookingNotice::Reminder, _) => Template::new(
            BookingReminder,
            "Upcoming booking",
            format!("{counterpart} is booked for \"{event_title}\" within the next 24 hours"),
        )
        .priority(High),
    }
}

/// Event and application notifications.
pub fn event_template(
    notice: EventNotice,
    recipient: Role,
    event_title: &str,
    counterpart: &str,
) -> Template {
    use NotificationPriority::*;
    use NotificationType::*;

    match (notice, recipient) {
        (EventNotice::ApplicationReceived, _) => Template::new(
            EventApplication,
            "New application",
            format!("{counterpart} applied to \"{event_title}\""),
        ),
        (EventNotice::ApplicationAccepted, _) => Template::new(
            ApplicationAccepted,
            "Application accepted",
            format!("Your application to \"{event_title}\" was accepted by {counterpart}"),
        )
        .priority(High)
        .with_email(),
        (EventNotice::ApplicationRejected, _) => Template::new(
            ApplicationRejected,
            "Application update",
            format!("Your application to \"{event_title}\" was not selected"),
        ),
        (EventNotice::Updated, _) => Template::new(
            EventUpdated,
            "Event updated",
            format!("{counterpart} updated \"{event_title}\""),
        )
        .priority(Low),
        (EventNotice::Cancelled, _) => Template::new(
            EventCancelled,
            "Event cancelled",
            format!("\"{event_title}\" has been cancelled by {counterpart}"),
        )
        .priority(Urgent)
        .with_email(),
        (EventNotice::Reminder, Role::EventPlanner | Role::Admin) => Template::new(
            EventReminder,
            "Event starting soon",
            format!("Your event \"{event_title}\" starts within 24 hours"),
        )
        .priority(High)
        .with_email(),
        (EventNotice::Reminder, Role::CreativeProfessional) => Template::new(
            EventReminder,
            "Event starting soon",
            format!("\"{event_title}\" starts within 24 hours"),
        )
        .priority(High),
    }
}

/// New direct message notification.
pub fn message_template(sender_name: &str, content: &str) -> Template {
    Template::new(
        NotificationType::NewMessage,
        format!("New message from {sender_name}"),
        truncate_preview(content, MESSAGE_PREVIEW_LENGTH),
    )
}

/// New review notification.
pub fn review_template(reviewer_name: &str, rating: i32) -> Template {
    let stars = rating.clamp(1, 5);
    Template::new(
        NotificationType::NewReview,
        "New review",
        format!("{reviewer_name} left you a {stars}-star review"),
    )
}

/// Truncate on a character boundary, appending an ellipsis when cut.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
