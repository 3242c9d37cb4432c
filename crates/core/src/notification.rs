//! Notification kinds, priorities, and delivery channel names.

text_enum! {
    NotificationType("notification type") {
        BookingRequest => "BOOKING_REQUEST",
        BookingAccepted => "BOOKING_ACCEPTED",
        BookingRejected => "BOOKING_REJECTED",
        BookingCancelled => "BOOKING_CANCELLED",
        BookingCompleted => "BOOKING_COMPLETED",
        BookingReminder => "BOOKING_REMINDER",
        EventApplication => "EVENT_APPLICATION",
        ApplicationAccepted => "APPLICATION_ACCEPTED",
        ApplicationRejected => "APPLICATION_REJECTED",
        EventUpdated => "EVENT_UPDATED",
        EventCancelled => "EVENT_CANCELLED",
        EventReminder => "EVENT_REMINDER",
        NewMessage => "NEW_MESSAGE",
        NewReview => "NEW_REVIEW",
        System => "SYSTEM",
    }
}

text_enum! {
    NotificationPriority("notification priority") {
        Low => "LOW",
        Normal => "NORMAL",
        High => "HIGH",
        Urgent => "URGENT",
    }
}

impl Default for NotificationPriority {
    fn default() -> Self {
        NotificationPriority::Normal
    }
}

/// In-app notification stored for the bell UI and pushed over the live
/// channel.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Email notification delivered through the outbox.
pub const CHANNEL_EMAIL: &str = "email";

/// Attempts after which an outbox row is abandoned.
pub const MAX_OUTBOX_ATTEMPTS: i32 = 5;

/// Seconds to wait before retrying an outbox row after `attempts` failures.
///
/// Doubles from one minute and caps at one hour.
pub fn outbox_retry_delay_secs(attempts: i32) -> i64 {
    let exp = attempts.clamp(0, 6) as u32;
    (60_i64 * 2_i64.pow(exp)).min(3600)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_doubles_and_caps() {
        assert_eq!(outbox_retry_delay_secs(0), 60);
        assert_eq!(outbox_retry_delay_secs(1), 120);
        assert_eq!(outbox_retry_delay_secs(3), 480);
        assert_eq!(outbox_retry_delay_secs(10), 3600);
    }

    #[test]
    fn type_round_trips() {
        for t in NotificationType::ALL {
            assert_eq!(t.as_str().parse::<NotificationType>().unwrap(), *t);
        }
    }
}
