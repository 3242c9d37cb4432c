//! Event and application enums plus schedule validation.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::Timestamp;

text_enum! {
    /// Kind of event a planner publishes.
    EventType("event type") {
        Concert => "CONCERT",
        Wedding => "WEDDING",
        Corporate => "CORPORATE",
        Birthday => "BIRTHDAY",
        Conference => "CONFERENCE",
        Festival => "FESTIVAL",
        Party => "PARTY",
        Exhibition => "EXHIBITION",
        Workshop => "WORKSHOP",
        Other => "OTHER",
    }
}

text_enum! {
    /// Lifecycle of an event listing.
    EventStatus("event status") {
        Draft => "DRAFT",
        Published => "PUBLISHED",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl EventStatus {
    /// Whether creatives may still apply.
    pub fn accepts_applications(self) -> bool {
        matches!(self, EventStatus::Published)
    }
}

text_enum! {
    /// Lifecycle of a creative's application to an event.
    ApplicationStatus("application status") {
        Pending => "PENDING",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
        Withdrawn => "WITHDRAWN",
    }
}

/// Who is attempting an application status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationActor {
    /// The planner that owns the event (or an admin).
    EventOwner,
    /// The creative that submitted the application.
    Applicant,
}

/// Check an application status transition.
///
/// Only pending applications move. The event owner accepts or rejects; the
/// applicant withdraws.
pub fn check_application_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
    actor: ApplicationActor,
) -> Result<(), CoreError> {
    use ApplicationStatus::*;

    if from != Pending {
        return Err(CoreError::Conflict(format!(
            "Application is already {from}"
        )));
    }
    match (to, actor) {
        (Accepted | Rejected, ApplicationActor::EventOwner) => Ok(()),
        (Withdrawn, ApplicationActor::Applicant) => Ok(()),
        (Pending, _) => Err(CoreError::Validation(
            "Application is already pending".into(),
        )),
        _ => Err(CoreError::Forbidden(format!(
            "Not permitted to mark application {to}"
        ))),
    }
}

/// Validate an event's schedule.
///
/// `end_date` must not precede `start_date`, and an application deadline,
/// when present, must fall on or before the start.
pub fn validate_schedule(
    start_date: Timestamp,
    end_date: Timestamp,
    deadline_date: Option<Timestamp>,
) -> Result<(), CoreError> {
    if end_date < start_date {
        return Err(CoreError::Validation(
            "endDate must be on or after startDate".into(),
        ));
    }
    if let Some(deadline) = deadline_date {
        if deadline > start_date {
            return Err(CoreError::Validation(
                "deadlineDate must be on or before startDate".into(),
            ));
        }
    }
    Ok(())
}

/// Validate an optional budget amount.
pub fn validate_budget(budget: Option<f64>) -> Result<(), CoreError> {
    match budget {
        Some(b) if !b.is_finite() || b < 0.0 => Err(CoreError::Validation(
            "budget must be a non-negative number".into(),
        )),
        _ => Ok(()),
    }
}

/// Whether `role` may own events (create, edit, review applications).
pub fn ensure_can_manage_events(role: Role) -> Result<(), CoreError> {
    if role.can_manage_events() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only event planners can manage events".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn ts(h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 8, 15, h, 0, 0).unwrap()
    }

    #[test]
    fn schedule_accepts_equal_start_and_end() {
        assert!(validate_schedule(ts(10), ts(10), None).is_ok());
        assert!(validate_schedule(ts(10), ts(23), Some(ts(9))).is_ok());
    }

    #[test]
    fn schedule_rejects_end_before_start() {
        assert_matches!(
            validate_schedule(ts(23), ts(10), None),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn schedule_rejects_deadline_after_start() {
        assert_matches!(
            validate_schedule(ts(10), ts(23), Some(ts(11))),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn owner_accepts_pending_application() {
        assert!(check_application_transition(
            ApplicationStatus::Pending,
            ApplicationStatus::Accepted,
            ApplicationActor::EventOwner
        )
        .is_ok());
    }

    #[test]
    fn applicant_cannot_accept_own_application() {
        assert_matches!(
            check_application_transition(
                ApplicationStatus::Pending,
                ApplicationStatus::Accepted,
                ApplicationActor::Applicant
            ),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn decided_application_is_final() {
        assert_matches!(
            check_application_transition(
                ApplicationStatus::Rejected,
                ApplicationStatus::Withdrawn,
                ApplicationActor::Applicant
            ),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn event_type_parses_screaming_case() {
        assert_eq!("CONCERT".parse::<EventType>().unwrap(), EventType::Concert);
        assert!("concert".parse::<EventType>().is_err());
    }

    #[test]
    fn negative_budget_is_rejected() {
        assert!(validate_budget(Some(-1.0)).is_err());
        assert!(validate_budget(None).is_ok());
        assert!(validate_budget(Some(2500.0)).is_ok());
    }
}
