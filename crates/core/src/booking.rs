//! Booking status lifecycle.
//!
//! ```text
//! PENDING --accept/reject (professional)--> ACCEPTED | REJECTED
//! PENDING --cancel (planner)--------------> CANCELLED
//! ACCEPTED --complete (planner)-----------> COMPLETED
//! ACCEPTED --cancel (either party)--------> CANCELLED
//! ```

use crate::error::CoreError;

text_enum! {
    BookingStatus("booking status") {
        Pending => "PENDING",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }
}

/// The party requesting a booking status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingActor {
    Planner,
    Professional,
    Admin,
}

/// Validate a status change against the lifecycle and the acting party.
pub fn check_transition(
    from: BookingStatus,
    to: BookingStatus,
    actor: BookingActor,
) -> Result<(), CoreError> {
    use BookingActor::*;
    use BookingStatus::*;

    if from.is_terminal() {
        return Err(CoreError::Conflict(format!("Booking is already {from}")));
    }

    let edge_allowed = matches!(
        (from, to),
        (Pending, Accepted)
            | (Pending, Rejected)
            | (Pending, Cancelled)
            | (Accepted, Completed)
            | (Accepted, Cancelled)
    );
    if !edge_allowed {
        return Err(CoreError::Validation(format!(
            "Cannot move booking from {from} to {to}"
        )));
    }

    let actor_allowed = match (from, to, actor) {
        (_, _, Admin) => true,
        (Pending, Accepted | Rejected, Professional) => true,
        (Pending, Cancelled, Planner) => true,
        (Accepted, Completed, Planner) => true,
        (Accepted, Cancelled, Planner | Professional) => true,
        _ => false,
    };
    if !actor_allowed {
        return Err(CoreError::Forbidden(format!(
            "Not permitted to mark booking {to}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn professional_accepts_pending() {
        assert!(check_transition(
            BookingStatus::Pending,
            BookingStatus::Accepted,
            BookingActor::Professional
        )
        .is_ok());
    }

    #[test]
    fn planner_cannot_accept_on_behalf_of_professional() {
        assert_matches!(
            check_transition(
                BookingStatus::Pending,
                BookingStatus::Accepted,
                BookingActor::Planner
            ),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn pending_cannot_jump_to_completed() {
        assert_matches!(
            check_transition(
                BookingStatus::Pending,
                BookingStatus::Completed,
                BookingActor::Admin
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn terminal_states_are_final() {
        for from in [
            BookingStatus::Rejected,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_matches!(
                check_transition(from, BookingStatus::Accepted, BookingActor::Admin),
                Err(CoreError::Conflict(_))
            );
        }
    }

    #[test]
    fn either_party_cancels_accepted_booking() {
        for actor in [BookingActor::Planner, BookingActor::Professional] {
            assert!(
                check_transition(BookingStatus::Accepted, BookingStatus::Cancelled, actor).is_ok()
            );
        }
    }
}
