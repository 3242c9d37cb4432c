//! User roles and the operations each role may perform.
//!
//! Roles are stored as text in `users.role` and must match the CHECK
//! constraint in `20250101000001_users_and_profiles.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_EVENT_PLANNER: &str = "EVENT_PLANNER";
pub const ROLE_CREATIVE_PROFESSIONAL: &str = "CREATIVE_PROFESSIONAL";

/// The closed set of platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    EventPlanner,
    CreativeProfessional,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::EventPlanner => ROLE_EVENT_PLANNER,
            Role::CreativeProfessional => ROLE_CREATIVE_PROFESSIONAL,
        }
    }

    /// Roles a user may pick for themselves during registration.
    pub fn is_self_assignable(self) -> bool {
        match self {
            Role::EventPlanner | Role::CreativeProfessional => true,
            Role::Admin => false,
        }
    }

    /// Publishing events and creating bookings.
    pub fn can_manage_events(self) -> bool {
        match self {
            Role::Admin | Role::EventPlanner => true,
            Role::CreativeProfessional => false,
        }
    }

    /// Applying to events and owning a portfolio.
    pub fn can_apply_to_events(self) -> bool {
        match self {
            Role::CreativeProfessional => true,
            Role::Admin | Role::EventPlanner => false,
        }
    }

    /// Platform-wide analytics dashboards.
    pub fn can_view_platform_analytics(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_EVENT_PLANNER => Ok(Role::EventPlanner),
            ROLE_CREATIVE_PROFESSIONAL => Ok(Role::CreativeProfessional),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}
