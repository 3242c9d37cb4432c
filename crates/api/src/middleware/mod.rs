//! Authentication, authorization and rate-limit middleware.
//!
//! - [`auth::AuthUser`] -- the registered, active user behind a Bearer token.
//! - [`auth::VerifiedIdentity`] -- a valid token whose user may not exist yet.
//! - [`rbac::RequireAdmin`], [`rbac::RequirePlanner`], [`rbac::RequireCreative`]
//!   -- role guards over `AuthUser`.
//! - [`rate_limit`] -- fixed-window request budgets per route group.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
