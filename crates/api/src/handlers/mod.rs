//! Request handlers, one module per resource.
//!
//! Handlers extract and validate input, call repositories or services, and
//! wrap results in [`crate::response::ApiResponse`]. Errors map through
//! [`crate::error::AppError`].

pub mod analytics;
pub mod applications;
pub mod auth;
pub mod bookings;
pub mod events;
pub mod messages;
pub mod notifications;
pub mod portfolio;
pub mod reviews;
pub mod saved;
pub mod search;
pub mod upload;
pub mod users;
