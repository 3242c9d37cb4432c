//! Notification delivery.
//!
//! The [`NotificationRouter`] subscribes to the event bus and turns domain
//! events into per-recipient notifications through the
//! [`NotificationDispatcher`].

pub mod dispatcher;
pub mod router;

pub use dispatcher::NotificationDispatcher;
pub use router::NotificationRouter;
