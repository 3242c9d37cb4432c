//! CollabBridge event bus and notification delivery infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope; [`names`] lists the
//!   event names flows publish.
//! - [`delivery`]: SMTP email delivery.
//! - [`OutboxProcessor`]: drains the notification outbox with retries.
//! - [`ReminderScheduler`]: hourly scan for events starting within a day.

pub mod bus;
pub mod delivery;
pub mod outbox;
pub mod reminders;

pub use bus::{names, EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use outbox::OutboxProcessor;
pub use reminders::ReminderScheduler;
