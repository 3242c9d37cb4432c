//! Multi-repository operations shared by handlers.

pub mod analytics;
pub mod messaging;

pub use analytics::AnalyticsService;
pub use messaging::MessagingService;
