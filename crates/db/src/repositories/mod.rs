//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod analytics_repo;
pub mod application_repo;
pub mod booking_repo;
pub mod event_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod outbox_repo;
pub mod portfolio_repo;
pub mod profile_repo;
pub mod review_repo;
pub mod saved_professional_repo;
pub mod search_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use application_repo::ApplicationRepo;
pub use booking_repo::BookingRepo;
pub use event_repo::EventRepo;
pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use outbox_repo::OutboxRepo;
pub use portfolio_repo::PortfolioRepo;
pub use profile_repo::ProfileRepo;
pub use review_repo::ReviewRepo;
pub use saved_professional_repo::SavedProfessionalRepo;
pub use search_repo::SearchRepo;
pub use user_repo::UserRepo;
