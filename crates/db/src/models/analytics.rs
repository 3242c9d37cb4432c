//! Admin analytics response shapes.

use collabbridge_core::analytics::{DateRange, DistributionEntry};
use serde::Serialize;
use sqlx::FromRow;

/// A grouped count, e.g. users per role.
#[derive(Debug, Clone, FromRow)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// Current vs previous value of one metric.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub current: f64,
    pub previous: f64,
    pub growth: f64,
}

/// Platform-wide totals.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformTotals {
    pub total_users: i64,
    pub active_users: i64,
    pub total_events: i64,
    pub published_events: i64,
    pub total_bookings: i64,
    pub completed_bookings: i64,
    pub total_reviews: i64,
    pub average_rating: f64,
    pub total_messages: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatistics {
    pub range: DateRange,
    pub totals: PlatformTotals,
    pub new_users: PeriodComparison,
    pub new_events: PeriodComparison,
    pub new_bookings: PeriodComparison,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersAnalytics {
    pub range: DateRange,
    pub total_users: i64,
    pub new_users: PeriodComparison,
    pub role_distribution: Vec<DistributionEntry>,
    pub verified_users: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalytics {
    pub range: DateRange,
    pub new_events: PeriodComparison,
    pub type_distribution: Vec<DistributionEntry>,
    pub status_distribution: Vec<DistributionEntry>,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAnalytics {
    pub range: DateRange,
    pub new_bookings: PeriodComparison,
    pub status_distribution: Vec<DistributionEntry>,
    /// Completed bookings as a percentage of bookings created in range.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAnalytics {
    pub range: DateRange,
    pub revenue: PeriodComparison,
    pub completed_bookings: i64,
    pub average_booking_value: f64,
}

/// Sum and count of completed booking rates in a period.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct RevenueTotals {
    pub revenue: f64,
    pub bookings: i64,
}
