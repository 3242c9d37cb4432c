//! Admin analytics assembled from [`AnalyticsRepo`] aggregates.
//!
//! Every report covers a period (default: the current calendar month) and
//! compares it with the period immediately before.

use chrono::Utc;
use collabbridge_core::analytics::{
    average, calculate_growth_percentage, distribution, percentage, DateRange, DistributionEntry,
};
use collabbridge_core::booking::BookingStatus;
use collabbridge_core::types::Timestamp;
use collabbridge_db::models::analytics::{
    BookingAnalytics, EventAnalytics, LabelCount, PeriodComparison, PlatformStatistics,
    RevenueAnalytics, UsersAnalytics,
};
use collabbridge_db::repositories::analytics_repo::{Breakdown, CountedTable};
use collabbridge_db::repositories::AnalyticsRepo;
use collabbridge_db::DbPool;

use crate::error::AppResult;

pub struct AnalyticsService {
    pool: DbPool,
}

impl AnalyticsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_platform_statistics(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> AppResult<PlatformStatistics> {
        let (current, previous) = DateRange::resolve(from, to, Utc::now())?;
        Ok(PlatformStatistics {
            range: current,
            totals: AnalyticsRepo::platform_totals(&self.pool).await?,
            new_users: self.created(CountedTable::Users, &current, &previous).await?,
            new_events: self.created(CountedTable::Events, &current, &previous).await?,
            new_bookings: self.created(CountedTable::Bookings, &current, &previous).await?,
        })
    }

    pub async fn get_users_analytics(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> AppResult<UsersAnalytics> {
        let (current, previous) = DateRange::resolve(from, to, Utc::now())?;
        let roles = AnalyticsRepo::breakdown(&self.pool, Breakdown::UserRole, None).await?;
        Ok(UsersAnalytics {
            range: current,
            total_users: AnalyticsRepo::count_all(&self.pool, CountedTable::Users).await?,
            new_users: self.created(CountedTable::Users, &current, &previous).await?,
            role_distribution: to_distribution(roles),
            verified_users: AnalyticsRepo::verified_users(&self.pool).await?,
        })
    }

    pub async fn get_event_analytics(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> AppResult<EventAnalytics> {
        let (current, previous) = DateRange::resolve(from, to, Utc::now())?;
        let types =
            AnalyticsRepo::breakdown(&self.pool, Breakdown::EventType, Some(&current)).await?;
        let statuses =
            AnalyticsRepo::breakdown(&self.pool, Breakdown::EventStatus, Some(&current)).await?;
        Ok(EventAnalytics {
            range: current,
            new_events: self.created(CountedTable::Events, &current, &previous).await?,
            type_distribution: to_distribution(types),
            status_distribution: to_distribution(statuses),
            applications: AnalyticsRepo::count_created(
                &self.pool,
                CountedTable::Applications,
                &current,
            )
            .await?,
        })
    }

    pub async fn get_booking_analytics(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> AppResult<BookingAnalytics> {
        let (current, previous) = DateRange::resolve(from, to, Utc::now())?;
        let statuses =
            AnalyticsRepo::breakdown(&self.pool, Breakdown::BookingStatus, Some(&current)).await?;
        let completion_rate = completion_rate(&statuses);
        Ok(BookingAnalytics {
            range: current,
            new_bookings: self.created(CountedTable::Bookings, &current, &previous).await?,
            status_distribution: to_distribution(statuses),
            completion_rate,
        })
    }

    pub async fn get_revenue_analytics(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> AppResult<RevenueAnalytics> {
        let (current, previous) = DateRange::resolve(from, to, Utc::now())?;
        let now = AnalyticsRepo::completed_revenue(&self.pool, &current).await?;
        let before = AnalyticsRepo::completed_revenue(&self.pool, &previous).await?;
        Ok(RevenueAnalytics {
            range: current,
            revenue: compare(now.revenue, before.revenue),
            completed_bookings: now.bookings,
            average_booking_value: average(now.revenue, now.bookings),
        })
    }

    async fn created(
        &self,
        table: CountedTable,
        current: &DateRange,
        previous: &DateRange,
    ) -> AppResult<PeriodComparison> {
        let now = AnalyticsRepo::count_created(&self.pool, table, current).await?;
        let before = AnalyticsRepo::count_created(&self.pool, table, previous).await?;
        Ok(compare(now as f64, before as f64))
    }
}

fn compare(current: f64, previous: f64) -> PeriodComparison {
    PeriodComparison {
        current,
        previous,
        growth: calculate_growth_percentage(current, previous),
    }
}

fn to_distribution(rows: Vec<LabelCount>) -> Vec<DistributionEntry> {
    distribution(rows.into_iter().map(|r| (r.label, r.count)))
}

/// Completed bookings as a percentage of all bookings in the breakdown.
fn completion_rate(statuses: &[LabelCount]) -> f64 {
    let total: i64 = statuses.iter().map(|r| r.count).sum();
    let completed = statuses
        .iter()
        .find(|r| r.label == BookingStatus::Completed.as_str())
        .map_or(0, |r| r.count);
    percentage(completed, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, count: i64) -> LabelCount {
        LabelCount {
            label: label.into(),
            count,
        }
    }

    #[test]
    fn completion_rate_is_share_of_completed() {
        let rows = [row("COMPLETED", 3), row("PENDING", 1)];
        assert_eq!(completion_rate(&rows), 75.0);
        assert_eq!(completion_rate(&[]), 0.0);
    }

    #[test]
    fn comparison_with_empty_previous_has_no_growth() {
        let c = compare(12.0, 0.0);
        assert_eq!(c.growth, 0.0);
        assert_eq!(compare(15.0, 10.0).growth, 50.0);
    }
}
