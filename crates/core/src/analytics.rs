//! Analytics math: period ranges, growth, and percentage breakdowns.

use chrono::{Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Trailing window used for "recent" portfolio views.
pub const RECENT_VIEW_WINDOW_HOURS: i64 = 24;

/// Half-open time range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl DateRange {
    pub fn new(from: Timestamp, to: Timestamp) -> Result<Self, CoreError> {
        if to <= from {
            return Err(CoreError::Validation(
                "'to' must be later than 'from'".into(),
            ));
        }
        Ok(Self { from, to })
    }

    /// The calendar month (UTC) containing `now`.
    pub fn current_month(now: Timestamp) -> Self {
        let from = month_start(now.year(), now.month());
        let (next_year, next_month) = if now.month() == 12 {
            (now.year() + 1, 1)
        } else {
            (now.year(), now.month() + 1)
        };
        Self {
            from,
            to: month_start(next_year, next_month),
        }
    }

    /// The equally long period immediately before this one.
    ///
    /// For a calendar month this is the previous calendar month.
    pub fn previous_period(&self) -> Self {
        if self.is_calendar_month() {
            let (year, month) = if self.from.month() == 1 {
                (self.from.year() - 1, 12)
            } else {
                (self.from.year(), self.from.month() - 1)
            };
            return Self {
                from: month_start(year, month),
                to: self.from,
            };
        }
        let span = self.to - self.from;
        Self {
            from: self.from - span,
            to: self.from,
        }
    }

    /// Resolve optional query bounds into the current and comparison
    /// periods. Missing bounds fall back to the current month.
    pub fn resolve(
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<(Self, Self), CoreError> {
        let current = match (from, to) {
            (None, None) => Self::current_month(now),
            (Some(from), Some(to)) => Self::new(from, to)?,
            (Some(from), None) => Self::new(from, now)?,
            (None, Some(to)) => {
                let month = Self::current_month(to);
                Self::new(month.from, to)?
            }
        };
        Ok((current, current.previous_period()))
    }

    fn is_calendar_month(&self) -> bool {
        let month = Self::current_month(self.from);
        month == *self
    }
}

fn month_start(year: i32, month: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Lower bound of a trailing window ending at `now`. Rows count as inside
/// the window when strictly newer than this bound.
pub fn trailing_window_start(now: Timestamp, hours: i64) -> Timestamp {
    now - Duration::hours(hours)
}

pub fn is_within_trailing_window(at: Timestamp, now: Timestamp, hours: i64) -> bool {
    at > trailing_window_start(now, hours) && at <= now
}

/// Period-over-period growth in percent, rounded to two decimals.
///
/// Zero when there is no previous value to compare against.
pub fn calculate_growth_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    round2((current - previous) / previous * 100.0)
}

/// `part` as a percentage of `total`, zero when `total` is zero.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// Mean of `sum` over `count`, zero when empty.
pub fn average(sum: f64, count: i64) -> f64 {
    if count <= 0 {
        return 0.0;
    }
    round2(sum / count as f64)
}

/// One bucket of a breakdown, e.g. users per role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub label: String,
    pub count: i64,
    pub percentage: f64,
}

/// Turn grouped counts into a breakdown with percentage-of-total.
///
/// Output is ordered by count descending, then label.
pub fn distribution<L: Into<String>>(counts: impl IntoIterator<Item = (L, i64)>) -> Vec<DistributionEntry> {
    let rows: Vec<(String, i64)> = counts.into_iter().map(|(l, c)| (l.into(), c)).collect();
    let total: i64 = rows.iter().map(|(_, c)| *c).sum();
    let mut out: Vec<DistributionEntry> = rows
        .into_iter()
        .map(|(label, count)| DistributionEntry {
            percentage: percentage(count, total),
            label,
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
