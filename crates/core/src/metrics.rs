//! Date ranges and aggregate math for the metrics read models.
//!
//! The dashboards compare a requested window against the equal-length window
//! immediately before it, so every channel summary carries a current total,
//! a previous total and the percentage change between them.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest range (inclusive, in days) a metrics query may span.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Window used when the caller gives no explicit range.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a validated range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        let range = Self { start, end };
        if range.days() > MAX_RANGE_DAYS {
            return Err(CoreError::Validation(format!(
                "date range may span at most {MAX_RANGE_DAYS} days"
            )));
        }
        Ok(range)
    }

    /// Resolve optional query bounds, defaulting to the
    /// [`DEFAULT_RANGE_DAYS`] days ending at `today`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let end = end.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => days_before(end, DEFAULT_RANGE_DAYS - 1)?,
        };
        Self::new(start, end)
    }

    /// Number of days in the range, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equal-length window ending the day before `start`.
    ///
    /// Fails when that window would fall before the earliest representable
    /// date.
    pub fn previous(&self) -> Result<Self, CoreError> {
        let end = days_before(self.start, 1)?;
        let start = days_before(end, self.days() - 1)?;
        Ok(Self { start, end })
    }
}

fn days_before(date: NaiveDate, days: i64) -> Result<NaiveDate, CoreError> {
    date.checked_sub_signed(Duration::days(days))
        .ok_or_else(|| CoreError::Validation(format!("date {date} is out of range")))
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Percentage change from `previous` to `current`.
///
/// Returns `None` when `previous` is zero, since the change is undefined.
pub fn pct_delta(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some(round2((current - previous) / previous * 100.0))
}

/// `numerator / denominator` as a percentage, or 0 when the denominator is 0.
pub fn safe_rate(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        round2(numerator / denominator * 100.0)
    }
}

/// Arithmetic mean, or 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One metric's headline numbers for a dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub total: f64,
    pub average: f64,
    pub previous_total: f64,
    pub pct_change: Option<f64>,
}

impl MetricSummary {
    /// Summarize an additive metric (sessions, opens, pieces sent, ...).
    ///
    /// `average` is the per-row mean of the current window.
    pub fn additive(current: &[f64], previous: &[f64]) -> Self {
        let total: f64 = current.iter().sum();
        let previous_total: f64 = previous.iter().sum();
        Self {
            total: round2(total),
            average: round2(mean(current)),
            previous_total: round2(previous_total),
            pct_change: pct_delta(total, previous_total),
        }
    }

    /// Summarize a ratio metric (bounce rate, session duration) where only
    /// the mean is meaningful; `total` and `previous_total` hold the means.
    pub fn averaged(current: &[f64], previous: &[f64]) -> Self {
        let avg = mean(current);
        let prev_avg = mean(previous);
        Self {
            total: round2(avg),
            average: round2(avg),
            previous_total: round2(prev_avg),
            pct_change: pct_delta(avg, prev_avg),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert_matches!(
            DateRange::new(d(2025, 3, 2), d(2025, 3, 1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn range_rejects_overlong_span() {
        assert_matches!(
            DateRange::new(d(2023, 1, 1), d(2025, 1, 1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn single_day_range_has_one_day() {
        let r = DateRange::new(d(2025, 3, 1), d(2025, 3, 1)).unwrap();
        assert_eq!(r.days(), 1);
    }

    #[test]
    fn resolve_defaults_to_thirty_days_ending_today() {
        let r = DateRange::resolve(None, None, d(2025, 3, 31)).unwrap();
        assert_eq!(r.start, d(2025, 3, 2));
        assert_eq!(r.end, d(2025, 3, 31));
        assert_eq!(r.days(), DEFAULT_RANGE_DAYS);
    }

    #[test]
    fn previous_window_is_adjacent_and_equal_length() {
        let r = DateRange::new(d(2025, 3, 1), d(2025, 3, 10)).unwrap();
        let p = r.previous().unwrap();
        assert_eq!(p.end, d(2025, 2, 28));
        assert_eq!(p.start, d(2025, 2, 19));
        assert_eq!(p.days(), r.days());
    }

    #[test]
    fn earliest_date_is_rejected_not_wrapped() {
        assert_matches!(
            DateRange::resolve(None, Some(NaiveDate::MIN), d(2025, 3, 31)),
            Err(CoreError::Validation(_))
        );
        let r = DateRange::new(NaiveDate::MIN, NaiveDate::MIN).unwrap();
        assert_matches!(r.previous(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn pct_delta_handles_zero_previous() {
        assert_eq!(pct_delta(10.0, 0.0), None);
        assert_eq!(pct_delta(0.0, 0.0), None);
        assert_eq!(pct_delta(150.0, 100.0), Some(50.0));
        assert_eq!(pct_delta(50.0, 100.0), Some(-50.0));
    }

    #[test]
    fn safe_rate_handles_zero_denominator() {
        assert_eq!(safe_rate(5.0, 0.0), 0.0);
        assert_eq!(safe_rate(1.0, 3.0), 33.33);
    }

    #[test]
    fn additive_summary() {
        let s = MetricSummary::additive(&[10.0, 20.0, 30.0], &[20.0, 20.0]);
        assert_eq!(s.total, 60.0);
        assert_eq!(s.average, 20.0);
        assert_eq!(s.previous_total, 40.0);
        assert_eq!(s.pct_change, Some(50.0));
    }

    #[test]
    fn averaged_summary_on_empty_previous() {
        let s = MetricSummary::averaged(&[40.0, 60.0], &[]);
        assert_eq!(s.average, 50.0);
        assert_eq!(s.previous_total, 0.0);
        assert_eq!(s.pct_change, None);
    }
}
