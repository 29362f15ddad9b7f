//! Query-string types shared by several handler modules.

use beacon_core::error::CoreError;
use beacon_core::metrics::DateRange;
use beacon_core::pagination::{clamp_limit, clamp_offset};
use chrono::NaiveDate;
use serde::Deserialize;

/// `?limit=&offset=`; clamp with [`PaginationParams::limit`] and
/// [`PaginationParams::offset`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        clamp_offset(self.offset)
    }
}

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD` for the metrics read models.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRangeParams {
    /// Validated range, defaulting to the last 30 days ending today (UTC).
    pub fn resolve(&self) -> Result<DateRange, CoreError> {
        DateRange::resolve(self.start, self.end, chrono::Utc::now().date_naive())
    }
}
