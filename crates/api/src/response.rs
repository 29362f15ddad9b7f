//! Response envelopes.

use serde::Serialize;

/// Standard `{ "data": T }` envelope returned by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Read-model payload: the rows for the requested window plus the summary
/// cards comparing it to the previous window.
#[derive(Debug, Serialize)]
pub struct MetricsResponse<R: Serialize, S: Serialize> {
    pub range: beacon_core::metrics::DateRange,
    pub previous_range: beacon_core::metrics::DateRange,
    pub rows: Vec<R>,
    pub summary: S,
}
