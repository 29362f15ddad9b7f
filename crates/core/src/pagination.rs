//! Limit/offset clamping for list endpoints.

/// Page size used when the caller does not pass `limit`.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size any list endpoint will return.
pub const MAX_LIMIT: i64 = 100;

/// Clamp an optional `limit` into `1..=MAX_LIMIT`, defaulting to [`DEFAULT_LIMIT`].
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp an optional `offset` to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
