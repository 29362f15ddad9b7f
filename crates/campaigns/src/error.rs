use beacon_vendors::VendorError;

/// Failure of a store operation, classified by what the caller can do
/// about it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected an insert.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A statement referenced a column the schema does not have.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Store error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if beacon_db::is_unique_violation(&err) {
            Self::UniqueViolation(err.to_string())
        } else if beacon_db::is_undefined_column(&err) {
            Self::MissingColumn(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// A sync run that could not continue.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Fetching single sends failed: {0}")]
    Vendor(#[from] VendorError),
}
