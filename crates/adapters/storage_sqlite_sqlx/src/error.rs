//! Failures of the profile and telemetry tables.

use incubator_domain::error::IncubatorError;

/// Errors from the incubator database.
///
/// Both variants surface as [`IncubatorError::Storage`]; the HTTP layer maps
/// that to a 500 and the telemetry recorder logs it and keeps sampling.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Opening the file, a profile query, or a telemetry insert failed.
    #[error("incubator database query failed")]
    Database(#[from] sqlx::Error),

    /// The embedded schema or seed profiles could not be applied.
    #[error("incubator schema migration failed")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for IncubatorError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
