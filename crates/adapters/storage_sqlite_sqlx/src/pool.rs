//! Opens the incubator database and brings its schema up to date.
//!
//! The daemon keeps one file holding the per-species setpoint overrides and
//! the telemetry history. Tests use `sqlite::memory:` instead.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use crate::error::StorageError;

/// How long a telemetry insert waits on a profile upsert holding the write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the incubator database lives.
pub struct Config {
    /// e.g. `sqlite:incubator.db`, or `sqlite::memory:` for a throwaway store.
    pub database_url: String,
}

impl Config {
    /// Open the database, creating the file on first boot.
    ///
    /// Migrations create `egg_profiles` and `sensor_readings` and seed the
    /// reference setpoints for every species.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] when the URL is invalid or the file
    /// cannot be opened, and [`StorageError::Migration`] when the schema
    /// cannot be brought up to date.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::open(&self.database_url).await
    }
}

/// Pool shared by the profile repository and the telemetry sink.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn open(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(database_url, "incubator database ready");

        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
