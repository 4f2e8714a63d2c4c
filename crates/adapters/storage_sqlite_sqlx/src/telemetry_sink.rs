//! `SQLite` implementation of [`TelemetrySink`].

use std::future::Future;

use sqlx::SqlitePool;

use incubator_app::ports::TelemetrySink;
use incubator_domain::error::IncubatorError;
use incubator_domain::reading::SensorReading;
use incubator_domain::time::to_sortable_text;

use crate::error::StorageError;

const INSERT: &str =
    "INSERT INTO sensor_readings (temperature, humidity, observed_at) VALUES (?, ?, ?)";

/// Appends readings to the `sensor_readings` table.
#[derive(Clone)]
pub struct SqliteTelemetrySink {
    pool: SqlitePool,
}

impl SqliteTelemetrySink {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TelemetrySink for SqliteTelemetrySink {
    fn record(
        &self,
        reading: &SensorReading,
    ) -> impl Future<Output = Result<(), IncubatorError>> + Send {
        let pool = self.pool.clone();
        let reading = *reading;
        async move {
            sqlx::query(INSERT)
                .bind(reading.temperature)
                .bind(reading.humidity)
                .bind(to_sortable_text(reading.observed_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
