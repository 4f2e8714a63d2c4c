//! `SQLite` implementation of [`ProfileSource`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use incubator_app::ports::ProfileSource;
use incubator_domain::error::IncubatorError;
use incubator_domain::profile::{EggProfile, Setpoints, Species};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Setpoints`].
struct Wrapper(Setpoints);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Setpoints {
            temperature: row.try_get("target_temperature")?,
            humidity: row.try_get("target_humidity")?,
        }))
    }
}

const SELECT_BY_SPECIES: &str =
    "SELECT target_temperature, target_humidity FROM egg_profiles WHERE species = ?";
const UPSERT: &str = "INSERT INTO egg_profiles (species, target_temperature, target_humidity) VALUES (?, ?, ?) \
     ON CONFLICT(species) DO UPDATE SET target_temperature = excluded.target_temperature, target_humidity = excluded.target_humidity";

/// `SQLite`-backed per-species setpoints.
#[derive(Clone)]
pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the setpoints stored for `profile.species`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub async fn upsert(&self, profile: EggProfile) -> Result<(), IncubatorError> {
        sqlx::query(UPSERT)
            .bind(profile.species.as_str())
            .bind(profile.setpoints.temperature)
            .bind(profile.setpoints.humidity)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

impl ProfileSource for SqliteProfileRepository {
    fn setpoints_for(
        &self,
        species: Species,
    ) -> impl Future<Output = Result<Option<Setpoints>, IncubatorError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SPECIES)
                .bind(species.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }
}
