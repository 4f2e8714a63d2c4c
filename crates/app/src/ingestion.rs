//! Sensor ingestion: drains a [`SensorSource`] into the [`LatestReadingStore`].

use std::future::Future;

use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use incubator_domain::error::IncubatorError;
use incubator_domain::reading::SensorReading;

use crate::ports::SensorSource;
use crate::reading_store::LatestReadingStore;

/// What to do when the serial sensor link cannot be opened at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFallback {
    /// Continue with simulated readings.
    #[default]
    Simulate,
    /// Refuse to start.
    Shutdown,
}

/// Either the primary source or its fallback.
pub enum ActiveSource<P, F> {
    Primary(P),
    Fallback(F),
}

impl<P, F> ActiveSource<P, F> {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl<P: SensorSource, F: SensorSource> SensorSource for ActiveSource<P, F> {
    fn next_reading(
        &mut self,
    ) -> impl Future<Output = Option<Result<SensorReading, IncubatorError>>> + Send {
        async move {
            match self {
                Self::Primary(source) => source.next_reading().await,
                Self::Fallback(source) => source.next_reading().await,
            }
        }
    }
}

/// Decide which source to run from the outcome of opening the primary one.
///
/// The open failure is logged once here; nothing retries it later.
///
/// # Errors
///
/// Returns the open error unchanged when `policy` is
/// [`SourceFallback::Shutdown`].
pub fn select_source<P, F>(
    primary: Result<P, IncubatorError>,
    fallback: impl FnOnce() -> F,
    policy: SourceFallback,
) -> Result<ActiveSource<P, F>, IncubatorError> {
    match primary {
        Ok(source) => Ok(ActiveSource::Primary(source)),
        Err(err) => match policy {
            SourceFallback::Simulate => {
                tracing::warn!(error = %err, "sensor link unavailable, using simulated readings");
                Ok(ActiveSource::Fallback(fallback()))
            }
            SourceFallback::Shutdown => {
                tracing::error!(error = %err, "sensor link unavailable, shutting down");
                Err(err)
            }
        },
    }
}

/// Background task writing every valid reading into the store.
pub struct SensorIngestion<S> {
    source: S,
    store: LatestReadingStore,
}

impl<S: SensorSource + 'static> SensorIngestion<S> {
    pub fn new(source: S, store: LatestReadingStore) -> Self {
        Self { source, store }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Pull readings until the source ends or `cancel` fires.
    ///
    /// Malformed lines and transient read errors are logged and skipped.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("sensor ingestion started");
        loop {
            let next = tokio::select! {
                () = cancel.cancelled() => break,
                next = self.source.next_reading() => next,
            };

            match next {
                Some(Ok(reading)) => {
                    tracing::trace!(
                        temperature = reading.temperature,
                        humidity = reading.humidity,
                        "reading received"
                    );
                    self.store.set(reading);
                }
                Some(Err(IncubatorError::MalformedReading(err))) => {
                    tracing::warn!(error = %err, "skipping malformed sensor line");
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "sensor read failed");
                }
                None => {
                    tracing::warn!("sensor stream ended");
                    break;
                }
            }
        }
        tracing::info!("sensor ingestion stopped");
    }
}
