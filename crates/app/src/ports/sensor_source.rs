//! Sensor source port: a lazy, infinite stream of readings.

use std::future::Future;

use incubator_domain::error::IncubatorError;
use incubator_domain::reading::SensorReading;

/// Produces readings at the source's own cadence.
///
/// The stream is not restartable. Each call yields:
/// - `Some(Ok(reading))` for a valid sample,
/// - `Some(Err(err))` for a recoverable failure (typically
///   [`IncubatorError::MalformedReading`]); the caller skips it and keeps
///   pulling,
/// - `None` once the underlying link is gone.
///
/// Implementations must be cancel-safe: dropping the returned future must not
/// lose a reading that was already fully received.
pub trait SensorSource: Send {
    fn next_reading(
        &mut self,
    ) -> impl Future<Output = Option<Result<SensorReading, IncubatorError>>> + Send;
}
