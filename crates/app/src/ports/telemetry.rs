//! Telemetry port: write-only sink for recorded readings.

use std::future::Future;

use incubator_domain::error::IncubatorError;
use incubator_domain::reading::SensorReading;

/// Persists readings for later inspection. Nothing is ever read back.
pub trait TelemetrySink: Send + Sync {
    fn record(
        &self,
        reading: &SensorReading,
    ) -> impl Future<Output = Result<(), IncubatorError>> + Send;
}
