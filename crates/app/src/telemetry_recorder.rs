//! Periodic forwarding of the latest reading to a [`TelemetrySink`].

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use incubator_domain::reading::SensorReading;

use crate::ports::TelemetrySink;
use crate::reading_store::LatestReadingStore;

pub const DEFAULT_TELEMETRY_INTERVAL: Duration = Duration::from_secs(4);

/// Samples the store on a fixed interval and records new readings.
///
/// Runs in its own task so a slow sink never delays ingestion or control.
pub struct TelemetryRecorder<T> {
    sink: T,
    store: LatestReadingStore,
    interval: Duration,
}

impl<T: TelemetrySink + 'static> TelemetryRecorder<T> {
    pub fn new(sink: T, store: LatestReadingStore, interval: Duration) -> Self {
        Self {
            sink,
            store,
            interval,
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_recorded: Option<SensorReading> = None;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(reading) = self.store.get() else {
                tracing::trace!("no reading to record yet");
                continue;
            };
            if last_recorded == Some(reading) {
                continue;
            }

            match self.sink.record(&reading).await {
                Ok(()) => last_recorded = Some(reading),
                Err(err) => tracing::warn!(error = %err, "failed to record telemetry"),
            }
        }
        tracing::debug!("telemetry recorder stopped");
    }
}
