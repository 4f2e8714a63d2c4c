//! Random reading generator.

use std::future::Future;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Interval, MissedTickBehavior};

use incubator_app::ports::SensorSource;
use incubator_domain::error::IncubatorError;
use incubator_domain::reading::SensorReading;
use incubator_domain::time::now;

use crate::config::SimulationConfig;

/// Endless stream of uniformly random readings, rounded to two decimals.
///
/// The first reading is produced immediately, then one per interval.
pub struct SimulatedSource {
    config: SimulationConfig,
    rng: StdRng,
    ticker: Option<Interval>,
}

impl SimulatedSource {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            ticker: None,
        }
    }

    fn sample(&mut self) -> SensorReading {
        let temperature = self
            .rng
            .gen_range(self.config.temperature_min..=self.config.temperature_max);
        let humidity = self
            .rng
            .gen_range(self.config.humidity_min..=self.config.humidity_max);
        SensorReading::new(round2(temperature), round2(humidity), now())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl SensorSource for SimulatedSource {
    fn next_reading(
        &mut self,
    ) -> impl Future<Output = Option<Result<SensorReading, IncubatorError>>> + Send {
        async move {
            // Created lazily so the interval starts with the first poll.
            let interval = self.config.interval();
            let ticker = self.ticker.get_or_insert_with(|| {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });
            ticker.tick().await;
            Some(Ok(self.sample()))
        }
    }
}
