//! Simulation configuration.

use std::time::Duration;

use serde::Deserialize;

use incubator_domain::error::ValidationError;

/// Value ranges and cadence of simulated readings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lower bound of generated temperatures, in °C.
    pub temperature_min: f64,
    /// Upper bound of generated temperatures, in °C.
    pub temperature_max: f64,
    /// Lower bound of generated relative humidity, in %.
    pub humidity_min: f64,
    /// Upper bound of generated relative humidity, in %.
    pub humidity_max: f64,
    /// Time between readings, in milliseconds.
    pub interval_ms: u64,
    /// RNG seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            temperature_min: 30.0,
            temperature_max: 38.0,
            humidity_min: 50.0,
            humidity_max: 60.0,
            interval_ms: 2000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty or non-finite range, or a
    /// zero interval.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range(
            "simulation.temperature",
            self.temperature_min,
            self.temperature_max,
        )?;
        check_range("simulation.humidity", self.humidity_min, self.humidity_max)?;
        if self.interval_ms == 0 {
            return Err(ValidationError::ZeroDuration("simulation.interval_ms"));
        }
        Ok(())
    }
}

fn check_range(name: &'static str, min: f64, max: f64) -> Result<(), ValidationError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ValidationError::InvalidRange { name, min, max })
    }
}
