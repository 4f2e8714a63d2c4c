//! Egg species and their incubation setpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Supported egg species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Chicken,
    Quail,
    Duck,
    Turkey,
}

impl Species {
    pub const ALL: [Self; 4] = [Self::Chicken, Self::Quail, Self::Duck, Self::Turkey];

    /// Lowercase identifier, as stored by the profile source.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chicken => "chicken",
            Self::Quail => "quail",
            Self::Duck => "duck",
            Self::Turkey => "turkey",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|species| species.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownSpecies(s.to_string()))
    }
}

/// Target values for one incubation cycle.
///
/// Each dimension is optional: a missing target means the control loop takes
/// no action for that dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Setpoints {
    /// Target temperature in °C.
    pub temperature: Option<f64>,
    /// Target relative humidity in %.
    pub humidity: Option<f64>,
}

impl Setpoints {
    #[must_use]
    pub const fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature: Some(temperature),
            humidity: Some(humidity),
        }
    }

    /// Whether neither dimension has a target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.humidity.is_none()
    }
}

/// The species selected for the current cycle and its setpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EggProfile {
    pub species: Species,
    pub setpoints: Setpoints,
}

impl EggProfile {
    #[must_use]
    pub const fn new(species: Species, setpoints: Setpoints) -> Self {
        Self { species, setpoints }
    }

    /// A selection whose species has no configured setpoints.
    #[must_use]
    pub fn unconfigured(species: Species) -> Self {
        Self::new(species, Setpoints::default())
    }
}
