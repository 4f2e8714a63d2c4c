//! Actuators, their on/off wire commands, and the logical actuator state.
//!
//! | Actuator | Activate | Deactivate |
//! |----------|----------|------------|
//! | Motor | `M1` | `M0` |
//! | Heater | `H1` | `H0` |
//! | Fan | `F1` | `F0` |
//! | Humidifier | `C1` | `C0` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A physical output driven through the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actuator {
    Fan,
    Heater,
    Humidifier,
    Motor,
}

impl Actuator {
    /// Every actuator, in a stable order.
    pub const ALL: [Self; 4] = [Self::Fan, Self::Heater, Self::Humidifier, Self::Motor];

    /// Lowercase name used in logs and on the control surface.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Heater => "heater",
            Self::Humidifier => "humidifier",
            Self::Motor => "motor",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Actuator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fan" => Ok(Self::Fan),
            "heater" => Ok(Self::Heater),
            "humidifier" | "hum" | "valve" => Ok(Self::Humidifier),
            "motor" => Ok(Self::Motor),
            _ => Err(ValidationError::UnknownActuator(s.to_string())),
        }
    }
}

/// Switch an actuator on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Activate,
    Deactivate,
}

impl Action {
    /// Whether the actuator ends up energised.
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::Activate)
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    /// Accepts `active`/`stop` as sent by the control panel, as well as the
    /// `activate`/`deactivate` and `on`/`off` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "activate" | "on" => Ok(Self::Activate),
            "stop" | "deactivate" | "off" => Ok(Self::Deactivate),
            _ => Err(ValidationError::UnknownAction(s.to_string())),
        }
    }
}

/// A single actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    pub actuator: Actuator,
    pub action: Action,
}

impl Command {
    #[must_use]
    pub const fn new(actuator: Actuator, action: Action) -> Self {
        Self { actuator, action }
    }

    #[must_use]
    pub const fn activate(actuator: Actuator) -> Self {
        Self::new(actuator, Action::Activate)
    }

    #[must_use]
    pub const fn deactivate(actuator: Actuator) -> Self {
        Self::new(actuator, Action::Deactivate)
    }

    /// The two ASCII bytes written to the serial link.
    #[must_use]
    pub fn wire_bytes(self) -> &'static [u8; 2] {
        match (self.actuator, self.action) {
            (Actuator::Motor, Action::Activate) => b"M1",
            (Actuator::Motor, Action::Deactivate) => b"M0",
            (Actuator::Heater, Action::Activate) => b"H1",
            (Actuator::Heater, Action::Deactivate) => b"H0",
            (Actuator::Fan, Action::Activate) => b"F1",
            (Actuator::Fan, Action::Deactivate) => b"F0",
            (Actuator::Humidifier, Action::Activate) => b"C1",
            (Actuator::Humidifier, Action::Deactivate) => b"C0",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = *self.wire_bytes();
        write!(f, "{}{}", char::from(a), char::from(b))
    }
}

/// Logical mirror of the actuator outputs.
///
/// Only reflects commands that were successfully written; there is no
/// acknowledgment protocol, so this is "last confirmed command" rather than
/// measured hardware state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActuatorState {
    pub fan: bool,
    pub heater: bool,
    pub humidifier: bool,
    pub motor: bool,
}

impl ActuatorState {
    /// Whether the given actuator is currently on.
    #[must_use]
    pub fn is_on(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Fan => self.fan,
            Actuator::Heater => self.heater,
            Actuator::Humidifier => self.humidifier,
            Actuator::Motor => self.motor,
        }
    }

    /// Record a confirmed command.
    pub fn apply(&mut self, command: Command) {
        let on = command.action.is_on();
        match command.actuator {
            Actuator::Fan => self.fan = on,
            Actuator::Heater => self.heater = on,
            Actuator::Humidifier => self.humidifier = on,
            Actuator::Motor => self.motor = on,
        }
    }

    /// Build the state that results from a sequence of confirmed commands,
    /// starting from all-off.
    #[must_use]
    pub fn replay<I>(commands: I) -> Self
    where
        I: IntoIterator<Item = Command>,
    {
        commands.into_iter().fold(Self::default(), |mut state, cmd| {
            state.apply(cmd);
            state
        })
    }
}
