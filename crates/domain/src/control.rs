//! Bang-bang decision rules for the automatic control loop.
//!
//! Pure functions: given a reading, a target and the confirmed actuator
//! state, they return the commands needed to reach the desired actuator
//! configuration. Commands are only produced on edges, so evaluating the same
//! situation twice against the updated state yields nothing.
//!
//! There is no dead-band: the comparison against the target is exact.

use crate::actuator::{Actuator, ActuatorState, Command};

/// What the temperature loop wants from the fan and heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureDemand {
    /// Above target: heater off, fan on.
    Cool,
    /// Below target: fan off, heater on.
    Heat,
    /// Exactly at target: leave everything as is.
    Hold,
}

impl TemperatureDemand {
    #[must_use]
    pub fn evaluate(current: f64, target: f64) -> Self {
        if current > target {
            Self::Cool
        } else if current < target {
            Self::Heat
        } else {
            Self::Hold
        }
    }

    /// Whether `current` still sits on the same side of `target`.
    #[must_use]
    pub fn persists(self, current: f64, target: f64) -> bool {
        match self {
            Self::Cool => current > target,
            Self::Heat => current < target,
            Self::Hold => false,
        }
    }

    /// Whether the actuators already match this demand.
    #[must_use]
    pub fn is_engaged(self, state: &ActuatorState) -> bool {
        match self {
            Self::Cool => state.fan && !state.heater,
            Self::Heat => state.heater && !state.fan,
            Self::Hold => true,
        }
    }

    /// Commands that move `state` to this demand, opposite actuator first.
    #[must_use]
    pub fn commands(self, state: &ActuatorState) -> Vec<Command> {
        let (stop, start) = match self {
            Self::Cool => (Actuator::Heater, Actuator::Fan),
            Self::Heat => (Actuator::Fan, Actuator::Heater),
            Self::Hold => return Vec::new(),
        };

        let mut commands = Vec::with_capacity(2);
        if state.is_on(stop) {
            commands.push(Command::deactivate(stop));
        }
        if !state.is_on(start) {
            commands.push(Command::activate(start));
        }
        commands
    }
}

/// Humidifier command needed for the given humidity, if any.
///
/// Below target the humidifier runs; at or above target it is switched off.
#[must_use]
pub fn humidity_command(current: f64, target: f64, state: &ActuatorState) -> Option<Command> {
    let wanted = current < target;
    (state.humidifier != wanted).then(|| {
        if wanted {
            Command::activate(Actuator::Humidifier)
        } else {
            Command::deactivate(Actuator::Humidifier)
        }
    })
}
