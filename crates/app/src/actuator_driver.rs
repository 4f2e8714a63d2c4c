//! Actuator driver: sends commands and tracks the last confirmed state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use incubator_domain::actuator::{Action, Actuator, ActuatorState, Command};
use incubator_domain::error::IncubatorError;

use crate::ports::SerialLink;

/// Issues actuator commands through a [`SerialLink`].
///
/// Commands go out one at a time in the order they were requested (the
/// in-flight lock is a FIFO tokio mutex). The logical [`ActuatorState`] is
/// only updated after the link reports a successful write; a failed command
/// leaves it untouched.
pub struct ActuatorDriver<L> {
    link: L,
    state: Mutex<ActuatorState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl<L: SerialLink> ActuatorDriver<L> {
    /// Create a driver with every actuator assumed off.
    pub fn new(link: L) -> Self {
        Self {
            link,
            state: Mutex::new(ActuatorState::default()),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Send `command` and record it on success.
    ///
    /// Returns the actuator state after the command was confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`IncubatorError::CommandFailed`] (or whatever the link
    /// reports) when the write fails; the tracked state is unchanged.
    pub async fn send(&self, command: Command) -> Result<ActuatorState, IncubatorError> {
        let _guard = self.in_flight.lock().await;
        self.link.send_command(command).await?;

        let mut state = self.lock_state();
        state.apply(command);
        tracing::debug!(%command, actuator = %command.actuator, "actuator command confirmed");
        Ok(*state)
    }

    /// Switch `actuator` on.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn activate(&self, actuator: Actuator) -> Result<ActuatorState, IncubatorError> {
        self.send(Command::new(actuator, Action::Activate)).await
    }

    /// Switch `actuator` off.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn deactivate(&self, actuator: Actuator) -> Result<ActuatorState, IncubatorError> {
        self.send(Command::new(actuator, Action::Deactivate)).await
    }

    /// Snapshot of the last confirmed actuator state.
    #[must_use]
    pub fn state(&self) -> ActuatorState {
        *self.lock_state()
    }

    fn lock_state(&self) -> MutexGuard<'_, ActuatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
