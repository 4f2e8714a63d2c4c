//! Automatic control loop: bang-bang regulation toward profile setpoints.
//!
//! Each tick the loop reads the latest reading and:
//!
//! 1. waits for the next tick when no reading has arrived yet;
//! 2. drives fan/heater toward the temperature target, then holds in an inner
//!    sub-loop while the temperature stays on the same side of the target;
//! 3. switches the humidifier toward the humidity target, on every outer and
//!    inner tick;
//! 4. sleeps one tick.
//!
//! Every sleep races the cancellation token, so a stop request is observed
//! within one tick even while the loop waits for a threshold crossing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use incubator_domain::actuator::Command;
use incubator_domain::control::{TemperatureDemand, humidity_command};
use incubator_domain::error::IncubatorError;
use incubator_domain::mode::LoopState;
use incubator_domain::profile::Setpoints;

use crate::actuator_driver::ActuatorDriver;
use crate::ports::SerialLink;
use crate::reading_store::LatestReadingStore;

/// Default poll interval.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// One instance of the automatic control loop, bound to fixed setpoints.
pub struct AutoControlLoop<L> {
    setpoints: Setpoints,
    store: LatestReadingStore,
    driver: Arc<ActuatorDriver<L>>,
    tick: Duration,
    cancel: CancellationToken,
}

impl<L: SerialLink + 'static> AutoControlLoop<L> {
    pub fn new(
        setpoints: Setpoints,
        store: LatestReadingStore,
        driver: Arc<ActuatorDriver<L>>,
        tick: Duration,
    ) -> Self {
        Self {
            setpoints,
            store,
            driver,
            tick,
            cancel: CancellationToken::new(),
        }
    }

    /// Spawn the loop on the tokio runtime.
    ///
    /// `state` is set to [`LoopState::Running`] immediately and back to
    /// [`LoopState::Idle`] when the task ends, however it ends.
    pub fn spawn(self, state: Arc<watch::Sender<LoopState>>) -> ControlLoopHandle {
        state.send_replace(LoopState::Running);
        let idle_on_exit = IdleOnExit(Arc::clone(&state));
        let cancel = self.cancel.clone();

        let task = tokio::spawn(async move {
            let _idle_on_exit = idle_on_exit;
            self.run().await;
        });

        ControlLoopHandle {
            cancel,
            state,
            task,
        }
    }

    async fn run(self) {
        tracing::info!(
            tick_ms = u64::try_from(self.tick.as_millis()).unwrap_or(u64::MAX),
            temperature_target = ?self.setpoints.temperature,
            humidity_target = ?self.setpoints.humidity,
            "automatic control started"
        );

        while !self.cancel.is_cancelled() {
            self.evaluate().await;
            if !self.pause().await {
                break;
            }
        }

        tracing::info!("automatic control stopped");
    }

    async fn evaluate(&self) {
        let Some(reading) = self.store.get() else {
            tracing::trace!("no reading available yet");
            return;
        };

        let hold = match self.setpoints.temperature {
            Some(target) => self.regulate_temperature(reading.temperature, target).await,
            None => None,
        };
        self.regulate_humidity(reading.humidity).await;

        if let Some((demand, target)) = hold {
            self.hold_until_crossed(demand, target).await;
        }
    }

    /// Bring fan/heater in line with the demand.
    ///
    /// Returns the demand to hold once the actuators are confirmed in place.
    async fn regulate_temperature(
        &self,
        current: f64,
        target: f64,
    ) -> Option<(TemperatureDemand, f64)> {
        let demand = TemperatureDemand::evaluate(current, target);
        if demand == TemperatureDemand::Hold {
            return None;
        }

        let state = self.driver.state();
        if demand.is_engaged(&state) {
            return Some((demand, target));
        }

        tracing::debug!(?demand, temperature = current, target, "temperature off target");
        self.drive(demand.commands(&state))
            .await
            .then_some((demand, target))
    }

    async fn regulate_humidity(&self, current: f64) {
        let Some(target) = self.setpoints.humidity else {
            return;
        };
        if let Some(command) = humidity_command(current, target, &self.driver.state()) {
            tracing::debug!(humidity = current, target, %command, "humidity off target");
            self.drive([command]).await;
        }
    }

    /// Inner sub-loop: poll until the temperature crosses the target.
    async fn hold_until_crossed(&self, demand: TemperatureDemand, target: f64) {
        while self.pause().await {
            let Some(reading) = self.store.get() else {
                return;
            };
            if !demand.persists(reading.temperature, target) {
                tracing::debug!(
                    ?demand,
                    temperature = reading.temperature,
                    target,
                    "temperature crossed target"
                );
                return;
            }
            self.regulate_humidity(reading.humidity).await;
        }
    }

    /// Send commands in order, stopping at the first failure or once
    /// cancellation was requested. Returns whether all of them went out.
    async fn drive(&self, commands: impl IntoIterator<Item = Command>) -> bool {
        for command in commands {
            if self.cancel.is_cancelled() {
                return false;
            }
            if let Err(err) = self.driver.send(command).await {
                tracing::warn!(%command, error = %err, "control command failed, re-evaluating next tick");
                return false;
            }
        }
        true
    }

    /// Sleep one tick. Returns `false` if cancelled first.
    async fn pause(&self) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(self.tick) => true,
        }
    }
}

struct IdleOnExit(Arc<watch::Sender<LoopState>>);

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        self.0.send_replace(LoopState::Idle);
    }
}

/// Owner-side handle of a spawned [`AutoControlLoop`].
pub struct ControlLoopHandle {
    cancel: CancellationToken,
    state: Arc<watch::Sender<LoopState>>,
    task: JoinHandle<()>,
}

impl ControlLoopHandle {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        *self.state.borrow()
    }

    /// Whether the loop task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request cancellation and wait up to `timeout` for the loop to end.
    ///
    /// # Errors
    ///
    /// Returns [`IncubatorError::ShutdownTimeout`] when the loop did not stop
    /// in time. The task is aborted before returning, so no loop keeps
    /// running either way.
    pub async fn stop(mut self, timeout: Duration) -> Result<(), IncubatorError> {
        self.state.send_if_modified(|state| {
            let running = *state == LoopState::Running;
            if running {
                *state = LoopState::Stopping;
            }
            running
        });
        self.cancel.cancel();

        match tokio::time::timeout(timeout, &mut self.task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                tracing::error!(error = %err, "control loop task ended abnormally");
                Ok(())
            }
            Err(_) => {
                tracing::error!(?timeout, "control loop ignored cancellation, aborting");
                self.task.abort();
                let _ = (&mut self.task).await;
                Err(IncubatorError::ShutdownTimeout { timeout })
            }
        }
    }
}
