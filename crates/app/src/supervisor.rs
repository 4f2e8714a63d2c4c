//! Control mode supervisor: owns the Manual/Automatic flag and the lifecycle
//! of the single automatic control loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};

use incubator_domain::actuator::{ActuatorState, Command};
use incubator_domain::error::{IncubatorError, ValidationError};
use incubator_domain::mode::{ControlMode, LoopState};
use incubator_domain::profile::{EggProfile, Setpoints};

use crate::actuator_driver::ActuatorDriver;
use crate::control_loop::{AutoControlLoop, ControlLoopHandle, DEFAULT_TICK};
use crate::ports::SerialLink;
use crate::reading_store::LatestReadingStore;

/// Timing knobs for the supervised loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Poll interval of the control loop.
    pub tick: Duration,
    /// How long `set_mode(Manual)` waits for the loop to stop.
    pub shutdown_timeout: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            shutdown_timeout: Duration::from_secs(2),
        }
    }
}

/// Starts and stops the [`AutoControlLoop`] and gates manual commands.
///
/// Mode transitions, profile changes and manual commands are serialized
/// through one async mutex, so at most one loop instance exists at any time
/// and no manual command can slip in while the loop is being started.
/// Observers read mode, loop state and profile through watch channels without
/// taking that lock.
pub struct ControlModeSupervisor<L> {
    store: LatestReadingStore,
    driver: Arc<ActuatorDriver<L>>,
    settings: SupervisorSettings,
    active: Mutex<Option<ControlLoopHandle>>,
    mode: watch::Sender<ControlMode>,
    profile: watch::Sender<Option<EggProfile>>,
    loop_state: Arc<watch::Sender<LoopState>>,
}

impl<L: SerialLink + 'static> ControlModeSupervisor<L> {
    /// Create a supervisor in [`ControlMode::Manual`] with no profile.
    pub fn new(
        store: LatestReadingStore,
        driver: Arc<ActuatorDriver<L>>,
        settings: SupervisorSettings,
    ) -> Self {
        Self {
            store,
            driver,
            settings,
            active: Mutex::new(None),
            mode: watch::Sender::new(ControlMode::Manual),
            profile: watch::Sender::new(None),
            loop_state: Arc::new(watch::Sender::new(LoopState::Idle)),
        }
    }

    /// Switch the control mode.
    ///
    /// Switching to [`ControlMode::Automatic`] while a loop is running is a
    /// no-op. A loop that ended on its own is replaced by a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`IncubatorError::ShutdownTimeout`] when switching to Manual
    /// and the loop did not stop in time. The loop is aborted and the mode
    /// is Manual regardless.
    pub async fn set_mode(&self, mode: ControlMode) -> Result<(), IncubatorError> {
        let mut active = self.active.lock().await;
        match mode {
            ControlMode::Manual => {
                let result = self.stop_loop(&mut active).await;
                self.publish_mode(ControlMode::Manual);
                result
            }
            ControlMode::Automatic => {
                if active.as_ref().is_some_and(|handle| !handle.is_finished()) {
                    tracing::debug!("automatic mode already active");
                    return Ok(());
                }
                if active.take().is_some() {
                    tracing::warn!("control loop had ended unexpectedly, restarting");
                }
                *active = Some(self.start_loop());
                self.publish_mode(ControlMode::Automatic);
                Ok(())
            }
        }
    }

    /// Select the profile for the incubation cycle.
    ///
    /// In Automatic mode the running loop is replaced by one bound to the new
    /// setpoints.
    ///
    /// # Errors
    ///
    /// Returns [`IncubatorError::ShutdownTimeout`] if the previous loop could
    /// not be stopped; the mode then falls back to Manual.
    pub async fn apply_profile(&self, profile: EggProfile) -> Result<(), IncubatorError> {
        let mut active = self.active.lock().await;
        self.profile.send_replace(Some(profile));
        tracing::info!(
            species = %profile.species,
            temperature_target = ?profile.setpoints.temperature,
            humidity_target = ?profile.setpoints.humidity,
            "profile selected"
        );

        if self.mode() != ControlMode::Automatic {
            return Ok(());
        }
        if let Err(err) = self.stop_loop(&mut active).await {
            self.publish_mode(ControlMode::Manual);
            return Err(err);
        }
        *active = Some(self.start_loop());
        Ok(())
    }

    /// Send a manual actuator command.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AutomaticModeActive`] in Automatic mode, or
    /// the driver's error when the command fails.
    pub async fn manual_command(&self, command: Command) -> Result<ActuatorState, IncubatorError> {
        let _active = self.active.lock().await;
        if self.mode() == ControlMode::Automatic {
            return Err(ValidationError::AutomaticModeActive.into());
        }
        self.driver.send(command).await
    }

    #[must_use]
    pub fn mode(&self) -> ControlMode {
        *self.mode.borrow()
    }

    #[must_use]
    pub fn loop_state(&self) -> LoopState {
        *self.loop_state.borrow()
    }

    #[must_use]
    pub fn profile(&self) -> Option<EggProfile> {
        *self.profile.borrow()
    }

    fn start_loop(&self) -> ControlLoopHandle {
        let setpoints = match self.profile() {
            Some(profile) => profile.setpoints,
            None => {
                tracing::warn!("no profile selected, automatic control will idle");
                Setpoints::default()
            }
        };
        AutoControlLoop::new(
            setpoints,
            self.store.clone(),
            Arc::clone(&self.driver),
            self.settings.tick,
        )
        .spawn(Arc::clone(&self.loop_state))
    }

    async fn stop_loop(&self, active: &mut Option<ControlLoopHandle>) -> Result<(), IncubatorError> {
        match active.take() {
            Some(handle) => handle.stop(self.settings.shutdown_timeout).await,
            None => Ok(()),
        }
    }

    fn publish_mode(&self, mode: ControlMode) {
        let previous = self.mode.send_replace(mode);
        if previous != mode {
            tracing::info!(from = %previous, to = %mode, "control mode changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use super::*;
    use crate::actuator_driver::testing::RecordingLink;
    use incubator_domain::actuator::Actuator;
    use incubator_domain::profile::Species;
    use incubator_domain::reading::SensorReading;
    use incubator_domain::time::now;
    use tokio::time::sleep;

    const TICK: Duration = Duration::from_secs(1);

    fn settings() -> SupervisorSettings {
        SupervisorSettings {
            tick: TICK,
            shutdown_timeout: Duration::from_secs(2),
        }
    }

    fn supervisor(link: RecordingLink) -> ControlModeSupervisor<RecordingLink> {
        ControlModeSupervisor::new(
            LatestReadingStore::new(),
            Arc::new(ActuatorDriver::new(link)),
            settings(),
        )
    }

    fn chicken() -> EggProfile {
        EggProfile::new(Species::Chicken, Setpoints::new(37.5, 60.0))
    }

    #[tokio::test(start_paused = true)]
    async fn should_start_in_manual_and_idle() {
        let sup = supervisor(RecordingLink::default());
        assert_eq!(sup.mode(), ControlMode::Manual);
        assert_eq!(sup.loop_state(), LoopState::Idle);
        assert!(sup.profile().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_loop_only_in_automatic_mode() {
        let sup = supervisor(RecordingLink::default());

        sup.set_mode(ControlMode::Automatic).await.unwrap();
        assert_eq!(sup.mode(), ControlMode::Automatic);
        assert_eq!(sup.loop_state(), LoopState::Running);

        sup.set_mode(ControlMode::Manual).await.unwrap();
        assert_eq!(sup.mode(), ControlMode::Manual);
        assert_eq!(sup.loop_state(), LoopState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_single_loop_when_automatic_requested_twice() {
        let link = RecordingLink::default();
        let sup = supervisor(link.clone());
        sup.apply_profile(chicken()).await.unwrap();
        sup.store.set(SensorReading::new(35.0, 60.0, now()));

        sup.set_mode(ControlMode::Automatic).await.unwrap();
        sup.set_mode(ControlMode::Automatic).await.unwrap();
        sleep(TICK * 3).await;
        sup.set_mode(ControlMode::Manual).await.unwrap();

        // A second loop would have raced the first to switch the heater on.
        assert_eq!(link.sent(), vec![Command::activate(Actuator::Heater)]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_manual_commands_in_automatic_mode() {
        let link = RecordingLink::default();
        let sup = supervisor(link.clone());
        sup.set_mode(ControlMode::Automatic).await.unwrap();

        let err = sup
            .manual_command(Command::activate(Actuator::Motor))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IncubatorError::Validation(ValidationError::AutomaticModeActive)
        ));
        assert!(link.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_forward_manual_commands_in_manual_mode() {
        let link = RecordingLink::default();
        let sup = supervisor(link.clone());

        let state = sup
            .manual_command(Command::activate(Actuator::Motor))
            .await
            .unwrap();

        assert!(state.motor);
        assert_eq!(link.sent(), vec![Command::activate(Actuator::Motor)]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_idle_without_profile() {
        let link = RecordingLink::default();
        let sup = supervisor(link.clone());
        sup.store.set(SensorReading::new(20.0, 10.0, now()));

        sup.set_mode(ControlMode::Automatic).await.unwrap();
        sleep(TICK * 3).await;
        sup.set_mode(ControlMode::Manual).await.unwrap();

        assert!(link.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_restart_loop_with_new_profile_in_automatic_mode() {
        let link = RecordingLink::default();
        let sup = supervisor(link.clone());
        sup.store.set(SensorReading::new(37.6, 60.0, now()));
        sup.apply_profile(chicken()).await.unwrap();
        sup.set_mode(ControlMode::Automatic).await.unwrap();
        sleep(TICK / 2).await;
        assert_eq!(link.sent(), vec![Command::activate(Actuator::Fan)]);

        sup.apply_profile(EggProfile::new(
            Species::Quail,
            Setpoints::new(37.8, 60.0),
        ))
        .await
        .unwrap();
        sleep(TICK / 2).await;
        sup.set_mode(ControlMode::Manual).await.unwrap();

        assert_eq!(sup.profile().unwrap().species, Species::Quail);
        assert_eq!(
            link.sent(),
            vec![
                Command::activate(Actuator::Fan),
                Command::deactivate(Actuator::Fan),
                Command::activate(Actuator::Heater),
            ]
        );
    }

    /// A link whose writes never complete.
    struct StuckLink;

    impl SerialLink for StuckLink {
        fn send_command(
            &self,
            _command: Command,
        ) -> impl Future<Output = Result<(), IncubatorError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_and_force_manual_when_loop_hangs() {
        let store = LatestReadingStore::new();
        store.set(SensorReading::new(30.0, 60.0, now()));
        let sup =
            ControlModeSupervisor::new(store, Arc::new(ActuatorDriver::new(StuckLink)), settings());
        sup.apply_profile(chicken()).await.unwrap();
        sup.set_mode(ControlMode::Automatic).await.unwrap();
        // Let the loop block inside the heater command.
        sleep(TICK / 2).await;

        let err = sup.set_mode(ControlMode::Manual).await.unwrap_err();

        assert!(matches!(
            err,
            IncubatorError::ShutdownTimeout { timeout } if timeout == Duration::from_secs(2)
        ));
        assert_eq!(sup.mode(), ControlMode::Manual);
        assert_eq!(sup.loop_state(), LoopState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn should_allow_automatic_again_after_manual() {
        let sup = supervisor(RecordingLink::default());
        for _ in 0..3 {
            sup.set_mode(ControlMode::Automatic).await.unwrap();
            assert_eq!(sup.loop_state(), LoopState::Running);
            sup.set_mode(ControlMode::Manual).await.unwrap();
            assert_eq!(sup.loop_state(), LoopState::Idle);
        }
    }
}
