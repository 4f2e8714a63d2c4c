//! Incubator service: the control surface used by the HTTP layer and the
//! daemon.

use std::sync::Arc;

use serde::Serialize;

use incubator_domain::actuator::{Action, Actuator, ActuatorState, Command};
use incubator_domain::error::IncubatorError;
use incubator_domain::mode::{ControlMode, LoopState};
use incubator_domain::profile::{EggProfile, Species};
use incubator_domain::reading::SensorReading;

use crate::actuator_driver::ActuatorDriver;
use crate::ports::{ProfileSource, SerialLink};
use crate::reading_store::LatestReadingStore;
use crate::supervisor::{ControlModeSupervisor, SupervisorSettings};

/// Point-in-time view of the whole controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncubatorStatus {
    pub mode: ControlMode,
    pub loop_state: LoopState,
    pub profile: Option<EggProfile>,
    pub actuators: ActuatorState,
    pub reading: Option<SensorReading>,
}

/// Application service exposing mode, actuator and profile operations.
pub struct IncubatorService<L, P> {
    store: LatestReadingStore,
    driver: Arc<ActuatorDriver<L>>,
    supervisor: ControlModeSupervisor<L>,
    profiles: P,
}

impl<L: SerialLink + 'static, P: ProfileSource> IncubatorService<L, P> {
    pub fn new(
        store: LatestReadingStore,
        driver: Arc<ActuatorDriver<L>>,
        profiles: P,
        settings: SupervisorSettings,
    ) -> Self {
        let supervisor = ControlModeSupervisor::new(store.clone(), Arc::clone(&driver), settings);
        Self {
            store,
            driver,
            supervisor,
            profiles,
        }
    }

    /// Switch between manual and automatic control.
    ///
    /// # Errors
    ///
    /// Returns [`IncubatorError::ShutdownTimeout`] if the control loop did not
    /// stop in time when leaving automatic mode.
    pub async fn set_mode(&self, mode: ControlMode) -> Result<(), IncubatorError> {
        self.supervisor.set_mode(mode).await
    }

    /// Drive one actuator by hand.
    ///
    /// # Errors
    ///
    /// Returns a validation error in automatic mode, or
    /// [`IncubatorError::CommandFailed`] when the serial write fails.
    pub async fn set_actuator(
        &self,
        actuator: Actuator,
        action: Action,
    ) -> Result<ActuatorState, IncubatorError> {
        self.supervisor
            .manual_command(Command::new(actuator, action))
            .await
    }

    /// Load the setpoints for `species` and make them the active profile.
    ///
    /// A species without any configured target is still selected, so the
    /// automatic loop idles instead of regulating toward stale setpoints.
    ///
    /// # Errors
    ///
    /// Returns [`IncubatorError::NoProfile`] when the species has no
    /// setpoints, a storage error from the profile source, or
    /// [`IncubatorError::ShutdownTimeout`] when restarting the loop fails.
    pub async fn set_profile(&self, species: Species) -> Result<EggProfile, IncubatorError> {
        let setpoints = self
            .profiles
            .setpoints_for(species)
            .await?
            .filter(|setpoints| !setpoints.is_empty());

        match setpoints {
            Some(setpoints) => {
                let profile = EggProfile::new(species, setpoints);
                self.supervisor.apply_profile(profile).await?;
                Ok(profile)
            }
            None => {
                tracing::warn!(%species, "no setpoints configured for species");
                self.supervisor
                    .apply_profile(EggProfile::unconfigured(species))
                    .await?;
                Err(IncubatorError::NoProfile { species })
            }
        }
    }

    #[must_use]
    pub fn latest_reading(&self) -> Option<SensorReading> {
        self.store.get()
    }

    #[must_use]
    pub fn actuator_state(&self) -> ActuatorState {
        self.driver.state()
    }

    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.supervisor.mode()
    }

    #[must_use]
    pub fn status(&self) -> IncubatorStatus {
        IncubatorStatus {
            mode: self.supervisor.mode(),
            loop_state: self.supervisor.loop_state(),
            profile: self.supervisor.profile(),
            actuators: self.driver.state(),
            reading: self.store.get(),
        }
    }

    /// Stop automatic control ahead of process exit.
    ///
    /// # Errors
    ///
    /// Returns [`IncubatorError::ShutdownTimeout`] if the loop had to be
    /// aborted.
    pub async fn shutdown(&self) -> Result<(), IncubatorError> {
        self.supervisor.set_mode(ControlMode::Manual).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::time::Duration;

    use super::*;
    use crate::actuator_driver::testing::RecordingLink;
    use incubator_domain::error::ValidationError;
    use incubator_domain::profile::Setpoints;
    use incubator_domain::time::now;
    use tokio::time::sleep;

    const TICK: Duration = Duration::from_secs(1);

    #[derive(Default)]
    struct StaticProfiles(HashMap<Species, Setpoints>);

    impl ProfileSource for StaticProfiles {
        fn setpoints_for(
            &self,
            species: Species,
        ) -> impl Future<Output = Result<Option<Setpoints>, IncubatorError>> + Send {
            let result = self.0.get(&species).copied();
            async move { Ok(result) }
        }
    }

    fn service(link: &RecordingLink) -> IncubatorService<RecordingLink, StaticProfiles> {
        let profiles = StaticProfiles(HashMap::from([
            (Species::Chicken, Setpoints::new(37.5, 60.0)),
            (
                Species::Duck,
                Setpoints {
                    temperature: Some(37.2),
                    humidity: None,
                },
            ),
        ]));
        IncubatorService::new(
            LatestReadingStore::new(),
            Arc::new(ActuatorDriver::new(link.clone())),
            profiles,
            SupervisorSettings {
                tick: TICK,
                shutdown_timeout: Duration::from_secs(2),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn should_select_configured_profile() {
        let link = RecordingLink::default();
        let svc = service(&link);

        let profile = svc.set_profile(Species::Chicken).await.unwrap();

        assert_eq!(profile.setpoints, Setpoints::new(37.5, 60.0));
        assert_eq!(svc.status().profile, Some(profile));
    }

    #[tokio::test(start_paused = true)]
    async fn should_accept_profile_with_partial_setpoints() {
        let link = RecordingLink::default();
        let svc = service(&link);

        let profile = svc.set_profile(Species::Duck).await.unwrap();

        assert_eq!(profile.setpoints.temperature, Some(37.2));
        assert!(profile.setpoints.humidity.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_missing_profile_and_issue_no_commands() {
        let link = RecordingLink::default();
        let svc = service(&link);
        svc.store.set(SensorReading::new(30.0, 40.0, now()));

        let err = svc.set_profile(Species::Quail).await.unwrap_err();
        svc.set_mode(ControlMode::Automatic).await.unwrap();
        sleep(TICK * 3).await;
        svc.shutdown().await.unwrap();

        assert!(matches!(
            err,
            IncubatorError::NoProfile {
                species: Species::Quail
            }
        ));
        assert_eq!(
            svc.status().profile,
            Some(EggProfile::unconfigured(Species::Quail))
        );
        assert!(link.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_drive_actuator_manually() {
        let link = RecordingLink::default();
        let svc = service(&link);

        let state = svc
            .set_actuator(Actuator::Humidifier, Action::Activate)
            .await
            .unwrap();

        assert!(state.humidifier);
        assert_eq!(svc.actuator_state(), state);
        assert_eq!(link.sent(), vec![Command::activate(Actuator::Humidifier)]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_surface_failed_manual_command() {
        let link = RecordingLink::default();
        link.fail_on(Command::activate(Actuator::Fan));
        let svc = service(&link);

        let err = svc
            .set_actuator(Actuator::Fan, Action::Activate)
            .await
            .unwrap_err();

        assert!(matches!(err, IncubatorError::CommandFailed { .. }));
        assert!(!svc.actuator_state().fan);
    }

    #[tokio::test(start_paused = true)]
    async fn should_block_manual_control_in_automatic_mode() {
        let link = RecordingLink::default();
        let svc = service(&link);
        svc.set_mode(ControlMode::Automatic).await.unwrap();

        let err = svc
            .set_actuator(Actuator::Motor, Action::Activate)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IncubatorError::Validation(ValidationError::AutomaticModeActive)
        ));
        svc.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_status_snapshot() {
        let link = RecordingLink::default();
        let svc = service(&link);
        let reading = SensorReading::new(37.5, 60.0, now());
        svc.store.set(reading);
        svc.set_profile(Species::Chicken).await.unwrap();
        svc.set_mode(ControlMode::Automatic).await.unwrap();

        let status = svc.status();

        assert_eq!(status.mode, ControlMode::Automatic);
        assert_eq!(status.loop_state, LoopState::Running);
        assert_eq!(status.reading, Some(reading));
        assert_eq!(svc.latest_reading(), Some(reading));
        svc.shutdown().await.unwrap();
        assert_eq!(svc.status().loop_state, LoopState::Idle);
    }
}
