//! Control handlers: mode, profile and manual actuators.
//!
//! Names in request bodies are parsed with the domain `FromStr` impls so an
//! unknown value is reported as a validation error (`400`) with the
//! offending name, rather than as a generic body rejection.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use incubator_app::ports::{ProfileSource, SerialLink};
use incubator_app::services::IncubatorStatus;
use incubator_domain::actuator::{Action, Actuator, ActuatorState};
use incubator_domain::mode::ControlMode;
use incubator_domain::profile::{EggProfile, Species};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SetModeRequest {
    pub mode: String,
}

#[derive(Deserialize)]
pub struct SetProfileRequest {
    pub species: String,
}

#[derive(Deserialize)]
pub struct SetActuatorRequest {
    pub actuator: String,
    pub action: String,
}

/// Possible responses from the mode endpoint.
pub enum SetModeResponse {
    Ok(Json<IncubatorStatus>),
}

impl IntoResponse for SetModeResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the profile endpoint.
pub enum SetProfileResponse {
    Ok(Json<EggProfile>),
}

impl IntoResponse for SetProfileResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the actuator endpoints.
pub enum ActuatorResponse {
    Ok(Json<ActuatorState>),
}

impl IntoResponse for ActuatorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `PUT /api/mode`
pub async fn set_mode<L, P>(
    State(state): State<AppState<L, P>>,
    Json(req): Json<SetModeRequest>,
) -> Result<SetModeResponse, ApiError>
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    let mode: ControlMode = req.mode.parse()?;
    state.service.set_mode(mode).await?;
    Ok(SetModeResponse::Ok(Json(state.service.status())))
}

/// `PUT /api/profile`
pub async fn set_profile<L, P>(
    State(state): State<AppState<L, P>>,
    Json(req): Json<SetProfileRequest>,
) -> Result<SetProfileResponse, ApiError>
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    let species: Species = req.species.parse()?;
    let profile = state.service.set_profile(species).await?;
    Ok(SetProfileResponse::Ok(Json(profile)))
}

/// `GET /api/actuators`
pub async fn actuators<L, P>(State(state): State<AppState<L, P>>) -> ActuatorResponse
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    ActuatorResponse::Ok(Json(state.service.actuator_state()))
}

/// `POST /api/actuators`
pub async fn set_actuator<L, P>(
    State(state): State<AppState<L, P>>,
    Json(req): Json<SetActuatorRequest>,
) -> Result<ActuatorResponse, ApiError>
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    let actuator: Actuator = req.actuator.parse()?;
    let action: Action = req.action.parse()?;
    let actuators = state.service.set_actuator(actuator, action).await?;
    Ok(ActuatorResponse::Ok(Json(actuators)))
}
