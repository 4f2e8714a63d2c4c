//! `GET /api/data`: latest sensor reading.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use incubator_app::ports::{ProfileSource, SerialLink};
use incubator_domain::reading::SensorReading;

use crate::state::AppState;

/// Possible responses from the latest-reading endpoint.
pub enum LatestResponse {
    Ok(Json<SensorReading>),
    /// Nothing received from the sensor yet.
    NoContent,
}

impl IntoResponse for LatestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/data`
pub async fn latest<L, P>(State(state): State<AppState<L, P>>) -> LatestResponse
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    match state.service.latest_reading() {
        Some(reading) => LatestResponse::Ok(Json(reading)),
        None => LatestResponse::NoContent,
    }
}
