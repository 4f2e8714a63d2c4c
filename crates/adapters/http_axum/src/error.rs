//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use incubator_domain::error::{IncubatorError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`IncubatorError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(IncubatorError);

impl From<IncubatorError> for ApiError {
    fn from(err: IncubatorError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            IncubatorError::Validation(ValidationError::AutomaticModeActive) => {
                StatusCode::CONFLICT
            }
            IncubatorError::Validation(_) | IncubatorError::MalformedReading(_) => {
                StatusCode::BAD_REQUEST
            }
            IncubatorError::NoProfile { .. } => StatusCode::NOT_FOUND,
            IncubatorError::LinkUnavailable(_) | IncubatorError::CommandFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            IncubatorError::ShutdownTimeout { .. } | IncubatorError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            IncubatorError::Validation(err) => err.to_string(),
            IncubatorError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                "internal server error".to_string()
            }
            IncubatorError::CommandFailed { command, source } => {
                tracing::warn!(%command, error = %source, "manual command failed");
                self.0.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use incubator_domain::actuator::{Actuator, Command};
    use incubator_domain::profile::Species;

    fn status_of(err: IncubatorError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn should_map_errors_to_status_codes() {
        assert_eq!(
            status_of(ValidationError::UnknownSpecies("emu".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ValidationError::AutomaticModeActive.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(IncubatorError::NoProfile {
                species: Species::Quail
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(IncubatorError::CommandFailed {
                command: Command::activate(Actuator::Fan),
                source: "port busy".into(),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(IncubatorError::ShutdownTimeout {
                timeout: Duration::from_secs(2)
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(IncubatorError::Storage("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
