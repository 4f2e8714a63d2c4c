//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod control;
pub mod readings;
pub mod status;

use axum::Router;
use axum::routing::{get, put};

use incubator_app::ports::{ProfileSource, SerialLink};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<L, P>() -> Router<AppState<L, P>>
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    Router::new()
        .route("/data", get(readings::latest::<L, P>))
        .route("/status", get(status::get::<L, P>))
        .route("/mode", put(control::set_mode::<L, P>))
        .route("/profile", put(control::set_profile::<L, P>))
        .route(
            "/actuators",
            get(control::actuators::<L, P>).post(control::set_actuator::<L, P>),
        )
}
