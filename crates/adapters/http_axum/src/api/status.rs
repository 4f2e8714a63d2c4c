//! `GET /api/status`: controller snapshot.

use axum::Json;
use axum::extract::State;

use incubator_app::ports::{ProfileSource, SerialLink};
use incubator_app::services::IncubatorStatus;

use crate::state::AppState;

/// `GET /api/status`
pub async fn get<L, P>(State(state): State<AppState<L, P>>) -> Json<IncubatorStatus>
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    Json(state.service.status())
}
