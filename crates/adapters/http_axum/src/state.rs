//! Shared application state for axum handlers.

use std::sync::Arc;

use incubator_app::ports::{ProfileSource, SerialLink};
use incubator_app::services::IncubatorService;

/// Application state shared across all axum handlers.
///
/// Generic over the serial link and profile source to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` is cloned.
pub struct AppState<L, P> {
    pub service: Arc<IncubatorService<L, P>>,
}

impl<L, P> Clone for AppState<L, P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<L, P> AppState<L, P>
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    pub fn new(service: IncubatorService<L, P>) -> Self {
        Self::from_arc(Arc::new(service))
    }

    /// Use a service that is also shared with the shutdown path.
    pub fn from_arc(service: Arc<IncubatorService<L, P>>) -> Self {
        Self { service }
    }
}
