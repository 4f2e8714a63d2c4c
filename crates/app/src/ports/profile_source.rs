//! Profile source port: per-species incubation setpoints.

use std::future::Future;

use incubator_domain::error::IncubatorError;
use incubator_domain::profile::{Setpoints, Species};

/// Looks up the setpoints configured for a species.
pub trait ProfileSource: Send + Sync {
    /// Return the setpoints for `species`, or `None` when nothing is configured.
    fn setpoints_for(
        &self,
        species: Species,
    ) -> impl Future<Output = Result<Option<Setpoints>, IncubatorError>> + Send;
}
