//! Application services: use-case implementations.
//!
//! Services accept port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod incubator_service;

pub use incubator_service::{IncubatorService, IncubatorStatus};
