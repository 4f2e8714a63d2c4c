//! # incubator-adapter-simulated
//!
//! Simulated [`SensorSource`](incubator_app::ports::SensorSource) producing
//! uniformly distributed readings on a fixed cadence. Used as the fallback
//! when the serial sensor link cannot be opened, and for running the
//! controller without hardware.

pub mod config;
pub mod source;

pub use config::SimulationConfig;
pub use source::SimulatedSource;
