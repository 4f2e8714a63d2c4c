//! # incubator-app
//!
//! Application layer: use-cases, long-running tasks and **port definitions**
//! (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `SerialLink`: write actuator commands
//!   - `SensorSource`: stream of sensor readings
//!   - `ProfileSource`: per-species setpoints
//!   - `TelemetrySink`: write-only reading persistence
//! - Own the shared runtime state: `LatestReadingStore` and the
//!   `ActuatorDriver`'s confirmed actuator state.
//! - Run the background tasks: sensor ingestion, telemetry recording and the
//!   automatic control loop, supervised by `ControlModeSupervisor`.
//! - Expose the control surface as `IncubatorService`.
//!
//! ## Dependency rule
//! Depends on `incubator-domain` only (plus `tokio` for tasks and sync).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod actuator_driver;
pub mod control_loop;
pub mod ingestion;
pub mod ports;
pub mod reading_store;
pub mod services;
pub mod supervisor;
pub mod telemetry_recorder;
