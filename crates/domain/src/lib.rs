//! # incubator-domain
//!
//! Pure domain model for the egg incubator controller.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, timestamps
//! - Define **readings** (temperature/humidity samples) and the serial line formats they arrive in
//! - Define **actuators** (fan, heater, humidifier, motor), their wire commands and logical state
//! - Define **profiles** (per-species setpoints)
//! - Define **control modes** and the automatic loop lifecycle states
//! - Contain the bang-bang decision rules used by the control loop
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod actuator;
pub mod control;
pub mod mode;
pub mod profile;
pub mod reading;
