//! # incubator-adapter-serial
//!
//! Serial port adapter built on [tokio-serial](https://docs.rs/tokio-serial).
//!
//! ## Responsibilities
//! - Open the board's port once and split it into receive and transmit halves
//! - Implement `SerialLink` over the transmit half, one two-byte actuator
//!   command per write
//! - Implement `SensorSource` over a line-oriented byte stream, decoding
//!   delimited or JSON readings
//!
//! ## Dependency rule
//! Depends on `incubator-app` (for port traits) and `incubator-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

pub mod config;
pub mod error;
pub mod link;
pub mod port;
pub mod source;

pub use config::{SerialConfig, WireFormat};
pub use error::SerialError;
pub use link::SerialPortLink;
pub use port::{open, split};
pub use source::{LineSensorSource, SerialSensorSource};
