//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod profile_source;
pub mod sensor_source;
pub mod serial_link;
pub mod telemetry;

pub use profile_source::ProfileSource;
pub use sensor_source::SensorSource;
pub use serial_link::SerialLink;
pub use telemetry::TelemetrySink;
