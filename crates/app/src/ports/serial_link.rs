//! Serial link port: delivers actuator commands to the controller board.

use std::future::Future;
use std::sync::Arc;

use incubator_domain::actuator::Command;
use incubator_domain::error::IncubatorError;

/// Writes actuator commands to the hardware.
///
/// Implementations open the link, write [`Command::wire_bytes`] and close it
/// again; a successful return means the bytes were written, not that the
/// board acknowledged them.
pub trait SerialLink: Send + Sync {
    /// Send one command.
    ///
    /// Failures are reported as [`IncubatorError::CommandFailed`].
    fn send_command(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<(), IncubatorError>> + Send;
}

impl<T: SerialLink> SerialLink for Arc<T> {
    fn send_command(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<(), IncubatorError>> + Send {
        (**self).send_command(command)
    }
}
