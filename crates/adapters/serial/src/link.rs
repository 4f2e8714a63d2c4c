//! [`SerialLink`] over the transmit half of the shared serial port.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::Mutex;
use tokio_serial::SerialStream;

use incubator_app::ports::SerialLink;
use incubator_domain::actuator::Command;
use incubator_domain::error::IncubatorError;

use crate::error::SerialError;

/// Writes actuator commands to a port that stays open for the daemon's life.
///
/// Clones share the writer; the mutex keeps two-byte commands from
/// interleaving on the wire.
pub struct SerialPortLink<W = WriteHalf<SerialStream>> {
    port: String,
    writer: Option<Arc<Mutex<W>>>,
    timeout: Duration,
}

impl<W> Clone for SerialPortLink<W> {
    fn clone(&self) -> Self {
        Self {
            port: self.port.clone(),
            writer: self.writer.clone(),
            timeout: self.timeout,
        }
    }
}

impl<W> SerialPortLink<W> {
    #[must_use]
    pub fn new(port: impl Into<String>, writer: W, timeout: Duration) -> Self {
        Self {
            port: port.into(),
            writer: Some(Arc::new(Mutex::new(writer))),
            timeout,
        }
    }

    /// A link for a port that could not be opened. Every command fails.
    #[must_use]
    pub fn disconnected(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            writer: None,
            timeout: Duration::ZERO,
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> SerialPortLink<W> {
    async fn write(&self, bytes: &[u8]) -> Result<(), SerialError> {
        let Some(writer) = &self.writer else {
            return Err(SerialError::NotOpen {
                port: self.port.clone(),
            });
        };
        let mut writer = writer.lock().await;

        let write = async {
            writer.write_all(bytes).await?;
            writer.flush().await
        };
        tokio::time::timeout(self.timeout, write)
            .await
            .map_err(|_| std::io::Error::from(std::io::ErrorKind::TimedOut))??;
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin + Send> SerialLink for SerialPortLink<W> {
    fn send_command(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<(), IncubatorError>> + Send {
        async move {
            self.write(command.wire_bytes())
                .await
                .map_err(|err| IncubatorError::CommandFailed {
                    command,
                    source: Box::new(err),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incubator_domain::actuator::Actuator;
    use tokio::io::AsyncReadExt;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn should_write_wire_bytes() {
        let (host, mut board) = tokio::io::duplex(64);
        let link = SerialPortLink::new("test", host, TIMEOUT);

        link.send_command(Command::activate(Actuator::Heater))
            .await
            .unwrap();
        link.clone()
            .send_command(Command::deactivate(Actuator::Fan))
            .await
            .unwrap();

        let mut received = [0_u8; 4];
        board.read_exact(&mut received).await.unwrap();
        assert_eq!(&received, b"H1F0");
    }

    #[tokio::test]
    async fn should_report_command_failure_when_port_not_open() {
        let link = SerialPortLink::<tokio::io::DuplexStream>::disconnected("/dev/incubator-missing");

        let err = link
            .send_command(Command::activate(Actuator::Heater))
            .await
            .unwrap_err();

        match err {
            IncubatorError::CommandFailed { command, source } => {
                assert_eq!(command, Command::activate(Actuator::Heater));
                assert!(source.to_string().contains("/dev/incubator-missing"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_when_board_stops_draining() {
        let (host, _board) = tokio::io::duplex(1);
        let link = SerialPortLink::new("test", host, TIMEOUT);

        let err = link
            .send_command(Command::activate(Actuator::Motor))
            .await
            .unwrap_err();

        assert!(matches!(err, IncubatorError::CommandFailed { .. }));
    }
}
