//! One connection to the controller board, shared by sensing and actuation.
//!
//! The board is a single device node, and `tokio-serial` opens it with
//! exclusive access. Readings and commands therefore travel over the two
//! halves of one stream instead of separate opens.

use tokio::io::{AsyncRead, AsyncWrite, BufReader, ReadHalf, WriteHalf};
use tokio_serial::SerialPortBuilderExt;

use crate::config::SerialConfig;
use crate::error::SerialError;
use crate::link::SerialPortLink;
use crate::source::{LineSensorSource, SerialSensorSource};

/// Open the configured port once and hand out its receive and transmit halves.
///
/// # Errors
///
/// Returns [`SerialError::Open`] when the device cannot be opened.
pub fn open(config: &SerialConfig) -> Result<(SerialSensorSource, SerialPortLink), SerialError> {
    let stream = tokio_serial::new(&config.port, config.baud_rate)
        .timeout(config.read_timeout())
        .open_native_async()
        .map_err(|source| SerialError::Open {
            port: config.port.clone(),
            source,
        })?;
    tracing::info!(port = %config.port, baud_rate = config.baud_rate, "serial port opened");

    Ok(split(stream, config))
}

/// Split an already open stream into a sensor source and a command link.
#[must_use]
pub fn split<S>(
    stream: S,
    config: &SerialConfig,
) -> (
    LineSensorSource<BufReader<ReadHalf<S>>>,
    SerialPortLink<WriteHalf<S>>,
)
where
    S: AsyncRead + AsyncWrite + Send,
{
    let (reader, writer) = tokio::io::split(stream);
    let source = LineSensorSource::new(
        BufReader::new(reader),
        config.line_format(),
        config.read_timeout(),
    );
    let link = SerialPortLink::new(config.port.clone(), writer, config.read_timeout());
    (source, link)
}
