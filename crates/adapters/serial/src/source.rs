//! Line-oriented [`SensorSource`] for the serial sensor feed.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, ReadHalf};
use tokio_serial::SerialStream;

use incubator_app::ports::SensorSource;
use incubator_domain::error::{IncubatorError, ReadingParseError};
use incubator_domain::reading::{LineFormat, SensorReading};
use incubator_domain::time::now;

/// Longest sensor line accepted before it is reported as malformed.
///
/// A board line is `37.50|60.00` or a short JSON object; anything this long
/// is line noise or a baud rate mismatch.
pub const MAX_LINE_LEN: usize = 512;

/// Sensor source reading the receive half of the shared serial port.
pub type SerialSensorSource = LineSensorSource<BufReader<ReadHalf<SerialStream>>>;

/// Decodes one [`SensorReading`] per line from any buffered byte stream.
///
/// Partially received lines survive a read timeout or a dropped
/// `next_reading` future: bytes accumulate in an internal buffer until the
/// newline arrives.
pub struct LineSensorSource<R> {
    reader: R,
    buf: Vec<u8>,
    /// Set after an over-long line until its terminator shows up.
    discarding: bool,
    format: LineFormat,
    read_timeout: Duration,
}

impl<R: AsyncBufRead + Unpin + Send> LineSensorSource<R> {
    pub fn new(reader: R, format: LineFormat, read_timeout: Duration) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            discarding: false,
            format,
            read_timeout,
        }
    }

    fn take_line(&mut self) -> Result<SensorReading, IncubatorError> {
        let raw = std::mem::take(&mut self.buf);
        let line = String::from_utf8_lossy(&raw);
        SensorReading::parse_line(&line, self.format, now()).map_err(IncubatorError::from)
    }

    /// Move buffered bytes up to and including the next newline into `buf`.
    ///
    /// Returns `Ok(None)` at end of stream, otherwise whether a newline was
    /// consumed. Cancel-safe: nothing is consumed before `fill_buf` resolves.
    async fn fill_line(&mut self) -> io::Result<Option<bool>> {
        let chunk = self.reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(None);
        }
        let (used, terminated) = match chunk.iter().position(|b| *b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (chunk.len(), false),
        };
        if !self.discarding {
            self.buf.extend_from_slice(&chunk[..used]);
        }
        self.reader.consume(used);
        Ok(Some(terminated))
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

impl<R: AsyncBufRead + Unpin + Send> SensorSource for LineSensorSource<R> {
    fn next_reading(
        &mut self,
    ) -> impl Future<Output = Option<Result<SensorReading, IncubatorError>>> + Send {
        async move {
            loop {
                let filled = match tokio::time::timeout(self.read_timeout, self.fill_line()).await {
                    Err(_) => {
                        tracing::trace!("no complete sensor line within read timeout");
                        continue;
                    }
                    Ok(Err(err)) if is_transient(&err) => {
                        tracing::warn!(error = %err, "transient serial read error, retrying");
                        continue;
                    }
                    Ok(Err(err)) => {
                        tracing::error!(error = %err, "serial sensor read failed");
                        return None;
                    }
                    Ok(Ok(filled)) => filled,
                };

                let Some(terminated) = filled else {
                    if self.buf.is_empty() || self.discarding {
                        tracing::error!("serial sensor stream closed");
                        return None;
                    }
                    return Some(self.take_line());
                };

                if self.discarding {
                    self.discarding = !terminated;
                    continue;
                }
                if self.buf.len() > MAX_LINE_LEN {
                    self.buf.clear();
                    self.discarding = !terminated;
                    return Some(Err(ReadingParseError::TooLong {
                        limit: MAX_LINE_LEN,
                    }
                    .into()));
                }
                if terminated {
                    return Some(self.take_line());
                }
            }
        }
    }
}
