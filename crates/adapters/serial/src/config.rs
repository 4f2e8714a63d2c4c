//! Serial port configuration.

use std::time::Duration;

use serde::Deserialize;

use incubator_domain::error::ValidationError;
use incubator_domain::reading::{DEFAULT_DELIMITER, LineFormat};

/// How sensor lines are encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// `temperature<delimiter>humidity`
    #[default]
    Delimited,
    /// `{"temperature": .., "humidity": ..}`
    Json,
}

/// Configuration for the serial link to the controller board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub port: String,
    pub baud_rate: u32,
    /// Read and write timeout, in milliseconds.
    pub read_timeout_ms: u64,
    pub format: WireFormat,
    /// Field separator for [`WireFormat::Delimited`].
    pub delimiter: char,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            read_timeout_ms: 2000,
            format: WireFormat::Delimited,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SerialConfig {
    #[must_use]
    pub fn line_format(&self) -> LineFormat {
        match self.format {
            WireFormat::Delimited => LineFormat::Delimited(self.delimiter),
            WireFormat::Json => LineFormat::Json,
        }
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a zero baud rate or timeout.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.baud_rate == 0 {
            return Err(ValidationError::ZeroDuration("serial.baud_rate"));
        }
        if self.read_timeout_ms == 0 {
            return Err(ValidationError::ZeroDuration("serial.read_timeout_ms"));
        }
        Ok(())
    }
}
