//! Serial adapter error types.

use incubator_domain::error::IncubatorError;

/// Errors specific to the serial adapter.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// The device could not be opened.
    #[error("failed to open serial port {port}")]
    Open {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// The port was never opened, so there is nothing to write to.
    #[error("serial port {port} is not open")]
    NotOpen { port: String },

    /// Reading from or writing to an open port failed.
    #[error("serial I/O error")]
    Io(#[from] std::io::Error),
}

impl SerialError {
    /// Convert into [`IncubatorError::LinkUnavailable`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> IncubatorError {
        IncubatorError::LinkUnavailable(Box::new(self))
    }
}

impl From<SerialError> for IncubatorError {
    fn from(err: SerialError) -> Self {
        err.into_domain()
    }
}
