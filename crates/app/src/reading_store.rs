//! Single-slot store for the most recent sensor reading.

use std::sync::Arc;

use tokio::sync::watch;

use incubator_domain::reading::SensorReading;

/// Holds the latest [`SensorReading`], replaced as a whole on every update.
///
/// Backed by a tokio [`watch`] channel: writers swap the entire value under
/// the channel's lock, so readers never see temperature from one sample and
/// humidity from another. No history is kept.
///
/// Cloning yields another handle to the same slot.
#[derive(Clone)]
pub struct LatestReadingStore {
    sender: Arc<watch::Sender<Option<SensorReading>>>,
}

impl Default for LatestReadingStore {
    fn default() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }
}

impl LatestReadingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored reading.
    pub fn set(&self, reading: SensorReading) {
        self.sender.send_replace(Some(reading));
    }

    /// The most recent reading, or `None` if nothing arrived yet.
    #[must_use]
    pub fn get(&self) -> Option<SensorReading> {
        *self.sender.borrow()
    }

    /// Receiver notified whenever a new reading is stored.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SensorReading>> {
        self.sender.subscribe()
    }
}
