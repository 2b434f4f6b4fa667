//! Synthetic response latency.

use std::time::Duration;

/// Fixed per-request delay applied by the echo handler.
///
/// Sleeping is done on the tokio timer, so only the calling request task is
/// suspended; concurrent requests wait independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseDelay {
    duration: Duration,
}

impl ResponseDelay {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_zero(&self) -> bool {
        self.duration.is_zero()
    }

    pub async fn delay(&self) {
        if self.is_zero() {
            return;
        }
        tokio::time::sleep(self.duration).await;
    }
}
