//! Minimum spacing between consecutive outbound provider calls.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum gap between the end of one call and the start of the next.
///
/// Each walker owns its own `Pacer`, so parallel walkers (one per section)
/// are paced independently.
#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call is allowed. The first call never waits.
    pub async fn ready(&self) {
        if let Some(last) = self.last_call {
            let next = last + self.min_interval;
            if next > Instant::now() {
                sleep_until(next).await;
            }
        }
    }

    /// Record that a call just finished.
    pub fn mark(&mut self) {
        self.last_call = Some(Instant::now());
    }
}
