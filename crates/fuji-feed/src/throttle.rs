//! Request pacing for exchange REST clients.
//!
//! Each client is limited to a fixed number of requests per second. Callers
//! reserve the next free slot under a lock and then sleep until it opens, so
//! bursts are spread evenly instead of being rejected.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Evenly spaced request scheduler.
#[derive(Debug)]
pub struct RequestThrottle {
    /// Minimum spacing between two requests.
    interval: Duration,
    /// Earliest instant the next request may start.
    next_slot: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// Throttle allowing `requests` per second (at least one).
    pub fn per_second(requests: u32) -> Self {
        Self::with_interval(Duration::from_secs(1) / requests.max(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until this caller's slot opens.
    pub async fn acquire(&self) {
        let slot = self.reserve(Instant::now());
        if slot > Instant::now() {
            trace!(wait_ms = (slot - Instant::now()).as_millis() as u64, "Throttling request");
            tokio::time::sleep_until(slot).await;
        }
    }

    /// Reserve the next slot at or after `now`.
    fn reserve(&self, now: Instant) -> Instant {
        let mut next = self.next_slot.lock();
        let slot = match *next {
            Some(at) if at > now => at,
            _ => now,
        };
        *next = Some(slot + self.interval);
        slot
    }

    /// Forget reserved slots.
    pub fn reset(&self) {
        *self.next_slot.lock() = None;
    }
}
