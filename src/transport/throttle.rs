//! Global throttle gate for outbound calls.
//!
//! Every dispatch in the process goes through one `ThrottleGate`, so no two
//! calls leave closer together than `min_interval` no matter how many tasks
//! are issuing them. The gate is passed around explicitly (usually behind an
//! `Arc`) rather than living in a static, which lets tests pause the Tokio
//! clock and check spacing exactly.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Default spacing between two dispatches.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Minimum-interval gate shared by all callers.
#[derive(Debug)]
pub struct ThrottleGate {
    min_interval: Duration,
    /// Time of the last dispatch (None until the first call).
    last_dispatch: Mutex<Option<Instant>>,
}

impl ThrottleGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a dispatch is allowed, then claim the slot.
    ///
    /// The lock is held across the wait so the read-modify-write of
    /// `last_dispatch` is a single step; waiters queue in FIFO order.
    /// Returns the instant the slot was claimed.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_dispatch.lock().await;

        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Throttle gate waiting"
                );
                sleep_until(ready_at).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}

impl Default for ThrottleGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
