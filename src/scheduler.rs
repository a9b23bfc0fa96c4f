//! Tick scheduler for the cooperative main loop.
//!
//! The loop spins as fast as the radio receive timeout allows. Slow work
//! (retransmission, geofence evaluation) runs on a coarser cadence, gated
//! by [`TickScheduler::poll`].
//!
//! ```text
//!  ──┬──────┬──────┬──────┬──────┬──────┬───▶ loop iterations
//!    │ rx   │ rx   │ rx   │ rx   │ rx   │
//!    └──────┴─ ≥1 s ──────┴──────┴─ ≥1 s ─
//!              tick                 tick
//! ```
//!
//! The schedule does not catch up: a long stall yields one tick, not a
//! burst of them.

use core::time::Duration;

/// Default cadence of the protocol tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Fires at most once per interval, measured from the previous firing.
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    interval_ms: u64,
    last_ms: u64,
}

impl TickScheduler {
    /// Start the interval at `now_ms`; the first tick is one interval out.
    pub fn new(interval: Duration, now_ms: u64) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            last_ms: now_ms,
        }
    }

    /// Returns `true` (and restarts the interval) once at least one interval
    /// has passed since the last tick.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) < self.interval_ms {
            return false;
        }
        self.last_ms = now_ms;
        true
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Clock reading of the most recent tick (or of construction).
    pub fn last_tick_ms(&self) -> u64 {
        self.last_ms
    }
}
