//! Heartbeat gating for periodic status logs

use std::time::{Duration, Instant};

/// Rate-limits periodic status logging to a fixed interval.
pub struct Heartbeat {
    interval: Duration,
    last_beat: Instant,
}

impl Heartbeat {
    /// Create a heartbeat with the given interval in seconds
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            last_beat: Instant::now(),
        }
    }

    /// True (and the timer restarts) once per interval
    pub fn tick(&mut self) -> bool {
        if self.last_beat.elapsed() >= self.interval {
            self.last_beat = Instant::now();
            true
        } else {
            false
        }
    }

    /// Restart the interval without beating, e.g. after other output
    /// already showed liveness
    pub fn reset(&mut self) {
        self.last_beat = Instant::now();
    }
}
