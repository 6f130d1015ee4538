//! Fixed-interval tick pacing, decoupled from the frame rate.

use std::time::{Duration, Instant};

/// Most ticks a single frame may run; time past the cap is discarded.
const MAX_BURST: u32 = 4;

/// Accumulates wall-clock time and converts it into whole simulation
/// ticks. The frame loop calls [`TickScheduler::due_ticks`] once per frame
/// and runs the simulation that many times.
pub struct TickScheduler {
    interval: Duration,
    last: Instant,
    carry: Duration,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
            carry: Duration::ZERO,
        }
    }

    /// Number of ticks that became due since the previous call, capped at
    /// [`MAX_BURST`]. After a long stall the backlog beyond the cap is
    /// dropped instead of replayed.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        self.carry += now.saturating_duration_since(self.last);
        self.last = now;

        let mut due = 0;
        while self.carry >= self.interval {
            self.carry -= self.interval;
            due += 1;
        }
        if due > MAX_BURST {
            self.carry = Duration::ZERO;
            due = MAX_BURST;
        }
        due
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
