//! Frame clock.
use std::{
    thread,
    time::{Duration, Instant},
};

/// Timer to synchronize a host loop with the refresh rate of the machine.
///
/// The host runs one frame, then waits on the clock until the frame's
/// time slice has elapsed. Time spent in the frame itself counts towards
/// the slice, so the loop holds a fixed rate regardless of frame cost.
pub struct Clock {
    start: Instant,
    interval: Duration,
}

impl Clock {
    /// Creates a new clock with the current time as internal state.
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Set the clock state back to zero.
    pub fn reset(&mut self) {
        self.start = Instant::now()
    }

    /// Block the current thread until the next time slice.
    pub fn wait(&mut self) {
        loop {
            let elapsed = self.start.elapsed();
            if elapsed < self.interval {
                // Sleep does not have enough resolution for short intervals.
                //
                // Spinning a loop causes high CPU usage and fan madness.
                //
                // Sleep through most of the slice, then yield for the rest.
                let remaining = self.interval - elapsed;
                if remaining > Duration::from_millis(2) {
                    thread::sleep(remaining - Duration::from_millis(1));
                } else {
                    thread::yield_now();
                }
            } else {
                // Reset back to zero, rather than trying to catch up.
                //
                // If the host was paused for debugging, and a large
                // amount of time has elapsed until it is resumed,
                // it should simply continue at the next frame running
                // at its usual speed.
                self.reset();
                return;
            }
        }
    }
}
