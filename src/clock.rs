use std::time::{Duration, Instant};

use crate::config::MIN_TICK_DELAY_MS;

/// Paces the tick loop. `start` marks the beginning of a tick's work and
/// `remaining` reports how long to wait so ticks land on the target rate.
#[derive(Debug)]
pub struct Clock {
    last_run_at: Instant,
    min_delay: Duration,
}

impl Clock {
    pub fn new() -> Self {
        Self::with_min_delay(Duration::from_millis(MIN_TICK_DELAY_MS))
    }

    pub fn with_min_delay(min_delay: Duration) -> Self {
        Self {
            last_run_at: Instant::now(),
            min_delay,
        }
    }

    pub fn start(&mut self) {
        self.last_run_at = Instant::now();
    }

    /// Delay until the next tick, given the work done since `start`.
    pub fn remaining(&self, fps: u32) -> Duration {
        self.delay_after(self.last_run_at.elapsed(), fps)
    }

    /// Frame interval minus `elapsed`, never below the minimum delay.
    pub fn delay_after(&self, elapsed: Duration, fps: u32) -> Duration {
        let frame = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        frame.saturating_sub(elapsed).max(self.min_delay)
    }

    /// Blocks the current thread until the next tick is due.
    pub fn wait(&self, fps: u32) {
        std::thread::sleep(self.remaining(fps));
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
