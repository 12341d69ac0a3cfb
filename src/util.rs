//! Frame timing.

use std::time::{Duration, Instant};

/// Counts frames and reports a rate once per `interval`.
pub struct FpsCounter {
    interval: Duration,
    frames: u32,
    since: Instant,
}

impl FpsCounter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frames: 0,
            since: Instant::now(),
        }
    }

    /// Record a frame. Returns the rate when a full interval has elapsed.
    pub fn tick(&mut self) -> Option<f32> {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.since);
        if elapsed < self.interval {
            return None;
        }

        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.since = now;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_once_per_interval() {
        let start = Instant::now();
        let mut counter = FpsCounter {
            interval: Duration::from_secs(1),
            frames: 0,
            since: start,
        };

        for i in 1..30 {
            assert_eq!(counter.tick_at(start + Duration::from_millis(i * 10)), None);
        }
        let fps = counter.tick_at(start + Duration::from_secs(1)).unwrap();
        assert!((fps - 30.0).abs() < 1e-3);
        assert_eq!(counter.frames, 0);
    }
}
