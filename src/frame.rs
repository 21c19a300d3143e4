//! Frame timing

use std::time::{Duration, Instant};

/// Elapsed and per-frame time in whole milliseconds
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_ms: u64,
}

/// One clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    pub elapsed_ms: u64,
    pub delta_ms: u64,
}

impl FrameTime {
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ms as f32 / 1000.0
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta_ms as f32 / 1000.0
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start, last_ms: 0 }
    }

    /// Read the clock at `now` and advance the frame
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let elapsed_ms = now.saturating_duration_since(self.start).as_millis() as u64;
        let delta_ms = elapsed_ms.saturating_sub(self.last_ms);
        self.last_ms = elapsed_ms;
        FrameTime {
            elapsed_ms,
            delta_ms,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts frames and reports once per second
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    since_report_ms: u64,
}

impl FpsCounter {
    pub const REPORT_INTERVAL: Duration = Duration::from_millis(1000);

    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame of `delta_ms`; returns the frame count once more than
    /// a second has passed since the last report
    pub fn frame(&mut self, delta_ms: u64) -> Option<u32> {
        self.frames += 1;
        self.since_report_ms += delta_ms;
        if self.since_report_ms > Self::REPORT_INTERVAL.as_millis() as u64 {
            let frames = self.frames;
            self.frames = 0;
            self.since_report_ms = 0;
            Some(frames)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_deltas() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let first = clock.tick_at(start + Duration::from_millis(16));
        assert_eq!(first, FrameTime { elapsed_ms: 16, delta_ms: 16 });
        let second = clock.tick_at(start + Duration::from_millis(50));
        assert_eq!(second.delta_ms, 34);
        assert!((second.elapsed_secs() - 0.05).abs() < 1e-6);
        assert!((second.delta_secs() - 0.034).abs() < 1e-6);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start + Duration::from_secs(1));
        assert_eq!(clock.tick_at(start), FrameTime::default());
    }

    #[test]
    fn test_fps_reports_after_one_second() {
        let mut fps = FpsCounter::new();
        for _ in 0..99 {
            assert_eq!(fps.frame(10), None);
        }
        // Exactly 1000 ms is not yet a report
        assert_eq!(fps.frame(10), None);
        assert_eq!(fps.frame(10), Some(101));
        assert_eq!(fps.frame(10), None);
    }
}
