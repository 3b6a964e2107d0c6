//! Frame timing for the card window.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // Once per redraw:
//! let delta = clock.tick();
//! scene.step(delta);
//! ```

use std::time::{Duration, Instant};

/// Longest delta handed to the animation, in seconds.
///
/// A window that was minimized or stalled would otherwise report one huge
/// frame and the tree would jump a full turn.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Per-frame timing: delta, elapsed time, frame count and FPS.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    max_delta: f32,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Mark a new frame. Returns the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = raw_delta.min(self.max_delta);
        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Time since last frame in seconds, after clamping.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Change the delta clamp. Negative values are treated as zero.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta.max(0.0);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_tick_advances() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        let delta = clock.tick_at(start + Duration::from_millis(16));
        assert!((delta - 0.016).abs() < 1e-4);
        assert_eq!(clock.frame(), 1);
        assert!((clock.elapsed() - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        let delta = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(delta, DEFAULT_MAX_DELTA);
        // Elapsed time still reflects the wall clock.
        assert!((clock.elapsed() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_fps_estimate() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        for i in 1..=30 {
            clock.tick_at(start + Duration::from_millis(i * 20));
        }
        // 30 frames over 600ms, measured at the 500ms mark: 25 frames / 0.5s.
        assert!((clock.fps() - 50.0).abs() < 1.0);
    }
}
