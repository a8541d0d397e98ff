//! Frame timing.
//!
//! Physics always advances by a fixed nominal step ([`FIXED_STEP`]) no matter
//! how often frames actually arrive, so effects look the same on 60 Hz and
//! 144 Hz displays (a faster display simply plays them faster). Wall-clock
//! time is only used to report frames per second.
//!
//! # Example
//!
//! ```ignore
//! use clickfx::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // Once per redraw:
//! let now = clock.advance(FrameClock::STEP);
//!
//! println!("Simulated: {:.2}s", clock.elapsed());
//! println!("Frame: {}", clock.frame());
//! println!("FPS: {:.1}", clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Nominal physics step in seconds.
pub const FIXED_STEP: f32 = 1.0 / 60.0;

/// `dt` if it is a finite, positive step, otherwise 0.
pub fn usable_step(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Simulated clock plus a measured frame rate.
#[derive(Debug)]
pub struct FrameClock {
    /// Simulated seconds since creation.
    elapsed_secs: f32,
    /// Frames advanced since creation.
    frame_count: u64,
    /// Measured FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameClock {
    pub const STEP: f32 = FIXED_STEP;

    pub fn new() -> Self {
        Self {
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: Instant::now(),
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance simulated time by `dt` and count a frame.
    ///
    /// Returns the new simulated time. Negative or non-finite steps count
    /// the frame without moving the clock.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed_secs += usable_step(dt);
        self.frame_count += 1;

        let now = Instant::now();
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_secs
    }

    /// Simulated seconds since creation.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Frames advanced since creation.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frames per second; `0` until the first half-second passes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
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
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_fixed_steps_accumulate() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(FIXED_STEP);
        }
        assert_eq!(clock.frame(), 60);
        assert!((clock.elapsed() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_bad_steps_are_ignored() {
        let mut clock = FrameClock::new();
        clock.advance(-1.0);
        clock.advance(f32::NAN);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_fps_measured() {
        let mut clock = FrameClock::new();
        clock.advance(FIXED_STEP);
        thread::sleep(Duration::from_millis(550));
        clock.advance(FIXED_STEP);
        assert!(clock.fps() > 0.0);
    }
}
