//! Frame clock utilities.
//!
//! Every Reelforge timeline position is an integer frame index relative to
//! the composition start. This module converts between frames, seconds and
//! human-readable timecodes for a fixed frame rate.

/// Frame-rate aware clock for converting timeline positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    fps: u32,
}

impl FrameClock {
    /// Create a clock for the given frame rate.
    pub fn new(fps: u32) -> Self {
        Self { fps }
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Convert a frame count to seconds. A zero frame rate yields 0.
    pub fn frames_to_secs(&self, frames: u32) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        frames as f64 / self.fps as f64
    }

    /// Format a frame position as `mm:ss:ff`.
    pub fn timecode(&self, frame: u32) -> String {
        if self.fps == 0 {
            return "00:00:00".to_string();
        }
        let total_secs = frame / self.fps;
        let minutes = total_secs / 60;
        let secs = total_secs % 60;
        let frames = frame % self.fps;
        format!("{minutes:02}:{secs:02}:{frames:02}")
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(30)
    }
}
