//! Playhead position and play/pause state.

use serde::Serialize;

/// Playhead over a composition of `duration` frames.
///
/// The playhead always lies in `[0, duration - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Playback {
    pub current_frame: u32,
    pub playing: bool,
}

impl Playback {
    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn seek(&mut self, frame: u32, duration: u32) {
        self.current_frame = frame.min(last_frame(duration));
    }

    /// Move the playhead forward while playing. Reaching the last frame
    /// pauses playback.
    pub fn advance(&mut self, frames: u32, duration: u32) -> u32 {
        if !self.playing {
            return self.current_frame;
        }
        let last = last_frame(duration);
        self.current_frame = self.current_frame.saturating_add(frames).min(last);
        if self.current_frame == last {
            self.playing = false;
        }
        self.current_frame
    }

    /// Pull the playhead back inside a composition that got shorter.
    pub fn clamp_to(&mut self, duration: u32) {
        self.current_frame = self.current_frame.min(last_frame(duration));
    }
}

fn last_frame(duration: u32) -> u32 {
    duration.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_clamps() {
        let mut playback = Playback::default();
        playback.seek(500, 300);
        assert_eq!(playback.current_frame, 299);
        playback.seek(10, 300);
        assert_eq!(playback.current_frame, 10);
    }

    #[test]
    fn test_advance_only_while_playing() {
        let mut playback = Playback::default();
        assert_eq!(playback.advance(5, 300), 0);
        playback.play();
        assert_eq!(playback.advance(5, 300), 5);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut playback = Playback {
            current_frame: 290,
            playing: true,
        };
        assert_eq!(playback.advance(30, 300), 299);
        assert!(!playback.playing);
    }

    #[test]
    fn test_toggle() {
        let mut playback = Playback::default();
        assert!(playback.toggle());
        assert!(!playback.toggle());
    }
}
