//! Composition duration resolution.
//!
//! The composition length is derived from its overlays: it is the latest
//! end frame of any overlay, so every overlay fits by construction.

use reelforge_common::clock::FrameClock;
use reelforge_project_model::overlay::Overlay;

/// Fallback length used when the composition has no overlays.
pub const DEFAULT_DURATION_FRAMES: u32 = 300;

/// Policy knobs for duration resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    /// Length reported for an empty composition. Never 0.
    pub default_frames: u32,
}

impl DurationPolicy {
    pub fn new(default_frames: u32) -> Self {
        Self {
            default_frames: default_frames.max(1),
        }
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_FRAMES)
    }
}

/// Resolved composition length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionDuration {
    pub duration_in_frames: u32,
    pub duration_in_seconds: f64,
}

/// Latest end frame over all overlays, or the policy default when empty.
pub fn resolve_duration(
    overlays: &[Overlay],
    fps: u32,
    policy: DurationPolicy,
) -> CompositionDuration {
    let duration_in_frames = overlays
        .iter()
        .map(Overlay::end_frame)
        .max()
        .unwrap_or(policy.default_frames.max(1));

    CompositionDuration {
        duration_in_frames,
        duration_in_seconds: FrameClock::new(fps).frames_to_secs(duration_in_frames),
    }
}
