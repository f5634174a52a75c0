//! Reelforge Processing Core
//!
//! Pure computations over the composition model:
//! - **Geometry:** Retarget overlay geometry when the canvas aspect ratio changes
//! - **Zoom:** Timeline zoom/scroll controller anchored on the pointer
//! - **Duration:** Derive the composition length from its overlays
//!
//! Pure computation only: no I/O and no async.
//! All inputs are data; all outputs are data.

pub mod duration;
pub mod geometry;
pub mod zoom;

pub use duration::{resolve_duration, CompositionDuration, DurationPolicy};
pub use geometry::transform_overlays_for_aspect_ratio;
pub use zoom::TimelineZoom;
