//! Reelforge Project Model
//!
//! Defines the core data contracts for Reelforge compositions:
//! - **Overlays:** Timed, positioned canvas elements (video, image, text,
//!   caption, audio, sticker)
//! - **Aspect ratios:** The fixed ratio → canvas dimension table
//! - **Composition:** Renderer input snapshot and the on-disk document
//!
//! Time is measured in integer frames; geometry in canvas pixels at the
//! composition's current resolution.

pub mod aspect;
pub mod composition;
pub mod overlay;

pub use aspect::*;
pub use composition::*;
pub use overlay::*;
