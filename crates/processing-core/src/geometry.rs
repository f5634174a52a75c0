//! Aspect-ratio retargeting of overlay geometry.
//!
//! When the canvas changes size every overlay's position and size are
//! rescaled independently per axis. Rotation, timing and styles are left
//! untouched.

use std::sync::Arc;

use reelforge_project_model::aspect::CanvasDimensions;
use reelforge_project_model::overlay::Overlay;

/// Per-axis scale factors between two canvases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasScale {
    pub x: f64,
    pub y: f64,
}

impl CanvasScale {
    /// Scale from `old` to `new`. A zero source dimension yields a zero
    /// factor on that axis instead of dividing by zero.
    pub fn between(old: CanvasDimensions, new: CanvasDimensions) -> Self {
        Self {
            x: axis_scale(old.width, new.width),
            y: axis_scale(old.height, new.height),
        }
    }
}

fn axis_scale(old: u32, new: u32) -> f64 {
    if old == 0 {
        return 0.0;
    }
    new as f64 / old as f64
}

fn scale_round(value: f64, factor: f64) -> f64 {
    let scaled = (value * factor).round();
    if scaled.is_finite() {
        // Normalize -0.0 so degenerate overlays compare equal to 0.
        scaled + 0.0
    } else {
        0.0
    }
}

/// Rescale one overlay's geometry.
pub fn transform_overlay(overlay: &Overlay, scale: CanvasScale) -> Overlay {
    Overlay {
        left: scale_round(overlay.left, scale.x),
        top: scale_round(overlay.top, scale.y),
        width: scale_round(overlay.width, scale.x),
        height: scale_round(overlay.height, scale.y),
        ..overlay.clone()
    }
}

/// Retarget every overlay from the `old` canvas to the `new` canvas.
///
/// If the canvases match within tolerance the input `Arc` itself is
/// returned, so callers can detect the no-op with [`Arc::ptr_eq`].
pub fn transform_overlays_for_aspect_ratio(
    overlays: &Arc<[Overlay]>,
    old: CanvasDimensions,
    new: CanvasDimensions,
) -> Arc<[Overlay]> {
    if old.approx_eq(&new) {
        return Arc::clone(overlays);
    }

    let scale = CanvasScale::between(old, new);
    tracing::debug!(
        from = %old,
        to = %new,
        scale_x = scale.x,
        scale_y = scale.y,
        count = overlays.len(),
        "Retargeting overlays"
    );

    overlays
        .iter()
        .map(|overlay| transform_overlay(overlay, scale))
        .collect()
}
