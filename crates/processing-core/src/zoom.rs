//! Timeline zoom and scroll controller.
//!
//! Maps a logical zoom factor (`scale`) and a horizontal scroll offset to
//! pixel space. Zooming keeps the time position under the pointer fixed so
//! the timeline does not jump beneath the cursor.
//!
//! # Coordinate spaces
//!
//! - **client x**: pointer position in window pixels
//! - **relative x**: position inside the scrolled content, in pixels
//!   (`client_x - container.left + scroll`)
//! - **time**: position on the timeline, same unit as the content duration

use reelforge_common::config::TimelineDefaults;

/// Zoom limits for the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale change per unit of zoom delta.
    pub step: f64,
    pub initial_scale: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 10.0,
            step: 0.1,
            initial_scale: 1.0,
        }
    }
}

impl ZoomConfig {
    /// Bounds safe to clamp against.
    ///
    /// Non-finite values fall back to the defaults and reversed bounds are
    /// swapped.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let (mut min_scale, mut max_scale) =
            if self.min_scale.is_finite() && self.max_scale.is_finite() {
                (self.min_scale, self.max_scale)
            } else {
                (defaults.min_scale, defaults.max_scale)
            };
        if min_scale > max_scale {
            std::mem::swap(&mut min_scale, &mut max_scale);
        }
        Self {
            min_scale,
            max_scale,
            step: if self.step.is_finite() {
                self.step
            } else {
                defaults.step
            },
            initial_scale: if self.initial_scale.is_finite() {
                self.initial_scale
            } else {
                defaults.initial_scale
            },
        }
    }
}

impl From<&TimelineDefaults> for ZoomConfig {
    fn from(defaults: &TimelineDefaults) -> Self {
        Self {
            min_scale: defaults.min_scale,
            max_scale: defaults.max_scale,
            step: defaults.zoom_step,
            initial_scale: defaults.initial_scale,
        }
    }
}

/// Horizontal placement of the scroll container in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerMetrics {
    pub left: f64,
    pub width: f64,
}

/// A wheel event as delivered by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelInput {
    pub delta_y: f64,
    pub client_x: f64,
    pub ctrl_key: bool,
    pub meta_key: bool,
}

/// Outcome of a zoom request that changed the scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomChange {
    pub previous_scale: f64,
    pub scale: f64,
    pub scroll: f64,
}

/// Zoom/scroll state of the timeline.
#[derive(Debug, Clone)]
pub struct TimelineZoom {
    config: ZoomConfig,
    scale: f64,
    scroll: f64,
}

impl TimelineZoom {
    pub fn new(config: ZoomConfig) -> Self {
        let config = config.normalized();
        let scale = config
            .initial_scale
            .clamp(config.min_scale, config.max_scale);
        Self {
            config,
            scale,
            scroll: 0.0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ZoomConfig::default())
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Horizontal scroll offset in content pixels.
    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// Record a scroll offset reported by the scroll container.
    pub fn set_scroll(&mut self, scroll: f64) {
        self.scroll = scroll.max(0.0);
    }

    /// Set the scale directly, clamped to the configured range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = self.clamp(scale);
    }

    /// Back to the initial scale with no scroll.
    pub fn reset(&mut self) {
        self.scale = self.clamp(self.config.initial_scale);
        self.scroll = 0.0;
    }

    fn clamp(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.scale;
        }
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    /// Zoom by `delta` steps around the pointer.
    ///
    /// Returns `None` when the clamped scale does not change.
    pub fn handle_zoom(
        &mut self,
        delta: f64,
        pointer_client_x: f64,
        container: ContainerMetrics,
    ) -> Option<ZoomChange> {
        let new_scale = self.clamp(self.scale + delta * self.config.step);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return None;
        }

        let pointer_offset = pointer_client_x - container.left;
        let relative_x = pointer_offset + self.scroll;
        let new_scroll = relative_x * (new_scale / self.scale) - pointer_offset;

        let change = ZoomChange {
            previous_scale: self.scale,
            scale: new_scale,
            scroll: new_scroll.max(0.0),
        };
        self.scale = change.scale;
        self.scroll = change.scroll;
        Some(change)
    }

    /// Zoom from a wheel event when ctrl or meta is held.
    ///
    /// Plain wheel events are left to the scroll container and return `None`.
    pub fn handle_wheel_zoom(
        &mut self,
        event: WheelInput,
        container: ContainerMetrics,
    ) -> Option<ZoomChange> {
        if !(event.ctrl_key || event.meta_key) || event.delta_y == 0.0 {
            return None;
        }
        // Wheel up (negative delta) zooms in.
        let delta = -event.delta_y.signum();
        self.handle_zoom(delta, event.client_x, container)
    }

    /// Duration visible in the viewport at the current scale.
    pub fn viewport_duration(&self, content_duration: f64) -> f64 {
        viewport_duration(content_duration, self.scale)
    }

    /// Width in pixels occupied by the whole content duration.
    ///
    /// Pixels per time unit are `content_width / content_duration` at every
    /// scale; below 1 the content no longer fills the container and the
    /// remainder of the viewport shows empty timeline.
    pub fn content_width(&self, container: ContainerMetrics) -> f64 {
        container.width * self.scale
    }

    /// Timeline time under a client x position.
    pub fn time_at_client_x(
        &self,
        client_x: f64,
        container: ContainerMetrics,
        content_duration: f64,
    ) -> f64 {
        let width = self.content_width(container);
        if width <= 0.0 {
            return 0.0;
        }
        let relative_x = client_x - container.left + self.scroll;
        relative_x / width * content_duration
    }

    /// Client x position at which `time` is drawn.
    pub fn client_x_for_time(
        &self,
        time: f64,
        container: ContainerMetrics,
        content_duration: f64,
    ) -> f64 {
        if content_duration <= 0.0 {
            return container.left - self.scroll;
        }
        time / content_duration * self.content_width(container) + container.left - self.scroll
    }
}

impl Default for TimelineZoom {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Visible duration for a given scale.
///
/// At `scale >= 1` the whole content duration maps onto the (wider)
/// scrollable content; below 1 the viewport expands without an upper cap.
pub fn viewport_duration(content_duration: f64, scale: f64) -> f64 {
    if scale >= 1.0 || scale <= 0.0 {
        content_duration
    } else {
        content_duration / scale
    }
}
