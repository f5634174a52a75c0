//! Aspect ratios and the canvas dimensions they map to.
//!
//! Canvas width/height are a pure function of the selected aspect ratio.
//! Labels may use either colon (`"9:16"`) or underscore (`"9_16"`) form;
//! anything outside the table resolves to the default 1920×1080 canvas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Relative tolerance under which two canvases count as the same size.
pub const DIMENSION_TOLERANCE: f64 = 0.01;

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasDimensions {
    pub width: u32,
    pub height: u32,
}

impl CanvasDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Equal within [`DIMENSION_TOLERANCE`] on both axes.
    pub fn approx_eq(&self, other: &CanvasDimensions) -> bool {
        within_tolerance(self.width, other.width) && within_tolerance(self.height, other.height)
    }

    /// Width divided by height (0 for a zero-height canvas).
    pub fn ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for CanvasDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn within_tolerance(a: u32, b: u32) -> bool {
    let largest = a.max(b);
    if largest == 0 {
        return true;
    }
    (a as f64 - b as f64).abs() / largest as f64 <= DIMENSION_TOLERANCE
}

/// Supported canvas aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Feed,
    /// Fallback for labels outside the table.
    #[default]
    #[serde(rename = "default")]
    Default,
}

impl AspectRatio {
    /// Resolve a label. Underscores are normalized to colons first;
    /// unknown labels resolve to [`AspectRatio::Default`].
    pub fn parse(label: &str) -> Self {
        match label.trim().replace('_', ":").as_str() {
            "16:9" => AspectRatio::Landscape,
            "9:16" => AspectRatio::Portrait,
            "1:1" => AspectRatio::Square,
            "4:5" => AspectRatio::Feed,
            _ => AspectRatio::Default,
        }
    }

    /// Canvas size for this ratio.
    pub fn dimensions(self) -> CanvasDimensions {
        match self {
            AspectRatio::Portrait => CanvasDimensions::new(1080, 1920),
            AspectRatio::Feed => CanvasDimensions::new(1080, 1350),
            AspectRatio::Square => CanvasDimensions::new(1080, 1080),
            AspectRatio::Landscape => CanvasDimensions::new(1280, 720),
            AspectRatio::Default => CanvasDimensions::new(1920, 1080),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Feed => "4:5",
            AspectRatio::Default => "default",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AspectRatio::parse(s))
    }
}

impl<'de> Deserialize<'de> for AspectRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(AspectRatio::parse(&label))
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canvas size for an aspect-ratio label.
pub fn canvas_dimensions(label: &str) -> CanvasDimensions {
    AspectRatio::parse(label).dimensions()
}
