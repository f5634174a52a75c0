//! Overlay types for the composition canvas.
//!
//! An overlay is one timed, positioned element of the composition. Time is
//! measured in integer frames relative to the composition start; geometry is
//! measured in canvas pixels at the composition's current resolution.
//!
//! Overlays serialize to the camelCase JSON shape the renderer consumes,
//! discriminated by a `type` tag.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::composition::ProjectError;

/// Opaque overlay identifier, unique within the active overlay set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single timed element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    /// Assigned at creation, never changes.
    pub id: OverlayId,

    /// Track index. Row 0 stacks above row 4.
    pub row: u32,

    /// Start frame relative to the composition start.
    pub from: u32,

    /// Length in frames, at least 1.
    pub duration_in_frames: u32,

    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,

    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,

    /// Type tag plus type-specific payload and styles.
    #[serde(flatten)]
    pub kind: OverlayKind,
}

/// Discriminated payload of an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayKind {
    Video {
        src: String,
        /// Poster/thumbnail reference.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Offset into the source media, in seconds.
        #[serde(default, rename = "videoStartTime")]
        video_start_time: f64,
        #[serde(default)]
        styles: VisualStyles,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        greenscreen: Option<GreenscreenConfig>,
    },
    Image {
        src: String,
        #[serde(default)]
        styles: VisualStyles,
    },
    Text {
        content: String,
        #[serde(default)]
        styles: TextStyles,
    },
    Caption {
        captions: Vec<Caption>,
        #[serde(default)]
        styles: CaptionStyles,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<String>,
    },
    Audio {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Offset into the source media, in frames.
        #[serde(default, rename = "startFromSound")]
        start_from_sound: u32,
        #[serde(default)]
        styles: AudioStyles,
    },
    Sticker {
        /// Sticker template identifier.
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        #[serde(default)]
        styles: VisualStyles,
    },
}

/// Visual properties shared by video, image and sticker overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualStyles {
    /// Opacity in `[0.0, 1.0]`.
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationKeys>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
}

impl Default for VisualStyles {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            filter: None,
            transform: None,
            border_radius: None,
            box_shadow: None,
            object_fit: None,
            animation: None,
            crop: None,
        }
    }
}

/// Enter/exit animation template keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,
}

/// Crop rectangle in percent of the source media.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Chroma-key settings for video overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GreenscreenConfig {
    pub enabled: bool,
    /// Key color as hex string.
    pub key_color: String,
    /// Color distance below which pixels are removed, `[0.0, 1.0]`.
    pub threshold: f64,
    pub smoothing: f64,
    pub spill: f64,
}

impl Default for GreenscreenConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key_color: "#00ff00".to_string(),
            threshold: 0.4,
            smoothing: 0.1,
            spill: 0.0,
        }
    }
}

/// Font and layout styles for text overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyles {
    pub font_size: String,
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub text_align: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<String>,
    #[serde(flatten)]
    pub visual: VisualStyles,
}

impl Default for TextStyles {
    fn default() -> Self {
        Self {
            font_size: "3rem".to_string(),
            font_family: "Inter".to_string(),
            font_weight: "700".to_string(),
            color: "#ffffff".to_string(),
            background_color: None,
            text_align: "center".to_string(),
            line_height: None,
            letter_spacing: None,
            text_shadow: None,
            visual: VisualStyles::default(),
        }
    }
}

/// Styles for caption overlays, including the active-word highlight.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptionStyles {
    #[serde(flatten)]
    pub text: TextStyles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_style: Option<HighlightStyle>,
}

/// Emphasis applied to the word currently being spoken.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
}

/// One caption line with word timings (milliseconds, relative to the overlay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    #[serde(default)]
    pub words: Vec<CaptionWord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionWord {
    pub word: String,
    pub start_ms: u64,
    pub end_ms: u64,
    #[serde(default)]
    pub confidence: f64,
}

/// Volume and fade settings for audio overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioStyles {
    /// Linear gain in `[0.0, 1.0]`.
    pub volume: f64,
    /// Fade-in length in seconds.
    pub fade_in: f64,
    /// Fade-out length in seconds.
    pub fade_out: f64,
}

impl Default for AudioStyles {
    fn default() -> Self {
        Self {
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }
}

impl Overlay {
    /// Stacking order derived from the row: `100 - row * 10`.
    pub fn z_index(&self) -> i64 {
        100 - i64::from(self.row) * 10
    }

    /// First frame after this overlay ends.
    pub fn end_frame(&self) -> u32 {
        self.from.saturating_add(self.duration_in_frames)
    }

    /// Whether `frame` falls within `[from, end)`.
    pub fn is_active_at(&self, frame: u32) -> bool {
        frame >= self.from && frame < self.end_frame()
    }

    /// Same row and intersecting frame ranges.
    pub fn overlaps(&self, other: &Overlay) -> bool {
        self.row == other.row && self.from < other.end_frame() && other.from < self.end_frame()
    }

    /// The `type` tag of this overlay.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

impl OverlayKind {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayKind::Video { .. } => "video",
            OverlayKind::Image { .. } => "image",
            OverlayKind::Text { .. } => "text",
            OverlayKind::Caption { .. } => "caption",
            OverlayKind::Audio { .. } => "audio",
            OverlayKind::Sticker { .. } => "sticker",
        }
    }

    /// Whether two payloads carry the same `type` tag.
    pub fn same_type(&self, other: &OverlayKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Source URI for media-backed overlays.
    pub fn src(&self) -> Option<&str> {
        match self {
            OverlayKind::Video { src, .. }
            | OverlayKind::Image { src, .. }
            | OverlayKind::Audio { src, .. } => Some(src),
            _ => None,
        }
    }
}

/// An overlay that has not been assigned an id yet.
///
/// The owner of the overlay set mints ids; callers describe everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDraft {
    pub row: u32,
    pub from: u32,
    pub duration_in_frames: u32,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub kind: OverlayKind,
}

impl OverlayDraft {
    /// Draft at the canvas origin with the given timing.
    pub fn new(kind: OverlayKind, from: u32, duration_in_frames: u32) -> Self {
        Self {
            row: 0,
            from,
            duration_in_frames,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            kind,
        }
    }

    pub fn on_row(mut self, row: u32) -> Self {
        self.row = row;
        self
    }

    pub fn with_geometry(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.left = left;
        self.top = top;
        self.width = width;
        self.height = height;
        self
    }

    pub fn into_overlay(self, id: OverlayId) -> Overlay {
        Overlay {
            id,
            row: self.row,
            from: self.from,
            duration_in_frames: self.duration_in_frames,
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            kind: self.kind,
        }
    }
}

/// Check per-overlay timing invariants and id uniqueness.
pub fn validate_overlays(overlays: &[Overlay]) -> Result<(), ProjectError> {
    let mut seen = HashSet::with_capacity(overlays.len());
    for overlay in overlays {
        if overlay.duration_in_frames == 0 {
            return Err(ProjectError::ValidationError {
                message: format!("overlay {} has zero duration", overlay.id),
            });
        }
        if !seen.insert(overlay.id) {
            return Err(ProjectError::ValidationError {
                message: format!("duplicate overlay id {}", overlay.id),
            });
        }
    }
    Ok(())
}
