//! Composition snapshots and the on-disk composition document.
//!
//! A [`Composition`] is transient: it is rebuilt from the current overlay
//! set whenever it is needed and is never stored on its own. The
//! [`CompositionDocument`] is the import/export file used by tooling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aspect::{AspectRatio, CanvasDimensions};
use crate::overlay::{validate_overlays, Overlay};

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Everything the renderer needs to draw one composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub overlays: Vec<Overlay>,
    pub duration_in_frames: u32,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

impl Composition {
    pub fn dimensions(&self) -> CanvasDimensions {
        CanvasDimensions::new(self.width, self.height)
    }
}

/// Composition file (`composition.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionDocument {
    /// Schema version.
    pub version: String,

    /// Human-readable composition name.
    pub name: String,

    /// Unique document identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Frame rate.
    pub fps: u32,

    /// Selected aspect ratio; overlay geometry is expressed in its canvas.
    pub aspect_ratio: AspectRatio,

    /// Overlays in canvas space.
    #[serde(default)]
    pub overlays: Vec<Overlay>,
}

impl CompositionDocument {
    /// Create an empty document.
    pub fn new(name: impl Into<String>, fps: u32, aspect_ratio: AspectRatio) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: DOCUMENT_VERSION.to_string(),
            name: name.into(),
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now.clone(),
            modified_at: now,
            fps,
            aspect_ratio,
            overlays: vec![],
        }
    }

    /// Canvas size implied by the aspect ratio.
    pub fn dimensions(&self) -> CanvasDimensions {
        self.aspect_ratio.dimensions()
    }

    /// Load a document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref().to_path_buf();

        let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::IoError {
            path: path.clone(),
            source: e,
        })?;

        let document: Self =
            serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        document.validate()?;
        Ok(document)
    }

    /// Save the document as pretty-printed JSON, creating parent directories.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        self.modified_at = chrono::Utc::now().to_rfc3339();
        let json = serde_json::to_string_pretty(self).map_err(|e| ProjectError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| ProjectError::IoError { path, source: e })
    }

    /// Create a new empty document on disk.
    pub fn create(
        path: impl AsRef<Path>,
        name: impl Into<String>,
        fps: u32,
        aspect_ratio: AspectRatio,
    ) -> Result<Self, ProjectError> {
        let mut document = Self::new(name, fps, aspect_ratio);
        document.save(path)?;
        Ok(document)
    }

    /// Check document-level invariants.
    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.fps == 0 {
            return Err(ProjectError::ValidationError {
                message: "fps must be positive".to_string(),
            });
        }
        validate_overlays(&self.overlays)
    }

    /// Media-backed sources that are local paths and do not exist,
    /// resolved relative to `root`.
    pub fn missing_local_sources(&self, root: impl AsRef<Path>) -> Vec<String> {
        let root = root.as_ref();
        self.overlays
            .iter()
            .filter_map(|o| o.kind.src())
            .filter(|src| !is_remote(src))
            .filter(|src| !root.join(src.trim_start_matches('/')).exists())
            .map(|src| src.to_string())
            .collect()
    }
}

fn is_remote(src: &str) -> bool {
    ["http://", "https://", "blob:", "data:"]
        .iter()
        .any(|scheme| src.starts_with(scheme))
}

/// Errors that can occur when working with compositions.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid composition: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{OverlayDraft, OverlayId, OverlayKind, VisualStyles};

    fn image(id: u64, src: &str) -> Overlay {
        OverlayDraft::new(
            OverlayKind::Image {
                src: src.to_string(),
                styles: VisualStyles::default(),
            },
            0,
            30,
        )
        .into_overlay(OverlayId(id))
    }

    #[test]
    fn test_document_creation() {
        let doc = CompositionDocument::new("Promo", 30, AspectRatio::Portrait);
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert_eq!(doc.dimensions(), CanvasDimensions::new(1080, 1920));
        assert!(doc.overlays.is_empty());
        assert_eq!(doc.id.len(), 36);
    }

    #[test]
    fn test_create_and_load_round_trip() {
        let dir = std::env::temp_dir().join("reelforge_test_document");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("composition.json");

        let mut created =
            CompositionDocument::create(&path, "Integration Test", 30, AspectRatio::Square)
                .unwrap();
        created.overlays.push(image(1, "https://cdn/a.png"));
        created.save(&path).unwrap();

        let loaded = CompositionDocument::load(&path).unwrap();
        assert_eq!(loaded.name, "Integration Test");
        assert_eq!(loaded.aspect_ratio, AspectRatio::Square);
        assert_eq!(loaded.overlays, created.overlays);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = std::env::temp_dir().join("reelforge_test_document_dupes");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("composition.json");

        let mut doc = CompositionDocument::new("Dupes", 30, AspectRatio::Landscape);
        doc.overlays = vec![image(1, "a.png"), image(1, "b.png")];
        doc.save(&path).unwrap();

        let err = CompositionDocument::load(&path).unwrap_err();
        assert!(matches!(err, ProjectError::ValidationError { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_local_sources_skips_remote() {
        let dir = std::env::temp_dir().join("reelforge_test_sources");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("present.png"), b"png").unwrap();

        let mut doc = CompositionDocument::new("Sources", 30, AspectRatio::Landscape);
        doc.overlays = vec![
            image(1, "https://cdn/remote.png"),
            image(2, "/present.png"),
            image(3, "missing.png"),
        ];

        assert_eq!(doc.missing_local_sources(&dir), vec!["missing.png"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_composition_serializes_camel_case() {
        let composition = Composition {
            overlays: vec![],
            duration_in_frames: 300,
            fps: 30,
            width: 1280,
            height: 720,
        };
        let json = serde_json::to_value(&composition).unwrap();
        assert_eq!(json["durationInFrames"], 300);
        assert_eq!(composition.dimensions(), CanvasDimensions::new(1280, 720));
    }
}
