//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReelforgeError, ReelforgeResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Editor defaults for new compositions.
    pub editor: EditorDefaults,

    /// Timeline zoom limits.
    pub timeline: TimelineDefaults,

    /// Render service settings.
    pub render: RenderConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Defaults applied when a composition is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Composition frame rate.
    pub fps: u32,

    /// Aspect ratio label (`"16:9"`, `"9:16"`, `"1:1"`, `"4:5"`).
    pub aspect_ratio: String,

    /// Duration reported for an empty composition, in frames.
    pub default_duration_frames: u32,
}

/// Timeline zoom limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,
    pub initial_scale: f64,
}

/// Render service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Base URL of the render service.
    pub endpoint: String,

    /// Composition identifier sent with every render request.
    pub composition_id: String,

    /// Delay between status polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// Overall job timeout measured from job creation, in seconds.
    pub timeout_secs: u64,

    /// Delay before the post-completion navigation callback, in milliseconds.
    pub navigate_delay_ms: u64,

    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelforge=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            fps: 30,
            aspect_ratio: "16:9".to_string(),
            default_duration_frames: 300,
        }
    }
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 10.0,
            zoom_step: 0.1,
            initial_scale: 1.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/latest/lambda".to_string(),
            composition_id: "TestComponent".to_string(),
            poll_interval_ms: 3_000,
            timeout_secs: 600,
            navigate_delay_ms: 1_000,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit file.
    pub fn load_from(path: impl AsRef<Path>) -> ReelforgeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReelforgeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ReelforgeResult<()> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }

    /// Reject values that would make the editor or poll loop misbehave.
    pub fn validate(&self) -> ReelforgeResult<()> {
        if self.editor.fps == 0 {
            return Err(ReelforgeError::config("editor.fps must be positive"));
        }
        if self.editor.default_duration_frames == 0 {
            return Err(ReelforgeError::config(
                "editor.default_duration_frames must be positive",
            ));
        }
        let t = &self.timeline;
        if !(t.min_scale > 0.0 && t.min_scale <= t.max_scale) {
            return Err(ReelforgeError::config(
                "timeline scale bounds must satisfy 0 < min_scale <= max_scale",
            ));
        }
        if self.render.poll_interval_ms == 0 {
            return Err(ReelforgeError::config(
                "render.poll_interval_ms must be positive",
            ));
        }
        if self.render.timeout_secs == 0 {
            return Err(ReelforgeError::config("render.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelforge").join("config.json")
}
