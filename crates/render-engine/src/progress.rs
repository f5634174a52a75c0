//! Progress normalization for renderer status payloads.
//!
//! Render services report progress in several shapes. They are checked in
//! a fixed order:
//!
//! 1. `progress` as a bare number on the 0–100 scale
//! 2. `progress` as an object carrying `percent`, `progress` or `value`
//!    (plus an optional `phase`/`stage`/`message` label)
//! 3. `progress` as a numeric string
//! 4. a top-level `progress_percent` number or numeric string
//!
//! The first shape that yields a finite number wins; the value is clamped
//! to `[0, 100]`.

use serde::Serialize;
use serde_json::{Map, Value};

const OBJECT_VALUE_KEYS: [&str; 3] = ["percent", "progress", "value"];
const PHASE_KEYS: [&str; 3] = ["phase", "stage", "message"];

/// Normalized progress report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderProgress {
    /// Completion in `[0.0, 1.0]`.
    pub fraction: f64,
    /// Human-readable phase, when the renderer reports one.
    pub phase: Option<String>,
}

impl RenderProgress {
    pub fn new(fraction: f64, phase: Option<String>) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { fraction, phase }
    }

    /// Build from a percentage on the 0–100 scale.
    pub fn from_percent(percent: f64, phase: Option<String>) -> Self {
        Self::new(percent / 100.0, phase)
    }

    /// Completion in `[0.0, 100.0]`.
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }

    pub fn complete() -> Self {
        Self::new(1.0, Some("complete".to_string()))
    }
}

/// Extract normalized progress from a status response.
///
/// Returns `None` when no recognised progress shape is present.
pub fn normalize_progress(response: &Value) -> Option<RenderProgress> {
    let body = response.as_object()?;
    let top_level_phase = phase_from(body);

    if let Some(progress) = body.get("progress") {
        let parsed = match progress {
            Value::Number(_) => progress
                .as_f64()
                .map(|p| RenderProgress::from_percent(p, top_level_phase.clone())),
            Value::Object(inner) => from_object(inner, top_level_phase.clone()),
            Value::String(text) => parse_numeric(text)
                .map(|p| RenderProgress::from_percent(p, top_level_phase.clone())),
            _ => None,
        };
        if parsed.is_some() {
            return parsed;
        }
    }

    body.get("progress_percent")
        .and_then(number_like)
        .map(|p| RenderProgress::from_percent(p, top_level_phase))
}

fn from_object(inner: &Map<String, Value>, fallback_phase: Option<String>) -> Option<RenderProgress> {
    let percent = OBJECT_VALUE_KEYS
        .iter()
        .find_map(|key| inner.get(*key).and_then(number_like))?;
    let phase = phase_from(inner).or(fallback_phase);
    Some(RenderProgress::from_percent(percent, phase))
}

fn phase_from(object: &Map<String, Value>) -> Option<String> {
    PHASE_KEYS.iter().find_map(|key| {
        object
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

fn parse_numeric(text: &str) -> Option<f64> {
    text.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
