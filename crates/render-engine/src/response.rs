//! Interpretation of renderer submission and status responses.
//!
//! Responses are duck-typed JSON; field names vary between render services,
//! so every accessor checks a fixed list of aliases in order.

use serde_json::Value;

use crate::progress::{normalize_progress, RenderProgress};

const JOB_ID_KEYS: [&str; 3] = ["job_id", "renderId", "_jobId"];
const STATUS_KEYS: [&str; 2] = ["status", "job_status"];
const RESULT_URL_KEYS: [&str; 4] = ["url", "video_url", "result_url", "resultUrl"];

/// Fallback message for a failed job that carried no explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Render failed";

/// Status of a render job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    /// Any non-terminal status other than `queued`, including a missing one.
    Processing,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" => JobStatus::Queued,
            "succeeded" | "completed" | "success" => JobStatus::Succeeded,
            "failed" | "error" => JobStatus::Failed,
            _ => JobStatus::Processing,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// What a single status poll tells the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Job still running; progress is present when the service reported it.
    Pending {
        status: JobStatus,
        progress: Option<RenderProgress>,
    },
    /// Job finished; the result URL may be missing on non-conforming services.
    Succeeded { url: Option<String> },
    /// Job failed with the server's message or a generic fallback.
    Failed { message: String },
}

/// Job identifier from a submission response (string or number).
pub fn extract_job_id(response: &Value) -> Option<String> {
    let body = response.as_object()?;
    JOB_ID_KEYS.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Status label from a poll response.
pub fn extract_status(response: &Value) -> JobStatus {
    response
        .as_object()
        .and_then(|body| {
            STATUS_KEYS
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str))
        })
        .map(JobStatus::parse)
        .unwrap_or(JobStatus::Processing)
}

/// Result URL from a successful poll response.
pub fn extract_result_url(response: &Value) -> Option<String> {
    let body = response.as_object()?;
    RESULT_URL_KEYS.iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Server-provided failure message: `error` as a string or `{message}`,
/// else a top-level `message`.
pub fn extract_error_message(response: &Value) -> Option<String> {
    let body = response.as_object()?;
    let from_error = match body.get("error") {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Object(inner)) => inner.get("message").and_then(Value::as_str),
        _ => None,
    };
    from_error
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Classify a status poll response.
pub fn interpret_poll(response: &Value) -> PollOutcome {
    match extract_status(response) {
        JobStatus::Succeeded => PollOutcome::Succeeded {
            url: extract_result_url(response),
        },
        JobStatus::Failed => PollOutcome::Failed {
            message: extract_error_message(response)
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        },
        status => PollOutcome::Pending {
            status,
            progress: normalize_progress(response),
        },
    }
}
