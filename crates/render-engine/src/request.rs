//! Wire types sent to the renderer.

use serde::{Deserialize, Serialize};

use reelforge_project_model::composition::Composition;

/// Job submission payload: `{ id, inputProps }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Composition identifier on the renderer side.
    pub id: String,
    pub input_props: RenderInputProps,
}

/// Composition snapshot plus the optional primary source URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInputProps {
    #[serde(flatten)]
    pub composition: Composition,
    #[serde(default)]
    pub src: String,
}

impl RenderRequest {
    pub fn new(id: impl Into<String>, composition: Composition) -> Self {
        Self {
            id: id.into(),
            input_props: RenderInputProps {
                composition,
                src: String::new(),
            },
        }
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.input_props.src = src.into();
        self
    }

    pub fn composition(&self) -> &Composition {
        &self.input_props.composition
    }
}

/// Status poll payload: `{ id: jobId }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRequest {
    pub id: String,
}

impl PollRequest {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { id: job_id.into() }
    }
}
