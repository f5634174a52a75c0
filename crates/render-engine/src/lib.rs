//! Reelforge Render Engine
//!
//! Hands a composition snapshot to an external renderer and follows the
//! job until it produces a media URL or fails.
//!
//! # Job flow
//!
//! ```text
//! Composition ──► RenderRequest ──submit──► renderer
//!                                              │ job id
//!                     ┌────── poll every 3s ◄──┘
//!                     ▼
//!             progress / succeeded / failed
//!                     │
//!                     ▼
//!               RenderState (watch channel) ──► observers
//! ```
//!
//! The renderer is reached through the [`RenderBackend`] trait;
//! [`HttpRenderBackend`] speaks JSON over HTTP.

pub mod backend;
pub mod orchestrator;
pub mod progress;
pub mod request;
pub mod response;

pub use backend::{HttpRenderBackend, RenderBackend, RenderError, RenderResult};
pub use orchestrator::*;
pub use progress::{normalize_progress, RenderProgress};
pub use request::{PollRequest, RenderInputProps, RenderRequest};
pub use response::{interpret_poll, JobStatus, PollOutcome};
