//! Render job orchestration.
//!
//! One orchestrator drives at most one render job at a time:
//!
//! ```text
//! init ──render()──► invoking ──job id──► rendering ──succeeded──► done
//!                        │                    │
//!                        └──────────┬─────────┘ failed / timeout / rejected
//!                                   ▼
//!                                 error
//! ```
//!
//! `undo()` moves any state back to `init`. State snapshots are published
//! through a `tokio::sync::watch` channel; every write goes through the
//! channel lock together with a generation check, so a loop superseded by
//! `undo()` can never overwrite newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use reelforge_common::config::RenderConfig;

use crate::backend::{RenderBackend, RenderError};
use crate::progress::RenderProgress;
use crate::request::RenderRequest;
use crate::response::{extract_job_id, interpret_poll, PollOutcome};

/// Timing knobs for a render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub poll_interval: Duration,
    /// Overall budget measured from job creation.
    pub timeout: Duration,
    /// Delay between completion and the navigation callback.
    pub navigate_delay: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(10 * 60),
            navigate_delay: Duration::from_secs(1),
        }
    }
}

impl From<&RenderConfig> for RenderSettings {
    fn from(config: &RenderConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            timeout: Duration::from_secs(config.timeout_secs),
            navigate_delay: Duration::from_millis(config.navigate_delay_ms),
        }
    }
}

/// Lifecycle status of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStatus {
    #[default]
    Init,
    Invoking,
    Rendering,
    Done,
    Error,
}

impl RenderStatus {
    /// A job is in flight.
    pub fn is_active(self) -> bool {
        matches!(self, RenderStatus::Invoking | RenderStatus::Rendering)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RenderStatus::Done | RenderStatus::Error)
    }
}

/// Why a job ended in `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The submission request itself failed.
    Submit,
    MissingJobId,
    /// The renderer reported the job as failed.
    JobFailed,
    /// A status poll was refused with a non-retryable response.
    Rejected,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Snapshot of the orchestrator state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderState {
    pub status: RenderStatus,
    pub job_id: Option<String>,
    /// Last reported progress on the 0–100 scale.
    pub progress_percent: f64,
    pub phase: Option<String>,
    /// Result media URL once `done`.
    pub url: Option<String>,
    pub error: Option<RenderFailure>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Callbacks fired as a job advances. All methods default to no-ops.
///
/// Progress is reported before the matching state is published.
pub trait RenderObserver: Send + Sync {
    fn on_render_start(&self, _job_id: &str) {}

    fn on_render_progress(&self, _progress: &RenderProgress) {}

    /// Fired once per successful job.
    fn on_render_complete(&self, _url: Option<&str>) {}

    /// Fired once per successful job, `navigate_delay` after completion.
    fn on_navigate(&self, _url: Option<&str>) {}
}

struct NoopObserver;

impl RenderObserver for NoopObserver {}

/// Drives render jobs against a [`RenderBackend`].
pub struct RenderOrchestrator {
    backend: Arc<dyn RenderBackend>,
    observer: Arc<dyn RenderObserver>,
    settings: RenderSettings,
    state: watch::Sender<RenderState>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for RenderOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOrchestrator")
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl RenderOrchestrator {
    pub fn new(backend: Arc<dyn RenderBackend>, settings: RenderSettings) -> Self {
        let (state, _) = watch::channel(RenderState::default());
        Self {
            backend,
            observer: Arc::new(NoopObserver),
            settings,
            state,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RenderObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Current state snapshot.
    pub fn state(&self) -> RenderState {
        self.state.borrow().clone()
    }

    /// Receive every published state transition.
    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.state.subscribe()
    }

    /// Reset to `init`. Any loop still running for the previous job stops
    /// at its next step without publishing anything.
    pub fn undo(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = RenderState::default();
        });
        info!("Render state reset");
    }

    /// Run a render job to completion and return the final state.
    ///
    /// Calling this while a job is `invoking` or `rendering` does nothing
    /// and returns the current state. Failures are recorded in the state,
    /// never returned as errors.
    pub async fn render(&self, request: &RenderRequest) -> RenderState {
        let started = Instant::now();
        let submitted_at = Utc::now();

        let mut generation = 0;
        let claimed = self.state.send_if_modified(|state| {
            if state.status.is_active() {
                return false;
            }
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = RenderState {
                status: RenderStatus::Invoking,
                submitted_at: Some(submitted_at),
                ..RenderState::default()
            };
            true
        });
        if !claimed {
            debug!("Render already in progress; ignoring request");
            return self.state();
        }

        info!(
            backend = self.backend.name(),
            composition = %request.id,
            overlays = request.composition().overlays.len(),
            frames = request.composition().duration_in_frames,
            "Submitting render job"
        );

        let deadline = started + self.settings.timeout;
        let response = match tokio::time::timeout_at(deadline, self.backend.submit(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return self.fail(generation, FailureKind::Submit, e.to_string());
            }
            Err(_) => return self.time_out(generation),
        };

        let Some(job_id) = extract_job_id(&response) else {
            return self.fail(
                generation,
                FailureKind::MissingJobId,
                RenderError::MissingJobId.to_string(),
            );
        };

        if !self.is_current(generation) {
            return self.state();
        }
        self.observer.on_render_start(&job_id);
        self.commit(generation, |state| {
            state.status = RenderStatus::Rendering;
            state.job_id = Some(job_id.clone());
        });
        info!(job_id = %job_id, "Render job started");

        self.poll_until_settled(generation, &job_id, deadline).await
    }

    async fn poll_until_settled(
        &self,
        generation: u64,
        job_id: &str,
        deadline: Instant,
    ) -> RenderState {
        loop {
            if !self.is_current(generation) {
                debug!(job_id, "Render loop superseded");
                return self.state();
            }
            if Instant::now() >= deadline {
                return self.time_out(generation);
            }

            let polled = match tokio::time::timeout_at(deadline, self.backend.poll(job_id)).await
            {
                Ok(polled) => polled,
                Err(_) => return self.time_out(generation),
            };

            match polled {
                Ok(response) => match interpret_poll(&response) {
                    PollOutcome::Pending { status, progress } => {
                        debug!(job_id, ?status, "Render pending");
                        if let Some(progress) = progress {
                            self.report_progress(generation, progress);
                        }
                    }
                    PollOutcome::Succeeded { url } => {
                        return self.complete(generation, url);
                    }
                    PollOutcome::Failed { message } => {
                        return self.fail(generation, FailureKind::JobFailed, message);
                    }
                },
                Err(e) if e.is_transient() => {
                    warn!(job_id, error = %e, "Render poll failed; retrying");
                }
                Err(e) => {
                    return self.fail(generation, FailureKind::Rejected, e.to_string());
                }
            }

            let next = (Instant::now() + self.settings.poll_interval).min(deadline);
            tokio::time::sleep_until(next).await;
        }
    }

    fn report_progress(&self, generation: u64, progress: RenderProgress) {
        if !self.is_current(generation) {
            return;
        }
        self.observer.on_render_progress(&progress);
        self.commit(generation, |state| {
            state.progress_percent = progress.percent();
            state.phase = progress.phase.clone();
        });
    }

    fn complete(&self, generation: u64, url: Option<String>) -> RenderState {
        if !self.is_current(generation) {
            return self.state();
        }
        let progress = RenderProgress::complete();
        self.observer.on_render_progress(&progress);
        let committed = self.commit(generation, |state| {
            state.status = RenderStatus::Done;
            state.progress_percent = progress.percent();
            state.phase = progress.phase.clone();
            state.url = url.clone();
        });
        if !committed {
            return self.state();
        }

        info!(url = url.as_deref().unwrap_or("<none>"), "Render job finished");
        self.observer.on_render_complete(url.as_deref());
        self.schedule_navigation(generation, url);
        self.state()
    }

    fn schedule_navigation(&self, generation: u64, url: Option<String>) {
        let observer = Arc::clone(&self.observer);
        let current = Arc::clone(&self.generation);
        let delay = self.settings.navigate_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                observer.on_navigate(url.as_deref());
            }
        });
    }

    fn time_out(&self, generation: u64) -> RenderState {
        let secs = self.settings.timeout.as_secs();
        self.fail(
            generation,
            FailureKind::Timeout,
            RenderError::Timeout { secs }.to_string(),
        )
    }

    fn fail(&self, generation: u64, kind: FailureKind, message: String) -> RenderState {
        let committed = self.commit(generation, |state| {
            state.status = RenderStatus::Error;
            state.error = Some(RenderFailure {
                kind,
                message: message.clone(),
            });
        });
        if committed {
            warn!(?kind, error = %message, "Render job failed");
        }
        self.state()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Apply `update` if `generation` is still the live job.
    fn commit(&self, generation: u64, update: impl FnOnce(&mut RenderState)) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            update(state);
            true
        })
    }
}
