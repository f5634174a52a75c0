//! Render orchestrator behaviour against a scripted in-memory renderer.
//!
//! All tests run on paused tokio time, so multi-minute poll schedules
//! finish instantly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::watch;
use tokio::time::Instant;

use reelforge_project_model::composition::Composition;
use reelforge_render_engine::{
    FailureKind, RenderBackend, RenderError, RenderObserver, RenderOrchestrator, RenderProgress,
    RenderRequest, RenderResult, RenderSettings, RenderState, RenderStatus,
};

struct ScriptedBackend {
    submit_response: Mutex<Option<RenderResult<Value>>>,
    submit_delay: Duration,
    polls: Mutex<VecDeque<RenderResult<Value>>>,
    /// Returned once the poll script runs out.
    idle_poll: Value,
    submit_calls: AtomicUsize,
    poll_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(submit: RenderResult<Value>, polls: Vec<RenderResult<Value>>) -> Self {
        Self {
            submit_response: Mutex::new(Some(submit)),
            submit_delay: Duration::ZERO,
            polls: Mutex::new(polls.into()),
            idle_poll: json!({ "status": "processing" }),
            submit_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
        }
    }

    fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    fn polls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderBackend for ScriptedBackend {
    async fn submit(&self, _request: &RenderRequest) -> RenderResult<Value> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        self.submit_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(json!({ "job_id": "again" })))
    }

    async fn poll(&self, _job_id: &str) -> RenderResult<Value> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.idle_poll.clone()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
struct RecordingObserver {
    started: Mutex<Vec<String>>,
    /// (reported percent, state percent visible at callback time)
    progress: Mutex<Vec<(f64, f64)>>,
    completed: Mutex<Vec<Option<String>>>,
    navigated: Mutex<Vec<Option<String>>>,
    state: OnceLock<watch::Receiver<RenderState>>,
}

impl RenderObserver for RecordingObserver {
    fn on_render_start(&self, job_id: &str) {
        self.started.lock().unwrap().push(job_id.to_string());
    }

    fn on_render_progress(&self, progress: &RenderProgress) {
        let visible = self
            .state
            .get()
            .map(|rx| rx.borrow().progress_percent)
            .unwrap_or(-1.0);
        self.progress
            .lock()
            .unwrap()
            .push((progress.percent(), visible));
    }

    fn on_render_complete(&self, url: Option<&str>) {
        self.completed.lock().unwrap().push(url.map(str::to_string));
    }

    fn on_navigate(&self, url: Option<&str>) {
        self.navigated.lock().unwrap().push(url.map(str::to_string));
    }
}

fn request() -> RenderRequest {
    RenderRequest::new(
        "TestComponent",
        Composition {
            overlays: vec![],
            duration_in_frames: 300,
            fps: 30,
            width: 1280,
            height: 720,
        },
    )
}

fn orchestrator(
    backend: &Arc<ScriptedBackend>,
) -> (Arc<RenderOrchestrator>, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let orchestrator = RenderOrchestrator::new(backend.clone(), RenderSettings::default())
        .with_observer(observer.clone());
    let _ = observer.state.set(orchestrator.subscribe());
    (Arc::new(orchestrator), observer)
}

#[tokio::test(start_paused = true)]
async fn second_render_while_invoking_is_ignored() {
    let backend = Arc::new(
        ScriptedBackend::new(
            Ok(json!({ "job_id": "job-1" })),
            vec![Ok(json!({ "status": "succeeded", "url": "https://cdn/out.mp4" }))],
        )
        .with_submit_delay(Duration::from_secs(2)),
    );
    let (orchestrator, _) = orchestrator(&backend);
    let mut states = orchestrator.subscribe();

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.render(&request()).await }
    });
    states
        .wait_for(|s| s.status == RenderStatus::Invoking)
        .await
        .unwrap();

    let second = orchestrator.render(&request()).await;
    assert_eq!(second.status, RenderStatus::Invoking);
    assert_eq!(backend.submits(), 1);

    let done = first.await.unwrap();
    assert_eq!(done.status, RenderStatus::Done);
    assert_eq!(backend.submits(), 1);
}

#[tokio::test(start_paused = true)]
async fn render_while_rendering_is_ignored() {
    let backend = Arc::new(ScriptedBackend::new(Ok(json!({ "renderId": 42 })), vec![]));
    let (orchestrator, _) = orchestrator(&backend);
    let mut states = orchestrator.subscribe();

    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.render(&request()).await }
    });
    states
        .wait_for(|s| s.status == RenderStatus::Rendering)
        .await
        .unwrap();
    assert_eq!(orchestrator.state().job_id.as_deref(), Some("42"));

    let ignored = orchestrator.render(&request()).await;
    assert_eq!(ignored.status, RenderStatus::Rendering);
    assert_eq!(backend.submits(), 1);

    orchestrator.undo();
    running.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn succeeded_job_records_url_and_completes_once() {
    let backend = Arc::new(ScriptedBackend::new(
        Ok(json!({ "job_id": "job-7" })),
        vec![
            Ok(json!({ "status": "processing", "progress": 25 })),
            Ok(json!({ "status": "processing", "progress": { "percent": 60, "phase": "encoding" } })),
            Ok(json!({ "status": "completed", "video_url": "https://cdn/final.mp4" })),
        ],
    ));
    let (orchestrator, observer) = orchestrator(&backend);
    let started = Instant::now();

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Done);
    assert_eq!(state.url.as_deref(), Some("https://cdn/final.mp4"));
    assert_eq!(state.progress_percent, 100.0);
    assert!(state.error.is_none());
    assert_eq!(backend.polls(), 3);
    // Polls at 0s, 3s and 6s.
    assert_eq!(started.elapsed(), Duration::from_secs(6));

    assert_eq!(*observer.started.lock().unwrap(), vec!["job-7".to_string()]);
    assert_eq!(
        *observer.completed.lock().unwrap(),
        vec![Some("https://cdn/final.mp4".to_string())]
    );

    let progress = observer.progress.lock().unwrap().clone();
    let reported: Vec<f64> = progress.iter().map(|(p, _)| *p).collect();
    assert_eq!(reported, vec![25.0, 60.0, 100.0]);
    // Each callback ran before its state was published.
    for (reported, visible) in progress {
        assert!(visible < reported);
    }
}

#[tokio::test(start_paused = true)]
async fn navigation_fires_once_after_delay() {
    let backend = Arc::new(ScriptedBackend::new(
        Ok(json!({ "job_id": "job-8" })),
        vec![Ok(json!({ "status": "success", "resultUrl": "https://cdn/n.mp4" }))],
    ));
    let (orchestrator, observer) = orchestrator(&backend);

    orchestrator.render(&request()).await;
    assert!(observer.navigated.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(observer.navigated.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        *observer.navigated.lock().unwrap(),
        vec![Some("https://cdn/n.mp4".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_status_surfaces_server_message() {
    let backend = Arc::new(ScriptedBackend::new(
        Ok(json!({ "job_id": "job-2" })),
        vec![
            Ok(json!({ "status": "processing", "progress": 10 })),
            Ok(json!({ "status": "failed", "error": "boom" })),
        ],
    ));
    let (orchestrator, observer) = orchestrator(&backend);

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Error);
    let failure = state.error.unwrap();
    assert_eq!(failure.kind, FailureKind::JobFailed);
    assert_eq!(failure.message, "boom");
    assert!(state.url.is_none());
    assert_eq!(backend.polls(), 2);
    assert!(observer.completed.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn job_that_never_finishes_times_out_after_ten_minutes() {
    let backend = Arc::new(ScriptedBackend::new(Ok(json!({ "job_id": "slow" })), vec![]));
    let (orchestrator, _) = orchestrator(&backend);
    let started = Instant::now();

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Error);
    let failure = state.error.unwrap();
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(failure.message.contains("timed out"));
    assert_eq!(started.elapsed(), Duration::from_secs(600));
    // One poll at t=0 and one every 3s before the deadline.
    assert_eq!(backend.polls(), 200);

    let polls = backend.polls();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.polls(), polls);
}

#[tokio::test(start_paused = true)]
async fn hung_submit_times_out_and_releases_the_guard() {
    let backend = Arc::new(
        ScriptedBackend::new(Ok(json!({ "job_id": "late" })), vec![])
            .with_submit_delay(Duration::from_secs(3600)),
    );
    let (orchestrator, observer) = orchestrator(&backend);
    let started = Instant::now();

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Error);
    assert_eq!(state.error.unwrap().kind, FailureKind::Timeout);
    assert_eq!(started.elapsed(), Duration::from_secs(600));
    assert_eq!(backend.polls(), 0);
    assert!(observer.started.lock().unwrap().is_empty());

    // An errored job no longer blocks a new submission.
    let mut states = orchestrator.subscribe();
    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.render(&request()).await }
    });
    states
        .wait_for(|s| s.status == RenderStatus::Invoking)
        .await
        .unwrap();
    assert_eq!(backend.submits(), 2);

    orchestrator.undo();
    running.abort();
}

#[tokio::test(start_paused = true)]
async fn transient_poll_errors_are_retried() {
    let backend = Arc::new(ScriptedBackend::new(
        Ok(json!({ "_jobId": "job-3" })),
        vec![
            Err(RenderError::Transport("connection reset".to_string())),
            Err(RenderError::Parse("expected value".to_string())),
            Err(RenderError::Http {
                status: 503,
                body: "busy".to_string(),
            }),
            Ok(json!({ "status": "succeeded", "url": "https://cdn/r.mp4" })),
        ],
    ));
    let (orchestrator, _) = orchestrator(&backend);
    let started = Instant::now();

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Done);
    assert_eq!(state.url.as_deref(), Some("https://cdn/r.mp4"));
    assert_eq!(backend.polls(), 4);
    assert_eq!(started.elapsed(), Duration::from_secs(9));
}

#[tokio::test(start_paused = true)]
async fn rejected_poll_is_terminal() {
    let backend = Arc::new(ScriptedBackend::new(
        Ok(json!({ "job_id": "job-4" })),
        vec![Err(RenderError::Http {
            status: 404,
            body: "unknown job".to_string(),
        })],
    ));
    let (orchestrator, _) = orchestrator(&backend);

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Error);
    assert_eq!(state.error.unwrap().kind, FailureKind::Rejected);
    assert_eq!(backend.polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_job_id_is_an_error_without_polling() {
    let backend = Arc::new(ScriptedBackend::new(Ok(json!({ "accepted": true })), vec![]));
    let (orchestrator, observer) = orchestrator(&backend);

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Error);
    assert_eq!(state.error.unwrap().kind, FailureKind::MissingJobId);
    assert_eq!(backend.polls(), 0);
    assert!(observer.started.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn submit_failure_is_not_retried() {
    let backend = Arc::new(ScriptedBackend::new(
        Err(RenderError::Transport("dns failure".to_string())),
        vec![],
    ));
    let (orchestrator, _) = orchestrator(&backend);

    let state = orchestrator.render(&request()).await;

    assert_eq!(state.status, RenderStatus::Error);
    let failure = state.error.unwrap();
    assert_eq!(failure.kind, FailureKind::Submit);
    assert!(failure.message.contains("dns failure"));
    assert_eq!(backend.submits(), 1);
    assert_eq!(backend.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn undo_resets_and_stops_the_loop() {
    let backend = Arc::new(ScriptedBackend::new(Ok(json!({ "job_id": "job-5" })), vec![]));
    let (orchestrator, _) = orchestrator(&backend);
    let mut states = orchestrator.subscribe();

    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.render(&request()).await }
    });
    states
        .wait_for(|s| s.status == RenderStatus::Rendering)
        .await
        .unwrap();

    orchestrator.undo();
    assert_eq!(orchestrator.state(), RenderState::default());

    let returned = running.await.unwrap();
    assert_eq!(returned.status, RenderStatus::Init);

    let polls = backend.polls();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(backend.polls(), polls);
    assert_eq!(orchestrator.state().status, RenderStatus::Init);
}

#[tokio::test(start_paused = true)]
async fn undo_after_error_allows_a_new_job() {
    let backend = Arc::new(ScriptedBackend::new(Ok(json!({ "nope": 1 })), vec![]));
    let (orchestrator, _) = orchestrator(&backend);

    let state = orchestrator.render(&request()).await;
    assert_eq!(state.status, RenderStatus::Error);
    // Terminal states are left alone until reset.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(orchestrator.state().status, RenderStatus::Error);

    orchestrator.undo();
    let mut states = orchestrator.subscribe();
    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.render(&request()).await }
    });
    states
        .wait_for(|s| s.status == RenderStatus::Rendering)
        .await
        .unwrap();
    assert_eq!(backend.submits(), 2);
    assert_eq!(orchestrator.state().job_id.as_deref(), Some("again"));

    orchestrator.undo();
    running.await.unwrap();
}
