//! Render a composition through the configured render service.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use reelforge_common::config::AppConfig;
use reelforge_editor::EditorState;
use reelforge_project_model::CompositionDocument;
use reelforge_render_engine::{
    HttpRenderBackend, RenderObserver, RenderOrchestrator, RenderProgress, RenderSettings,
    RenderStatus,
};

/// Prints progress on a single terminal line.
struct ConsoleObserver;

impl RenderObserver for ConsoleObserver {
    fn on_render_start(&self, job_id: &str) {
        println!("  Job: {job_id}");
    }

    fn on_render_progress(&self, progress: &RenderProgress) {
        print!(
            "\r  Progress: {:.1}% {}  ",
            progress.percent(),
            progress.phase.as_deref().unwrap_or("")
        );
        std::io::stdout().flush().ok();
    }
}

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    endpoint: Option<String>,
    composition_id: Option<String>,
    src: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    println!("Rendering composition at: {}", path.display());

    let document = CompositionDocument::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;
    let editor = EditorState::from_document(&document)?;

    let mut render_config = config.render.clone();
    if let Some(endpoint) = endpoint {
        render_config.endpoint = endpoint;
    }
    let composition_id = composition_id.unwrap_or_else(|| render_config.composition_id.clone());
    let request = editor.render_request(&composition_id, src.as_deref());

    println!("  Endpoint: {}", render_config.endpoint);
    println!(
        "  Canvas: {} @ {}fps, {} frames",
        editor.dimensions(),
        editor.fps(),
        editor.duration().duration_in_frames
    );

    let backend = HttpRenderBackend::from_config(&render_config)?;
    let orchestrator =
        RenderOrchestrator::new(Arc::new(backend), RenderSettings::from(&render_config))
            .with_observer(Arc::new(ConsoleObserver));

    info!(
        endpoint = %render_config.endpoint,
        composition = %composition_id,
        overlays = editor.overlays().len(),
        "Render requested"
    );
    let state = orchestrator.render(&request).await;
    println!();

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    match state.status {
        RenderStatus::Done => {
            info!(url = state.url.as_deref().unwrap_or("<none>"), "Render command finished");
            println!(
                "Render complete: {}",
                state.url.as_deref().unwrap_or("(no URL returned)")
            );
            Ok(())
        }
        _ => {
            let message = state
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "render did not finish".to_string());
            warn!(status = ?state.status, error = %message, "Render command failed");
            anyhow::bail!("Render failed: {message}")
        }
    }
}
