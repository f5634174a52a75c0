//! Create a new composition file.

use std::path::PathBuf;

use tracing::info;

use reelforge_common::config::AppConfig;
use reelforge_project_model::{AspectRatio, CompositionDocument};

pub fn run(
    config: &AppConfig,
    name: String,
    output: PathBuf,
    fps: Option<u32>,
    aspect: Option<String>,
) -> anyhow::Result<()> {
    let fps = fps.unwrap_or(config.editor.fps);
    if fps == 0 {
        anyhow::bail!("fps must be positive");
    }
    let aspect = AspectRatio::parse(aspect.as_deref().unwrap_or(&config.editor.aspect_ratio));
    let path = output.join(format!("{name}.json"));
    println!("Creating composition '{}' at {}", name, path.display());

    let document = CompositionDocument::create(&path, &name, fps, aspect)
        .map_err(|e| anyhow::anyhow!("Failed to create composition: {e}"))?;

    let dims = document.dimensions();
    info!(id = %document.id, path = %path.display(), "Composition created");
    println!("Composition created successfully:");
    println!("  ID: {}", document.id);
    println!("  Aspect ratio: {} ({})", aspect, dims);
    println!("  FPS: {fps}");

    Ok(())
}
