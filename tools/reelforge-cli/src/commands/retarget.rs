//! Rescale a composition to another aspect ratio.

use std::path::PathBuf;

use tracing::info;

use reelforge_editor::EditorState;
use reelforge_project_model::CompositionDocument;

pub fn run(path: PathBuf, aspect: String, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut document = CompositionDocument::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;
    let mut editor = EditorState::from_document(&document)?;
    let before = editor.dimensions();

    editor.set_aspect_ratio(&aspect);
    println!(
        "Retargeting '{}': {} ({}) -> {} ({})",
        document.name,
        document.aspect_ratio,
        before,
        editor.aspect_ratio(),
        editor.dimensions()
    );

    info!(
        from = %before,
        to = %editor.dimensions(),
        overlays = editor.overlays().len(),
        "Retargeted composition"
    );
    document.aspect_ratio = editor.aspect_ratio();
    document.overlays = editor.overlays().to_vec();

    let output = output.unwrap_or(path);
    document
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to save composition: {e}"))?;
    println!("  {} overlay(s) written to {}", document.overlays.len(), output.display());

    Ok(())
}
