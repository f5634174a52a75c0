//! Show composition information.

use std::path::PathBuf;

use reelforge_editor::EditorState;
use reelforge_project_model::CompositionDocument;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let document = CompositionDocument::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;
    let editor = EditorState::from_document(&document)?;
    let duration = editor.duration();

    println!("Composition: {}", document.name);
    println!("  ID: {}", document.id);
    println!("  Created: {}", document.created_at);
    println!("  Modified: {}", document.modified_at);
    println!();

    println!("Canvas:");
    println!(
        "  {} ({}) @ {}fps",
        document.aspect_ratio,
        editor.dimensions(),
        document.fps
    );
    println!(
        "  Duration: {} frames ({:.2}s)",
        duration.duration_in_frames, duration.duration_in_seconds
    );
    println!();

    println!("Overlays ({}):", editor.overlays().len());
    let mut overlays = editor.overlays().to_vec();
    overlays.sort_by_key(|o| (o.row, o.from));
    for o in &overlays {
        println!(
            "  #{:<4} {:<8} row {:<2} z {:<4} frames {}..{}  {}x{} at ({}, {})",
            o.id.0,
            o.kind_name(),
            o.row,
            o.z_index(),
            o.from,
            o.end_frame(),
            o.width,
            o.height,
            o.left,
            o.top,
        );
    }

    Ok(())
}
