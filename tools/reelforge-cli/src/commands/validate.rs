//! Validate a composition file.

use std::path::PathBuf;

use reelforge_project_model::CompositionDocument;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating composition at: {}", path.display());

    let document = CompositionDocument::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load composition: {e}"))?;

    println!("  Name: {}", document.name);
    println!("  Version: {}", document.version);
    println!("  Canvas: {}", document.dimensions());
    println!("  FPS: {}", document.fps);
    println!("  Overlays: {}", document.overlays.len());

    let root = path.parent().map(PathBuf::from).unwrap_or_default();
    let mut issues: Vec<String> = document
        .missing_local_sources(&root)
        .into_iter()
        .map(|src| format!("missing source: {src}"))
        .collect();

    for (i, a) in document.overlays.iter().enumerate() {
        for b in &document.overlays[i + 1..] {
            if a.overlaps(b) {
                issues.push(format!(
                    "overlays {} and {} overlap on row {}",
                    a.id, b.id, a.row
                ));
            }
        }
    }

    if issues.is_empty() {
        println!("\nComposition is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Composition may not render as expected.",
            issues.len()
        );
    }

    Ok(())
}
