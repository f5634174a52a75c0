//! Reelforge CLI: create, inspect, retarget and render compositions.
//!
//! Usage:
//!   reelforge init <NAME>                 Create an empty composition
//!   reelforge info <PATH>                 Show composition information
//!   reelforge validate <PATH>             Validate a composition file
//!   reelforge retarget <PATH> --aspect R  Rescale overlays to a new aspect ratio
//!   reelforge render <PATH>               Submit to a renderer and wait for the result

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelforge_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "reelforge",
    about = "Overlay composition and render orchestration",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new empty composition file
    Init {
        /// Composition name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Frame rate (defaults to the configured editor fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Aspect ratio: 16:9, 9:16, 1:1, 4:5
        #[arg(long)]
        aspect: Option<String>,
    },

    /// Show composition information
    Info {
        /// Path to the composition file
        path: PathBuf,
    },

    /// Validate a composition file
    Validate {
        /// Path to the composition file
        path: PathBuf,
    },

    /// Rescale every overlay to a new aspect ratio
    Retarget {
        /// Path to the composition file
        path: PathBuf,

        /// Target aspect ratio: 16:9, 9:16, 1:1, 4:5
        #[arg(long)]
        aspect: String,

        /// Write the result here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Submit a composition to the renderer and wait for the result
    Render {
        /// Path to the composition file
        path: PathBuf,

        /// Renderer base URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Renderer composition id (overrides config)
        #[arg(long)]
        composition_id: Option<String>,

        /// Primary source media URL passed to the renderer
        #[arg(long)]
        src: Option<String>,

        /// Print the final render state as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    reelforge_common::logging::init_logging(&config.logging)?;
    tracing::debug!(command = ?cli.command, "Starting reelforge");

    match cli.command {
        Commands::Init {
            name,
            output,
            fps,
            aspect,
        } => commands::init::run(&config, name, output, fps, aspect),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Retarget {
            path,
            aspect,
            output,
        } => commands::retarget::run(path, aspect, output),
        Commands::Render {
            path,
            endpoint,
            composition_id,
            src,
            json,
        } => commands::render::run(&config, path, endpoint, composition_id, src, json).await,
    }
}
