use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use playlist_export::{run, ExportConfig};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "playlist-export")]
#[command(about = "Copies iTunes playlists into numbered folders of track files")]
struct Args {
    /// Configuration file (defaults to PlaylistExportConfig.json next to the binary)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Library file to read instead of the configured one
    #[arg(long)]
    library: Option<PathBuf>,

    /// Output folder to write to instead of the configured one
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Playlist to export; repeat to export several. Replaces the configured list.
    #[arg(short, long = "playlist")]
    playlists: Vec<String>,

    /// Only log to stderr, do not write a log file into the output folder
    #[arg(long)]
    no_log_file: bool,

    /// Debug output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<ExportConfig> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => ExportConfig::locate()?,
    };
    let mut config = ExportConfig::load(&path)
        .with_context(|| format!("Can not load configuration file {}", path.display()))?;

    if let Some(library) = &args.library {
        config.library = library.clone();
    }
    if let Some(output) = &args.output {
        config.output_folder = output.clone();
    }
    if !args.playlists.is_empty() {
        config.playlists = args.playlists.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // The log file lives in the output folder, so it has to exist first.
    playlist_export::prepare_output_root(&config.output_folder)
        .context("Can not create output folder")?;
    let log_dir = (!args.no_log_file).then_some(config.output_folder.as_path());
    let log_guard = playlist_export::logging::init_logging(log_dir, args.verbose)?;

    info!(
        pid = std::process::id(),
        started = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=== playlist-export session started ==="
    );
    if let Some(file) = log_guard.file() {
        info!(file = %file.display(), "logging to file");
    }
    info!(
        library = %config.library.display(),
        output = %config.output_folder.display(),
        playlists = ?config.playlists,
        "configuration"
    );

    // Per-playlist and per-track failures are in the log and keep the exit code at 0.
    if let Err(e) = run(&config) {
        error!(error = %e, "export aborted");
        return Err(e.into());
    }
    Ok(())
}
