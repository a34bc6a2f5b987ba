pub mod config;
pub mod copier;
pub mod error;
pub mod exporter;
pub mod library_parser;
pub mod logging;
pub mod models;
pub mod naming;
pub mod resolver;
pub mod sanitize;

pub use config::ExportConfig;
pub use copier::{FsCopier, TrackCopier};
pub use error::{CatalogError, ConfigError, ExportError, PlaylistError, TrackError};
pub use exporter::{ExportReport, PlaylistExporter, PlaylistOutcome, PlaylistReport, SkipReason, TrackReport};
pub use library_parser::parse_library;
pub use models::{Catalog, Playlist, Track, TrackId};

use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Creates the output root if it does not exist yet.
pub fn prepare_output_root(path: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(path).map_err(|source| ExportError::OutputRoot {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs a complete export with the filesystem copier.
///
/// Errors returned here are fatal for the whole run and happen before any
/// playlist is touched. Everything after that is recorded in the report.
pub fn run(config: &ExportConfig) -> Result<ExportReport, ExportError> {
    run_with(config, FsCopier)
}

pub fn run_with<C: TrackCopier>(config: &ExportConfig, copier: C) -> Result<ExportReport, ExportError> {
    prepare_output_root(&config.output_folder)?;

    let catalog = parse_library(&config.library)?;
    log_catalog_summary(&catalog);

    let exporter = PlaylistExporter::new(&catalog, &config.output_folder, copier);
    let report = exporter.export(config.playlists.as_slice());
    log_report_summary(&report);
    Ok(report)
}

fn log_catalog_summary(catalog: &Catalog) {
    info!(version = %catalog.application_version, "iTunes version");
    info!(date = %catalog.date.format("%Y-%m-%d %H:%M:%S"), "last edit");
    info!(count = catalog.playlists.len(), "playlists");
    info!(count = catalog.tracks.len(), "tracks");
    info!(folder = %catalog.music_folder, "music folder");
}

fn log_report_summary(report: &ExportReport) {
    info!(
        playlists = report.playlists.len(),
        copied = report.copied(),
        "export finished"
    );
    if report.has_failures() {
        warn!(
            failed_tracks = report.failed_tracks(),
            skipped_playlists = report.skipped_playlists(),
            failed_playlists = report.failed_playlists(),
            "some items were not exported"
        );
    }
}
