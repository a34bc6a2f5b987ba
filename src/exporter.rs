use crate::copier::TrackCopier;
use crate::error::{PlaylistError, TrackError};
use crate::library_parser::decode_location;
use crate::models::{Catalog, TrackId};
use crate::naming::track_file_name;
use crate::resolver::{resolve, Resolution};
use crate::sanitize::sanitize;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Why a requested playlist was not exported at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => f.write_str("playlist not found in library"),
            SkipReason::Empty => f.write_str("playlist is empty"),
        }
    }
}

#[derive(Debug)]
pub struct TrackReport {
    /// 1-based position in the playlist.
    pub position: usize,
    pub track_id: TrackId,
    /// Destination of the copy on success.
    pub result: Result<PathBuf, TrackError>,
}

#[derive(Debug)]
pub enum PlaylistOutcome {
    Skipped(SkipReason),
    Failed(PlaylistError),
    Done {
        folder: PathBuf,
        tracks: Vec<TrackReport>,
    },
}

#[derive(Debug)]
pub struct PlaylistReport {
    pub name: String,
    pub outcome: PlaylistOutcome,
}

impl PlaylistReport {
    pub fn tracks(&self) -> &[TrackReport] {
        match &self.outcome {
            PlaylistOutcome::Done { tracks, .. } => tracks,
            _ => &[],
        }
    }
}

/// Everything that happened during one export run, in request order.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub playlists: Vec<PlaylistReport>,
}

impl ExportReport {
    pub fn copied(&self) -> usize {
        self.track_reports().filter(|t| t.result.is_ok()).count()
    }

    pub fn failed_tracks(&self) -> usize {
        self.track_reports().filter(|t| t.result.is_err()).count()
    }

    pub fn skipped_playlists(&self) -> usize {
        self.playlists
            .iter()
            .filter(|p| matches!(p.outcome, PlaylistOutcome::Skipped(_)))
            .count()
    }

    pub fn failed_playlists(&self) -> usize {
        self.playlists
            .iter()
            .filter(|p| matches!(p.outcome, PlaylistOutcome::Failed(_)))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_tracks() > 0 || self.skipped_playlists() > 0 || self.failed_playlists() > 0
    }

    fn track_reports(&self) -> impl Iterator<Item = &TrackReport> {
        self.playlists.iter().flat_map(|p| p.tracks())
    }
}

/// Copies the tracks of requested playlists into `<output_root>/<playlist name>/`.
///
/// Playlists are handled one after another in request order and tracks in
/// play order. A failure only ends the unit it happened in: a bad track
/// is recorded and the next track is tried, a bad playlist is recorded and
/// the next playlist is tried.
pub struct PlaylistExporter<'a, C> {
    catalog: &'a Catalog,
    output_root: PathBuf,
    copier: C,
}

impl<'a, C: TrackCopier> PlaylistExporter<'a, C> {
    pub fn new(catalog: &'a Catalog, output_root: impl Into<PathBuf>, copier: C) -> Self {
        Self {
            catalog,
            output_root: output_root.into(),
            copier,
        }
    }

    /// Exports every requested playlist. Duplicate names are exported again.
    pub fn export<S: AsRef<str>>(&self, names: &[S]) -> ExportReport {
        ExportReport {
            playlists: names
                .iter()
                .map(|name| self.export_playlist(name.as_ref()))
                .collect(),
        }
    }

    #[instrument(skip_all, fields(playlist = %name))]
    pub fn export_playlist(&self, name: &str) -> PlaylistReport {
        info!("working at playlist");
        let report = |outcome| PlaylistReport {
            name: name.to_string(),
            outcome,
        };

        let items = match resolve(self.catalog, name) {
            Resolution::Found(items) => items,
            Resolution::NotFound => {
                error!("can not find playlist in library");
                return report(PlaylistOutcome::Skipped(SkipReason::NotFound));
            }
            Resolution::Empty => {
                warn!("playlist is empty");
                return report(PlaylistOutcome::Skipped(SkipReason::Empty));
            }
        };

        let folder = match self.prepare_folder(name) {
            Ok(folder) => folder,
            Err(e) => {
                error!(error = %e, "skipping playlist");
                return report(PlaylistOutcome::Failed(e));
            }
        };
        info!(folder = %folder.display(), tracks = items.len(), "target folder ready");

        let mut tracks = Vec::with_capacity(items.len());
        for (index, &track_id) in items.iter().enumerate() {
            let position = index + 1;
            debug!(position, total = items.len(), track_id, "track");

            let result = self.export_track(&folder, track_id, position);
            match &result {
                Ok(destination) => {
                    info!(position, track_id, destination = %destination.display(), "copy successful")
                }
                Err(e) => error!(position, track_id, error = %e, "track failed"),
            }
            tracks.push(TrackReport {
                position,
                track_id,
                result,
            });
        }

        report(PlaylistOutcome::Done { folder, tracks })
    }

    /// Clears (or creates) the playlist's folder so every export starts empty.
    fn prepare_folder(&self, name: &str) -> Result<PathBuf, PlaylistError> {
        let folder = playlist_folder(&self.output_root, name)
            .ok_or_else(|| PlaylistError::InvalidFolderName(name.to_string()))?;
        let prep_failed = |source| PlaylistError::FolderPrep {
            folder: folder.clone(),
            source,
        };

        if fs::symlink_metadata(&folder).is_ok() {
            debug!(folder = %folder.display(), "removing previous export");
            fs::remove_dir_all(&folder).map_err(prep_failed)?;
        }
        fs::create_dir_all(&folder).map_err(prep_failed)?;
        Ok(folder)
    }

    fn export_track(
        &self,
        folder: &Path,
        track_id: TrackId,
        position: usize,
    ) -> Result<PathBuf, TrackError> {
        let track = self
            .catalog
            .track(track_id)
            .ok_or(TrackError::IdMissing(track_id))?;
        let location = track
            .location
            .as_deref()
            .ok_or(TrackError::LocationMissing(track_id))?;
        let source = decode_location(location)
            .map(PathBuf::from)
            .ok_or_else(|| TrackError::LocationUndecodable {
                id: track_id,
                location: location.to_string(),
            })?;
        let destination = folder.join(sanitize(&track_file_name(track, position)));
        debug!(source = %source.display(), destination = %destination.display(), "copying");

        self.copier
            .copy(&source, &destination)
            .map_err(|e| TrackError::CopyFailed {
                source_path: source,
                destination: destination.clone(),
                source: e,
            })?;
        Ok(destination)
    }
}

/// Joins a playlist name onto the output root, refusing names that would land
/// on or outside the root itself (`..`, absolute paths, `.`, empty).
fn playlist_folder(root: &Path, name: &str) -> Option<PathBuf> {
    if name.contains('\0') {
        return None;
    }
    let relative = Path::new(name);
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (depth > 0).then(|| root.join(relative))
}
