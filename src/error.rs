use crate::models::TrackId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures loading the library file. Both abort the run.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read iTunes library at {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },
    #[error("iTunes library at {path:?} is not a dictionary")]
    NotADictionary { path: PathBuf },
    #[error("iTunes library at {path:?} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl CatalogError {
    /// `true` for documents that could not be decoded at all, as opposed to
    /// decoded documents missing required fields.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable { .. } | Self::NotADictionary { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can not read configuration file {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration file {path:?}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration lists no playlists to export")]
    NoPlaylists,
    #[error("no configuration file found (looked in {searched:?})")]
    NotFound { searched: Vec<PathBuf> },
}

/// Aborts a single playlist, the run moves on to the next one.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist name {0:?} does not map to a folder inside the output root")]
    InvalidFolderName(String),
    #[error("can not prepare target folder {folder:?}")]
    FolderPrep {
        folder: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Aborts a single track, the playlist moves on to the next one.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("track {0} is not in the library")]
    IdMissing(TrackId),
    #[error("track {0} has no file location")]
    LocationMissing(TrackId),
    #[error("track {id} location {location:?} is not valid UTF-8 once decoded")]
    LocationUndecodable { id: TrackId, location: String },
    #[error("can not copy track from {source_path:?} to {destination:?}")]
    CopyFailed {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fatal errors of a whole export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("can not create output folder {path:?}")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
