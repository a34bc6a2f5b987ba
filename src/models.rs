use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Track identifier as stored in the library (`Track ID`).
pub type TrackId = i64;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Track {
    pub id: TrackId,
    pub location: Option<String>, // URL-encoded, usually file://...
    pub artist: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Playlist {
    pub persistent_id: Option<String>,
    pub name: String,
    pub is_folder: bool,
    pub items: Vec<TrackId>, // Play order
}

/// Snapshot of the library taken at load time. Read-only for the rest of the run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Catalog {
    pub application_version: String,
    pub date: DateTime<Utc>,
    pub music_folder: String,
    pub playlists: Vec<Playlist>,
    pub tracks: BTreeMap<TrackId, Track>,
}

impl Catalog {
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }
}
