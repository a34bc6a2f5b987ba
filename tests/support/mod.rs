//! Builders for on-disk iTunes libraries and media files.

#![allow(dead_code)]

use plist::{Date, Dictionary, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

/// `file://` URL the way iTunes writes it: every path segment percent-encoded.
pub fn file_url(path: &Path) -> String {
    let encoded: Vec<String> = path
        .to_str()
        .expect("utf-8 test path")
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("file://{}", encoded.join("/"))
}

/// Writes a fake media file and returns its path.
pub fn media_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    fs::create_dir_all(dir).expect("media dir");
    let path = dir.join(name);
    fs::write(&path, content).expect("media file");
    path
}

pub struct LibraryBuilder {
    root: Dictionary,
    tracks: Dictionary,
    playlists: Vec<Value>,
}

impl Default for LibraryBuilder {
    fn default() -> Self {
        let mut root = Dictionary::new();
        root.insert("Major Version".into(), Value::Integer(1.into()));
        root.insert("Application Version".into(), Value::String("12.9.5.5".into()));
        root.insert(
            "Date".into(),
            Value::Date(Date::from(UNIX_EPOCH + Duration::from_secs(1_700_000_000))),
        );
        root.insert("Music Folder".into(), Value::String("file:///Users/me/Music/".into()));
        Self {
            root,
            tracks: Dictionary::new(),
            playlists: Vec::new(),
        }
    }
}

impl LibraryBuilder {
    pub fn track(mut self, id: i64, location: &str, artist: Option<&str>, name: Option<&str>) -> Self {
        let mut track = Dictionary::new();
        track.insert("Track ID".into(), Value::Integer(id.into()));
        track.insert("Location".into(), Value::String(location.into()));
        if let Some(artist) = artist {
            track.insert("Artist".into(), Value::String(artist.into()));
        }
        if let Some(name) = name {
            track.insert("Name".into(), Value::String(name.into()));
        }
        self.tracks.insert(id.to_string(), Value::Dictionary(track));
        self
    }

    pub fn playlist(mut self, name: &str, ids: &[i64]) -> Self {
        let items = ids
            .iter()
            .map(|id| {
                let mut item = Dictionary::new();
                item.insert("Track ID".into(), Value::Integer((*id).into()));
                Value::Dictionary(item)
            })
            .collect();
        let mut playlist = Dictionary::new();
        playlist.insert("Name".into(), Value::String(name.into()));
        playlist.insert("Playlist Items".into(), Value::Array(items));
        self.playlists.push(Value::Dictionary(playlist));
        self
    }

    /// Drops a top-level key, for malformed-library tests.
    pub fn without(mut self, key: &str) -> Self {
        self.root.remove(key);
        self
    }

    pub fn build(self) -> Value {
        let mut root = self.root;
        root.insert("Tracks".into(), Value::Dictionary(self.tracks));
        root.insert("Playlists".into(), Value::Array(self.playlists));
        Value::Dictionary(root)
    }

    pub fn write_xml(self, path: &Path) -> PathBuf {
        self.build().to_file_xml(path).expect("write xml library");
        path.to_path_buf()
    }

    pub fn write_binary(self, path: &Path) -> PathBuf {
        self.build().to_file_binary(path).expect("write binary library");
        path.to_path_buf()
    }
}

/// Every file under `dir` with its bytes and modification time, sorted by path.
pub fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>, std::time::SystemTime)> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let modified = fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");
                let relative = path.strip_prefix(dir).expect("inside dir").to_path_buf();
                files.push((relative, fs::read(&path).expect("read file"), modified));
            }
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}
