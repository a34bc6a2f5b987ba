use crate::error::CatalogError;
use crate::models::{Catalog, Playlist, Track, TrackId};
use chrono::{DateTime, Utc};
use plist::{Dictionary, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, instrument, warn};
use urlencoding::decode;

const KEY_APPLICATION_VERSION: &str = "Application Version";
const KEY_DATE: &str = "Date";
const KEY_MUSIC_FOLDER: &str = "Music Folder";
const KEY_PLAYLISTS: &str = "Playlists";
const KEY_TRACKS: &str = "Tracks";

const KEY_PLAYLIST_NAME: &str = "Name";
const KEY_PLAYLIST_PERSISTENT_ID: &str = "Playlist Persistent ID";
const KEY_PLAYLIST_FOLDER: &str = "Folder";
const KEY_PLAYLIST_ITEMS: &str = "Playlist Items";

const KEY_TRACK_ID: &str = "Track ID";
const KEY_TRACK_LOCATION: &str = "Location";
const KEY_TRACK_ARTIST: &str = "Artist";
const KEY_TRACK_NAME: &str = "Name";

/// Reads an iTunes / Music library property list (XML or binary) into a [`Catalog`].
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_library<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let value = Value::from_file(path).map_err(|source| CatalogError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let root = value
        .into_dictionary()
        .ok_or_else(|| CatalogError::NotADictionary {
            path: path.to_path_buf(),
        })?;

    let catalog = decode_catalog(&root).map_err(|reason| CatalogError::Malformed {
        path: path.to_path_buf(),
        reason,
    })?;

    debug!(
        playlists = catalog.playlists.len(),
        tracks = catalog.tracks.len(),
        "decoded library"
    );
    Ok(catalog)
}

/// Validating decode of the root dictionary. Missing top-level keys are an
/// error whose text names the key; broken tracks and playlists are skipped.
pub(crate) fn decode_catalog(root: &Dictionary) -> Result<Catalog, String> {
    let application_version = required_string(root, KEY_APPLICATION_VERSION)?;
    let date = root
        .get(KEY_DATE)
        .and_then(|v| v.as_date())
        .map(|d| DateTime::<Utc>::from(SystemTime::from(d)))
        .ok_or_else(|| missing(KEY_DATE, "date"))?;
    let music_folder = required_string(root, KEY_MUSIC_FOLDER)?;

    let tracks_dict = root
        .get(KEY_TRACKS)
        .and_then(|v| v.as_dictionary())
        .ok_or_else(|| missing(KEY_TRACKS, "dictionary"))?;

    // Single broken entries are dropped so unrelated playlists still export.
    let mut tracks = BTreeMap::new();
    for (key, track_value) in tracks_dict {
        let Ok(id) = key.trim().parse::<TrackId>() else {
            warn!(key = %key, "skipping track with a non-integer key");
            continue;
        };
        let Some(track_info) = track_value.as_dictionary() else {
            warn!(track_id = id, "skipping track that is not a dictionary");
            continue;
        };
        tracks.insert(id, decode_track(id, track_info));
    }

    let playlists = root
        .get(KEY_PLAYLISTS)
        .and_then(|v| v.as_array())
        .ok_or_else(|| missing(KEY_PLAYLISTS, "array"))?
        .iter()
        .enumerate()
        .filter_map(|(index, value)| decode_playlist(index, value))
        .collect();

    Ok(Catalog {
        application_version,
        date,
        music_folder,
        playlists,
        tracks,
    })
}

// Artist and title are allowed to be missing, they become empty name segments.
fn decode_track(id: TrackId, track_info: &Dictionary) -> Track {
    Track {
        id,
        location: optional_string(track_info, KEY_TRACK_LOCATION),
        artist: optional_string(track_info, KEY_TRACK_ARTIST).unwrap_or_default(),
        title: optional_string(track_info, KEY_TRACK_NAME).unwrap_or_default(),
    }
}

fn decode_playlist(index: usize, value: &Value) -> Option<Playlist> {
    let Some(info) = value.as_dictionary() else {
        warn!(index, "skipping playlist that is not a dictionary");
        return None;
    };
    let Some(name) = info.get(KEY_PLAYLIST_NAME).and_then(|v| v.as_string()) else {
        warn!(index, "skipping playlist without a name");
        return None;
    };
    let name = name.to_string();

    // Smart playlists and folders may come without items at all.
    let items = match info.get(KEY_PLAYLIST_ITEMS).map(|v| v.as_array()) {
        None => Vec::new(),
        Some(None) => {
            warn!(playlist = %name, "playlist items are not an array, treating as empty");
            Vec::new()
        }
        Some(Some(items)) => items
            .iter()
            .filter_map(|item| {
                let id = item
                    .as_dictionary()
                    .and_then(|d| d.get(KEY_TRACK_ID))
                    .and_then(|v| v.as_signed_integer());
                if id.is_none() {
                    warn!(playlist = %name, "dropping playlist item without a Track ID");
                }
                id
            })
            .collect(),
    };

    Some(Playlist {
        persistent_id: optional_string(info, KEY_PLAYLIST_PERSISTENT_ID),
        is_folder: info
            .get(KEY_PLAYLIST_FOLDER)
            .and_then(|v| v.as_boolean())
            .unwrap_or(false),
        name,
        items,
    })
}

fn required_string(dict: &Dictionary, key: &str) -> Result<String, String> {
    dict.get(key)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| missing(key, "string"))
}

fn optional_string(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn missing(key: &str, kind: &str) -> String {
    format!("required {kind} {key:?} is missing")
}

/// Turns a track `Location` URL into a local path string.
///
/// iTunes writes `file://localhost/Users/...` or `file:///Users/...` with
/// percent-encoding. Returns `None` when the decoded bytes are not UTF-8.
pub fn decode_location(location: &str) -> Option<String> {
    let decoded = decode(location).ok()?;
    let path = decoded
        .strip_prefix("file://localhost")
        .or_else(|| decoded.strip_prefix("file://"))
        .unwrap_or(&*decoded);
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plist::Date;
    use std::time::{Duration, UNIX_EPOCH};

    fn track(id: i64, location: &str, artist: Option<&str>, name: Option<&str>) -> Value {
        let mut dict = Dictionary::new();
        dict.insert(KEY_TRACK_ID.into(), Value::Integer(id.into()));
        dict.insert(KEY_TRACK_LOCATION.into(), Value::String(location.into()));
        if let Some(artist) = artist {
            dict.insert(KEY_TRACK_ARTIST.into(), Value::String(artist.into()));
        }
        if let Some(name) = name {
            dict.insert(KEY_TRACK_NAME.into(), Value::String(name.into()));
        }
        Value::Dictionary(dict)
    }

    fn playlist(name: &str, ids: &[i64]) -> Value {
        let mut dict = Dictionary::new();
        dict.insert(KEY_PLAYLIST_NAME.into(), Value::String(name.into()));
        let items = ids
            .iter()
            .map(|id| {
                let mut item = Dictionary::new();
                item.insert(KEY_TRACK_ID.into(), Value::Integer((*id).into()));
                Value::Dictionary(item)
            })
            .collect();
        dict.insert(KEY_PLAYLIST_ITEMS.into(), Value::Array(items));
        Value::Dictionary(dict)
    }

    fn library() -> Dictionary {
        let mut tracks = Dictionary::new();
        tracks.insert("1".into(), track(1, "file:///m/a.mp3", Some("A B"), Some("Song One")));
        tracks.insert("2".into(), track(2, "file:///m/c.flac", None, None));

        let mut root = Dictionary::new();
        root.insert(KEY_APPLICATION_VERSION.into(), Value::String("12.9.5.5".into()));
        root.insert(
            KEY_DATE.into(),
            Value::Date(Date::from(UNIX_EPOCH + Duration::from_secs(1_600_000_000))),
        );
        root.insert(KEY_MUSIC_FOLDER.into(), Value::String("file:///m/".into()));
        root.insert(KEY_TRACKS.into(), Value::Dictionary(tracks));
        root.insert(
            KEY_PLAYLISTS.into(),
            Value::Array(vec![playlist("Road Trip", &[2, 1, 2])]),
        );
        root
    }

    #[test]
    fn decodes_locations() {
        assert_eq!(
            decode_location("file://localhost/Users/me/Music/A%20B/01%20Song.mp3").as_deref(),
            Some("/Users/me/Music/A B/01 Song.mp3")
        );
        assert_eq!(decode_location("file:///m/a.mp3").as_deref(), Some("/m/a.mp3"));
        assert_eq!(
            decode_location("file:///m/Sigur%20R%C3%B3s.flac").as_deref(),
            Some("/m/Sigur Rós.flac")
        );
        assert_eq!(decode_location("/already/a/path.mp3").as_deref(), Some("/already/a/path.mp3"));
        assert_eq!(decode_location("file:///m/%FF.mp3"), None);
    }

    #[test]
    fn decodes_complete_library() {
        let catalog = decode_catalog(&library()).unwrap();

        assert_eq!(catalog.application_version, "12.9.5.5");
        assert_eq!(catalog.date.timestamp(), 1_600_000_000);
        assert_eq!(catalog.music_folder, "file:///m/");
        assert_eq!(catalog.tracks.len(), 2);
        assert_eq!(catalog.playlists.len(), 1);
        assert_eq!(catalog.playlists[0].items, vec![2, 1, 2]);
        assert!(!catalog.playlists[0].is_folder);
    }

    #[test]
    fn missing_artist_and_title_become_empty() {
        let catalog = decode_catalog(&library()).unwrap();
        let track = catalog.track(2).unwrap();

        assert_eq!(track.artist, "");
        assert_eq!(track.title, "");
        assert_eq!(track.location.as_deref(), Some("file:///m/c.flac"));
    }

    #[test]
    fn playlist_without_items_is_empty() {
        let mut root = library();
        let mut folder = Dictionary::new();
        folder.insert(KEY_PLAYLIST_NAME.into(), Value::String("Folder".into()));
        folder.insert(KEY_PLAYLIST_FOLDER.into(), Value::Boolean(true));
        root.insert(KEY_PLAYLISTS.into(), Value::Array(vec![Value::Dictionary(folder)]));

        let catalog = decode_catalog(&root).unwrap();
        assert!(catalog.playlists[0].items.is_empty());
        assert!(catalog.playlists[0].is_folder);
    }

    #[test]
    fn each_required_key_is_checked() {
        for key in [
            KEY_APPLICATION_VERSION,
            KEY_DATE,
            KEY_MUSIC_FOLDER,
            KEY_TRACKS,
            KEY_PLAYLISTS,
        ] {
            let mut root = library();
            root.remove(key);
            let reason = decode_catalog(&root).unwrap_err();
            assert!(reason.contains(key), "{reason}");
        }
    }

    #[test]
    fn non_numeric_track_key_is_skipped() {
        let mut root = library();
        let mut tracks = Dictionary::new();
        tracks.insert("abc".into(), track(9, "file:///m/x.mp3", None, None));
        tracks.insert("1".into(), track(1, "file:///m/a.mp3", None, None));
        tracks.insert("2".into(), Value::String("not a track".into()));
        root.insert(KEY_TRACKS.into(), Value::Dictionary(tracks));

        let catalog = decode_catalog(&root).unwrap();
        assert_eq!(catalog.tracks.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn broken_playlists_do_not_hide_the_others() {
        let mut root = library();
        let mut nameless = Dictionary::new();
        nameless.insert(KEY_PLAYLIST_ITEMS.into(), Value::Array(Vec::new()));
        root.insert(
            KEY_PLAYLISTS.into(),
            Value::Array(vec![
                Value::Dictionary(nameless),
                Value::String("not a playlist".into()),
                playlist("Road Trip", &[1, 2]),
            ]),
        );

        let catalog = decode_catalog(&root).unwrap();
        assert_eq!(catalog.playlists.len(), 1);
        assert_eq!(catalog.playlists[0].name, "Road Trip");
    }

    #[test]
    fn item_without_track_id_is_dropped() {
        let mut root = library();
        let mut item = Dictionary::new();
        item.insert(KEY_TRACK_ID.into(), Value::Integer(1.into()));
        let mut dict = Dictionary::new();
        dict.insert(KEY_PLAYLIST_NAME.into(), Value::String("Patchy".into()));
        dict.insert(
            KEY_PLAYLIST_ITEMS.into(),
            Value::Array(vec![
                Value::Dictionary(Dictionary::new()),
                Value::Dictionary(item),
            ]),
        );
        root.insert(KEY_PLAYLISTS.into(), Value::Array(vec![Value::Dictionary(dict)]));

        let catalog = decode_catalog(&root).unwrap();
        assert_eq!(catalog.playlists[0].items, vec![1]);
    }
}
