use crate::models::Track;
use std::path::Path;

const SEPARATOR: &str = " - ";

/// Builds the raw destination filename for a track at a 1-based playlist position:
/// `<position, zero-padded to 3> - <artist> - <title><ext>`.
///
/// Positions above 999 are written in full, never truncated. The result may
/// contain characters that are unsafe in paths; run it through
/// [`sanitize`](crate::sanitize::sanitize) before use.
pub fn track_file_name(track: &Track, position: usize) -> String {
    format!(
        "{position:03}{SEPARATOR}{}{SEPARATOR}{}{}",
        track.artist,
        track.title,
        track_extension(track)
    )
}

/// Extension of the track's location including the leading period, or an empty
/// string when there is none.
pub fn track_extension(track: &Track) -> String {
    track
        .location
        .as_deref()
        .and_then(|location| Path::new(location).extension())
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
