use crate::models::{Catalog, TrackId};

/// Outcome of looking up a playlist by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Track ids of the first playlist with that name, in play order.
    Found(&'a [TrackId]),
    NotFound,
    /// The playlist exists but has nothing to export.
    Empty,
}

/// Finds the first playlist (in catalog order) whose name matches exactly.
/// Matching is case-sensitive.
pub fn resolve<'a>(catalog: &'a Catalog, name: &str) -> Resolution<'a> {
    match catalog.playlists.iter().find(|p| p.name == name) {
        None => Resolution::NotFound,
        Some(playlist) if playlist.items.is_empty() => Resolution::Empty,
        Some(playlist) => Resolution::Found(&playlist.items),
    }
}
