//! Track records extracted from the live page

pub use hype_common::events::{LinkRef, TrackKey, TrackSummary};

/// Artist name shown when the page leaves the artist field blank
pub const UNKNOWN_ARTIST: &str = "❓";

/// One playable song entry of the page
///
/// Identity is `(artist_name, track_name)`; `element` is only valid until the
/// page next rebuilds its list and must never be compared.
#[derive(Debug, Clone)]
pub struct Track<E> {
    pub artist_name: String,
    pub track_name: String,
    pub download: Option<LinkRef>,
    pub download_extra: Option<LinkRef>,
    /// Handle to the track's region, borrowed from the browser session
    pub element: E,
}

impl<E> Track<E> {
    pub fn key(&self) -> TrackKey {
        TrackKey {
            artist_name: self.artist_name.clone(),
            track_name: self.track_name.clone(),
        }
    }

    pub fn matches(&self, key: &TrackKey) -> bool {
        self.artist_name == key.artist_name && self.track_name == key.track_name
    }

    /// Same song, regardless of which snapshot either track came from
    pub fn is_same_song<F>(&self, other: &Track<F>) -> bool {
        self.artist_name == other.artist_name && self.track_name == other.track_name
    }

    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            artist_name: self.artist_name.clone(),
            track_name: self.track_name.clone(),
            download: self.download.clone(),
            download_extra: self.download_extra.clone(),
        }
    }
}

/// Artist text as displayed: trimmed, with a placeholder when blank
pub fn display_artist(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        trimmed.to_string()
    }
}
