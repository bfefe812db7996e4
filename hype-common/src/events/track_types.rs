//! Track type definitions for event data
//!
//! Handle-free track views shared between the player, its presenter
//! and event subscribers.

use serde::{Deserialize, Serialize};

/// A download link read from a track region
///
/// `href` starts as the page's obfuscated reference and is replaced by the
/// resolved canonical URL, or left empty when resolution fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Link text as shown on the page
    pub label: String,
    pub href: String,
}

impl LinkRef {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }

    /// True when the link carries a usable href
    pub fn is_downloadable(&self) -> bool {
        !self.href.is_empty()
    }
}

/// Identity of a track across queue snapshots
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackKey {
    pub artist_name: String,
    pub track_name: String,
}

/// Track information without its page element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub artist_name: String,
    pub track_name: String,
    pub download: Option<LinkRef>,
    pub download_extra: Option<LinkRef>,
}

impl TrackSummary {
    /// Download links that resolved to a usable URL, primary first
    pub fn downloadable_links(&self) -> impl Iterator<Item = &LinkRef> {
        self.download
            .iter()
            .chain(self.download_extra.iter())
            .filter(|link| link.is_downloadable())
    }
}

/// Render snapshot of the player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub current: Option<TrackSummary>,
    pub previous: Option<TrackSummary>,
    pub next: Option<TrackSummary>,
    pub muted: bool,
}
