//! Snapshot of the page's track list

use super::track::{Track, TrackKey};
use tracing::debug;

/// Tracks currently known on the page, oldest first
///
/// A queue is never patched: each scan produces a new `TrackQueue` that
/// replaces the previous one wholesale.
#[derive(Debug, Clone)]
pub struct TrackQueue<E> {
    tracks: Vec<Track<E>>,
}

impl<E> Default for TrackQueue<E> {
    fn default() -> Self {
        Self { tracks: Vec::new() }
    }
}

impl<E> TrackQueue<E> {
    /// Build from tracks in page order (newest first)
    ///
    /// Keeps only the oldest occurrence of a song listed more than once, so a
    /// key identifies at most one track per snapshot.
    pub fn from_newest_first(tracks: Vec<Track<E>>) -> Self {
        let mut oldest_first: Vec<Track<E>> = Vec::with_capacity(tracks.len());
        for track in tracks.into_iter().rev() {
            if oldest_first.iter().any(|known| known.is_same_song(&track)) {
                debug!(
                    "Skipping repeated listing of \"{}\" by {}",
                    track.track_name, track.artist_name
                );
                continue;
            }
            oldest_first.push(track);
        }
        Self { tracks: oldest_first }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track<E>> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track<E>> {
        self.tracks.iter()
    }

    /// Index of the track with `key`
    pub fn position(&self, key: &TrackKey) -> Option<usize> {
        self.tracks.iter().position(|track| track.matches(key))
    }
}

impl<E: Clone> TrackQueue<E> {
    /// The two tracks following `key`, as `(current, next)`
    ///
    /// With no key, or a key no longer listed, the queue is read from its
    /// oldest track.
    pub fn successors(&self, key: Option<&TrackKey>) -> (Option<Track<E>>, Option<Track<E>>) {
        let start = key
            .and_then(|key| self.position(key))
            .map_or(0, |index| index + 1);

        (self.get(start).cloned(), self.get(start + 1).cloned())
    }
}
