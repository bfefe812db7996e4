//! Shared display state
//!
//! The scheduler owns its track pointers; what it shares is the render
//! snapshot, which the mute toggle also writes. Both writers only ever
//! replace their own fields, last write wins.

use hype_common::events::{EventBus, NowPlaying, RadioEvent, TrackSummary};
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

/// Events buffered for slow subscribers
const EVENT_CAPACITY: usize = 100;

/// State shared between the scheduler, the mute toggle and subscribers
pub struct SharedState {
    /// Last rendered snapshot
    now_playing: RwLock<NowPlaying>,

    /// Error channel and informational event stream
    events: EventBus,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            now_playing: RwLock::new(NowPlaying::default()),
            events: EventBus::new(EVENT_CAPACITY),
        }
    }

    /// Broadcast an informational event (no receivers is OK)
    pub fn broadcast_event(&self, event: RadioEvent) {
        self.events.emit_lossy(event);
    }

    /// Report a fatal playback failure on the error channel
    pub fn report_failure(&self, message: &str) {
        if self.events.emit(RadioEvent::playback_failed(message)).is_err() {
            warn!("No subscriber for playback failure: {}", message);
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RadioEvent> {
        self.events.subscribe()
    }

    pub async fn now_playing(&self) -> NowPlaying {
        self.now_playing.read().await.clone()
    }

    /// Replace the track pointers, returning the new snapshot
    pub async fn set_tracks(
        &self,
        current: Option<TrackSummary>,
        previous: Option<TrackSummary>,
        next: Option<TrackSummary>,
    ) -> NowPlaying {
        let mut view = self.now_playing.write().await;
        view.current = current;
        view.previous = previous;
        view.next = next;
        view.clone()
    }

    /// Replace the mute flag, returning the new snapshot
    pub async fn set_muted(&self, muted: bool) -> NowPlaying {
        let mut view = self.now_playing.write().await;
        view.muted = muted;
        view.clone()
    }

    pub async fn is_muted(&self) -> bool {
        self.now_playing.read().await.muted
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
