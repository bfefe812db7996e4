//! Event types for the Hype Radio event system
//!
//! Provides the shared event definitions and the EventBus used as the
//! player's error channel and informational event stream.

mod track_types;

pub use track_types::{LinkRef, NowPlaying, TrackKey, TrackSummary};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Hype Radio event types
///
/// Events are broadcast via EventBus and are serializable so a subscriber
/// can forward them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RadioEvent {
    /// Track list was read from the page
    QueueScanned {
        /// Tracks in the rebuilt queue
        track_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback of a track was triggered
    TrackStarted {
        track: TrackSummary,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Track reported it can be played again (finished)
    TrackFinished {
        track: TrackSummary,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// No successor track is known; waiting for new content
    Starved {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Mute flag changed
    MuteToggled {
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Unrecoverable playback failure; the scheduling loop has halted
    ///
    /// Emitted exactly once per failure. The owning process decides whether
    /// to restart the scheduler or exit.
    PlaybackFailed {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl RadioEvent {
    pub fn queue_scanned(track_count: usize) -> Self {
        Self::QueueScanned {
            track_count,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn track_started(track: TrackSummary) -> Self {
        Self::TrackStarted {
            track,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn track_finished(track: TrackSummary) -> Self {
        Self::TrackFinished {
            track,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn starved() -> Self {
        Self::Starved {
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn mute_toggled(muted: bool) -> Self {
        Self::MuteToggled {
            muted,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn playback_failed(message: impl Into<String>) -> Self {
        Self::PlaybackFailed {
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Broadcast channel for RadioEvent
pub struct EventBus {
    tx: broadcast::Sender<RadioEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    ///
    /// # Examples
    ///
    /// ```
    /// use hype_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: RadioEvent,
    ) -> Result<usize, broadcast::error::SendError<RadioEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: RadioEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
