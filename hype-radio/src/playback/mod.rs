//! Playback core
//!
//! - `link_resolver`: obfuscated download link → canonical URL
//! - `extractor`: track region → [`Track`], page → [`TrackQueue`]
//! - `queue`: oldest-first snapshot of the page's list
//! - `scheduler`: the playback-continuity state machine
//! - `restart`: backoff between scheduler restarts
//! - `sound`: mute toggle

pub mod extractor;
pub mod link_resolver;
pub mod queue;
pub mod restart;
pub mod scheduler;
pub mod sound;
pub mod track;

pub use extractor::TrackExtractor;
pub use link_resolver::LinkResolver;
pub use queue::TrackQueue;
pub use restart::RestartPolicy;
pub use scheduler::{Outcome, PlaybackScheduler, SchedulerExit, SchedulerState};
pub use sound::SoundToggle;
pub use track::{LinkRef, Track, TrackKey};
