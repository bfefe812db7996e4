//! Playback scheduler
//!
//! Keeps the page playing one track after another while its list shifts.
//!
//! # State machine
//!
//! ```text
//!            ┌───────────┐
//!  start ──► │ Bootstrap │──┐
//!            └───────────┘  │      ┌────────┐ current  ┌─────────┐
//!                           ├────► │ Render │─────────►│ Playing │──► Fatal (halt)
//!   ┌───────────────┐       │      └────────┘          └─────────┘
//!   │ Carry-forward │───────┘          │ none               │ done
//!   └───────────────┘                  ▼                    │
//!        ▲    ▲                  ┌─────────┐                │
//!        │    └──────────────────│ Starved │                │
//!        └───────────────────────┴─────────┴────────────────┘
//! ```
//!
//! Each [`PlaybackScheduler::step`] threads a [`SchedulerState`] through one
//! cycle and returns the [`Outcome`] that [`PlaybackScheduler::run`] acts on.
//! Only one cycle is ever in flight.

use super::extractor::TrackExtractor;
use super::queue::TrackQueue;
use super::restart::RestartPolicy;
use super::track::Track;
use crate::browser::{BrowserPage, BrowserResult, PageElement};
use crate::presenter::Presenter;
use crate::state::SharedState;
use crate::Result;
use hype_common::events::{RadioEvent, TrackSummary};
use hype_common::PageLayout;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Previous, current and next track pointers
///
/// `previous` may come from a queue that has since been rebuilt; its element
/// is then stale and it is only used to find its successor by identity.
#[derive(Debug, Clone)]
pub struct SchedulerState<E> {
    pub previous: Option<Track<E>>,
    pub current: Option<Track<E>>,
    pub next: Option<Track<E>>,
}

impl<E> Default for SchedulerState<E> {
    fn default() -> Self {
        Self {
            previous: None,
            current: None,
            next: None,
        }
    }
}

impl<E: Clone> SchedulerState<E> {
    /// Nothing played or selected yet
    pub fn is_fresh(&self) -> bool {
        self.previous.is_none() && self.current.is_none()
    }

    /// First selection: the oldest two tracks of `queue`
    pub fn bootstrap(queue: &TrackQueue<E>) -> Self {
        let (current, next) = queue.successors(None);
        Self {
            previous: None,
            current,
            next,
        }
    }

    /// Advance: the current track (or, if none, the previous one) becomes
    /// previous, and current/next are its successors in `queue`
    pub fn carry_forward(self, queue: &TrackQueue<E>) -> Self {
        Self {
            previous: self.current.or(self.previous),
            current: None,
            next: None,
        }
        .relocate(queue)
    }

    /// Recompute current/next from `queue` without moving previous
    pub fn relocate(self, queue: &TrackQueue<E>) -> Self {
        let key = self.previous.as_ref().map(Track::key);
        let (current, next) = queue.successors(key.as_ref());
        Self {
            previous: self.previous,
            current,
            next,
        }
    }
}

/// Result of one scheduling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A track finished; start the next cycle
    Continue,
    /// No current track; wait for new content, then carry forward
    Starved,
    /// Playback failed; the loop halts
    Fatal(String),
}

/// Why [`PlaybackScheduler::run`] returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerExit {
    /// Session teardown interrupted a wait
    Cancelled,
    /// A playback failure was reported on the error channel
    Failed(String),
}

/// The single scheduling loop driving the page
pub struct PlaybackScheduler<P: BrowserPage> {
    page: Arc<P>,
    extractor: TrackExtractor,
    layout: PageLayout,
    queue: TrackQueue<P::Element>,
    shared: Arc<SharedState>,
    presenter: Arc<dyn Presenter>,
    cancel: CancellationToken,
}

impl<P: BrowserPage> PlaybackScheduler<P> {
    pub fn new(
        page: Arc<P>,
        extractor: TrackExtractor,
        layout: PageLayout,
        shared: Arc<SharedState>,
        presenter: Arc<dyn Presenter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            page,
            extractor,
            layout,
            queue: TrackQueue::default(),
            shared,
            presenter,
            cancel,
        }
    }

    /// The queue as of the last scan
    pub fn queue(&self) -> &TrackQueue<P::Element> {
        &self.queue
    }

    /// Run from Bootstrap until cancelled or a playback failure
    ///
    /// A playback failure is reported once on the error channel and ends the
    /// loop; calling `run` again starts over from Bootstrap. Failures outside
    /// of playback (initial scan, starved wait) are returned as errors.
    pub async fn run(&mut self) -> Result<SchedulerExit> {
        let cancel = self.cancel.clone();
        let mut state = SchedulerState::default();

        loop {
            let (next_state, outcome) = tokio::select! {
                _ = cancel.cancelled() => return Ok(SchedulerExit::Cancelled),
                result = self.step(state) => result?,
            };
            state = next_state;

            match outcome {
                Outcome::Continue => {}
                Outcome::Starved => {
                    info!("Ran out of tracks");
                    self.shared.broadcast_event(RadioEvent::starved());
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(SchedulerExit::Cancelled),
                        result = self.page.wait_for_selector(&self.layout.refresh_control, None) => result?,
                    }
                }
                Outcome::Fatal(message) => {
                    self.shared.report_failure(&message);
                    return Ok(SchedulerExit::Failed(message));
                }
            }
        }
    }

    /// [`run`](Self::run), restarted after playback failures per `policy`
    ///
    /// Restarts wait out a growing delay. A run that lasted longer than the
    /// longest delay resets the count. Returns the last failure once
    /// restarts are disabled or used up.
    pub async fn run_supervised(&mut self, policy: &RestartPolicy) -> Result<SchedulerExit> {
        let cancel = self.cancel.clone();
        let mut attempt = 0;

        loop {
            let started = Instant::now();
            let message = match self.run().await? {
                SchedulerExit::Failed(message) => message,
                exit => return Ok(exit),
            };

            if !policy.enabled {
                return Ok(SchedulerExit::Failed(message));
            }
            if started.elapsed() >= policy.max_delay {
                attempt = 0;
            }
            attempt += 1;
            if attempt > policy.max_attempts {
                warn!(
                    "Giving up after {} restarts: {}",
                    policy.max_attempts, message
                );
                return Ok(SchedulerExit::Failed(message));
            }

            let delay = policy.delay_for(attempt);
            warn!(
                "Restarting playback in {:?} ({} of {}): {}",
                delay, attempt, policy.max_attempts, message
            );
            tokio::select! {
                _ = cancel.cancelled() => return Ok(SchedulerExit::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One cycle: select current/next, render, play current if any
    pub async fn step(
        &mut self,
        state: SchedulerState<P::Element>,
    ) -> Result<(SchedulerState<P::Element>, Outcome)> {
        let state = if state.is_fresh() {
            self.rescan().await?;
            SchedulerState::bootstrap(&self.queue)
        } else {
            let state = state.carry_forward(&self.queue);
            if state.current.is_some() {
                state
            } else {
                self.refresh(state).await
            }
        };

        self.render(&state).await;

        let Some(current) = state.current.as_ref() else {
            return Ok((state, Outcome::Starved));
        };

        let outcome = match self.play(current).await {
            Ok(()) => Outcome::Continue,
            Err(e) => Outcome::Fatal(e.to_string()),
        };
        Ok((state, outcome))
    }

    /// Replace the queue with a fresh scan of the page
    async fn rescan(&mut self) -> BrowserResult<()> {
        self.queue = self.extractor.scan(self.page.as_ref()).await?;
        self.shared
            .broadcast_event(RadioEvent::queue_scanned(self.queue.len()));
        Ok(())
    }

    /// Ask the page for newer tracks and look for a successor again
    ///
    /// Failure just leaves `state` as it was; the next cycle retries.
    async fn refresh(&mut self, state: SchedulerState<P::Element>) -> SchedulerState<P::Element> {
        match self.try_refresh().await {
            Ok(()) => state.relocate(&self.queue),
            Err(e) => {
                debug!("Queue refresh unavailable: {}", e);
                state
            }
        }
    }

    async fn try_refresh(&mut self) -> BrowserResult<()> {
        self.page.click(&self.layout.refresh_control).await?;
        self.page.wait_for_network_idle().await?;
        info!("Found new tracks");
        self.rescan().await
    }

    async fn play(&self, track: &Track<P::Element>) -> BrowserResult<()> {
        info!("Playing \"{}\" by {}", track.track_name, track.artist_name);
        track.element.click(&self.layout.play_control).await?;
        self.shared
            .broadcast_event(RadioEvent::track_started(track.summary()));

        track.element.wait_for(&self.layout.play_ready).await?;
        info!("Track done");
        self.shared
            .broadcast_event(RadioEvent::track_finished(track.summary()));

        self.page.click(&self.layout.advance_control).await
    }

    async fn render(&self, state: &SchedulerState<P::Element>) {
        let view = self
            .shared
            .set_tracks(
                summary(&state.current),
                summary(&state.previous),
                summary(&state.next),
            )
            .await;
        self.presenter.render(&view);
    }
}

fn summary<E>(track: &Option<Track<E>>) -> Option<TrackSummary> {
    track.as_ref().map(Track::summary)
}
