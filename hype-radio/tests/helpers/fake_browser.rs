//! Scripted in-memory page implementing the browser capabilities
//!
//! Models the default page layout: a newest-first list of track regions, a
//! refresh control that reveals pending tracks, a global advance control and
//! a mute control. Rebuilding the list invalidates every element handle
//! handed out before, like the real page.

#![allow(dead_code)]

use async_trait::async_trait;
use hype_common::PageLayout;
use hype_radio::browser::{BrowserError, BrowserPage, BrowserResult, PageElement};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One track region of the fake page
#[derive(Debug, Clone, Default)]
pub struct FakeTrack {
    /// `None` = the artist element is missing
    pub artist: Option<String>,
    /// `None` = the track element is missing
    pub track: Option<String>,
    /// `(label, href)`
    pub download: Option<(String, String)>,
    pub download_extra: Option<(String, String)>,
    /// Every field read of this region takes this long
    pub read_delay: Option<Duration>,
}

impl FakeTrack {
    pub fn new(artist: &str, track: &str) -> Self {
        Self {
            artist: Some(artist.to_string()),
            track: Some(track.to_string()),
            ..Self::default()
        }
    }

    pub fn with_download(mut self, label: &str, href: &str) -> Self {
        self.download = Some((label.to_string(), href.to_string()));
        self
    }

    pub fn with_download_extra(mut self, label: &str, href: &str) -> Self {
        self.download_extra = Some((label.to_string(), href.to_string()));
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn without_track_name(mut self) -> Self {
        self.track = None;
        self
    }
}

/// What waiting for the refresh control does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationWait {
    /// Never resolves (no new content ever arrives)
    Forever,
    /// Resolves immediately if a refresh is available, else never
    WhenAvailable,
    /// Fails as if the session had been closed
    SessionClosed,
}

#[derive(Debug)]
pub struct FakeDom {
    layout: PageLayout,
    /// Page order: newest first
    tracks: Vec<FakeTrack>,
    /// Bumped on every list rebuild
    generation: u64,
    /// Tracks the refresh control will reveal (newest first)
    pending: Vec<FakeTrack>,
    /// Batches that arrive one per notification wait
    arrivals: Vec<Vec<FakeTrack>>,
    refresh_clickable: bool,
    notification_wait: NotificationWait,
    /// Track whose completion wait fails with a stale handle
    fail_playback_of: Option<String>,
    /// Track whose completion wait never resolves
    hang_playback_of: Option<String>,
    /// Every play click is rejected
    reject_play_clicks: bool,
    /// Rebuild the list while this track plays
    rebuild_during: Option<String>,
    muted: bool,
    mute_click_fails: bool,
    pub actions: Vec<String>,
    pub refresh_clicks: usize,
    pub network_idle_waits: usize,
    pub notification_waits: usize,
    pub scans: usize,
}

/// Fake page; clones share one document
#[derive(Debug, Clone)]
pub struct FakePage {
    dom: Arc<Mutex<FakeDom>>,
}

impl FakePage {
    /// Page showing `tracks`, given oldest first
    pub fn with_tracks(oldest_first: Vec<FakeTrack>) -> Self {
        let mut tracks = oldest_first;
        tracks.reverse();
        Self {
            dom: Arc::new(Mutex::new(FakeDom {
                layout: PageLayout::default(),
                tracks,
                generation: 0,
                pending: Vec::new(),
                arrivals: Vec::new(),
                refresh_clickable: true,
                notification_wait: NotificationWait::Forever,
                fail_playback_of: None,
                hang_playback_of: None,
                reject_play_clicks: false,
                rebuild_during: None,
                muted: false,
                mute_click_fails: false,
                actions: Vec::new(),
                refresh_clicks: 0,
                network_idle_waits: 0,
                notification_waits: 0,
                scans: 0,
            })),
        }
    }

    pub fn dom(&self) -> MutexGuard<'_, FakeDom> {
        self.dom.lock().unwrap()
    }

    /// Tracks (oldest first) the next refresh click reveals
    pub fn set_pending(&self, oldest_first: Vec<FakeTrack>) {
        let mut tracks = oldest_first;
        tracks.reverse();
        self.dom().pending = tracks;
    }

    /// Batches (each oldest first) that arrive one per notification wait
    pub fn push_arrival(&self, oldest_first: Vec<FakeTrack>) {
        let mut tracks = oldest_first;
        tracks.reverse();
        self.dom().arrivals.push(tracks);
    }

    pub fn set_refresh_clickable(&self, clickable: bool) {
        self.dom().refresh_clickable = clickable;
    }

    pub fn set_notification_wait(&self, wait: NotificationWait) {
        self.dom().notification_wait = wait;
    }

    pub fn fail_playback_of(&self, track: &str) {
        self.dom().fail_playback_of = Some(track.to_string());
    }

    pub fn hang_playback_of(&self, track: &str) {
        self.dom().hang_playback_of = Some(track.to_string());
    }

    pub fn reject_play_clicks(&self) {
        self.dom().reject_play_clicks = true;
    }

    pub fn scans(&self) -> usize {
        self.dom().scans
    }

    pub fn rebuild_during(&self, track: &str) {
        self.dom().rebuild_during = Some(track.to_string());
    }

    pub fn set_muted(&self, muted: bool) {
        self.dom().muted = muted;
    }

    pub fn set_mute_click_fails(&self, fails: bool) {
        self.dom().mute_click_fails = fails;
    }

    pub fn is_muted(&self) -> bool {
        self.dom().muted
    }

    pub fn actions(&self) -> Vec<String> {
        self.dom().actions.clone()
    }

    /// Track names played, in order
    pub fn played(&self) -> Vec<String> {
        self.actions()
            .iter()
            .filter_map(|a| a.strip_prefix("play ").map(str::to_string))
            .collect()
    }
}

impl FakeDom {
    fn rebuild(&mut self, newest_first: Vec<FakeTrack>) {
        let mut tracks = newest_first;
        tracks.extend(std::mem::take(&mut self.tracks));
        self.tracks = tracks;
        self.generation += 1;
    }

    fn region(&self, element: &FakeElement) -> BrowserResult<&FakeTrack> {
        if element.generation != self.generation {
            return Err(BrowserError::WebDriver("stale element reference".to_string()));
        }
        self.tracks
            .get(element.index)
            .ok_or_else(|| BrowserError::WebDriver("stale element reference".to_string()))
    }

    fn field<'a>(&self, track: &'a FakeTrack, selector: &str) -> BrowserResult<(&'a str, &'a str)> {
        let missing = || BrowserError::NotFound(selector.to_string());
        let l = &self.layout;
        if selector == l.artist {
            track.artist.as_deref().map(|t| (t, "")).ok_or_else(missing)
        } else if selector == l.track {
            track.track.as_deref().map(|t| (t, "")).ok_or_else(missing)
        } else if selector == l.download {
            track
                .download
                .as_ref()
                .map(|(label, href)| (label.as_str(), href.as_str()))
                .ok_or_else(missing)
        } else if selector == l.download_extra {
            track
                .download_extra
                .as_ref()
                .map(|(label, href)| (label.as_str(), href.as_str()))
                .ok_or_else(missing)
        } else {
            Err(missing())
        }
    }
}

/// Handle to one track region of a [`FakePage`]
#[derive(Debug, Clone)]
pub struct FakeElement {
    dom: Arc<Mutex<FakeDom>>,
    index: usize,
    generation: u64,
}

impl FakeElement {
    fn dom(&self) -> MutexGuard<'_, FakeDom> {
        self.dom.lock().unwrap()
    }

    async fn read_delay(&self) {
        let delay = {
            let dom = self.dom();
            dom.region(self).ok().and_then(|track| track.read_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn track_name(&self) -> BrowserResult<String> {
        let dom = self.dom();
        let track = dom.region(self)?;
        Ok(track.track.clone().unwrap_or_default())
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn text(&self, selector: &str) -> BrowserResult<String> {
        self.read_delay().await;
        let dom = self.dom();
        let track = dom.region(self)?;
        dom.field(track, selector).map(|(text, _)| text.to_string())
    }

    async fn attribute(&self, selector: &str, name: &str) -> BrowserResult<Option<String>> {
        self.read_delay().await;
        let dom = self.dom();
        let track = dom.region(self)?;
        let (_, href) = dom.field(track, selector)?;
        Ok((name == "href").then(|| href.to_string()))
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let name = self.track_name()?;
        let mut dom = self.dom();
        if selector != dom.layout.play_control {
            return Err(BrowserError::NotFound(selector.to_string()));
        }
        if dom.reject_play_clicks {
            return Err(BrowserError::WebDriver("element click intercepted".to_string()));
        }
        dom.actions.push(format!("play {}", name));
        if dom.rebuild_during.as_deref() == Some(name.as_str()) {
            let pending = std::mem::take(&mut dom.pending);
            dom.rebuild(pending);
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> BrowserResult<()> {
        let name = self.track_name()?;
        let hangs = {
            let mut dom = self.dom();
            if selector != dom.layout.play_ready {
                return Err(BrowserError::NotFound(selector.to_string()));
            }
            if dom.fail_playback_of.as_deref() == Some(name.as_str()) {
                return Err(BrowserError::WebDriver("stale element reference".to_string()));
            }
            let hangs = dom.hang_playback_of.as_deref() == Some(name.as_str());
            if !hangs {
                dom.actions.push(format!("finished {}", name));
            }
            hangs
        };

        if hangs {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    type Element = FakeElement;

    async fn query_all(&self, selector: &str) -> BrowserResult<Vec<FakeElement>> {
        let mut dom = self.dom();
        if selector != dom.layout.track_region {
            return Ok(Vec::new());
        }
        dom.scans += 1;
        Ok((0..dom.tracks.len())
            .map(|index| FakeElement {
                dom: Arc::clone(&self.dom),
                index,
                generation: dom.generation,
            })
            .collect())
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let mut dom = self.dom();
        if selector == dom.layout.refresh_control {
            dom.refresh_clicks += 1;
            dom.actions.push("refresh".to_string());
            if !dom.refresh_clickable {
                return Err(BrowserError::NotFound(selector.to_string()));
            }
            let pending = std::mem::take(&mut dom.pending);
            if !pending.is_empty() {
                dom.rebuild(pending);
            }
            Ok(())
        } else if selector == dom.layout.advance_control {
            dom.actions.push("advance".to_string());
            Ok(())
        } else if selector == dom.layout.mute_control {
            dom.actions.push("mute".to_string());
            if dom.mute_click_fails {
                return Err(BrowserError::WebDriver("click intercepted".to_string()));
            }
            dom.muted = !dom.muted;
            Ok(())
        } else {
            Err(BrowserError::NotFound(selector.to_string()))
        }
    }

    async fn has_class(&self, selector: &str, class: &str) -> BrowserResult<bool> {
        let dom = self.dom();
        if selector == dom.layout.mute_control {
            Ok(dom.muted && class == dom.layout.muted_class)
        } else {
            Err(BrowserError::NotFound(selector.to_string()))
        }
    }

    async fn wait_for_network_idle(&self) -> BrowserResult<()> {
        self.dom().network_idle_waits += 1;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Option<Duration>) -> BrowserResult<()> {
        let wait = {
            let mut dom = self.dom();
            if selector != dom.layout.refresh_control {
                return Err(BrowserError::NotFound(selector.to_string()));
            }
            dom.notification_waits += 1;
            if !dom.arrivals.is_empty() {
                let batch = dom.arrivals.remove(0);
                dom.pending = batch;
                dom.refresh_clickable = true;
                return Ok(());
            }
            (dom.notification_wait, !dom.pending.is_empty())
        };

        match wait {
            (NotificationWait::SessionClosed, _) => Err(BrowserError::SessionClosed),
            (NotificationWait::WhenAvailable, true) => Ok(()),
            _ => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}
