//! Test helper modules for hype-radio integration tests
//!
//! - FakePage: scripted page implementing the browser capabilities
//! - RecordingPresenter: keeps every rendered snapshot
//! - LinkServer: local download-link endpoint
//! - scheduler(): scheduler wired to a fake page

#![allow(dead_code)]

pub mod fake_browser;
pub mod link_server;

pub use fake_browser::{FakeElement, FakePage, FakeTrack, NotificationWait};
pub use link_server::LinkServer;

use hype_common::config::HttpConfig;
use hype_common::events::NowPlaying;
use hype_common::PageLayout;
use hype_radio::playback::{LinkResolver, PlaybackScheduler, TrackExtractor};
use hype_radio::presenter::Presenter;
use hype_radio::SharedState;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Presenter that records every snapshot it is given
#[derive(Default)]
pub struct RecordingPresenter {
    views: Mutex<Vec<NowPlaying>>,
}

impl RecordingPresenter {
    pub fn views(&self) -> Vec<NowPlaying> {
        self.views.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<NowPlaying> {
        self.views.lock().unwrap().last().cloned()
    }

    /// Current track name of every render (`None` = waiting)
    pub fn current_names(&self) -> Vec<Option<String>> {
        self.views()
            .into_iter()
            .map(|v| v.current.map(|t| t.track_name))
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, view: &NowPlaying) {
        self.views.lock().unwrap().push(view.clone());
    }
}

pub fn extractor() -> TrackExtractor {
    let resolver = LinkResolver::new(&HttpConfig::default()).unwrap();
    TrackExtractor::new(PageLayout::default(), resolver)
}

/// Everything a scheduler test needs to observe
pub struct Harness {
    pub page: FakePage,
    pub shared: Arc<SharedState>,
    pub presenter: Arc<RecordingPresenter>,
    pub cancel: CancellationToken,
    pub scheduler: PlaybackScheduler<FakePage>,
}

pub fn scheduler(page: &FakePage) -> Harness {
    let shared = Arc::new(SharedState::new());
    let presenter = Arc::new(RecordingPresenter::default());
    let cancel = CancellationToken::new();
    let scheduler = PlaybackScheduler::new(
        Arc::new(page.clone()),
        extractor(),
        PageLayout::default(),
        Arc::clone(&shared),
        presenter.clone(),
        cancel.clone(),
    );

    Harness {
        page: page.clone(),
        shared,
        presenter,
        cancel,
        scheduler,
    }
}

/// Tracks `T1..=Tn` by artist "A", oldest first
pub fn numbered(range: std::ops::RangeInclusive<u32>) -> Vec<FakeTrack> {
    range.map(|n| FakeTrack::new("A", &format!("T{}", n))).collect()
}
