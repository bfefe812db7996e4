//! Mute toggle
//!
//! Runs alongside the scheduler in response to user input. It touches only
//! the mute flag and the render call, never the track pointers.

use crate::browser::{BrowserPage, BrowserResult};
use crate::presenter::Presenter;
use crate::state::SharedState;
use hype_common::events::RadioEvent;
use hype_common::PageLayout;
use std::sync::Arc;
use tracing::debug;

pub struct SoundToggle<P: BrowserPage> {
    page: Arc<P>,
    mute_control: String,
    muted_class: String,
    shared: Arc<SharedState>,
    presenter: Arc<dyn Presenter>,
}

impl<P: BrowserPage> SoundToggle<P> {
    pub fn new(
        page: Arc<P>,
        layout: &PageLayout,
        shared: Arc<SharedState>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            page,
            mute_control: layout.mute_control.clone(),
            muted_class: layout.muted_class.clone(),
            shared,
            presenter,
        }
    }

    /// Toggle page sound, returning the new mute flag
    ///
    /// The indicator is read before clicking: the page updates it
    /// asynchronously, so only the pre-click state is reliable. The flag is
    /// the inverse of that reading.
    pub async fn toggle(&self) -> BrowserResult<bool> {
        let was_muted = self
            .page
            .has_class(&self.mute_control, &self.muted_class)
            .await?;
        self.shared.set_muted(was_muted).await;

        self.page.click(&self.mute_control).await?;

        let muted = !was_muted;
        let view = self.shared.set_muted(muted).await;
        self.presenter.render(&view);
        self.shared.broadcast_event(RadioEvent::mute_toggled(muted));

        debug!("Sound {}", if muted { "muted" } else { "unmuted" });
        Ok(muted)
    }
}
