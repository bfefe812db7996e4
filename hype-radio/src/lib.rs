//! # Hype Radio Player Library (hype-radio)
//!
//! Plays a live, externally curated track list by driving a browser session
//! pointed at one page.
//!
//! **Purpose:** Extract track records from the live page, track which song is
//! current while the page's list shifts, decide when to refresh versus wait,
//! and resolve each track's obfuscated download link to a canonical URL.
//!
//! **Architecture:** `browser` (page capabilities + WebDriver adapter) →
//! `playback` (resolver, extractor, queue, scheduler) → `presenter`

pub mod browser;
pub mod error;
pub mod keyboard;
pub mod playback;
pub mod presenter;
pub mod state;

pub use error::{Error, Result};
pub use state::SharedState;
