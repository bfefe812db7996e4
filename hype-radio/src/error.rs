//! Error types for hype-radio
//!
//! Playback failures are not errors here: they travel as `Outcome::Fatal`
//! and are reported on the event channel.

use crate::browser::BrowserError;
use thiserror::Error;

/// Main error type for hype-radio
#[derive(Error, Debug)]
pub enum Error {
    /// Browser session errors outside of active playback
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience Result type using hype-radio Error
pub type Result<T> = std::result::Result<T, Error>;
