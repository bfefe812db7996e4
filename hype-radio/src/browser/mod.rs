//! Browser capabilities consumed by the player
//!
//! The playback core only needs a handful of page operations: list the track
//! regions, read fields out of one region, click things, and wait for the
//! page to change. They are expressed as two traits so the core can run
//! against a real WebDriver session ([`webdriver`]) or a scripted fake in
//! tests.
//!
//! Selectors are an opaque layout contract supplied by configuration; nothing
//! in this module interprets them.

pub mod webdriver;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use webdriver::{WebDriverElement, WebDriverPage, WebDriverSession};

/// Result type for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Browser operation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrowserError {
    /// No element matched the selector
    #[error("Element not found: {0}")]
    NotFound(String),

    /// A bounded wait expired
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The session was torn down while an operation was pending
    #[error("Browser session closed")]
    SessionClosed,

    /// Any other driver-reported failure (stale element, script error, ...)
    #[error("WebDriver error: {0}")]
    WebDriver(String),
}

/// Handle to one element of the live document
///
/// Handles are invalidated whenever the page replaces the element; operations
/// on a stale handle fail.
#[async_trait]
pub trait PageElement: Clone + fmt::Debug + Send + Sync + 'static {
    /// Text content of the first descendant matching `selector`
    async fn text(&self, selector: &str) -> BrowserResult<String>;

    /// Property `name` of the first descendant matching `selector`
    ///
    /// For `href` this is the resolved absolute URL, as the page sees it.
    async fn attribute(&self, selector: &str, name: &str) -> BrowserResult<Option<String>>;

    /// Click the first descendant matching `selector`
    async fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Wait, without timeout, until a descendant matches `selector`
    async fn wait_for(&self, selector: &str) -> BrowserResult<()>;
}

/// The single page the player drives
#[async_trait]
pub trait BrowserPage: Send + Sync + 'static {
    type Element: PageElement;

    /// All elements matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> BrowserResult<Vec<Self::Element>>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Whether the first element matching `selector` carries `class`
    async fn has_class(&self, selector: &str, class: &str) -> BrowserResult<bool>;

    /// Wait until the page's network activity has settled
    async fn wait_for_network_idle(&self) -> BrowserResult<()>;

    /// Wait until an element matches `selector`; `None` waits forever
    async fn wait_for_selector(&self, selector: &str, timeout: Option<Duration>) -> BrowserResult<()>;
}
