//! WebDriver adapter for the browser capabilities
//!
//! Connects to a chromedriver-compatible endpoint with fantoccini, optionally
//! spawning the driver first. WebDriver has no push notifications for DOM or
//! network changes, so element-scoped waits and network idle are polled at
//! the configured interval.

use super::{BrowserError, BrowserPage, BrowserResult, PageElement};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use hype_common::config::BrowserConfig;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

const CONNECT_ATTEMPTS: u32 = 20;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(150);

const CLICK_SCRIPT: &str = "const el = document.querySelector(arguments[0]); \
     if (!el) { throw new Error('no element matches ' + arguments[0]); } \
     el.click();";

const ELEMENT_CLICK_SCRIPT: &str = "arguments[0].click();";

const RESOURCE_COUNT_SCRIPT: &str = "return performance.getEntriesByType('resource').length;";

impl From<CmdError> for BrowserError {
    fn from(err: CmdError) -> Self {
        match err {
            e if is_absent(&e) => BrowserError::NotFound(e.to_string()),
            CmdError::WaitTimeout => BrowserError::Timeout("wait condition".to_string()),
            CmdError::Lost(_) => BrowserError::SessionClosed,
            other => BrowserError::WebDriver(other.to_string()),
        }
    }
}

/// The driver reported that no element matched
fn is_absent(err: &CmdError) -> bool {
    err.is_no_such_element()
}

#[derive(Debug, Clone, Copy)]
struct PollTiming {
    poll_interval: Duration,
    network_idle: Duration,
    network_idle_timeout: Duration,
}

impl From<&BrowserConfig> for PollTiming {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            network_idle: config.network_idle(),
            network_idle_timeout: config.network_idle_timeout(),
        }
    }
}

/// An automated browser session and, if we started it, its driver process
pub struct WebDriverSession {
    client: Client,
    driver: Option<Child>,
    timing: PollTiming,
}

impl WebDriverSession {
    /// Start a session and load `page_url`
    ///
    /// Returns once the page's network activity has settled.
    pub async fn launch(config: &BrowserConfig, page_url: &str) -> BrowserResult<Self> {
        let driver = match &config.driver_path {
            Some(path) => Some(spawn_driver(path, config)?),
            None => None,
        };

        let client = connect(config, driver.is_some()).await?;
        let session = Self {
            client,
            driver,
            timing: PollTiming::from(config),
        };

        info!("Opening {}", page_url);
        session.client.goto(page_url).await?;
        session.current_page().wait_for_network_idle().await?;
        Ok(session)
    }

    /// The page the session was opened on
    pub fn current_page(&self) -> WebDriverPage {
        WebDriverPage {
            client: self.client.clone(),
            timing: self.timing,
        }
    }

    /// Close the session; pending page operations fail afterwards
    pub async fn close(self) -> BrowserResult<()> {
        let Self { client, driver, .. } = self;
        let result = client.close().await;
        if let Some(mut child) = driver {
            if let Err(e) = child.kill().await {
                warn!("Failed to stop webdriver process: {}", e);
            }
        }
        result.map_err(BrowserError::from)
    }
}

fn spawn_driver(path: &std::path::Path, config: &BrowserConfig) -> BrowserResult<Child> {
    let mut command = Command::new(path);
    if let Some(port) = config.webdriver_port() {
        command.arg(format!("--port={}", port));
    }
    command.kill_on_drop(true);

    info!("Starting webdriver {}", path.display());
    command
        .spawn()
        .map_err(|e| BrowserError::WebDriver(format!("failed to start {}: {}", path.display(), e)))
}

async fn connect(config: &BrowserConfig, retry: bool) -> BrowserResult<Client> {
    let attempts = if retry { CONNECT_ATTEMPTS } else { 1 };
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match ClientBuilder::native()
            .capabilities(chrome_capabilities(config))
            .connect(&config.webdriver_url)
            .await
        {
            Ok(client) => {
                debug!("Connected to webdriver at {}", config.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                debug!("Webdriver connect attempt {} failed: {}", attempt, e);
                last_error = e.to_string();
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }

    Err(BrowserError::WebDriver(format!(
        "failed to connect to webdriver at {}: {}",
        config.webdriver_url, last_error
    )))
}

/// Chrome capabilities: audio must play without a user gesture and unmuted
fn chrome_capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let mut args = vec!["--autoplay-policy=no-user-gesture-required".to_string()];
    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "excludeSwitches": ["mute-audio"],
        }),
    );
    caps
}

/// The page of a [`WebDriverSession`]
#[derive(Clone)]
pub struct WebDriverPage {
    client: Client,
    timing: PollTiming,
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    type Element = WebDriverElement;

    async fn query_all(&self, selector: &str) -> BrowserResult<Vec<WebDriverElement>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements
            .into_iter()
            .map(|element| WebDriverElement {
                element,
                client: self.client.clone(),
                poll_interval: self.timing.poll_interval,
            })
            .collect())
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        self.client
            .execute(CLICK_SCRIPT, vec![json!(selector)])
            .await?;
        Ok(())
    }

    async fn has_class(&self, selector: &str, class: &str) -> BrowserResult<bool> {
        let element = self.client.find(Locator::Css(selector)).await?;
        let classes = element.attr("class").await?.unwrap_or_default();
        Ok(classes.split_whitespace().any(|c| c == class))
    }

    async fn wait_for_network_idle(&self) -> BrowserResult<()> {
        let deadline = Instant::now() + self.timing.network_idle_timeout;
        let mut last_count = None;
        let mut quiet = Duration::ZERO;

        loop {
            let count = self
                .client
                .execute(RESOURCE_COUNT_SCRIPT, vec![])
                .await?
                .as_u64();

            if count.is_some() && count == last_count {
                quiet += self.timing.poll_interval;
            } else {
                quiet = Duration::ZERO;
                last_count = count;
            }

            if quiet >= self.timing.network_idle {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout("network idle".to_string()));
            }
            tokio::time::sleep(self.timing.poll_interval).await;
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Option<Duration>) -> BrowserResult<()> {
        let wait = self.client.wait().every(self.timing.poll_interval);
        let wait = match timeout {
            Some(limit) => wait.at_most(limit),
            None => wait.forever(),
        };

        match wait.for_element(Locator::Css(selector)).await {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(BrowserError::Timeout(selector.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// An element handle obtained from a [`WebDriverPage`]
#[derive(Debug, Clone)]
pub struct WebDriverElement {
    element: Element,
    client: Client,
    poll_interval: Duration,
}

impl WebDriverElement {
    async fn child(&self, selector: &str) -> BrowserResult<Element> {
        Ok(self.element.find(Locator::Css(selector)).await?)
    }
}

#[async_trait]
impl PageElement for WebDriverElement {
    async fn text(&self, selector: &str) -> BrowserResult<String> {
        let child = self.child(selector).await?;
        Ok(child.prop("textContent").await?.unwrap_or_default())
    }

    async fn attribute(&self, selector: &str, name: &str) -> BrowserResult<Option<String>> {
        let child = self.child(selector).await?;
        Ok(child.prop(name).await?)
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let child = self.child(selector).await?;
        let target = serde_json::to_value(&child)
            .map_err(|e| BrowserError::WebDriver(format!("element reference: {}", e)))?;
        self.client.execute(ELEMENT_CLICK_SCRIPT, vec![target]).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> BrowserResult<()> {
        loop {
            match self.element.find(Locator::Css(selector)).await {
                Ok(_) => return Ok(()),
                Err(e) if is_absent(&e) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
