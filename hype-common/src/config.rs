//! Configuration loading and config file resolution
//!
//! Every field has a compiled default so a partial (or absent) TOML file
//! still yields a complete [`RadioConfig`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "HYPE_RADIO_CONFIG";

/// Default page the player drives
pub const DEFAULT_PAGE_URL: &str = "https://hypem.com/latest";

/// Complete player configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RadioConfig {
    /// Page holding the live track list
    pub page_url: String,
    pub browser: BrowserConfig,
    pub http: HttpConfig,
    pub layout: PageLayout,
    pub logging: LoggingConfig,
    /// Re-invoke the scheduler after a fatal playback error instead of
    /// leaving the last state on screen
    pub restart_on_error: bool,
    /// Backoff between those restarts
    pub restart: RestartConfig,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            browser: BrowserConfig::default(),
            http: HttpConfig::default(),
            layout: PageLayout::default(),
            logging: LoggingConfig::default(),
            restart_on_error: false,
            restart: RestartConfig::default(),
        }
    }
}

/// Automated browser session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint to connect to
    pub webdriver_url: String,
    /// Driver executable to spawn before connecting (None = already running)
    pub driver_path: Option<PathBuf>,
    pub headless: bool,
    /// Interval between checks of element-scoped waits
    pub poll_interval_ms: u64,
    /// Quiet period after which page network activity counts as settled
    pub network_idle_ms: u64,
    /// Upper bound on a network idle wait
    pub network_idle_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            driver_path: None,
            headless: true,
            poll_interval_ms: 250,
            network_idle_ms: 500,
            network_idle_timeout_ms: 30_000,
        }
    }
}

impl BrowserConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.network_idle_timeout_ms)
    }

    /// Port of the WebDriver endpoint, used when spawning the driver
    pub fn webdriver_port(&self) -> Option<u16> {
        let rest = self.webdriver_url.rsplit(':').next()?;
        rest.trim_end_matches('/').parse().ok()
    }
}

/// Restart backoff after fatal playback errors
///
/// The delay doubles after each consecutive failure up to `max_delay_ms`.
/// After `max_attempts` consecutive restarts playback stays halted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RestartConfig {
    pub delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1_000,
            max_delay_ms: 60_000,
            max_attempts: 5,
        }
    }
}

impl RestartConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Settings for the download-link resolution request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: concat!("hype-radio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Selectors making up the page layout contract
///
/// Element-scoped selectors (`artist`, `track`, `download`, `download_extra`,
/// `play_control`, `play_ready`) are evaluated relative to one track region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageLayout {
    pub track_region: String,
    pub artist: String,
    pub track: String,
    pub download: String,
    pub download_extra: String,
    pub play_control: String,
    /// Matches the play control once the track can be played again
    pub play_ready: String,
    /// Shown when new tracks are available; clicking it refreshes the list
    pub refresh_control: String,
    /// Global player control advancing to the next track
    pub advance_control: String,
    pub mute_control: String,
    /// Class present on the mute control while sound is muted
    pub muted_class: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            track_region: "div.section.section-track".to_string(),
            artist: "a.artist".to_string(),
            track: "a.track".to_string(),
            download: "span.download > a".to_string(),
            download_extra: "span.download-extra > a".to_string(),
            play_control: ".play-ctrl".to_string(),
            play_ready: ".play-ctrl.play".to_string(),
            refresh_control: "#track-notification".to_string(),
            advance_control: "a#playerPlay".to_string(),
            mute_control: "#player-volume-mute".to_string(),
            muted_class: "icon-speaker-mute".to_string(),
        }
    }
}

/// Log sink settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// File receiving log output (the terminal is used for display)
    pub log_file: PathBuf,
    /// Filter used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: default_data_dir().join("debug.log"),
            level: "hype_radio=debug,hype_common=info".to_string(),
        }
    }
}

impl RadioConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would turn waits into busy loops
    pub fn validate(&self) -> Result<()> {
        if self.browser.poll_interval_ms == 0 {
            return Err(Error::Config(
                "browser.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.restart.delay_ms == 0 {
            return Err(Error::Config(
                "restart.delay_ms must be at least 1".to_string(),
            ));
        }
        if self.restart.max_delay_ms < self.restart.delay_ms {
            return Err(Error::Config(
                "restart.max_delay_ms must not be below restart.delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from `path`
    ///
    /// A missing file is not an error: defaults are returned and a warning
    /// is logged. A file that exists but does not parse is `Error::Config`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Config file resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Per-user config file, if it exists
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_file().filter(|path| path.exists())
}

/// `<config_dir>/hype-radio/config.toml` for the platform
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hype-radio").join("config.toml"))
}

/// OS-dependent data directory for the log file
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hype-radio"))
        .unwrap_or_else(|| PathBuf::from("."))
}
