//! Hype Radio - Main entry point
//!
//! Opens the configured page in an automated browser, runs the playback
//! scheduler, and shows what is playing in the terminal until the user quits.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use hype_common::config::{resolve_config_path, LoggingConfig, RadioConfig, CONFIG_ENV_VAR};
use hype_common::events::RadioEvent;
use hype_radio::browser::{BrowserPage, WebDriverSession};
use hype_radio::keyboard::{Command, KeyCommands, RawModeGuard};
use hype_radio::playback::{
    LinkResolver, PlaybackScheduler, RestartPolicy, SchedulerExit, SoundToggle, TrackExtractor,
};
use hype_radio::presenter::TerminalPresenter;
use hype_radio::SharedState;
use tokio::signal;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for hype-radio
#[derive(Parser, Debug)]
#[command(name = "hype-radio")]
#[command(about = "Plays the latest Hype Machine tracks through an automated browser")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page holding the track list
    #[arg(long, env = "HYPE_RADIO_PAGE_URL")]
    page_url: Option<String>,

    /// WebDriver endpoint
    #[arg(long, env = "HYPE_RADIO_WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Show the browser window
    #[arg(long, env = "HYPE_RADIO_HEADED")]
    headed: bool,
}

impl Args {
    fn apply(&self, config: &mut RadioConfig) {
        if let Some(url) = &self.page_url {
            config.page_url = url.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if self.headed {
            config.browser.headless = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let mut config =
        RadioConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    init_logging(&config.logging)?;

    info!(
        "Starting Hype Radio {} (build {}, {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using defaults"),
    }

    let resolver = LinkResolver::new(&config.http).context("Failed to build HTTP client")?;
    let extractor = TrackExtractor::new(config.layout.clone(), resolver);

    let session = WebDriverSession::launch(&config.browser, &config.page_url)
        .await
        .context("Failed to launch browser session")?;
    info!("Browser session ready");

    let page = Arc::new(session.current_page());
    let shared = Arc::new(SharedState::new());
    let presenter = Arc::new(TerminalPresenter::new());
    let cancel = CancellationToken::new();

    let mut scheduler = PlaybackScheduler::new(
        Arc::clone(&page),
        extractor,
        config.layout.clone(),
        Arc::clone(&shared),
        presenter.clone(),
        cancel.clone(),
    );
    let sound = SoundToggle::new(
        Arc::clone(&page),
        &config.layout,
        Arc::clone(&shared),
        presenter.clone(),
    );

    let raw_mode = RawModeGuard::enable().context("Failed to enter raw mode")?;
    presenter.print_header()?;

    let error_log = tokio::spawn(log_events(shared.subscribe_events()));
    let restart = RestartPolicy::from_config(config.restart_on_error, &config.restart);

    let result = tokio::select! {
        result = drive(&mut scheduler, &restart) => result,
        () = handle_keys(&sound) => Ok(()),
        () = shutdown_signal() => Ok(()),
    };

    cancel.cancel();
    drop(raw_mode);
    error_log.abort();

    if let Err(e) = session.close().await {
        warn!("Failed to close browser session: {}", e);
    }
    info!("Shutdown complete");

    result.context("Playback stopped")
}

/// Log to the configured file; the terminal belongs to the presenter
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    if let Some(dir) = logging.log_file.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }
    let file = std::fs::File::create(&logging.log_file)
        .with_context(|| format!("Failed to open log file {}", logging.log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logging.level.as_str().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

/// Run the scheduler, restarting it after failures if configured
///
/// Once it halts the last state stays on screen until the user quits.
async fn drive<P: BrowserPage>(
    scheduler: &mut PlaybackScheduler<P>,
    restart: &RestartPolicy,
) -> hype_radio::Result<()> {
    match scheduler.run_supervised(restart).await? {
        SchedulerExit::Cancelled => Ok(()),
        SchedulerExit::Failed(_) => {
            info!("Playback halted; press q to quit");
            std::future::pending().await
        }
    }
}

/// Error channel and event subscriber
async fn log_events(mut rx: broadcast::Receiver<RadioEvent>) {
    loop {
        match rx.recv().await {
            Ok(RadioEvent::PlaybackFailed { message, .. }) => error!("{}", message),
            Ok(event) => debug!("Event: {:?}", event),
            Err(RecvError::Lagged(skipped)) => warn!("Event log skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

async fn handle_keys<P: BrowserPage>(sound: &SoundToggle<P>) {
    let mut keys = KeyCommands::new();
    while let Some(command) = keys.next().await {
        match command {
            Command::ToggleMute => {
                if let Err(e) = sound.toggle().await {
                    warn!("Mute toggle failed: {}", e);
                }
            }
            Command::Quit => {
                info!("Quit requested");
                return;
            }
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
