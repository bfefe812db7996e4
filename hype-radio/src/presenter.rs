//! Status display
//!
//! The scheduler and the mute toggle hand every new [`NowPlaying`] snapshot
//! to a [`Presenter`]. Rendering is informational; nothing reads it back.

use crossterm::cursor::MoveTo;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use hype_common::events::{NowPlaying, TrackSummary};
use std::io::{self, Write};
use tracing::warn;

/// Terminal row where the track block starts, below the header
const TRACKS_ROW: u16 = 6;

/// Receives every state change of the player
pub trait Presenter: Send + Sync {
    fn render(&self, view: &NowPlaying);
}

/// Renders to the terminal (stdout, raw mode)
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }

    /// Clear the screen and draw the title and command help
    pub fn print_header(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        execute!(
            out,
            MoveTo(0, 0),
            Clear(ClearType::FromCursorDown),
            Print(header_lines().join("\r\n")),
            Print("\r\n")
        )
    }

    fn draw(&self, view: &NowPlaying) -> io::Result<()> {
        let mut out = io::stdout().lock();
        queue!(
            out,
            MoveTo(0, TRACKS_ROW),
            Clear(ClearType::FromCursorDown),
            Print(compose(view).join("\r\n")),
            Print("\r\n")
        )?;
        out.flush()
    }
}

impl Presenter for TerminalPresenter {
    fn render(&self, view: &NowPlaying) {
        if let Err(e) = self.draw(view) {
            warn!("Failed to render status: {}", e);
        }
    }
}

fn header_lines() -> Vec<String> {
    vec![
        "Hype Radio".bold().magenta().to_string(),
        String::new(),
        "Commands:".bold().to_string(),
        "  m - (un)mute".to_string(),
        "  q - quit".to_string(),
    ]
}

fn describe(track: &TrackSummary) -> String {
    format!("\"{}\" by {}", track.track_name, track.artist_name)
}

fn link_lines(track: &TrackSummary) -> impl Iterator<Item = String> + '_ {
    track
        .downloadable_links()
        .map(|link| format!("{}: {}", link.label, link.href))
}

/// Lines of the track block for `view`
pub fn compose(view: &NowPlaying) -> Vec<String> {
    let mut lines = Vec::new();

    match &view.current {
        Some(current) => {
            let sound = if view.muted { "🔇" } else { "🔊" };
            lines.push(format!(
                "{} {} {}",
                "Now playing:".bold().green(),
                describe(current),
                sound.slow_blink()
            ));
            lines.extend(link_lines(current));
        }
        None => lines.push("Waiting for next track...".bold().cyan().to_string()),
    }

    if let Some(previous) = &view.previous {
        lines.push(String::new());
        lines.push(format!("{} {}", "Previously:".yellow(), describe(previous)));
        lines.extend(link_lines(previous));
    }

    if let Some(next) = &view.next {
        lines.push(String::new());
        lines.push(format!("{} {}", "Next up:".cyan(), describe(next)));
    }

    lines
}
