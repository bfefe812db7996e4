//! Keyboard commands
//!
//! The terminal runs in raw mode so single key presses arrive immediately;
//! Ctrl-C therefore arrives as a key, not as SIGINT.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use std::io;
use tracing::warn;

/// User commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleMute,
    Quit,
}

/// Command bound to a key press, if any
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(Command::ToggleMute),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        _ => None,
    }
}

/// Stream of commands from terminal input
pub struct KeyCommands {
    events: EventStream,
}

impl KeyCommands {
    pub fn new() -> Self {
        Self {
            events: EventStream::new(),
        }
    }

    /// Next command; `None` once input is closed or unreadable
    pub async fn next(&mut self) -> Option<Command> {
        while let Some(event) = self.events.next().await {
            match event {
                Ok(Event::Key(key)) => {
                    if let Some(command) = command_for(&key) {
                        return Some(command);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Terminal input failed: {}", e);
                    return None;
                }
            }
        }
        None
    }
}

impl Default for KeyCommands {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw mode for as long as the guard lives
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}
