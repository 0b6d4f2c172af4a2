use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::IsTerminal;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::console::RawModeGuard;
use crate::constants::{input, keys};

/// Operator commands, one key each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    NextImage,
    PreviousImage,
    NextCollection,
    PreviousCollection,
    ShuffleImages,
    ShuffleCollections,
    Help,
    DebugState,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::NextImage,
        Command::PreviousImage,
        Command::NextCollection,
        Command::PreviousCollection,
        Command::ShuffleImages,
        Command::ShuffleCollections,
        Command::Help,
        Command::DebugState,
        Command::Quit,
    ];

    pub fn from_key(key: char) -> Option<Self> {
        Command::ALL.into_iter().find(|command| command.key() == key)
    }

    pub fn key(&self) -> char {
        match self {
            Command::Quit => keys::QUIT,
            Command::NextImage => keys::NEXT_IMAGE,
            Command::PreviousImage => keys::PREVIOUS_IMAGE,
            Command::NextCollection => keys::NEXT_COLLECTION,
            Command::PreviousCollection => keys::PREVIOUS_COLLECTION,
            Command::ShuffleImages => keys::SHUFFLE_IMAGES,
            Command::ShuffleCollections => keys::SHUFFLE_COLLECTIONS,
            Command::Help => keys::HELP,
            Command::DebugState => keys::DEBUG_STATE,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Quit => "quit",
            Command::NextImage => "next image",
            Command::PreviousImage => "previous image",
            Command::NextCollection => "next collection",
            Command::PreviousCollection => "previous collection",
            Command::ShuffleImages => "shuffle remaining images",
            Command::ShuffleCollections => "shuffle remaining collections",
            Command::Help => "show this list",
            Command::DebugState => "print engine state",
        }
    }
}

/// Command list printed on startup and for the help key
pub fn help_text() -> String {
    let mut text = String::from("Commands:");
    for command in Command::ALL {
        text.push_str(&format!("\n  {}  {}", command.key(), command.description()));
    }
    text
}

/// Spawn the blocking key listener.
///
/// Each printable key press is forwarded as a `char`. The listener exits when
/// the receiving side is dropped.
pub fn spawn_listener(sender: Sender<char>) -> Result<JoinHandle<()>> {
    if !check_terminal() {
        anyhow::bail!("stdin is not a terminal, interactive commands are unavailable");
    }

    let handle = tokio::task::spawn_blocking(move || {
        info!("Key listener started");
        if let Err(e) = listen_for_keys(sender) {
            error!(error = %e, "Key listener error");
        }
        debug!("Key listener stopped");
    });
    Ok(handle)
}

/// Poll the terminal for key presses until the loop goes away
fn listen_for_keys(sender: Sender<char>) -> Result<()> {
    let _raw = RawModeGuard::enable()?;
    let poll_interval = Duration::from_millis(input::POLL_INTERVAL_MS);

    loop {
        if sender.is_closed() {
            return Ok(());
        }

        if !event::poll(poll_interval).context("Failed to poll terminal events")? {
            continue;
        }

        let Event::Key(key) = event::read().context("Failed to read terminal event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let pressed = match key.code {
            // Raw mode swallows SIGINT, so Ctrl+C has to be handled here
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => keys::QUIT,
            KeyCode::Char(c) => c,
            other => {
                debug!(key = ?other, "Ignoring non-character key");
                continue;
            }
        };

        debug!(key = %pressed, "Key pressed");
        if sender.blocking_send(pressed).is_err() {
            return Ok(());
        }
    }
}

/// Interactive commands need stdin attached to a terminal
pub fn check_terminal() -> bool {
    std::io::stdin().is_terminal()
}

/// Print helpful message if commands are unavailable
pub fn print_terminal_warning() {
    warn!("stdin is not a terminal, interactive commands are disabled");
    warn!(continuing = true, "Continuing with timed rotation only (stop with Ctrl+C)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_round_trips_through_its_key() {
        for command in Command::ALL {
            assert_eq!(Command::from_key(command.key()), Some(command));
        }
    }

    #[test]
    fn test_keys_are_distinct_and_case_sensitive() {
        let mut seen: Vec<char> = Command::ALL.iter().map(Command::key).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), Command::ALL.len());
        assert_eq!(Command::from_key('n'), Some(Command::NextImage));
        assert_eq!(Command::from_key('N'), Some(Command::NextCollection));
        assert_eq!(Command::from_key('x'), None);
    }

    #[test]
    fn test_help_lists_every_key() {
        let text = help_text();
        for command in Command::ALL {
            assert!(text.contains(command.description()));
        }
    }
}
