//! Terminal output while the key listener holds the terminal in raw mode
//!
//! Raw mode turns off output post-processing on Unix, so a bare `\n` no longer
//! returns the carriage. Everything printed by this process goes through
//! [`ConsoleWriter`], which emits `\r\n` instead.

use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{debug, warn};

/// Stdout writer that ends every line with `\r\n`
pub struct ConsoleWriter<W: Write> {
    inner: W,
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

/// `MakeWriter` entry point for the tracing subscriber
pub fn stdout_writer() -> ConsoleWriter<io::Stdout> {
    ConsoleWriter::new(io::stdout())
}

impl<W: Write> Write for ConsoleWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut lines = buf.split(|&b| b == b'\n').peekable();
        while let Some(line) = lines.next() {
            if lines.peek().is_some() {
                self.inner.write_all(line.strip_suffix(b"\r").unwrap_or(line))?;
                self.inner.write_all(b"\r\n")?;
            } else {
                self.inner.write_all(line)?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Print a multi-line block (help text, state dump)
pub fn print_block(text: &str) {
    let mut out = stdout_writer();
    if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
        warn!(error = %e, "Failed to write to terminal");
    }
}

/// Puts the terminal in raw mode for single-key input; restores it on drop
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        crossterm::terminal::enable_raw_mode().context("Failed to switch terminal to raw mode")?;
        debug!("Terminal raw mode enabled");
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            warn!(error = %e, "Failed to restore terminal mode");
        } else {
            debug!("Terminal raw mode disabled");
        }
    }
}
