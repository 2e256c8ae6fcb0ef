use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub trait ClipboardSink {
    fn name(&self) -> &'static str;
    fn set_text(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied { via: &'static str },
    /// Nothing to copy yet.
    Empty,
    Failed(String),
}

/// Desktop clipboard.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSink for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().context("clipboard unavailable")?);
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err(anyhow!("clipboard unavailable"));
        };
        if let Err(err) = clipboard.set_text(text.to_string()) {
            // Drop the handle so the next copy reconnects.
            self.inner = None;
            return Err(anyhow!("clipboard write failed: {err}"));
        }
        Ok(())
    }
}

/// Terminal clipboard via the OSC 52 escape sequence. Works over SSH and inside
/// tmux when passthrough is enabled.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ClipboardSink for Osc52Clipboard<W> {
    fn name(&self) -> &'static str {
        "osc52"
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{}", osc52_sequence(text)).context("write osc52 sequence")?;
        self.out.flush().context("flush osc52 sequence")?;
        Ok(())
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Tries each sink in order until one accepts the text.
#[derive(Default)]
pub struct ClipboardChain {
    sinks: Vec<Box<dyn ClipboardSink>>,
}

impl ClipboardChain {
    pub fn new(sinks: Vec<Box<dyn ClipboardSink>>) -> Self {
        Self { sinks }
    }

    pub fn system_with_terminal_fallback() -> Self {
        Self::new(vec![
            Box::new(SystemClipboard::new()),
            Box::new(Osc52Clipboard::stdout()),
        ])
    }

    pub fn copy(&mut self, text: &str) -> CopyOutcome {
        if text.trim().is_empty() {
            return CopyOutcome::Empty;
        }
        let mut errors = Vec::new();
        for sink in &mut self.sinks {
            match sink.set_text(text) {
                Ok(()) => return CopyOutcome::Copied { via: sink.name() },
                Err(err) => errors.push(format!("{}: {err:#}", sink.name())),
            }
        }
        if errors.is_empty() {
            return CopyOutcome::Failed("no clipboard configured".to_string());
        }
        CopyOutcome::Failed(errors.join("; "))
    }
}
