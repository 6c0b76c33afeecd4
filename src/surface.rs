//! Targets that display text content and can have it replaced

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};

use crate::codepoints::codepoint_len;

/// Something with a settable visible text content
pub trait Surface {
    fn content(&self) -> String;

    fn set_content(&mut self, text: &str) -> Result<()>;
}

/// Surface shared between the playback loop and whoever renders frames
pub type SharedSurface = Arc<Mutex<dyn Surface + Send>>;

/// Wrap a surface so it can be handed to actions and frame schedulers
pub fn shared<S: Surface + Send + 'static>(surface: S) -> SharedSurface {
    Arc::new(Mutex::new(surface))
}

/// Read the content of a shared surface
pub fn read_content(surface: &SharedSurface) -> Result<String> {
    let guard = surface
        .lock()
        .map_err(|_| anyhow!("Surface lock poisoned"))?;
    Ok(guard.content())
}

/// In-memory surface that remembers every content it was given
#[derive(Debug, Default, Clone)]
pub struct TextBuffer {
    content: String,
    history: Vec<String>,
}

impl TextBuffer {
    pub fn new(initial: impl Into<String>) -> Self {
        TextBuffer {
            content: initial.into(),
            history: Vec::new(),
        }
    }

    /// Every content set so far, in order
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Surface for TextBuffer {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_content(&mut self, text: &str) -> Result<()> {
        self.content = text.to_string();
        self.history.push(self.content.clone());
        Ok(())
    }
}

/// Paints content in place on a terminal, overwriting what it painted last time
pub struct TerminalLine<W: Write> {
    out: W,
    content: String,
    /// Fixed column count; the terminal is asked on every paint when unset
    width: Option<u16>,
    /// Rows occupied by the last paint, wrapped lines included
    painted_lines: usize,
}

impl<W: Write> TerminalLine<W> {
    pub fn new(out: W) -> Self {
        TerminalLine {
            out,
            content: String::new(),
            width: None,
            painted_lines: 1,
        }
    }

    /// Paint as if the terminal were always `width` columns wide
    pub fn with_width(out: W, width: u16) -> Self {
        TerminalLine {
            width: Some(width),
            ..Self::new(out)
        }
    }

    fn columns(&self) -> Option<u16> {
        self.width
            .or_else(|| terminal::size().ok().map(|(columns, _)| columns))
    }
}

/// Rows `text` takes up on a terminal `columns` wide
///
/// Every line takes at least one row. Without a known width lines are assumed not to wrap.
pub fn rows_needed(text: &str, columns: Option<u16>) -> usize {
    text.split('\n')
        .map(|line| match columns {
            Some(columns) if columns > 0 => {
                codepoint_len(line).div_ceil(usize::from(columns)).max(1)
            }
            _ => 1,
        })
        .sum()
}

impl<W: Write> Surface for TerminalLine<W> {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_content(&mut self, text: &str) -> Result<()> {
        queue!(self.out, MoveToColumn(0)).context("Failed to move cursor")?;
        if self.painted_lines > 1 {
            let up = u16::try_from(self.painted_lines - 1).unwrap_or(u16::MAX);
            queue!(self.out, MoveUp(up)).context("Failed to move cursor")?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown), Print(text))
            .context("Failed to paint terminal line")?;
        self.out.flush().context("Failed to flush terminal")?;

        self.content = text.to_string();
        self.painted_lines = rows_needed(text, self.columns());
        Ok(())
    }
}
