use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display io: {0}")]
    Io(#[from] io::Error),
    #[error("display rejected write: {0}")]
    Js(String),
}

/// The glyph surface we draw on (xterm.js in the browser, stdout natively).
/// Text is opaque here; escape sequences are already baked in.
pub trait Display {
    fn write(&mut self, text: &str) -> Result<(), DisplayError>;

    fn write_line(&mut self, text: &str) -> Result<(), DisplayError>;

    fn clear(&mut self) -> Result<(), DisplayError>;

    fn resize_to_fit(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Plain stdout, used by the native repl.
#[derive(Debug, Default)]
pub struct StdoutDisplay;

impl Display for StdoutDisplay {
    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", text)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        // ED2 + cursor home
        self.write("\x1b[2J\x1b[H")
    }
}

/// Everything the core asked the display to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Write(String),
    Line(String),
    Clear,
}

/// In-memory surface. Keeps an op log and can be told to fail writes.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub ops: Vec<DisplayOp>,
    pub fail_writes: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// text of every full line written since the last clear
    pub fn lines(&self) -> Vec<String> {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DisplayOp::Clear)
            .map_or(0, |i| i + 1);
        self.ops[start..]
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Line(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// all writes concatenated as a terminal would see them
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            match op {
                DisplayOp::Write(text) => out.push_str(text),
                DisplayOp::Line(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                DisplayOp::Clear => out.clear(),
            }
        }
        out
    }
}

impl Display for RecordingDisplay {
    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.fail_writes {
            return Err(DisplayError::Js("write refused".to_string()));
        }
        self.ops.push(DisplayOp::Write(text.to_string()));
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.fail_writes {
            return Err(DisplayError::Js("write refused".to_string()));
        }
        self.ops.push(DisplayOp::Line(text.to_string()));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.ops.push(DisplayOp::Clear);
        Ok(())
    }
}
