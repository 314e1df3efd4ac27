// styled text model + the one place that knows about escape sequences
// everything upstream only deals in StyleTag, the display adapter turns
// tags into ansi via `resolve`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    #[default]
    Plain,
    Error,
    Success,
    Info,
    Warning,
    Muted,
    /// markdown header, level 1..=3
    Heading(u8),
    Strong,
    Emphasis,
    Link,
    Code,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: StyleTag,
}

impl Span {
    pub fn new(text: impl Into<String>, style: StyleTag) -> Self {
        Self { text: text.into(), style }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, StyleTag::Plain)
    }
}

/// One output line made of styled spans. Carries no newline itself; the
/// write scheduler decides whether it ends the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<Span>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// whole line in a single style
    pub fn styled(text: impl Into<String>, style: StyleTag) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::new();
        }
        Self { spans: vec![Span::new(text, style)] }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, StyleTag::Plain)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::styled(text, StyleTag::Error)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::styled(text, StyleTag::Success)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::styled(text, StyleTag::Info)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::styled(text, StyleTag::Warning)
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self::styled(text, StyleTag::Muted)
    }

    pub fn blank() -> Self {
        Self::new()
    }

    /// builder-style append, skips empty text
    pub fn push(mut self, text: impl Into<String>, style: StyleTag) -> Self {
        self.push_span(Span::new(text, style));
        self
    }

    pub fn push_span(&mut self, span: Span) {
        if span.text.is_empty() {
            return;
        }
        // merge with previous run when the style matches
        if let Some(last) = self.spans.last_mut() {
            if last.style == span.style {
                last.text.push_str(&span.text);
                return;
            }
        }
        self.spans.push(span);
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// text with every style marker stripped
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Render through a tag resolver, e.g. [`resolve`] for ansi terminals.
    pub fn render_with(&self, resolver: StyleResolver) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let (open, close) = resolver(span.style);
            out.push_str(open);
            out.push_str(&span.text);
            out.push_str(close);
        }
        out
    }
}

impl From<&str> for StyledLine {
    fn from(text: &str) -> Self {
        StyledLine::plain(text)
    }
}

impl From<String> for StyledLine {
    fn from(text: String) -> Self {
        StyledLine::plain(text)
    }
}

/// tag -> (opening sequence, closing sequence)
pub type StyleResolver = fn(StyleTag) -> (&'static str, &'static str);

const RESET: &str = "\x1b[0m";

/// ansi rendering used by xterm.js and plain terminals
pub fn resolve(tag: StyleTag) -> (&'static str, &'static str) {
    match tag {
        StyleTag::Plain => ("", ""),
        StyleTag::Error => ("\x1b[1;31m", RESET),
        StyleTag::Success => ("\x1b[1;32m", RESET),
        StyleTag::Info => ("\x1b[36m", RESET),
        StyleTag::Warning => ("\x1b[33m", RESET),
        StyleTag::Muted => ("\x1b[2m", RESET),
        StyleTag::Heading(1) => ("\x1b[1;96m", RESET),
        StyleTag::Heading(2) => ("\x1b[1;93m", RESET),
        StyleTag::Heading(_) => ("\x1b[1;33m", RESET),
        StyleTag::Strong => ("\x1b[1m", RESET),
        StyleTag::Emphasis => ("\x1b[3m", RESET),
        StyleTag::Link => ("\x1b[4;34m", RESET),
        StyleTag::Code => ("\x1b[92m", RESET),
    }
}

/// no-op resolver, handy for logs and tests
pub fn resolve_plain(_tag: StyleTag) -> (&'static str, &'static str) {
    ("", "")
}

// cursor control for in-place rewrites (progress overlay, thinking indicator)

/// return to column 0 and wipe the line
pub const CLEAR_LINE: &str = "\r\x1b[K";

/// Erase `count` lines ending at the cursor line, leaving the cursor at
/// column 0 of the topmost one.
pub fn erase_lines(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let mut out = String::from(CLEAR_LINE);
    for _ in 1..count {
        out.push_str("\x1b[1A\x1b[K");
    }
    out
}
