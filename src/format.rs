//! Markdown-subset renderer used by `cat`, `man` and friends.
//!
//! Supported, per line and in this order: `#`/`##`/`###` headers, numbered
//! items (`1. foo`), bullets (`- foo`), blank lines, plain text. Plain text
//! and list bodies get inline spans (`**bold**`, `*italic*`,
//! `[text](url)`, `` `code` ``); spans never nest.

use crate::style::{Span, StyleTag, StyledLine};
use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.)\s(.*)$").expect("numbered item pattern"));

// alternation order matters: `**` has to win over `*`
static INLINE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]+)`|\*\*(.+?)\*\*|\[([^\]]+)\]\(([^)\s]+)\)|\*([^*]+)\*")
        .expect("inline span pattern")
});

const BULLET: &str = "  • ";
const CONTINUATION: &str = "  ";

/// trim + collapse internal whitespace runs to a single space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render a block of text into styled lines, one per source line.
pub fn render(text: &str) -> Vec<StyledLine> {
    let mut renderer = Renderer::default();
    text.lines().map(|line| renderer.line(line)).collect()
}

/// Line-at-a-time renderer; only state is whether we're inside a list.
#[derive(Debug, Default)]
pub struct Renderer {
    in_list: bool,
}

impl Renderer {
    pub fn line(&mut self, raw: &str) -> StyledLine {
        let line = normalize_whitespace(raw);

        if let Some((level, title)) = header(&line) {
            self.in_list = false;
            return StyledLine::styled(title, StyleTag::Heading(level));
        }

        if let Some(caps) = NUMBERED_ITEM.captures(&line) {
            self.in_list = true;
            let mut out = StyledLine::new().push(format!("{} ", &caps[1]), StyleTag::Info);
            inline_spans(&caps[2], &mut out);
            return out;
        }

        if let Some(body) = line.strip_prefix("- ") {
            self.in_list = true;
            let mut out = StyledLine::plain(BULLET);
            inline_spans(body, &mut out);
            return out;
        }

        if line.is_empty() {
            self.in_list = false;
            return StyledLine::blank();
        }

        let mut out = StyledLine::new();
        if self.in_list {
            out.push_span(Span::plain(CONTINUATION));
        }
        inline_spans(&line, &mut out);
        out
    }
}

fn header(line: &str) -> Option<(u8, &str)> {
    // longest marker first
    for (level, marker) in [(3u8, "### "), (2, "## "), (1, "# ")] {
        if let Some(title) = line.strip_prefix(marker) {
            return Some((level, title));
        }
    }
    None
}

/// Split `text` into plain and span-styled runs, appending to `out`.
fn inline_spans(text: &str, out: &mut StyledLine) {
    let mut cursor = 0;
    for caps in INLINE_SPAN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_span(Span::plain(&text[cursor..whole.start()]));

        if let Some(code) = caps.get(1) {
            out.push_span(Span::new(code.as_str(), StyleTag::Code));
        } else if let Some(bold) = caps.get(2) {
            out.push_span(Span::new(bold.as_str(), StyleTag::Strong));
        } else if let (Some(label), Some(url)) = (caps.get(3), caps.get(4)) {
            out.push_span(Span::new(
                format!("{} ({})", label.as_str(), url.as_str()),
                StyleTag::Link,
            ));
        } else if let Some(italic) = caps.get(5) {
            out.push_span(Span::new(italic.as_str(), StyleTag::Emphasis));
        }
        cursor = whole.end();
    }
    out.push_span(Span::plain(&text[cursor..]));
}
