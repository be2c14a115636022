//! Callout block detection and rendering
//!
//! Callouts are fenced admonitions written as:
//!
//! ```markdown
//! ::: tip Optional Title
//! Body **markdown** content.
//! :::
//! ```
//!
//! Recognized kinds: `info`, `warn`, `tip`, `danger`. The body runs up to the
//! *first* following line that is exactly `:::`; callouts do not nest. The body
//! is restricted to the inline grammar.
//!
//! The matcher declines (leaving the lines to the base grammar) when the kind
//! is not one of the four literals or when no closing marker follows. Openers
//! inside fenced code blocks, HTML comments and raw HTML blocks are never
//! matched. A callout may sit inside a block quote as long as every line
//! carries the same quote markers.
//!
//! Matching only locates callouts. The body lines stay in the document and
//! go through the main parse, so reference links and footnote references
//! inside a callout resolve against definitions anywhere in the document.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Tag, TagEnd};
use regex::Regex;

use crate::config::CalloutOptions;
use crate::utils::fence::FenceTracker;
use crate::utils::html::{HtmlBlockTracker, escape_html, starts_html_block};

/// Pattern to match callout opening markers
/// Captures: block quote markers, indentation, kind word, rest of line (title)
static OPEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?: {0,3}>[ \t]?)*)( {0,3}):::[ \t]*([^\s:]\S*)(.*)$").unwrap());

/// Pattern to match callout closing markers
static CLOSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*:::[ \t]*$").unwrap());

/// One block quote marker
static QUOTE_MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}>[ \t]?").unwrap());

/// Line starts that would open a block construct in the base grammar
static BLOCK_START_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#{1,6}(?:[ \t]|$)|>|[-+*](?:[ \t]|$)|=+[ \t]*$|`{3,}|~{3,}|\||\[\^[^\]]+\]:)").unwrap()
});

/// Ordered list marker: the delimiter gets escaped, not the number
static ORDERED_MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,9}([.)])(?:[ \t]|$)").unwrap());

/// Thematic breaks and table delimiter rows
static RULE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\*[ \t]*){3,}|(?:_[ \t]*){3,}|\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?)$").unwrap()
});

/// The closed set of callout kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalloutKind {
    Info,
    Warn,
    Tip,
    Danger,
}

impl CalloutKind {
    pub const ALL: [CalloutKind; 4] = [CalloutKind::Info, CalloutKind::Warn, CalloutKind::Tip, CalloutKind::Danger];

    /// Parse a kind literal; anything else is declined
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(CalloutKind::Info),
            "warn" => Some(CalloutKind::Warn),
            "tip" => Some(CalloutKind::Tip),
            "danger" => Some(CalloutKind::Danger),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutKind::Info => "info",
            CalloutKind::Warn => "warn",
            CalloutKind::Tip => "tip",
            CalloutKind::Danger => "danger",
        }
    }

    /// Icon shown in the callout header
    pub fn icon(&self) -> &'static str {
        match self {
            CalloutKind::Info => "ℹ️",
            CalloutKind::Warn => "⚠️",
            CalloutKind::Tip => "💡",
            CalloutKind::Danger => "🚨",
        }
    }
}

impl fmt::Display for CalloutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered callout block
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutBlock {
    pub kind: CalloutKind,
    /// Header title; `None` when the author gave none
    pub title: Option<String>,
    /// Inline events of the body
    pub body: Vec<Event<'static>>,
}

impl CalloutBlock {
    /// Render as raw HTML container events wrapped around the inline body
    pub fn to_events(&self) -> Vec<Event<'static>> {
        let mut events = Vec::with_capacity(self.body.len() + 4);
        events.push(Event::Html(
            format!("<div class=\"callout callout-{}\">\n", self.kind).into(),
        ));
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            events.push(Event::Html(
                format!(
                    "<div class=\"callout-header\"><span class=\"callout-icon\" aria-hidden=\"true\">{}</span><span class=\"callout-title\">{}</span></div>\n",
                    self.kind.icon(),
                    escape_html(title.trim())
                )
                .into(),
            ));
        }
        events.push(Event::Html("<div class=\"callout-body\">".into()));
        events.extend(self.body.iter().cloned());
        events.push(Event::Html("</div>\n</div>\n".into()));
        events
    }
}

/// A callout located in the source
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutSpan {
    /// Byte range from the start of the opening line through the closing line's newline
    pub range: Range<usize>,
    /// Block quote markers and indentation written before the opening marker
    pub prefix: String,
    pub kind: CalloutKind,
    pub title: Option<String>,
    /// Non-blank body lines, with block markers escaped so they parse inline
    pub body: Vec<String>,
}

impl CalloutSpan {
    /// Build the rendered block from the parsed body events
    pub fn to_block(&self, body: Vec<Event<'static>>) -> CalloutBlock {
        CalloutBlock {
            kind: self.kind,
            title: self.title.clone(),
            body: flatten_paragraphs(body),
        }
    }
}

/// A source line with its byte offsets
#[derive(Debug, Clone, Copy)]
struct SourceLine<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

fn source_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let text = raw.trim_end_matches('\n').trim_end_matches('\r');
        lines.push(SourceLine {
            text,
            start: offset,
            end: offset + raw.len(),
        });
        offset += raw.len();
    }
    lines
}

/// Opening marker of a candidate callout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutOpener<'a> {
    /// Block quote markers, e.g. `"> "`
    pub container: &'a str,
    pub indent: &'a str,
    pub kind: CalloutKind,
    pub title: &'a str,
}

impl CalloutOpener<'_> {
    /// Number of block quote levels the callout sits in
    pub fn quote_depth(&self) -> usize {
        self.container.matches('>').count()
    }
}

/// Match an opening line.
///
/// Returns `None` for lines that are not openers and for unrecognized kinds.
pub fn parse_opener(line: &str) -> Option<CalloutOpener<'_>> {
    let caps = OPEN_PATTERN.captures(line)?;
    let kind_str = caps.get(3)?.as_str();
    let Some(kind) = CalloutKind::parse(kind_str) else {
        log::debug!("Declining callout with unrecognized kind '{kind_str}'");
        return None;
    };
    Some(CalloutOpener {
        container: caps.get(1).map_or("", |m| m.as_str()),
        indent: caps.get(2).map_or("", |m| m.as_str()),
        kind,
        title: caps.get(4).map_or("", |m| m.as_str().trim()),
    })
}

/// Check if a line is a closing marker (exactly `:::`)
pub fn is_closer(line: &str) -> bool {
    CLOSE_PATTERN.is_match(line)
}

/// Strip exactly `depth` block quote markers, or `None` if the line has fewer
pub fn strip_quote_markers(line: &str, depth: usize) -> Option<&str> {
    let mut rest = line;
    for _ in 0..depth {
        let marker = QUOTE_MARKER_PATTERN.find(rest)?;
        rest = &rest[marker.end()..];
    }
    Some(rest)
}

/// Strip every leading block quote marker
fn strip_all_quote_markers(line: &str) -> &str {
    let mut rest = line;
    while let Some(marker) = QUOTE_MARKER_PATTERN.find(rest) {
        rest = &rest[marker.end()..];
    }
    rest
}

/// Find every callout block in the source, in document order.
pub fn find_callouts(source: &str, options: &CalloutOptions) -> Vec<CalloutSpan> {
    if !source.contains(":::") {
        return Vec::new();
    }

    let lines = source_lines(source);
    let mut spans = Vec::new();
    let mut fences = FenceTracker::new();
    let mut raw_html = HtmlBlockTracker::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let content = strip_all_quote_markers(line.text);
        let skip = if raw_html.is_inside() {
            raw_html.process_line(content)
        } else {
            fences.process_line(content) || raw_html.process_line(content)
        };
        if skip {
            i += 1;
            continue;
        }

        let Some(opener) = parse_opener(line.text) else {
            i += 1;
            continue;
        };

        let depth = opener.quote_depth();
        let Some(close) = (i + 1..lines.len())
            .find(|&j| strip_quote_markers(lines[j].text, depth).is_some_and(is_closer))
        else {
            log::warn!(
                "Unclosed '::: {}' callout at line {}; rendering as text",
                opener.kind,
                i + 1
            );
            i += 1;
            continue;
        };

        let Some(body_lines) = lines[i + 1..close]
            .iter()
            .map(|l| strip_quote_markers(l.text, depth))
            .collect::<Option<Vec<&str>>>()
        else {
            log::debug!(
                "Declining '::: {}' callout at line {}: body leaves its block quote",
                opener.kind,
                i + 1
            );
            i += 1;
            continue;
        };

        log::trace!("Matched '{}' callout at lines {}-{}", opener.kind, i + 1, close + 1);
        spans.push(build_span(&opener, &body_lines, line.start..lines[close].end, options));
        i = close + 1;
    }

    spans
}

fn build_span(
    opener: &CalloutOpener<'_>,
    body_lines: &[&str],
    range: Range<usize>,
    options: &CalloutOptions,
) -> CalloutSpan {
    let mut title = (!opener.title.is_empty()).then(|| opener.title.to_string());
    let mut body = body_lines;

    if title.is_none()
        && options.next_line_title
        && body.len() >= 2
        && let Some((first, rest)) = body.split_first()
        && !first.trim().is_empty()
    {
        title = Some(first.trim().to_string());
        body = rest;
    }

    CalloutSpan {
        range,
        prefix: format!("{}{}", opener.container, opener.indent),
        kind: opener.kind,
        title,
        body: inline_body_lines(body),
    }
}

/// Escape a line start that the base grammar would read as a block construct,
/// so the line parses as inline text.
pub fn escape_block_markers(line: &str) -> Cow<'_, str> {
    let trimmed = line.trim_start();

    if let Some(caps) = ORDERED_MARKER_PATTERN.captures(trimmed)
        && let Some(delim) = caps.get(1)
    {
        return Cow::Owned(format!(
            "{}\\{}",
            &trimmed[..delim.start()],
            &trimmed[delim.start()..]
        ));
    }

    if BLOCK_START_PATTERN.is_match(trimmed) || RULE_PATTERN.is_match(trimmed) || starts_html_block(trimmed) {
        return Cow::Owned(format!("\\{trimmed}"));
    }

    Cow::Borrowed(trimmed)
}

/// Drop blank lines and escape block markers, leaving lines that form a
/// single paragraph of inline content
pub fn inline_body_lines(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| escape_block_markers(line).into_owned())
        .collect()
}

/// Unwrap paragraph tags from parsed body events.
///
/// The body is one inline run; separate paragraphs are joined by soft breaks.
pub fn flatten_paragraphs(events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    let mut flat = Vec::with_capacity(events.len());
    let mut paragraphs = 0;
    for event in events {
        match event {
            Event::Start(Tag::Paragraph) => {
                if paragraphs > 0 {
                    flat.push(Event::SoftBreak);
                }
                paragraphs += 1;
            }
            Event::End(TagEnd::Paragraph) => {}
            other => flat.push(other),
        }
    }
    flat
}
