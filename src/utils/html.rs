//! HTML escaping and attribute helpers used when stages emit raw HTML events.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Matches an opening tag name followed by its attribute text
static OPEN_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<([a-z][a-z0-9-]*)(\s[^<>]*?)?(/?)>").unwrap());

/// Matches a double- or single-quoted `class` attribute
static CLASS_ATTR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(\sclass\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Raw text elements whose content is never parsed as Markdown
static RAW_TEXT_OPEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<(?:pre|script|style|textarea)(?:[ \t>]|$)").unwrap());

static RAW_TEXT_CLOSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(?:pre|script|style|textarea)>").unwrap());

/// Block-level tags that start an HTML block running to the next blank line
static BLOCK_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^</?(?:address|article|aside|base|basefont|blockquote|body|caption|center|col|colgroup|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption|figure|footer|form|frame|frameset|h[1-6]|head|header|hr|html|iframe|legend|li|link|main|menu|menuitem|nav|noframes|ol|optgroup|option|p|param|search|section|summary|table|tbody|td|tfoot|th|thead|title|tr|track|ul)(?:[ \t]|/?>|$)",
    )
    .unwrap()
});

/// A complete open or close tag alone on its line
static LONE_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:<[A-Za-z][A-Za-z0-9-]*(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*(?:\s*=\s*(?:[^\s"'=<>`]+|'[^']*'|"[^"]*"))?)*\s*/?>|</[A-Za-z][A-Za-z0-9-]*\s*>)\s*$"#,
    )
    .unwrap()
});

/// Columns of indentation an HTML block start may carry
const MAX_BLOCK_INDENT: usize = 3;

/// Escape text for use in element content or a double-quoted attribute value
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

/// Escape a URL for use in `href`/`src`
pub fn escape_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let _ = pulldown_cmark_escape::escape_href(&mut out, url);
    out
}

/// Add `class` to every opening `<tag>` in an HTML fragment.
///
/// Tags that already carry the class are left untouched, so applying this
/// twice yields the same markup as applying it once.
pub fn add_class_to_tags(html: &str, tag: &str, class: &str) -> String {
    if class.is_empty() || !html.to_ascii_lowercase().contains(&format!("<{}", tag.to_ascii_lowercase())) {
        return html.to_string();
    }

    OPEN_TAG_PATTERN
        .replace_all(html, |caps: &Captures| {
            let whole = &caps[0];
            if !caps[1].eq_ignore_ascii_case(tag) {
                return whole.to_string();
            }
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            let self_closing = &caps[3];
            let attrs = merge_class(attrs, class);
            format!("<{}{}{}>", &caps[1], attrs, self_closing)
        })
        .into_owned()
}

fn merge_class(attrs: &str, class: &str) -> String {
    if let Some(caps) = CLASS_ATTR_PATTERN.captures(attrs) {
        let existing = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        if existing.split_whitespace().any(|c| c == class) {
            return attrs.to_string();
        }
        let merged = if existing.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {}", existing.trim(), class)
        };
        let Some(full) = caps.get(0) else {
            return attrs.to_string();
        };
        format!(
            "{}{}\"{}\"{}",
            &attrs[..full.start()],
            &caps[1],
            escape_html(&merged),
            &attrs[full.end()..]
        )
    } else {
        format!(" class=\"{}\"{}", escape_html(class), attrs)
    }
}

fn block_start(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    (line.len() - trimmed.len() <= MAX_BLOCK_INDENT && trimmed.starts_with('<')).then_some(trimmed)
}

/// Check if a line would open an HTML block in the base grammar
pub fn starts_html_block(line: &str) -> bool {
    let Some(trimmed) = block_start(line) else {
        return false;
    };
    RAW_TEXT_OPEN_PATTERN.is_match(trimmed)
        || trimmed.starts_with("<!--")
        || trimmed.starts_with("<?")
        || trimmed.starts_with("<![CDATA[")
        || trimmed.strip_prefix("<!").is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic()))
        || BLOCK_TAG_PATTERN.is_match(trimmed)
        || LONE_TAG_PATTERN.is_match(trimmed)
}

/// How an open raw HTML region ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawHtmlEnd {
    /// `</pre>`, `</script>`, `</style>` or `</textarea>`
    RawText,
    /// `-->`, which may sit on a later line than the opener
    Comment,
    Marker(&'static str),
    BlankLine,
}

/// Tracks whether a line-by-line scan is inside raw HTML: comments, raw text
/// elements and block-level HTML up to the next blank line.
///
/// Comments are followed anywhere on a line, so a comment opened mid-paragraph
/// hides the lines up to its `-->` too.
#[derive(Debug, Clone, Default)]
pub struct HtmlBlockTracker {
    open: Option<RawHtmlEnd>,
}

impl HtmlBlockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_inside(&self) -> bool {
        self.open.is_some()
    }

    /// Process a line and return whether it belongs to raw HTML
    /// (opening and closing lines included)
    pub fn process_line(&mut self, line: &str) -> bool {
        match self.open {
            Some(RawHtmlEnd::Comment) => return self.scan_comments(line, true),
            Some(RawHtmlEnd::BlankLine) => {
                if line.trim().is_empty() {
                    self.open = None;
                    return false;
                }
                return true;
            }
            Some(RawHtmlEnd::RawText) => {
                if RAW_TEXT_CLOSE_PATTERN.is_match(line) {
                    self.open = None;
                }
                return true;
            }
            Some(RawHtmlEnd::Marker(marker)) => {
                if line.contains(marker) {
                    self.open = None;
                }
                return true;
            }
            None => {}
        }

        if let Some(trimmed) = block_start(line) {
            if RAW_TEXT_OPEN_PATTERN.is_match(trimmed) {
                if !RAW_TEXT_CLOSE_PATTERN.is_match(trimmed) {
                    self.open = Some(RawHtmlEnd::RawText);
                }
                return true;
            }
            let marker = if trimmed.starts_with("<?") {
                Some(("<?", "?>"))
            } else if trimmed.starts_with("<![CDATA[") {
                Some(("<![CDATA[", "]]>"))
            } else if trimmed.strip_prefix("<!").is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic())) {
                Some(("<!", ">"))
            } else {
                None
            };
            if let Some((start, end)) = marker {
                if !trimmed[start.len()..].contains(end) {
                    self.open = Some(RawHtmlEnd::Marker(end));
                }
                return true;
            }
            if BLOCK_TAG_PATTERN.is_match(trimmed) {
                self.open = Some(RawHtmlEnd::BlankLine);
                return true;
            }
        }

        self.scan_comments(line, false)
    }

    fn scan_comments(&mut self, line: &str, started_inside: bool) -> bool {
        let mut inside = started_inside;
        let mut rest = line;
        loop {
            let (needle, found) = if inside { ("-->", rest.find("-->")) } else { ("<!--", rest.find("<!--")) };
            let Some(pos) = found else {
                break;
            };
            rest = &rest[pos + needle.len()..];
            inside = !inside;
        }
        self.open = inside.then_some(RawHtmlEnd::Comment);
        started_inside || inside
    }
}
