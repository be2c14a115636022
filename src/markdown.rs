//! Markdown renderer: base block grammar plus the callout, code fence and
//! diagram extensions.
//!
//! The renderer produces an intermediate event stream rather than HTML so the
//! post-processing passes can see the whole document before anything is
//! serialized. Headings leave this stage without ids.

use std::borrow::Cow;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::callout::{self, CalloutSpan};
use crate::config::{CalloutOptions, CodeOptions, RenderOptions};
use crate::highlight::{Highlighter, PLAINTEXT};
use crate::utils::html::escape_html;

/// Fence language handed to the client-side diagram renderer
pub const MERMAID: &str = "mermaid";

/// Base of the placeholder comment that marks a callout in the source
const PLACEHOLDER_BASE: &str = "rendoc-callout";

/// A fenced (or indented) code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFence {
    pub language: Option<String>,
    pub filename: Option<String>,
    pub source_text: String,
}

impl CodeFence {
    /// Split the info string on its first whitespace run into language and filename
    pub fn from_info(info: &str, source_text: impl Into<String>) -> Self {
        let info = info.trim();
        let (language, filename) = match info.split_once(char::is_whitespace) {
            Some((language, rest)) => (language, rest.trim()),
            None => (info, ""),
        };
        Self {
            language: (!language.is_empty()).then(|| language.to_string()),
            filename: (!filename.is_empty()).then(|| filename.to_string()),
            source_text: source_text.into(),
        }
    }

    pub fn is_mermaid(&self) -> bool {
        self.language.as_deref().is_some_and(|lang| lang.eq_ignore_ascii_case(MERMAID))
    }
}

/// Parses Markdown into an annotated event stream and serializes the final stream
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    parser_options: Options,
    callouts: CalloutOptions,
    code: CodeOptions,
    highlighter: Highlighter,
}

impl MarkdownRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            parser_options: options.markdown.parser_options(),
            callouts: options.callouts.clone(),
            code: options.code.clone(),
            highlighter: Highlighter::new(options.code.class_style, &options.code.inline_language),
        }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Parse source text into the intermediate event stream.
    ///
    /// Callouts are spliced in as container events and code blocks are
    /// replaced by their rendered chrome. Inline code stays as
    /// [`Event::Code`] until [`serialize`](Self::serialize).
    pub fn parse(&self, source: &str) -> Vec<Event<'static>> {
        let spans = callout::find_callouts(source, &self.callouts);
        let marker = placeholder_marker(source);
        let text = substitute_callouts(source, &spans, &marker);

        let mut events: Vec<Event<'static>> = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;
        let mut diagram_count = 0;
        let mut callout_count = 0;
        let mut drop_html_block_end = false;
        // (callout index, position of its first body event)
        let mut open_callout: Option<(usize, usize)> = None;

        for event in Parser::new_ext(&text, self.parser_options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let info = match kind {
                        CodeBlockKind::Fenced(info) => Some(info.into_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((info, String::new()));
                }
                Event::Text(t) if code.is_some() => {
                    if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&t);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((info, buf)) = code.take() {
                        let fence = CodeFence::from_info(info.as_deref().unwrap_or(""), buf);
                        events.push(Event::Html(self.render_code_block(&fence, &mut diagram_count).into()));
                    }
                }
                Event::Html(ref html) | Event::InlineHtml(ref html) if Placeholder::parse(html, &marker).is_some() => {
                    if matches!(events.last(), Some(Event::Start(Tag::HtmlBlock))) {
                        events.pop();
                        drop_html_block_end = true;
                    }
                    match Placeholder::parse(html, &marker) {
                        Some(Placeholder::Open(n)) => open_callout = Some((n, events.len())),
                        Some(Placeholder::Close(n)) => {
                            let start = open_callout.take().filter(|&(open, _)| open == n).map(|(_, start)| start);
                            match (start, spans.get(n)) {
                                (Some(start), Some(span)) if events.get(start..).is_some_and(is_balanced) => {
                                    let body = events.split_off(start);
                                    events.extend(span.to_block(body).to_events());
                                    callout_count += 1;
                                }
                                _ => log::debug!("Callout {n} lost its block structure; leaving the body as parsed"),
                            }
                        }
                        None => {}
                    }
                }
                Event::End(TagEnd::HtmlBlock) if drop_html_block_end => {
                    drop_html_block_end = false;
                }
                other => events.push(other.into_static()),
            }
        }

        log::debug!(
            "Parsed {} events ({} callouts, {} diagrams)",
            events.len(),
            callout_count,
            diagram_count
        );
        events
    }

    /// Render a code block: diagram container for mermaid, otherwise
    /// header chrome plus highlighted body
    pub fn render_code_block(&self, fence: &CodeFence, diagram_count: &mut usize) -> String {
        if self.code.mermaid && fence.is_mermaid() {
            let id = *diagram_count;
            *diagram_count += 1;
            let source = fence.source_text.strip_suffix('\n').unwrap_or(&fence.source_text);
            return format!(
                "<div class=\"mermaid\" id=\"mermaid-{id}\">{}</div>\n",
                escape_html(source)
            );
        }

        let language = fence.language.as_deref().unwrap_or(PLAINTEXT);
        let highlighted = self.highlighter.highlight(&fence.source_text, fence.language.as_deref());
        let language_attr = escape_html(language);

        let mut html = String::with_capacity(highlighted.len() + 256);
        html.push_str(&format!("<div class=\"code-block\" data-language=\"{language_attr}\">\n"));
        if self.code.show_header {
            html.push_str("<div class=\"code-header\">");
            html.push_str("<span class=\"code-dots\"><span></span><span></span><span></span></span>");
            if let Some(filename) = &fence.filename {
                html.push_str(&format!("<span class=\"code-filename\">{}</span>", escape_html(filename)));
            }
            html.push_str(&format!("<span class=\"code-language\">{language_attr}</span>"));
            html.push_str("</div>\n");
        }
        html.push_str(&format!(
            "<pre><code class=\"hljs language-{language_attr}\">{highlighted}</code></pre>\n"
        ));
        html.push_str("</div>\n");
        html
    }

    /// Serialize the final event stream, highlighting inline code spans with
    /// the fixed inline grammar
    pub fn serialize(&self, events: Vec<Event<'static>>) -> String {
        let language = escape_html(self.highlighter.inline_language());
        let events = events.into_iter().map(|event| match event {
            Event::Code(text) => Event::InlineHtml(
                format!(
                    "<code class=\"inline-code language-{language}\">{}</code>",
                    self.highlighter.highlight_inline(&text)
                )
                .into(),
            ),
            other => other,
        });

        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events);
        html
    }
}

/// Pick a placeholder base that does not occur in the source
fn placeholder_marker(source: &str) -> String {
    let mut marker = PLACEHOLDER_BASE.to_string();
    while source.contains(&marker) {
        marker.push('x');
    }
    marker
}

/// Replace each callout's marker lines with placeholder comments.
///
/// The escaped body lines stay between the two placeholders, behind the same
/// block quote markers and indentation as the opener, so the body is parsed
/// in place with the rest of the document.
fn substitute_callouts<'a>(source: &'a str, spans: &[CalloutSpan], marker: &str) -> Cow<'a, str> {
    if spans.is_empty() {
        return Cow::Borrowed(source);
    }

    let mut text = String::with_capacity(source.len() + spans.len() * 64);
    let mut cursor = 0;
    for (n, span) in spans.iter().enumerate() {
        let prefix = &span.prefix;
        text.push_str(&source[cursor..span.range.start]);
        text.push_str(&format!("{prefix}<!--{marker}-{n}-->\n"));
        for line in &span.body {
            text.push_str(&format!("{prefix}{line}\n"));
        }
        text.push_str(&format!("{prefix}<!--{marker}-end-{n}-->\n"));
        cursor = span.range.end;
    }
    text.push_str(&source[cursor..]);
    Cow::Owned(text)
}

/// A callout placeholder comment found in the parsed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Open(usize),
    Close(usize),
}

impl Placeholder {
    fn parse(html: &str, marker: &str) -> Option<Self> {
        let name = html
            .trim()
            .strip_prefix("<!--")?
            .strip_suffix("-->")?
            .strip_prefix(marker)?
            .strip_prefix('-')?;
        match name.strip_prefix("end-") {
            Some(n) => n.parse().ok().map(Placeholder::Close),
            None => name.parse().ok().map(Placeholder::Open),
        }
    }
}

/// Check that every tag opened in `events` is also closed there
fn is_balanced(events: &[Event<'_>]) -> bool {
    let mut depth = 0usize;
    for event in events {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(&RenderOptions::default())
    }

    fn render(source: &str) -> String {
        let renderer = renderer();
        renderer.serialize(renderer.parse(source))
    }

    #[test]
    fn test_code_fence_info_split() {
        let fence = CodeFence::from_info("rust src/main.rs", "fn main() {}\n");
        assert_eq!(fence.language.as_deref(), Some("rust"));
        assert_eq!(fence.filename.as_deref(), Some("src/main.rs"));

        let fence = CodeFence::from_info("python   my script.py ", "");
        assert_eq!(fence.language.as_deref(), Some("python"));
        assert_eq!(fence.filename.as_deref(), Some("my script.py"));

        let fence = CodeFence::from_info("", "x");
        assert_eq!(fence.language, None);
        assert_eq!(fence.filename, None);
    }

    #[test]
    fn test_headings_have_no_ids_after_parse() {
        let events = renderer().parse("# Title\n");
        assert!(events.iter().any(|e| matches!(e, Event::Start(Tag::Heading { id: None, .. }))));
    }

    #[test]
    fn test_code_block_chrome() {
        let html = render("```rust main.rs\nfn main() {}\n```\n");
        assert!(html.contains("<div class=\"code-block\" data-language=\"rust\">"));
        assert!(html.contains("<span class=\"code-filename\">main.rs</span>"));
        assert!(html.contains("<span class=\"code-language\">rust</span>"));
        assert!(html.contains("<pre><code class=\"hljs language-rust\">"));
        assert!(html.contains("hl-"));
    }

    #[test]
    fn test_code_block_without_header() {
        let mut options = RenderOptions::default();
        options.code.show_header = false;
        let renderer = MarkdownRenderer::new(&options);
        let html = renderer.serialize(renderer.parse("```js\nlet a = 1;\n```\n"));
        assert!(!html.contains("code-header"));
        assert!(html.contains("language-js"));
    }

    #[test]
    fn test_fence_without_language_is_plaintext() {
        let html = render("```\nplain <text>\n```\n");
        assert!(html.contains("language-plaintext"));
        assert!(html.contains("plain &lt;text&gt;"));
        assert!(!html.contains("code-filename"));
    }

    #[test]
    fn test_indented_code_block() {
        let html = render("para\n\n    indented code\n");
        assert!(html.contains("language-plaintext"));
        assert!(html.contains("indented code"));
    }

    #[test]
    fn test_mermaid_pass_through() {
        let html = render("```mermaid\ngraph TD; A-->B;\n```\n");
        assert_eq!(html, "<div class=\"mermaid\" id=\"mermaid-0\">graph TD; A--&gt;B;</div>\n");
    }

    #[test]
    fn test_mermaid_ids_are_sequential() {
        let html = render("```mermaid\nA\n```\n\n```mermaid\nB\n```\n");
        assert!(html.contains("id=\"mermaid-0\">A<"));
        assert!(html.contains("id=\"mermaid-1\">B<"));
    }

    #[test]
    fn test_mermaid_disabled_is_highlighted() {
        let mut options = RenderOptions::default();
        options.code.mermaid = false;
        let renderer = MarkdownRenderer::new(&options);
        let html = renderer.serialize(renderer.parse("```mermaid\ngraph TD;\n```\n"));
        assert!(!html.contains("class=\"mermaid\""));
        assert!(html.contains("language-mermaid"));
    }

    #[test]
    fn test_inline_code_uses_shell_grammar() {
        let html = render("Run `cargo build` now\n");
        assert!(html.contains("<code class=\"inline-code language-sh\">"));
        assert!(html.contains("cargo"));
    }

    #[test]
    fn test_callout_is_spliced() {
        let html = render("Intro\n::: tip Hint\nUse **this**.\n:::\nOutro\n");
        assert_eq!(
            html,
            "<p>Intro</p>\n<div class=\"callout callout-tip\">\n<div class=\"callout-header\"><span class=\"callout-icon\" aria-hidden=\"true\">💡</span><span class=\"callout-title\">Hint</span></div>\n<div class=\"callout-body\">Use <strong>this</strong>.</div>\n</div>\n<p>Outro</p>\n"
        );
    }

    #[test]
    fn test_unclosed_callout_renders_as_paragraph() {
        let html = render("::: tip\nhello");
        assert_eq!(html, "<p>::: tip\nhello</p>\n");
    }

    #[test]
    fn test_placeholder_collision_with_author_comment() {
        let source = "<!--rendoc-callout-0-->\n\n::: info\nbody\n:::\n";
        let html = render(source);
        assert!(html.contains("<!--rendoc-callout-0-->"));
        assert_eq!(html.matches("callout-info").count(), 1);
    }

    #[test]
    fn test_placeholder_parse() {
        assert_eq!(Placeholder::parse("<!--m-3-->\n", "m"), Some(Placeholder::Open(3)));
        assert_eq!(Placeholder::parse("<!--m-end-3-->", "m"), Some(Placeholder::Close(3)));
        assert_eq!(Placeholder::parse("<!--m-x-->", "m"), None);
        assert_eq!(Placeholder::parse("<!--m-end-->", "m"), None);
        assert_eq!(Placeholder::parse("<!--other-1-->", "m"), None);
    }

    #[test]
    fn test_substitute_keeps_body_between_placeholders() {
        let source = "> ::: tip T\n> # body\n> :::\nafter\n";
        let spans = callout::find_callouts(source, &CalloutOptions::default());
        assert_eq!(
            substitute_callouts(source, &spans, "m"),
            "> <!--m-0-->\n> \\# body\n> <!--m-end-0-->\nafter\n"
        );
    }

    #[test]
    fn test_is_balanced() {
        let para = [Event::Start(Tag::Paragraph), Event::Text("a".into()), Event::End(TagEnd::Paragraph)];
        assert!(is_balanced(&para));
        assert!(is_balanced(&[]));
        assert!(!is_balanced(&para[1..]));
        assert!(!is_balanced(&para[..2]));
    }

    #[test]
    fn test_callout_body_resolves_document_references() {
        let html = render("::: tip\nSee [the docs][docs] and note[^1].\n:::\n\n[docs]: https://example.com\n\n[^1]: fn\n");
        assert!(html.contains("<a href=\"https://example.com\">the docs</a>"));
        assert!(html.contains("class=\"footnote-reference\""));
        assert!(!html.contains("[the docs][docs]"));
        assert!(!html.contains("[^1]."));
    }

    #[test]
    fn test_callout_body_with_html_block_start_stays_inside() {
        let html = render("::: info Note\n<div>\ntext\n:::\n\nafter\n");
        assert!(html.contains("<div class=\"callout-body\">&lt;div&gt;\ntext</div>"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_callout_in_block_quote() {
        let html = render("> ::: tip Hint\n> body\n> :::\n");
        assert!(html.starts_with("<blockquote>\n<div class=\"callout callout-tip\">"));
        assert!(html.contains("<div class=\"callout-body\">body</div>"));
        assert!(!html.contains(":::"));
    }

    #[test]
    fn test_callout_in_list_item() {
        let html = render("- item\n\n  ::: warn\n  careful\n  :::\n");
        assert!(html.contains("<li>"));
        assert!(html.contains("<div class=\"callout-body\">careful</div>"));
        assert!(html.find("callout-warn") < html.find("</li>"));
    }
}
