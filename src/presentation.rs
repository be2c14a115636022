//! Presentation pass: image and iframe classes, paragraph whitespace styling
//! and scroll wrappers around tables.

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::config::PresentationOptions;
use crate::utils::html::{add_class_to_tags, escape_href, escape_html};

/// Apply presentation adjustments to a fully annotated event stream
pub fn apply(events: Vec<Event<'static>>, options: &PresentationOptions) -> Vec<Event<'static>> {
    let mut out = Vec::with_capacity(events.len() + 8);
    let mut container_depth = 0usize;
    let mut styled_paragraph = false;
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::Image { dest_url, title, .. }) => {
                let alt = image_alt_text(&mut iter);
                out.push(Event::InlineHtml(image_html(&dest_url, &title, &alt, &options.image_class).into()));
            }
            Event::Start(Tag::Paragraph) if container_depth == 0 => {
                styled_paragraph = true;
                out.push(Event::Html(
                    format!("<p class=\"{}\">", escape_html(&options.paragraph_class)).into(),
                ));
            }
            Event::End(TagEnd::Paragraph) if styled_paragraph => {
                styled_paragraph = false;
                out.push(Event::Html("</p>\n".into()));
            }
            Event::Start(Tag::Table(alignments)) => {
                container_depth += 1;
                out.push(Event::Html(
                    format!("<div class=\"{}\">\n", escape_html(&options.table_wrapper_class)).into(),
                ));
                out.push(Event::Start(Tag::Table(alignments)));
            }
            Event::End(TagEnd::Table) => {
                container_depth = container_depth.saturating_sub(1);
                out.push(Event::End(TagEnd::Table));
                out.push(Event::Html("</div>\n".into()));
            }
            Event::Start(tag) => {
                if is_container(&tag) {
                    container_depth += 1;
                }
                out.push(Event::Start(tag));
            }
            Event::End(tag) => {
                if is_container_end(&tag) {
                    container_depth = container_depth.saturating_sub(1);
                }
                out.push(Event::End(tag));
            }
            Event::Html(html) => out.push(Event::Html(style_iframes(html, &options.iframe_class))),
            Event::InlineHtml(html) => out.push(Event::InlineHtml(style_iframes(html, &options.iframe_class))),
            other => out.push(other),
        }
    }

    out
}

fn is_container(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::BlockQuote(_)
            | Tag::List(_)
            | Tag::Item
            | Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
    )
}

fn is_container_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
    )
}

/// Consume events up to the image's end tag and return the plain alt text
fn image_alt_text(iter: &mut impl Iterator<Item = Event<'static>>) -> String {
    let mut alt = String::new();
    let mut nested = 0usize;
    for event in iter.by_ref() {
        match event {
            Event::Start(Tag::Image { .. }) => nested += 1,
            Event::End(TagEnd::Image) if nested == 0 => break,
            Event::End(TagEnd::Image) => nested -= 1,
            Event::Text(t) | Event::Code(t) => alt.push_str(&t),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        }
    }
    alt
}

fn image_html(src: &str, title: &str, alt: &str, class: &str) -> String {
    let mut html = format!("<img src=\"{}\" alt=\"{}\"", escape_href(src), escape_html(alt));
    if !title.is_empty() {
        html.push_str(&format!(" title=\"{}\"", escape_html(title)));
    }
    if !class.is_empty() {
        html.push_str(&format!(" class=\"{}\"", escape_html(class)));
    }
    html.push_str(" />");
    html
}

fn style_iframes(html: CowStr<'static>, class: &str) -> CowStr<'static> {
    if class.is_empty() || !html.to_ascii_lowercase().contains("<iframe") {
        return html;
    }
    add_class_to_tags(&html, "iframe", class).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulldown_cmark::{Options, Parser};

    fn render(source: &str) -> String {
        let events = Parser::new_ext(source, Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES)
            .map(Event::into_static)
            .collect();
        let events = apply(events, &PresentationOptions::default());
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        html
    }

    #[test]
    fn test_paragraph_class() {
        assert_eq!(render("hello\n"), "<p class=\"whitespace-pre-wrap\">hello</p>\n");
    }

    #[test]
    fn test_nested_paragraphs_untouched() {
        let html = render("> quoted\n\n- a\n\n- b\n");
        assert!(html.contains("<blockquote>\n<p>quoted</p>"));
        assert!(html.contains("<li>\n<p>a</p>"));
        assert!(!html.contains("whitespace-pre-wrap"));
    }

    #[test]
    fn test_image_class() {
        let html = render("![A *cat*](cat.png \"Cat\")\n");
        assert!(html.contains("<img src=\"cat.png\" alt=\"A cat\" title=\"Cat\" class=\"md-image\" />"));
    }

    #[test]
    fn test_image_alt_is_escaped() {
        let html = render("![a \\<b\\>](x.png)\n");
        assert!(html.contains("alt=\"a &lt;b&gt;\""));
        assert!(!html.contains("title="));
    }

    #[test]
    fn test_table_wrapper() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.starts_with("<div class=\"table-wrapper\">\n<table>"));
        assert!(html.ends_with("</table>\n</div>\n"));
    }

    #[test]
    fn test_iframe_class() {
        let html = render("<iframe src=\"https://example.com\"></iframe>\n");
        assert!(html.contains("<iframe class=\"md-iframe\" src=\"https://example.com\">"));
    }

    #[test]
    fn test_iframe_existing_class_is_merged() {
        let html = render("<iframe class=\"video\" src=\"v\"></iframe>\n");
        assert!(html.contains("class=\"video md-iframe\""));
    }

    #[test]
    fn test_empty_classes_disable_styling() {
        let options = PresentationOptions {
            image_class: String::new(),
            paragraph_class: "pre".to_string(),
            iframe_class: String::new(),
            table_wrapper_class: "scroll".to_string(),
        };
        let events = Parser::new("![x](y.png)\n").map(Event::into_static).collect();
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, apply(events, &options).into_iter());
        assert_eq!(html, "<p class=\"pre\"><img src=\"y.png\" alt=\"x\" /></p>\n");
    }
}
