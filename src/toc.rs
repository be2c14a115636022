//! Heading id assignment and table-of-contents collection.

use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::config::HeadingOptions;
use crate::document::Heading;
use crate::utils::slug::slugify;

/// Assign a unique anchor id to every heading in the stream and return the
/// ToC entries for headings up to the configured depth, in document order.
///
/// Ids are `{prefix}{slug}`. Headings whose text slugs to nothing get
/// `heading-{n}` where `n` is the heading's position in the document. An id
/// that is already taken gets `-1`, `-2`, ... appended until it is unique.
pub fn assign_heading_ids(events: &mut [Event<'static>], options: &HeadingOptions) -> Vec<Heading> {
    let mut used: HashSet<String> = HashSet::new();
    let mut headings = Vec::new();
    let mut position = 0;

    let mut i = 0;
    while i < events.len() {
        let Event::Start(Tag::Heading { level, id, .. }) = &events[i] else {
            i += 1;
            continue;
        };
        let level = *level as u8;
        let custom_id = id.as_deref().map(str::trim).filter(|id| !id.is_empty()).map(str::to_string);

        let (title, end) = heading_text(events, i + 1);
        let base = custom_id.unwrap_or_else(|| {
            let slug = slugify(&title);
            if slug.is_empty() {
                format!("heading-{position}")
            } else {
                format!("{}{slug}", options.id_prefix)
            }
        });
        let anchor = unique_id(&base, &mut used);
        log::trace!("Heading h{level} {title:?} -> #{anchor}");

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor.clone()));
        }
        if level <= options.toc_max_level {
            headings.push(Heading { id: anchor, title, level });
        }

        position += 1;
        i = end;
    }

    headings
}

/// Collect the text content of the heading starting at `start`; returns the
/// text and the index just past the heading's end tag
fn heading_text(events: &[Event<'static>], start: usize) -> (String, usize) {
    let mut text = String::new();
    for (offset, event) in events[start..].iter().enumerate() {
        match event {
            Event::End(TagEnd::Heading(_)) => return (text.trim().to_string(), start + offset + 1),
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    (text.trim().to_string(), events.len())
}

fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}
