//! Extended Markdown to HTML rendering.
//!
//! A document goes through a fixed pipeline:
//!
//! 1. [`markdown::MarkdownRenderer::parse`] builds an event stream with
//!    callouts, highlighted code blocks and diagram containers in place.
//! 2. [`toc::assign_heading_ids`] gives every heading a unique anchor and
//!    collects the table of contents.
//! 3. [`presentation::apply`] adds image, paragraph, iframe and table styling.
//! 4. The final stream is serialized to an HTML fragment.

pub mod callout;
pub mod config;
pub mod document;
pub mod exit_codes;
pub mod highlight;
pub mod markdown;
pub mod parallel;
pub mod presentation;
pub mod toc;
pub mod utils;

pub use crate::config::{ConfigError, RenderOptions};
pub use crate::document::{Heading, RenderedDocument};
pub use crate::highlight::{HighlightError, Highlighter};
pub use crate::parallel::render_batch;

use std::time::Instant;

use crate::markdown::MarkdownRenderer;

/// Reusable renderer. Holds no per-document state, so one instance can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: RenderOptions,
    markdown: MarkdownRenderer,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        let markdown = MarkdownRenderer::new(&options);
        Self { options, markdown }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render one document to an HTML fragment plus its table of contents
    pub fn render(&self, text: &str) -> RenderedDocument {
        let start = Instant::now();

        let mut events = self.markdown.parse(text);
        let parsed = start.elapsed();

        let headings = toc::assign_heading_ids(&mut events, &self.options.headings);
        let events = presentation::apply(events, &self.options.presentation);
        let html = self.markdown.serialize(events);

        log::debug!(
            "Rendered {} bytes into {} bytes of HTML, {} ToC entries (parse {:?}, total {:?})",
            text.len(),
            html.len(),
            headings.len(),
            parsed,
            start.elapsed()
        );

        RenderedDocument { html, headings }
    }
}

/// Render one document with the given options
pub fn render(text: &str, options: &RenderOptions) -> RenderedDocument {
    Renderer::new(options.clone()).render(text)
}
