//! Render output types.

use serde::{Deserialize, Serialize};

/// A heading collected into the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Anchor id assigned to the heading element, unique within one document
    pub id: String,
    /// Text content of the heading
    pub title: String,
    /// Source heading depth (1 for `#`)
    pub level: u8,
}

/// Result of rendering one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// HTML fragment ready to be injected into a container element
    pub html: String,
    /// ToC entries in document order
    pub headings: Vec<Heading>,
}

impl RenderedDocument {
    /// Look up a ToC entry by its anchor id
    pub fn heading(&self, id: &str) -> Option<&Heading> {
        self.headings.iter().find(|h| h.id == id)
    }
}
