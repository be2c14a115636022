//! Render configuration
//!
//! This module defines the render configuration: grammar extensions, heading
//! id policy, code highlighting, callout parsing and presentation classes.
//! Options are an explicit value handed to each render call; they can be built
//! in code or loaded from a `.rendoc.toml` file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::highlight::HighlightClassStyle;

/// Config file names searched for, in priority order
pub const CONFIG_FILES: &[&str] = &[".rendoc.toml", "rendoc.toml"];

/// Deepest heading level a ToC can collect
const MAX_HEADING_LEVEL: u8 = 6;

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    Io { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Complete render configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    /// Base grammar extensions
    pub markdown: MarkdownOptions,
    /// Heading id assignment and ToC collection
    pub headings: HeadingOptions,
    /// Code fence and inline code rendering
    pub code: CodeOptions,
    /// Callout block parsing
    pub callouts: CalloutOptions,
    /// Presentation classes and wrappers
    pub presentation: PresentationOptions,
}

/// Base grammar extensions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct MarkdownOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
    pub smart_punctuation: bool,
    /// Honour `{#custom-id}` on headings as the base id
    pub heading_attributes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: true,
            smart_punctuation: false,
            heading_attributes: false,
        }
    }
}

impl MarkdownOptions {
    /// Translate into parser options
    pub fn parser_options(&self) -> pulldown_cmark::Options {
        use pulldown_cmark::Options;

        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if self.heading_attributes {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        options
    }
}

/// Heading id assignment and ToC collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct HeadingOptions {
    /// Prepended to every generated slug (default: "toc-")
    pub id_prefix: String,
    /// Deepest heading level collected into the ToC (default: 4)
    pub toc_max_level: u8,
}

impl Default for HeadingOptions {
    fn default() -> Self {
        Self {
            id_prefix: "toc-".to_string(),
            toc_max_level: 4,
        }
    }
}

/// Code fence and inline code rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct CodeOptions {
    /// Fixed grammar for inline code spans (default: "sh")
    pub inline_language: String,
    /// Class style for highlighted spans
    pub class_style: HighlightClassStyle,
    /// Emit ```mermaid fences as diagram containers instead of highlighting them
    pub mermaid: bool,
    /// Emit the filename/language header above fenced code
    pub show_header: bool,
}

impl Default for CodeOptions {
    fn default() -> Self {
        Self {
            inline_language: "sh".to_string(),
            class_style: HighlightClassStyle::default(),
            mermaid: true,
            show_header: true,
        }
    }
}

/// Callout block parsing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct CalloutOptions {
    /// Take the first body line as the title when the opening line has none
    pub next_line_title: bool,
}

impl Default for CalloutOptions {
    fn default() -> Self {
        Self { next_line_title: true }
    }
}

/// Presentation classes and wrappers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct PresentationOptions {
    pub image_class: String,
    pub paragraph_class: String,
    pub iframe_class: String,
    pub table_wrapper_class: String,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            image_class: "md-image".to_string(),
            paragraph_class: "whitespace-pre-wrap".to_string(),
            iframe_class: "md-iframe".to_string(),
            table_wrapper_class: "table-wrapper".to_string(),
        }
    }
}

impl RenderOptions {
    /// Parse options from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    /// Load options from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display_path = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            source: e,
            path: display_path.clone(),
        })?;
        Self::parse(&content, &display_path)
    }

    /// Find and load the nearest config file, searching `start` and its ancestors
    pub fn discover(start: impl AsRef<Path>) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        for dir in start.as_ref().ancestors() {
            for name in CONFIG_FILES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    log::debug!("Using config file {}", candidate.display());
                    let options = Self::load(&candidate)?;
                    return Ok(Some((candidate, options)));
                }
            }
        }
        Ok(None)
    }

    fn parse(content: &str, display_path: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: display_path.to_string(),
            message: e.to_string(),
        })?;
        warn_unknown_keys(&table, display_path);

        let mut options: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: display_path.to_string(),
            message: e.to_string(),
        })?;
        options.normalize(display_path);
        Ok(options)
    }

    fn normalize(&mut self, display_path: &str) {
        let level = self.headings.toc_max_level;
        if !(1..=MAX_HEADING_LEVEL).contains(&level) {
            let clamped = level.clamp(1, MAX_HEADING_LEVEL);
            log::warn!("[WARN] toc-max-level {level} in {display_path} is out of range, using {clamped}");
            self.headings.toc_max_level = clamped;
        }
        if self.code.inline_language.trim().is_empty() {
            log::warn!("[WARN] Empty inline-language in {display_path}, using \"sh\"");
            self.code.inline_language = CodeOptions::default().inline_language;
        }
    }
}

/// Known keys per section, for unknown-key warnings
const SECTION_KEYS: &[(&str, &[&str])] = &[
    (
        "markdown",
        &[
            "tables",
            "strikethrough",
            "tasklists",
            "footnotes",
            "smart-punctuation",
            "heading-attributes",
        ],
    ),
    ("headings", &["id-prefix", "toc-max-level"]),
    ("code", &["inline-language", "class-style", "mermaid", "show-header"]),
    ("callouts", &["next-line-title"]),
    (
        "presentation",
        &["image-class", "paragraph-class", "iframe-class", "table-wrapper-class"],
    ),
];

fn warn_unknown_keys(table: &toml::Table, display_path: &str) {
    for (section, value) in table {
        let Some((_, known)) = SECTION_KEYS.iter().find(|(name, _)| *name == section.as_str()) else {
            log::warn!("[WARN] Unknown section in {display_path}: [{section}]");
            continue;
        };
        if let Some(keys) = value.as_table() {
            for key in keys.keys() {
                if !known.contains(&key.as_str()) {
                    log::warn!("[WARN] Unknown key in [{section}] section of {display_path}: {key}");
                }
            }
        }
    }
}
