//! Syntax highlighting adapter.
//!
//! Maps a fence language tag to class-annotated HTML using syntect's bundled
//! grammars. Tags are first normalized through an alias table (e.g. "py",
//! "python3" → Python) so the common spellings authors use all resolve to the
//! same grammar. Anything still unknown falls back to the plain text grammar;
//! highlighting never fails from the caller's point of view.
//!
//! The grammar registry is loaded once and shared read-only, so one
//! [`Highlighter`] can serve any number of concurrent renders.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::utils::html::escape_html;

/// Grammar used when a tag is absent or unknown
pub const PLAINTEXT: &str = "plaintext";

/// Class prefix for [`HighlightClassStyle::Prefixed`]
pub const CLASS_PREFIX: &str = "hl-";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Errors from the highlighting backend
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Highlighting failed for language '{language}': {source}")]
    Backend {
        language: String,
        #[source]
        source: syntect::Error,
    },

    #[error("Unknown theme '{name}' (available: {available})")]
    UnknownTheme { name: String, available: String },

    #[error("Failed to generate stylesheet: {0}")]
    Stylesheet(#[from] syntect::Error),
}

/// How highlighted spans are classed in the output
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightClassStyle {
    /// Scope classes carry the `hl-` prefix (`hl-source hl-rust`)
    #[default]
    Prefixed,
    /// Bare scope classes (`source rust`)
    Plain,
}

impl HighlightClassStyle {
    fn class_style(self) -> ClassStyle {
        match self {
            HighlightClassStyle::Prefixed => ClassStyle::SpacedPrefixed { prefix: CLASS_PREFIX },
            HighlightClassStyle::Plain => ClassStyle::Spaced,
        }
    }
}

/// Alias → syntect lookup token (file extension or grammar name)
static LANGUAGE_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Shell/Bash
    m.insert("shell", "sh");
    m.insert("sh", "sh");
    m.insert("bash", "sh");
    m.insert("zsh", "sh");
    m.insert("ksh", "sh");
    m.insert("console", "sh");
    m.insert("terminal", "sh");
    m.insert("shellscript", "sh");
    m.insert("shell-script", "sh");
    m.insert("shell-session", "sh");

    // Python
    m.insert("python", "py");
    m.insert("py", "py");
    m.insert("python3", "py");
    m.insert("py3", "py");

    // JavaScript
    m.insert("javascript", "js");
    m.insert("js", "js");
    m.insert("jsx", "js");
    m.insert("node", "js");
    m.insert("nodejs", "js");
    m.insert("mjs", "js");
    m.insert("cjs", "js");

    // Rust
    m.insert("rust", "rs");
    m.insert("rs", "rs");

    // Go
    m.insert("go", "go");
    m.insert("golang", "go");

    // Ruby
    m.insert("ruby", "rb");
    m.insert("rb", "rb");

    // C / C++ / C#
    m.insert("c", "c");
    m.insert("h", "c");
    m.insert("c++", "cpp");
    m.insert("cpp", "cpp");
    m.insert("cxx", "cpp");
    m.insert("cc", "cpp");
    m.insert("hpp", "cpp");
    m.insert("c#", "cs");
    m.insert("csharp", "cs");
    m.insert("cs", "cs");

    // JVM
    m.insert("java", "java");
    m.insert("scala", "scala");
    m.insert("groovy", "groovy");
    m.insert("clojure", "clj");
    m.insert("clj", "clj");

    // Scripting
    m.insert("php", "php");
    m.insert("perl", "pl");
    m.insert("pl", "pl");
    m.insert("lua", "lua");
    m.insert("r", "r");

    // Functional
    m.insert("haskell", "hs");
    m.insert("hs", "hs");
    m.insert("erlang", "erl");
    m.insert("erl", "erl");
    m.insert("ocaml", "ml");

    // Markup and data
    m.insert("html", "html");
    m.insert("htm", "html");
    m.insert("xhtml", "html");
    m.insert("xml", "xml");
    m.insert("svg", "xml");
    m.insert("css", "css");
    m.insert("json", "json");
    m.insert("jsonc", "json");
    m.insert("yaml", "yaml");
    m.insert("yml", "yaml");
    m.insert("markdown", "md");
    m.insert("md", "md");
    m.insert("latex", "tex");
    m.insert("tex", "tex");
    m.insert("sql", "sql");

    // Tooling
    m.insert("diff", "diff");
    m.insert("patch", "diff");
    m.insert("makefile", "mk");
    m.insert("make", "mk");
    m.insert("bat", "bat");
    m.insert("batch", "bat");
    m.insert("cmd", "bat");
    m.insert("dot", "dot");
    m.insert("graphviz", "dot");

    m
});

/// Resolve a language tag to the token used for grammar lookup.
///
/// Returns the mapped token for known aliases, otherwise the tag lowercased.
pub fn resolve_language(language: &str) -> String {
    let lower = language.trim().to_lowercase();
    LANGUAGE_ALIASES
        .get(lower.as_str())
        .map(|&s| s.to_string())
        .unwrap_or(lower)
}

/// Syntax highlighter backed by the shared grammar registry
#[derive(Clone)]
pub struct Highlighter {
    syntax_set: &'static SyntaxSet,
    class_style: HighlightClassStyle,
    inline_language: String,
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("class_style", &self.class_style)
            .field("inline_language", &self.inline_language)
            .finish_non_exhaustive()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(HighlightClassStyle::default(), "sh")
    }
}

impl Highlighter {
    /// Create a highlighter; `inline_language` is the fixed grammar used for inline code spans
    pub fn new(class_style: HighlightClassStyle, inline_language: &str) -> Self {
        Self {
            syntax_set: &SYNTAX_SET,
            class_style,
            inline_language: inline_language.to_string(),
        }
    }

    /// Find the grammar for a language tag, if the registry knows it
    pub fn find_syntax(&self, language: &str) -> Option<&'static SyntaxReference> {
        if language.trim().is_empty() {
            return None;
        }
        let token = resolve_language(language);
        if token == PLAINTEXT || token == "text" || token == "txt" {
            return Some(self.syntax_set.find_syntax_plain_text());
        }
        self.syntax_set
            .find_syntax_by_token(&token)
            .or_else(|| self.syntax_set.find_syntax_by_name(language.trim()))
    }

    /// Check if a language tag resolves to a real grammar (not the plaintext fallback)
    pub fn is_supported(&self, language: &str) -> bool {
        self.find_syntax(language)
            .is_some_and(|syntax| !std::ptr::eq(syntax, self.syntax_set.find_syntax_plain_text()))
    }

    /// Highlight a block of source text.
    ///
    /// An absent or unknown language uses the plaintext grammar. A backend
    /// failure degrades to escaped text; this never returns an error.
    pub fn highlight(&self, source: &str, language: Option<&str>) -> String {
        match self.try_highlight(source, language) {
            Ok(html) => html,
            Err(e) => {
                log::warn!("{e}; emitting escaped plain text");
                escape_html(source)
            }
        }
    }

    /// Highlight an inline code span with the fixed inline grammar
    pub fn highlight_inline(&self, source: &str) -> String {
        self.highlight(source, Some(&self.inline_language))
    }

    /// The language used for inline code spans
    pub fn inline_language(&self) -> &str {
        &self.inline_language
    }

    /// Highlight, surfacing backend failures
    pub fn try_highlight(&self, source: &str, language: Option<&str>) -> Result<String, HighlightError> {
        let syntax = match language.and_then(|lang| self.find_syntax(lang)) {
            Some(syntax) => syntax,
            None => {
                if let Some(lang) = language {
                    log::debug!("No grammar for language '{lang}', using {PLAINTEXT}");
                }
                self.syntax_set.find_syntax_plain_text()
            }
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, self.syntax_set, self.class_style.class_style());
        for line in LinesWithEndings::from(source) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|source| HighlightError::Backend {
                    language: language.unwrap_or(PLAINTEXT).to_string(),
                    source,
                })?;
        }

        Ok(generator.finalize())
    }

    /// Stylesheet for one of the bundled themes, matching this highlighter's class style
    pub fn css_for_theme(&self, theme_name: &str) -> Result<String, HighlightError> {
        let Some(theme) = THEME_SET.themes.get(theme_name) else {
            return Err(HighlightError::UnknownTheme {
                name: theme_name.to_string(),
                available: available_themes().join(", "),
            });
        };
        Ok(css_for_theme_with_class_style(theme, self.class_style.class_style())?)
    }
}

/// Names of the bundled themes
pub fn available_themes() -> Vec<&'static str> {
    THEME_SET.themes.keys().map(|name| name.as_str()).collect()
}
