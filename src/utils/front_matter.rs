//! Front matter stripping for callers that load documents from disk.
//!
//! The render pipeline expects body text only; the CLI strips a leading YAML
//! (`---`) or TOML (`+++`) block before handing the text over.

use regex::Regex;
use std::sync::LazyLock;

static YAML_DELIMITER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^---\s*$").unwrap());
static TOML_DELIMITER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+\+\+\s*$").unwrap());

/// Return the document body with any leading front matter block removed.
///
/// An opening delimiter without a matching closing one is not front matter;
/// the content is returned unchanged.
///
/// # Examples
/// ```
/// use rendoc_lib::utils::front_matter::strip_front_matter;
///
/// assert_eq!(strip_front_matter("---\ntitle: Post\n---\n# Body\n"), "# Body\n");
/// assert_eq!(strip_front_matter("# No front matter\n"), "# No front matter\n");
/// ```
pub fn strip_front_matter(content: &str) -> &str {
    let first_line_end = content.find('\n').unwrap_or(content.len());
    let first_line = content[..first_line_end].trim_end_matches('\r');

    let delimiter: &Regex = if YAML_DELIMITER.is_match(first_line) {
        &YAML_DELIMITER
    } else if TOML_DELIMITER.is_match(first_line) {
        &TOML_DELIMITER
    } else {
        return content;
    };

    let mut offset = (first_line_end + 1).min(content.len());
    while offset < content.len() {
        let line_end = content[offset..].find('\n').map_or(content.len(), |i| offset + i);
        let line = content[offset..line_end].trim_end_matches('\r');
        if delimiter.is_match(line) {
            let body_start = (line_end + 1).min(content.len());
            return &content[body_start..];
        }
        offset = line_end + 1;
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_front_matter() {
        let content = "---\ntitle: Hello\ntags: [a, b]\n---\n\n# Heading\n";
        assert_eq!(strip_front_matter(content), "\n# Heading\n");
    }

    #[test]
    fn test_toml_front_matter() {
        let content = "+++\ntitle = \"Hello\"\n+++\nBody";
        assert_eq!(strip_front_matter(content), "Body");
    }

    #[test]
    fn test_crlf_front_matter() {
        let content = "---\r\ntitle: Hello\r\n---\r\nBody\r\n";
        assert_eq!(strip_front_matter(content), "Body\r\n");
    }

    #[test]
    fn test_unclosed_front_matter_is_kept() {
        let content = "---\ntitle: Hello\n# Heading\n";
        assert_eq!(strip_front_matter(content), content);
    }

    #[test]
    fn test_delimiter_must_be_first_line() {
        let content = "# Heading\n---\ntext\n---\n";
        assert_eq!(strip_front_matter(content), content);
    }

    #[test]
    fn test_front_matter_at_end_of_input() {
        assert_eq!(strip_front_matter("---\na: 1\n---"), "");
    }
}
