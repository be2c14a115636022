//! Heading slug generation
//!
//! Maps arbitrary heading text to a URL-safe fragment:
//! 1. Lowercase conversion
//! 2. Drop everything that is not a letter, digit, CJK ideograph, whitespace or hyphen
//! 3. Whitespace runs → single hyphen
//! 4. Repeated hyphens collapse to one
//! 5. Leading/trailing hyphens are trimmed
//!
//! The function is total: text made only of punctuation or emoji yields an
//! empty string, and the caller picks a positional fallback.

/// Check if a character is a CJK ideograph
///
/// Covers the unified ideograph blocks plus the compatibility block, which is
/// what heading text in Chinese/Japanese documents is written in.
#[inline]
pub fn is_cjk_ideograph(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)       // CJK Unified Ideographs
        || (0x3400..=0x4DBF).contains(&code) // Extension A
        || (0x20000..=0x2A6DF).contains(&code) // Extension B
        || (0xF900..=0xFAFF).contains(&code) // Compatibility Ideographs
}

/// Generate a slug from heading text
///
/// # Examples
/// ```
/// use rendoc_lib::utils::slug::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("  Getting   Started!  "), "getting-started");
/// assert_eq!(slugify("快速 开始"), "快速-开始");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    // Pending separator: emitted lazily so leading/trailing/repeated hyphens never appear
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        } else if c.is_alphabetic() || c.is_numeric() || is_cjk_ideograph(c) {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        }
        // Punctuation, symbols and emoji are dropped without acting as separators
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_cases() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Title"), "title");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(slugify("a   b\t\tc"), "a-b-c");
        assert_eq!(slugify("  padded  "), "padded");
    }

    #[test]
    fn test_hyphens() {
        assert_eq!(slugify("Double--Hyphen"), "double-hyphen");
        assert_eq!(slugify("---leading"), "leading");
        assert_eq!(slugify("trailing---"), "trailing");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn test_punctuation_removed() {
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("API::Response > Error"), "apiresponse-error");
        assert_eq!(slugify("snake_case_name"), "snakecasename");
        assert_eq!(slugify("Version 2.1.0"), "version-210");
    }

    #[test]
    fn test_cjk_preserved() {
        assert_eq!(slugify("安装指南"), "安装指南");
        assert_eq!(slugify("第 1 章：简介"), "第-1-章简介");
    }

    #[test]
    fn test_unicode_letters_lowercased() {
        assert_eq!(slugify("Café René"), "café-rené");
        assert_eq!(slugify("ÜBER"), "über");
    }

    #[test]
    fn test_emoji_only_is_empty() {
        assert_eq!(slugify("🎉🚀"), "");
        assert_eq!(slugify("🎉 Party"), "party");
    }
}
