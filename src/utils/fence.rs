//! Fenced code block tracking for line-oriented scanners.
//!
//! The callout matcher works on raw lines before the block grammar runs, so it
//! needs to know which lines belong to a fenced code block: a `::: tip` line
//! inside a fence is code, not a callout opener.

/// Leading indentation (in columns) that still allows a fence marker
const MAX_FENCE_INDENT: usize = 3;

/// An opening fence marker found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceMarker {
    /// The fence character used (` or ~)
    pub fence_char: char,
    /// Length of the fence run (3 or more)
    pub fence_len: usize,
}

/// Parse a fence marker at the start of a line.
///
/// Backtick fences may not carry backticks in their info string (CommonMark).
pub fn parse_fence_marker(line: &str) -> Option<FenceMarker> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > MAX_FENCE_INDENT {
        return None;
    }

    let trimmed = &line[indent..];
    let fence_char = trimmed.chars().next()?;
    if fence_char != '`' && fence_char != '~' {
        return None;
    }

    let fence_len = trimmed.chars().take_while(|&c| c == fence_char).count();
    if fence_len < 3 {
        return None;
    }

    let info = &trimmed[fence_len..];
    if fence_char == '`' && info.contains('`') {
        return None;
    }

    Some(FenceMarker { fence_char, fence_len })
}

/// Tracks whether a line-by-line scan is inside a fenced code block
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    open: Option<FenceMarker>,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a line and return whether it belongs to a fenced code block
    /// (opening and closing marker lines included)
    pub fn process_line(&mut self, line: &str) -> bool {
        match self.open {
            Some(open) => {
                if let Some(marker) = parse_fence_marker(line)
                    && marker.fence_char == open.fence_char
                    && marker.fence_len >= open.fence_len
                    && line.trim_start().trim_start_matches(open.fence_char).trim().is_empty()
                {
                    self.open = None;
                }
                true
            }
            None => {
                if let Some(marker) = parse_fence_marker(line) {
                    self.open = Some(marker);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Check if we're currently inside a fence
    pub fn is_inside_fence(&self) -> bool {
        self.open.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fence_marker() {
        assert_eq!(
            parse_fence_marker("```rust"),
            Some(FenceMarker {
                fence_char: '`',
                fence_len: 3
            })
        );
        assert_eq!(
            parse_fence_marker("  ~~~~"),
            Some(FenceMarker {
                fence_char: '~',
                fence_len: 4
            })
        );
        assert_eq!(parse_fence_marker("``"), None);
        assert_eq!(parse_fence_marker("    ```"), None);
        assert_eq!(parse_fence_marker("``` a`b"), None);
        assert_eq!(parse_fence_marker("text"), None);
    }

    #[test]
    fn test_tracker_open_and_close() {
        let mut tracker = FenceTracker::new();
        assert!(!tracker.process_line("before"));
        assert!(tracker.process_line("```md"));
        assert!(tracker.process_line("::: tip"));
        assert!(tracker.is_inside_fence());
        assert!(tracker.process_line("```"));
        assert!(!tracker.is_inside_fence());
        assert!(!tracker.process_line("after"));
    }

    #[test]
    fn test_tracker_requires_matching_fence() {
        let mut tracker = FenceTracker::new();
        tracker.process_line("````");
        // Shorter fence and different character do not close
        tracker.process_line("```");
        tracker.process_line("~~~~");
        assert!(tracker.is_inside_fence());
        // Closing fence with an info string is content, not a close
        tracker.process_line("```` rust");
        assert!(tracker.is_inside_fence());
        tracker.process_line("`````");
        assert!(!tracker.is_inside_fence());
    }
}
