//! Blank-line and trailing-whitespace tidy
//!
//! Trailing whitespace is trimmed, runs of three or more blank lines shrink
//! to two, the document loses its leading and trailing blank lines and ends
//! with exactly one newline. Lines inside verbatim blocks are copied as is.

use super::{LineRole, Syntax, VerbatimTracker};

/// Most consecutive blank lines kept outside verbatim blocks
const MAX_BLANK_RUN: usize = 2;

/// Normalize whitespace while preserving verbatim block content.
///
/// # Arguments
///
/// * `text` - Finished output of one emitter
/// * `syntax` - Which verbatim delimiters to honour
///
/// # Returns
///
/// The tidied document, empty or ending in a single `\n`
#[must_use]
pub fn normalize_whitespace(text: &str, syntax: Syntax) -> String {
    let text = text.replace("\r\n", "\n");
    let mut tracker = VerbatimTracker::new(syntax);
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0;

    for line in text.lines() {
        let role = tracker.observe(line);
        let line = match role {
            LineRole::Verbatim => line,
            LineRole::Text | LineRole::Fence => line.trim_end(),
        };

        if role == LineRole::Verbatim {
            blank_run = 0;
            lines.push(line);
            continue;
        }

        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            blank_run += 1;
            if blank_run > MAX_BLANK_RUN {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_long_blank_runs() {
        assert_eq!(
            normalize_whitespace("a\n\n\n\n\n\nb", Syntax::AsciiDoc),
            "a\n\n\nb\n"
        );
        assert_eq!(normalize_whitespace("a\n\nb", Syntax::AsciiDoc), "a\n\nb\n");
    }

    #[test]
    fn test_trims_edges_and_trailing_spaces() {
        assert_eq!(
            normalize_whitespace("\n\n  \ntitle   \nbody\t\n\n\n", Syntax::Markdown),
            "title\nbody\n"
        );
        assert_eq!(normalize_whitespace("\n \n", Syntax::Markdown), "");
    }

    #[test]
    fn test_verbatim_lines_untouched() {
        let input = "text\n----\nkeep   \n\n\n\n\nend  \n----\n";
        assert_eq!(
            normalize_whitespace(input, Syntax::AsciiDoc),
            "text\n----\nkeep   \n\n\n\n\nend  \n----\n"
        );
    }

    #[test]
    fn test_markdown_fence_untouched() {
        let input = "```rust\nlet x = 1;   \n```\n";
        assert_eq!(normalize_whitespace(input, Syntax::Markdown), input);
    }
}
