//! Orphan continuation removal
//!
//! A `+` line attaches the next block to the preceding list item. One with a
//! blank line (or the document edge) on either side, or followed by another
//! `+`, attaches nothing and renders as a literal plus sign.

use super::whitespace_normalization::normalize_whitespace;
use super::{LineRole, Syntax, VerbatimTracker};

/// Remove `+` lines that attach nothing, then re-tidy blank lines.
#[must_use]
pub fn remove_orphan_continuations(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();

    // removing one orphan can orphan its neighbour
    while let Some(index) = find_orphan(&lines) {
        tracing::trace!("Removing orphan continuation marker at line {}", index + 1);
        lines.remove(index);
    }

    let mut joined = lines.join("\n");
    joined.push('\n');
    normalize_whitespace(&joined, Syntax::AsciiDoc)
}

fn find_orphan(lines: &[&str]) -> Option<usize> {
    let mut tracker = VerbatimTracker::new(Syntax::AsciiDoc);

    for (i, line) in lines.iter().enumerate() {
        if tracker.observe(line) != LineRole::Text || line.trim() != "+" {
            continue;
        }
        let blank_or_edge = |neighbour: Option<&&str>| neighbour.is_none_or(|l| l.trim().is_empty());
        let previous = i.checked_sub(1).and_then(|p| lines.get(p));
        let next = lines.get(i + 1);
        if blank_or_edge(previous) || blank_or_edge(next) || next.is_some_and(|l| l.trim() == "+") {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphan_before_blank_removed() {
        assert_eq!(
            remove_orphan_continuations("* item\n+\n\nNext paragraph\n"),
            "* item\n\nNext paragraph\n"
        );
    }

    #[test]
    fn test_attached_continuation_kept() {
        let input = "* item\n+\n----\ncode\n----\n";
        assert_eq!(remove_orphan_continuations(input), input);
    }

    #[test]
    fn test_stacked_markers_collapse_to_one() {
        assert_eq!(
            remove_orphan_continuations("* item\n+\n+\nimage::a.png[]\n"),
            "* item\n+\nimage::a.png[]\n"
        );
    }

    #[test]
    fn test_trailing_marker_removed() {
        assert_eq!(remove_orphan_continuations("* item\n+"), "* item\n");
    }

    #[test]
    fn test_plus_inside_listing_kept() {
        let input = "----\n+\n----\n";
        assert_eq!(remove_orphan_continuations(input), input);
    }
}
