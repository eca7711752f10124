//! Whole-document normalization passes
//!
//! Runs after the walk, on the finished text. Each target format composes a
//! fixed sequence of passes:
//!
//! | Pass | AsciiDoc | Markdown | HTML |
//! |------|----------|----------|------|
//! | blank-line and trailing-whitespace tidy | yes | yes | yes |
//! | spacing around callouts and block images | yes | yes | |
//! | roman and outline sub-list markers to letters | yes | | |
//! | orphan `+` continuation removal | yes | | |
//! | "see" + cross reference spacing | yes | yes | |
//!
//! Every pass leaves verbatim blocks untouched and every composition is
//! idempotent.

mod block_spacing;
mod continuation;
mod cross_reference_spacing;
mod fence_detection;
mod sublist_markers;
mod whitespace_normalization;

pub(crate) use fence_detection::{LineRole, VerbatimTracker};

pub use block_spacing::ensure_block_spacing;
pub use continuation::remove_orphan_continuations;
pub use cross_reference_spacing::fix_see_references;
pub use sublist_markers::rewrite_sublist_markers;
pub use whitespace_normalization::normalize_whitespace;

/// Line syntax a pass is operating on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    AsciiDoc,
    Markdown,
    Html,
}

/// Normalize finished AsciiDoc output.
#[must_use]
pub fn normalize_asciidoc(text: &str) -> String {
    let text = normalize_whitespace(text, Syntax::AsciiDoc);
    let text = ensure_block_spacing(&text, Syntax::AsciiDoc);
    let text = rewrite_sublist_markers(&text);
    let text = remove_orphan_continuations(&text);
    fix_see_references(&text, Syntax::AsciiDoc)
}

/// Normalize finished Markdown output.
#[must_use]
pub fn normalize_markdown(text: &str) -> String {
    let text = normalize_whitespace(text, Syntax::Markdown);
    let text = ensure_block_spacing(&text, Syntax::Markdown);
    fix_see_references(&text, Syntax::Markdown)
}

/// Normalize finished HTML output.
#[must_use]
pub fn normalize_html(text: &str) -> String {
    normalize_whitespace(text, Syntax::Html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Line vocabulary covering every construct the passes react to
    const ASCIIDOC_LINES: &[&str] = &[
        "",
        "",
        "   ",
        "text",
        "text with trailing   ",
        "+",
        "NOTE: short note",
        "[NOTE]",
        "====",
        "image::images/a.png[Alt]",
        ".Caption",
        "i. first",
        "ii. second",
        "iii. third",
        "v. fifth",
        "a. letter",
        "b. letter",
        "1.1. outline",
        "1.2. outline",
        "2.1. outline",
        "----",
        "  code  ",
        "see<<anchor,Anchor>>",
        "See xref:other.adoc[Other]",
        ". item",
        "** item",
        "--",
        "|===",
        "| cell",
    ];

    const MARKDOWN_LINES: &[&str] = &[
        "",
        "",
        "text",
        "text  ",
        "> **Note:** careful",
        "> more",
        "![Alt](images/a.png)",
        "```",
        "~~~",
        "  code  ",
        "see[Other](other.md)",
        "- item",
        "  - nested",
        "# Heading",
    ];

    fn lines_from(vocabulary: &'static [&'static str]) -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vocabulary), 0..40).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        #[test]
        fn asciidoc_normalization_is_idempotent(text in lines_from(ASCIIDOC_LINES)) {
            let once = normalize_asciidoc(&text);
            let twice = normalize_asciidoc(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn markdown_normalization_is_idempotent(text in lines_from(MARKDOWN_LINES)) {
            let once = normalize_markdown(&text);
            let twice = normalize_markdown(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn html_normalization_is_idempotent(text in "[a-z<>/ \n]{0,200}") {
            let once = normalize_html(&text);
            prop_assert_eq!(normalize_html(&once), once);
        }
    }

    #[test]
    fn test_roman_markers_rewritten_once() {
        let input = "Steps:\n\ni. one\nii. two\niii. three\n";
        let once = normalize_asciidoc(input);
        assert_eq!(once, "Steps:\n\na. one\nb. two\nc. three\n");
        assert_eq!(normalize_asciidoc(&once), once);
    }

    #[test]
    fn test_html_keeps_pre_content() {
        let input = "<p>a</p>   \n\n\n\n\n<pre><code>x   \n\n\n\n\ny</code></pre>\n";
        assert_eq!(
            normalize_html(input),
            "<p>a</p>\n\n\n<pre><code>x   \n\n\n\n\ny</code></pre>\n"
        );
    }
}
