//! Block spacing safety net
//!
//! Callouts and block images must stand apart from surrounding paragraphs or
//! the target syntax folds them into the neighbouring text. The walk already
//! separates blocks it emits itself; this pass catches the joins it cannot
//! see, such as pre-rendered snippet text placed next to a callout.
//!
//! A blank line is never inserted next to a line that attaches content
//! (`+`, block attribute lines, block titles, delimiters), since those
//! adjacencies are meaningful.

use regex::Regex;
use std::sync::LazyLock;

use super::{LineRole, Syntax, VerbatimTracker};

/// `[NOTE]`-style block attribute line opening a delimited callout
static ADMONITION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(NOTE|TIP|IMPORTANT|WARNING|CAUTION)\]$")
        .expect("ADMONITION_BLOCK: hardcoded regex is valid")
});

/// `NOTE: text` paragraph callout
static ADMONITION_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(NOTE|TIP|IMPORTANT|WARNING|CAUTION): ")
        .expect("ADMONITION_PARAGRAPH: hardcoded regex is valid")
});

/// First line of a Markdown blockquote callout
static MARKDOWN_CALLOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^> \*\*(Note|Tip|Important|Warning|Caution):\*\*")
        .expect("MARKDOWN_CALLOUT: hardcoded regex is valid")
});

/// Markdown image standing alone on its line
static MARKDOWN_IMAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!\[[^\]]*\]\([^)]*\)$").expect("MARKDOWN_IMAGE_LINE: hardcoded regex is valid")
});

/// Structural classification of a line for spacing decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineType {
    Blank,
    /// `+` list continuation
    Continuation,
    /// `[...]` block attribute line
    Attribute,
    /// `.Title` block title
    BlockTitle,
    /// Any delimiter line: `====`, `--`, `|===`, fences
    Delimiter,
    /// Callout start that needs a blank line before it
    Callout,
    /// Block image that needs blank lines on both sides
    BlockImage,
    /// Closing delimiter of a callout or example block
    BlockClose,
    /// Markdown blockquote line
    Quote,
    Text,
}

impl LineType {
    /// Whether a blank line may be inserted next to this line
    fn accepts_gap(self) -> bool {
        !matches!(
            self,
            LineType::Blank
                | LineType::Continuation
                | LineType::Attribute
                | LineType::BlockTitle
                | LineType::Delimiter
                | LineType::BlockClose
        )
    }
}

/// Insert blank lines around callouts and block images.
///
/// # Arguments
///
/// * `text` - Output of the whitespace pass
/// * `syntax` - Target syntax; HTML output is returned unchanged
#[must_use]
pub fn ensure_block_spacing(text: &str, syntax: Syntax) -> String {
    if syntax == Syntax::Html {
        return text.to_string();
    }

    let types = classify_lines(text, syntax);
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 8);

    // Markdown callouts are blockquotes: no gaps between their lines
    let quote_like = |t: Option<LineType>| {
        syntax == Syntax::Markdown && matches!(t, Some(LineType::Quote | LineType::Callout))
    };

    for (i, line) in lines.iter().enumerate() {
        let current = types[i];
        let previous = i.checked_sub(1).map(|p| types[p]);
        let next = types.get(i + 1).copied();

        let wants_gap_before = match current {
            LineType::Callout | LineType::Quote => !quote_like(previous),
            LineType::BlockImage => true,
            LineType::Attribute => ADMONITION_BLOCK.is_match(line),
            _ => false,
        };
        if wants_gap_before && previous.is_some_and(LineType::accepts_gap) && out.last() != Some(&"") {
            out.push("");
        }

        out.push(line);

        let wants_gap_after = match current {
            LineType::BlockImage | LineType::BlockClose => true,
            LineType::Callout | LineType::Quote => syntax == Syntax::Markdown && !quote_like(next),
            _ => false,
        };
        if wants_gap_after && next.is_some_and(LineType::accepts_gap) {
            out.push("");
        }
    }

    let mut result = out.join("\n");
    if text.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn classify_lines(text: &str, syntax: Syntax) -> Vec<LineType> {
    let mut tracker = VerbatimTracker::new(syntax);
    // open example/callout delimiters, innermost last
    let mut open_blocks: Vec<&str> = Vec::new();

    text.lines()
        .map(|line| match tracker.observe(line) {
            LineRole::Fence => LineType::Delimiter,
            LineRole::Verbatim => LineType::Text,
            LineRole::Text => match syntax {
                Syntax::AsciiDoc => classify_asciidoc(line, &mut open_blocks),
                Syntax::Markdown => classify_markdown(line),
                Syntax::Html => LineType::Text,
            },
        })
        .collect()
}

fn classify_asciidoc<'a>(line: &'a str, open_blocks: &mut Vec<&'a str>) -> LineType {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return LineType::Blank;
    }
    if trimmed == "+" {
        return LineType::Continuation;
    }
    if trimmed.len() >= 4 && trimmed.chars().all(|c| c == '=') {
        if open_blocks.last() == Some(&trimmed) {
            open_blocks.pop();
            return LineType::BlockClose;
        }
        open_blocks.push(trimmed);
        return LineType::Delimiter;
    }
    if trimmed == "--" || trimmed.starts_with("|===") || trimmed.starts_with("!===") || trimmed == "____" {
        return LineType::Delimiter;
    }
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return LineType::Attribute;
    }
    if trimmed.starts_with("image::") {
        return LineType::BlockImage;
    }
    if ADMONITION_PARAGRAPH.is_match(trimmed) {
        return LineType::Callout;
    }
    if is_block_title(trimmed) {
        return LineType::BlockTitle;
    }
    LineType::Text
}

/// `.Title` but not a list marker (`. item`, `.. item`) or an ellipsis
fn is_block_title(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('.')
        && chars
            .next()
            .is_some_and(|c| !c.is_whitespace() && c != '.')
}

fn classify_markdown(line: &str) -> LineType {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return LineType::Blank;
    }
    if MARKDOWN_CALLOUT.is_match(trimmed) {
        return LineType::Callout;
    }
    if trimmed.starts_with('>') {
        return LineType::Quote;
    }
    if MARKDOWN_IMAGE_LINE.is_match(trimmed) {
        return LineType::BlockImage;
    }
    LineType::Text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_before_asciidoc_callouts() {
        assert_eq!(
            ensure_block_spacing("text\nNOTE: careful\n", Syntax::AsciiDoc),
            "text\n\nNOTE: careful\n"
        );
        assert_eq!(
            ensure_block_spacing("text\n[WARNING]\n====\nbody\n====\nafter\n", Syntax::AsciiDoc),
            "text\n\n[WARNING]\n====\nbody\n====\n\nafter\n"
        );
    }

    #[test]
    fn test_gap_around_block_image() {
        assert_eq!(
            ensure_block_spacing("before\nimage::a.png[A]\nafter\n", Syntax::AsciiDoc),
            "before\n\nimage::a.png[A]\n\nafter\n"
        );
    }

    #[test]
    fn test_continuation_and_title_adjacency_kept() {
        let input = "* item\n+\nimage::a.png[A]\n+\n.Caption\nimage::b.png[B]\n";
        assert_eq!(ensure_block_spacing(input, Syntax::AsciiDoc), input);
    }

    #[test]
    fn test_markdown_callout_and_lazy_continuation() {
        assert_eq!(
            ensure_block_spacing("text\n> **Note:** careful\n> more\nafter\n", Syntax::Markdown),
            "text\n\n> **Note:** careful\n> more\n\nafter\n"
        );
    }

    #[test]
    fn test_nothing_inserted_in_listing() {
        let input = "----\nNOTE: inside code\nimage::x[]\n----\n";
        assert_eq!(ensure_block_spacing(input, Syntax::AsciiDoc), input);
    }
}
