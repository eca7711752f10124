//! "see" + cross reference spacing
//!
//! Source text often runs the word "see" straight into a cross reference
//! (`see<<anchor>>`, `seexref:file.adoc[...]`, `see[Topic](topic.md)`)
//! because the reference was a separate element with no whitespace between.

use regex::Regex;
use std::sync::LazyLock;

use super::{LineRole, Syntax, VerbatimTracker};

static ASCIIDOC_SEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(see)(xref:|<<)").expect("ASCIIDOC_SEE: hardcoded regex is valid")
});

static MARKDOWN_SEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(see)(\[[^\]]*\]\()").expect("MARKDOWN_SEE: hardcoded regex is valid")
});

/// Insert the missing space between "see" and a cross reference.
#[must_use]
pub fn fix_see_references(text: &str, syntax: Syntax) -> String {
    let pattern = match syntax {
        Syntax::AsciiDoc => &*ASCIIDOC_SEE,
        Syntax::Markdown => &*MARKDOWN_SEE,
        Syntax::Html => return text.to_string(),
    };

    let mut tracker = VerbatimTracker::new(syntax);
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        if tracker.observe(line) == LineRole::Text && pattern.is_match(line) {
            out.push(pattern.replace_all(line, "$1 $2").into_owned());
        } else {
            out.push(line.to_string());
        }
    }

    let mut result = out.join("\n");
    if text.ends_with('\n') {
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asciidoc_see_references() {
        assert_eq!(
            fix_see_references("For details, see<<setup,Setup>>.", Syntax::AsciiDoc),
            "For details, see <<setup,Setup>>."
        );
        assert_eq!(
            fix_see_references("Seexref:install.adoc[Install]\n", Syntax::AsciiDoc),
            "See xref:install.adoc[Install]\n"
        );
    }

    #[test]
    fn test_markdown_see_link() {
        assert_eq!(
            fix_see_references("see[Topic](topic.md)", Syntax::Markdown),
            "see [Topic](topic.md)"
        );
        // a word ending in "see" is left alone
        assert_eq!(
            fix_see_references("foresee[x](y)", Syntax::Markdown),
            "foresee[x](y)"
        );
    }

    #[test]
    fn test_already_spaced_unchanged() {
        let input = "see <<a>>";
        assert_eq!(fix_see_references(input, Syntax::AsciiDoc), input);
    }
}
