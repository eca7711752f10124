//! Verbatim block detection for the line-based passes
//!
//! Every pass walks the document line by line through a [`VerbatimTracker`]
//! and leaves verbatim lines untouched.

use super::Syntax;

/// Role of a line with respect to verbatim blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineRole {
    /// Ordinary text that passes may rewrite
    Text,
    /// Opening or closing delimiter of a verbatim block
    Fence,
    /// Content inside a verbatim block, or a line that must stay byte-exact
    Verbatim,
}

/// Code fence state to track fence type and character count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeFence {
    pub char: char,
    pub count: usize,
}

/// Detect a Markdown code fence marker at the start of a line.
///
/// Returns the fence character and its run length for 3+ backticks or tildes.
pub fn detect_code_fence(line: &str) -> Option<CodeFence> {
    let trimmed = line.trim_start();
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some(CodeFence { char: first, count })
}

/// AsciiDoc delimiter of a verbatim block: `----`, `....`, `++++`, `////`
/// (four or more) or a backtick fence.
pub fn detect_asciidoc_delimiter(line: &str) -> Option<String> {
    let trimmed = line.trim_end();
    if trimmed.starts_with("```") {
        return Some("```".to_string());
    }
    let first = trimmed.chars().next()?;
    if matches!(first, '-' | '.' | '+' | '/')
        && trimmed.len() >= 4
        && trimmed.chars().all(|c| c == first)
    {
        return Some(trimmed.to_string());
    }
    None
}

#[derive(Debug, Clone)]
enum Open {
    AsciiDoc(String),
    Markdown(CodeFence),
    HtmlPre,
}

/// Line-by-line verbatim state machine
#[derive(Debug, Clone)]
pub(crate) struct VerbatimTracker {
    syntax: Syntax,
    open: Option<Open>,
}

impl VerbatimTracker {
    pub(crate) fn new(syntax: Syntax) -> Self {
        Self { syntax, open: None }
    }

    /// Feed the next line and get its role.
    pub(crate) fn observe(&mut self, line: &str) -> LineRole {
        match self.syntax {
            Syntax::AsciiDoc => self.observe_asciidoc(line),
            Syntax::Markdown => self.observe_markdown(line),
            Syntax::Html => self.observe_html(line),
        }
    }

    fn observe_asciidoc(&mut self, line: &str) -> LineRole {
        match &self.open {
            Some(Open::AsciiDoc(delimiter)) => {
                let closes = if delimiter == "```" {
                    line.trim() == "```"
                } else {
                    line.trim_end() == delimiter
                };
                if closes {
                    self.open = None;
                    LineRole::Fence
                } else {
                    LineRole::Verbatim
                }
            }
            _ => match detect_asciidoc_delimiter(line) {
                Some(delimiter) => {
                    self.open = Some(Open::AsciiDoc(delimiter));
                    LineRole::Fence
                }
                None => LineRole::Text,
            },
        }
    }

    fn observe_markdown(&mut self, line: &str) -> LineRole {
        match self.open {
            Some(Open::Markdown(fence)) => {
                let trimmed = line.trim();
                let closes = detect_code_fence(trimmed).is_some_and(|f| {
                    f.char == fence.char
                        && f.count >= fence.count
                        && trimmed.chars().all(|c| c == fence.char)
                });
                if closes {
                    self.open = None;
                    LineRole::Fence
                } else {
                    LineRole::Verbatim
                }
            }
            _ => match detect_code_fence(line) {
                Some(fence) => {
                    self.open = Some(Open::Markdown(fence));
                    LineRole::Fence
                }
                None => LineRole::Text,
            },
        }
    }

    fn observe_html(&mut self, line: &str) -> LineRole {
        let lower = line.to_ascii_lowercase();
        match self.open {
            Some(Open::HtmlPre) => {
                if lower.contains("</pre>") {
                    self.open = None;
                }
                LineRole::Verbatim
            }
            _ => {
                if let Some(pos) = lower.find("<pre") {
                    if !lower[pos..].contains("</pre>") {
                        self.open = Some(Open::HtmlPre);
                    }
                    LineRole::Verbatim
                } else {
                    LineRole::Text
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(syntax: Syntax, text: &str) -> Vec<LineRole> {
        let mut tracker = VerbatimTracker::new(syntax);
        text.lines().map(|line| tracker.observe(line)).collect()
    }

    #[test]
    fn test_asciidoc_listing_block() {
        use LineRole::*;
        assert_eq!(
            roles(Syntax::AsciiDoc, "a\n----\ncode\n----\nb"),
            vec![Text, Fence, Verbatim, Fence, Text]
        );
    }

    #[test]
    fn test_asciidoc_longer_delimiter_needs_exact_close() {
        use LineRole::*;
        assert_eq!(
            roles(Syntax::AsciiDoc, "-----\n----\n-----"),
            vec![Fence, Verbatim, Fence]
        );
    }

    #[test]
    fn test_markdown_fence_needs_matching_close() {
        use LineRole::*;
        assert_eq!(
            roles(Syntax::Markdown, "````\n```\ninner\n````\ntext"),
            vec![Fence, Verbatim, Verbatim, Fence, Text]
        );
    }

    #[test]
    fn test_html_pre_spans_lines() {
        use LineRole::*;
        assert_eq!(
            roles(Syntax::Html, "<p>a</p>\n<pre><code>x\n\ny</code></pre>\n<p>b</p>"),
            vec![Text, Verbatim, Verbatim, Verbatim, Text]
        );
    }

    #[test]
    fn test_detect_code_fence() {
        assert_eq!(detect_code_fence("```rust"), Some(CodeFence { char: '`', count: 3 }));
        assert_eq!(detect_code_fence("  ~~~~"), Some(CodeFence { char: '~', count: 4 }));
        assert_eq!(detect_code_fence("``"), None);
    }
}
