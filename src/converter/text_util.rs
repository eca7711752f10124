//! Text helpers shared by the walker and the emitters

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Collapse every run of ASCII whitespace into a single space.
///
/// Allocates only when the text actually contains a run to collapse or a
/// non-space whitespace character.
pub(crate) fn compress_whitespace(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let needs_work = bytes.iter().enumerate().any(|(i, &b)| {
        (b.is_ascii_whitespace() && b != b' ')
            || (b == b' ' && bytes.get(i + 1).is_some_and(|n| n.is_ascii_whitespace()))
    });
    if !needs_work {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    Cow::Owned(out)
}

/// Lookup table for Markdown body escape characters: \ * _ ` [ ]
const BODY_ESCAPE_LUT: [bool; 256] = {
    let mut lut = [false; 256];
    lut[b'\\' as usize] = true;
    lut[b'*' as usize] = true;
    lut[b'_' as usize] = true;
    lut[b'`' as usize] = true;
    lut[b'[' as usize] = true;
    lut[b']' as usize] = true;
    lut
};

/// Escape Markdown metacharacters in a run of body text.
///
/// - Body escapes: `\` `*` `_` `` ` `` `[` `]` are backslash-prefixed
/// - A leading `#`, `>` or `-`/`+` followed by a space is backslash-prefixed
/// - A leading `N.` followed by a space gets its dot escaped
/// - `<` and `&` are entity-encoded so text never turns into raw HTML
pub(crate) fn escape_markdown(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed(text);
    }

    let needs_body_escape = text.bytes().any(|b| BODY_ESCAPE_LUT[b as usize]);
    let needs_line_start = matches!(text.as_bytes()[0], b'#' | b'>' | b'-' | b'+' | b'0'..=b'9');
    let needs_html = text.bytes().any(|b| b == b'<' || b == b'&');

    if !needs_body_escape && !needs_line_start && !needs_html {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\\' | '*' | '_' | '`' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '<' => escaped.push_str("&lt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(ch),
        }
    }

    let bytes = escaped.as_bytes();
    match bytes[0] {
        b'>' => escaped.insert(0, '\\'),
        b'#' | b'-' | b'+' => {
            let marker_len = if bytes[0] == b'#' {
                bytes.iter().take_while(|&&b| b == b'#').count()
            } else {
                1
            };
            if bytes.get(marker_len) == Some(&b' ') && marker_len <= 6 {
                escaped.insert(0, '\\');
            }
        }
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if bytes.get(digits) == Some(&b'.') && bytes.get(digits + 1) == Some(&b' ') {
                escaped.replace_range(digits..digits + 1, "\\.");
            }
        }
        _ => {}
    }
    Cow::Owned(escaped)
}

/// Inline AsciiDoc constructs that plain text must not form: attribute
/// references, cross references and inline anchors
static ASCIIDOC_INLINE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[A-Za-z0-9_][A-Za-z0-9_-]*\}|<<[^<>\n]+>>|\[\[[^\[\]\n]+\]\]")
        .expect("ASCIIDOC_INLINE_MARKUP: hardcoded regex is valid")
});

/// Text that AsciiDoc reads as block markup when it opens a line: list and
/// section markers, admonition labels, block titles, comments, delimiters
/// and attribute lines
static ASCIIDOC_LINE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:\*{1,5}|-|\.{1,5}|={1,6}|#{1,6}|\d+\.|<\d+>|(?:NOTE|TIP|IMPORTANT|WARNING|CAUTION):)(?:\s|$)|\.[^\s.]|//|\|===|'''|-{4}|\+$|\[[^\]\n]*\]\s*$)",
    )
    .expect("ASCIIDOC_LINE_MARKUP: hardcoded regex is valid")
});

/// Backslash-escape attribute references, cross references and inline
/// anchors in a run of body text.
pub(crate) fn escape_asciidoc(text: &str) -> Cow<'_, str> {
    if !text.contains('{') && !text.contains("<<") && !text.contains("[[") {
        return Cow::Borrowed(text);
    }
    ASCIIDOC_INLINE_MARKUP.replace_all(text, "\\$0")
}

/// Whether text at the start of a line would be read as block markup
pub(crate) fn opens_asciidoc_block(text: &str) -> bool {
    ASCIIDOC_LINE_MARKUP.is_match(text.trim_start())
}

/// Neutralize line-start markup with an `{empty}` prefix after any leading
/// whitespace
pub(crate) fn guard_asciidoc_line(text: &str) -> String {
    let body = text.trim_start();
    let lead = &text[..text.len() - body.len()];
    format!("{lead}{{empty}}{body}")
}

/// Entity-encode text for an HTML text node
pub(crate) fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Entity-encode text for a double-quoted HTML attribute
pub(crate) fn escape_html_attr(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Wrap the non-whitespace core of `content` in delimiters, keeping leading
/// and trailing whitespace outside them.
///
/// Whitespace-only content is returned unchanged; content spanning
/// paragraphs is returned unwrapped because inline delimiters cannot cross
/// block boundaries.
pub(crate) fn wrap_inline(content: &str, open: &str, close: &str) -> String {
    let core = content.trim();
    if core.is_empty() || core.contains("\n\n") {
        return content.to_string();
    }
    let start = content.len() - content.trim_start().len();
    let end = start + core.len();
    let mut out = String::with_capacity(content.len() + open.len() + close.len());
    out.push_str(&content[..start]);
    out.push_str(open);
    out.push_str(core);
    out.push_str(close);
    out.push_str(&content[end..]);
    out
}

/// Join all lines into one, collapsing whitespace
pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prefix every non-empty line with `prefix`
pub(crate) fn indent_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shortest delimiter of at least `min` copies of `ch` that does not occur as
/// a whole line inside `content`.
pub(crate) fn block_delimiter(content: &str, ch: char, min: usize) -> String {
    let longest_clash = content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && line.chars().all(|c| c == ch))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let len = if longest_clash >= min {
        longest_clash + 1
    } else {
        min
    };
    std::iter::repeat_n(ch, len).collect()
}

/// Fence for Markdown code blocks: longer than any backtick run at a line start
pub(crate) fn markdown_fence(content: &str) -> String {
    let longest = content
        .lines()
        .map(|line| line.trim_start().chars().take_while(|&c| c == '`').count())
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Attribute name for an extracted variable: lower-cased, every
/// non-alphanumeric character replaced with `_`
pub(crate) fn attribute_name(variable: &str) -> String {
    variable
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
