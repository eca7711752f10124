//! Format emitters
//!
//! An [`Emitter`] turns one classified element into target text. The walker
//! owns traversal, the depth counter and the processed set; list and table
//! extraction live in their own modules. Emitters supply the syntax: every
//! one matches exhaustively on [`Rule`], so that match is the format's rule
//! set, and renders the list and table models the converters build.
//!
//! The helpers here resolve source-side details (image references, link
//! targets, collapsible titles, code languages, substitutions) the same way
//! for all three formats.

pub mod asciidoc;
pub mod html;
pub mod markdown;

use regex::Regex;
use std::sync::LazyLock;

use super::context::ConversionContext;
use super::list_processing::{FlatLine, ListBlock};
use super::resolver::{ImagePlacement, classify_image, is_safe_href, normalize_image_path, rewrite_link};
use super::rules::Rule;
use super::table::{ColumnLayout, Table};
use super::text_util::{attribute_name, single_line};
use super::walker::Walker;
use crate::config::TargetFormat;
use crate::tree::{Document, NodeId, is_block_tag, parse_px};

/// Target syntax for one format.
///
/// Block-level output is wrapped in `"\n\n"` on both sides; inline output
/// never starts with a newline. Callers tell the two apart that way.
pub(crate) trait Emitter: Sync {
    fn format(&self) -> TargetFormat;

    /// Escape a run of source text
    fn text(&self, text: &str) -> String;

    /// Escape a run of source text whose line position is looked up on
    /// demand; only formats with line-start markup ask `opens_line`
    fn positioned_text(&self, text: &str, opens_line: &dyn Fn() -> bool) -> String {
        let _ = opens_line;
        self.text(text)
    }

    /// Render one classified element
    fn emit(&self, walker: &Walker<'_>, rule: Rule, id: NodeId, ctx: &mut ConversionContext<'_>) -> String;

    fn heading(&self, level: u8, text: &str, anchor: Option<&str>) -> String;
    fn paragraph(&self, text: &str) -> String;
    fn strong(&self, text: &str) -> String;
    fn emphasis(&self, text: &str) -> String;
    /// Monospace span from raw, unescaped text
    fn code_span(&self, text: &str) -> String;
    /// Link to `href` (source form); unsafe targets degrade to the text
    fn link(&self, href: &str, text: &str, ctx: &mut ConversionContext<'_>) -> String;
    fn image(&self, image: &ImageRef) -> String;
    fn line_break(&self) -> String;

    /// Flattened text with the truncation marker
    fn truncated(&self, text: &str) -> String;

    fn render_list(&self, list: &ListBlock) -> String;
    /// Bullet lines of lists flattened at the list ceiling
    fn render_flattened(&self, lines: &[FlatLine]) -> String;
    fn render_table(&self, table: &Table, layout: &ColumnLayout, ctx: &mut ConversionContext<'_>) -> String;

    /// Document header for `title`; `from_heading` is set when the title is
    /// the first `h1`, which the walk then skips
    fn document_title(&self, title: &str, from_heading: bool) -> Option<String>;

    /// Whole-document post-processing
    fn normalize(&self, text: &str) -> String;
}

// ============================================================================
// Images
// ============================================================================

/// A resolved `<img>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageRef {
    /// Normalized source path
    pub(crate) src: String,
    pub(crate) alt: String,
    pub(crate) title: Option<String>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) placement: ImagePlacement,
}

/// Resolve an `<img>` and record its path.
///
/// Returns `None` when the image has no usable source.
pub(crate) fn image_ref(doc: &Document, id: NodeId, ctx: &mut ConversionContext<'_>) -> Option<ImageRef> {
    let raw = doc.attr(id, "src").or_else(|| doc.attr(id, "data-src"))?;
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") {
        return None;
    }

    let src = normalize_image_path(raw);
    if src.is_empty() {
        return None;
    }
    if !lower.starts_with("data:") {
        ctx.images.insert(src.clone());
    }

    let alt = doc
        .attr(id, "alt")
        .or_else(|| doc.attr(id, "title"))
        .map(single_line)
        .unwrap_or_default();
    let pixels = |name: &str| doc.attr(id, name).and_then(parse_px).map(|px| px.round() as u32);

    Some(ImageRef {
        src,
        alt,
        title: doc.attr(id, "title").map(single_line),
        width: pixels("width"),
        height: pixels("height"),
        placement: classify_image(doc, id),
    })
}

// ============================================================================
// Links
// ============================================================================

/// Link target for the output, or `None` when the link must be dropped.
pub(crate) fn resolve_href(href: &str, format: TargetFormat, ctx: &ConversionContext<'_>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || !is_safe_href(href) {
        return None;
    }
    if ctx.options.rewrite_links {
        Some(rewrite_link(href, format))
    } else {
        Some(href.to_string())
    }
}

/// Target and label of a cross reference.
///
/// Empty source text falls back to the caller's cross-reference table, then
/// to the target path itself.
pub(crate) fn cross_reference(
    walker: &Walker<'_>,
    id: NodeId,
    ctx: &mut ConversionContext<'_>,
) -> (Option<String>, String) {
    let doc = walker.doc;
    let href = doc
        .attr(id, "href")
        .or_else(|| doc.attr(id, "data-xref"))
        .map(str::to_string);
    let text = walker.walk_children(id, ctx).trim().to_string();
    if !text.is_empty() {
        return (href, text);
    }

    let Some(target) = href.as_deref() else {
        return (None, String::new());
    };
    let path = target.split_once('#').map_or(target, |(path, _)| path);
    let label = ctx
        .substitutions
        .cross_refs
        .get(target)
        .or_else(|| ctx.substitutions.cross_refs.get(path))
        .cloned();
    let label = match label {
        Some(label) => walker.emitter.text(&label),
        None => {
            let shown = if path.is_empty() { target } else { path };
            walker.emitter.text(shown)
        }
    };
    (href, label)
}

// ============================================================================
// Substitutions
// ============================================================================

/// How a variable reference is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VariableUse {
    /// Attribute reference by name; the value goes to the variables file
    Attribute(String),
    /// Value inlined into the text
    Value(String),
    /// Unknown variable; its own content is kept
    Unresolved,
}

/// Look up a variable reference. Only AsciiDoc output can extract
/// variables into attributes; other formats always inline the value.
pub(crate) fn resolve_variable(
    doc: &Document,
    id: NodeId,
    format: TargetFormat,
    ctx: &mut ConversionContext<'_>,
) -> VariableUse {
    let Some(name) = doc.attr(id, "data-variable").or_else(|| doc.attr(id, "name")) else {
        return VariableUse::Unresolved;
    };
    let substitutions = ctx.substitutions;
    match substitutions.variables.get(name) {
        Some(value) if ctx.options.extract_variables && format == TargetFormat::AsciiDoc => {
            let attribute = attribute_name(name);
            ctx.used_variables.insert(attribute.clone(), value.clone());
            VariableUse::Attribute(attribute)
        }
        Some(value) => VariableUse::Value(value.clone()),
        None => {
            ctx.warn(format!("unresolved variable '{name}'; kept its source text"));
            VariableUse::Unresolved
        }
    }
}

/// Pre-rendered text for a snippet reference
pub(crate) fn resolve_snippet<'s>(
    doc: &Document,
    id: NodeId,
    ctx: &mut ConversionContext<'s>,
) -> Option<&'s str> {
    let key = doc.attr(id, "data-snippet").or_else(|| doc.attr(id, "src"))?;
    let substitutions = ctx.substitutions;
    let text = substitutions.snippet(key);
    if text.is_none() {
        ctx.warn(format!("unresolved snippet '{key}'; converted its inline content"));
    }
    text
}

/// Whether a snippet reference stands as a block
pub(crate) fn is_block_snippet(doc: &Document, id: NodeId) -> bool {
    doc.tag(id).is_some_and(|tag| tag == "madcap:snippetblock" || is_block_tag(tag))
}

// ============================================================================
// Collapsible sections and code
// ============================================================================

/// Title and body of a collapsible section.
///
/// The title comes from `summary`, `madcap:dropdownhead` or a `dropdown-head`
/// child; the body is everything else.
pub(crate) fn collapsible_parts(
    walker: &Walker<'_>,
    id: NodeId,
    ctx: &mut ConversionContext<'_>,
) -> (String, String) {
    let doc = walker.doc;
    let head = doc.element_children(id).find(|&child| {
        doc.is_tag(child, "summary")
            || doc.is_tag(child, "madcap:dropdownhead")
            || doc.class_tokens(child).any(|c| {
                let c = c.to_ascii_lowercase();
                c == "dropdown-head" || c == "dropdown-title" || c == "dropdown-toggle"
            })
    });

    let title = head
        .map(|h| single_line(&walker.walk_children(h, ctx)))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Details".to_string());
    let skip: Vec<NodeId> = head.into_iter().collect();
    let body = walker.walk_children_except(id, &skip, ctx).trim().to_string();
    (title, body)
}

static CLASS_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:language|lang|brush)[-:]([A-Za-z0-9_+#.-]+)$")
        .expect("CLASS_LANGUAGE: hardcoded regex is valid")
});

/// Language of a `<pre>` block from its own or its `<code>` child's
/// attributes
pub(crate) fn code_language(doc: &Document, pre: NodeId) -> Option<String> {
    let code = doc.child_by_tag(pre, "code");
    [Some(pre), code].into_iter().flatten().find_map(|node| {
        doc.attr(node, "data-language")
            .or_else(|| doc.attr(node, "data-lang"))
            .map(str::to_string)
            .or_else(|| {
                doc.class_tokens(node)
                    .find_map(|class| CLASS_LANGUAGE.captures(class).map(|c| c[1].to_string()))
            })
            .map(|lang| lang.to_ascii_lowercase())
    })
}

/// Verbatim content of a `<pre>` block without the edge blank lines
pub(crate) fn code_text(doc: &Document, pre: NodeId) -> String {
    let raw = doc.raw_text_content(pre).replace("\r\n", "\n");
    let raw = raw.strip_prefix('\n').unwrap_or(&raw);
    raw.trim_end().to_string()
}

// ============================================================================
// Admonitions
// ============================================================================

/// Label the author already typed at the start of a callout, in any of the
/// three output syntaxes
static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:\{empty\})?(?:<(?:strong|b)>\s*)?[*_]{0,2}\s*(?:note|tip|important|warning|caution|danger|attention)\s*:\s*[*_]{0,2}(?:\s*</(?:strong|b)>)?\s*",
    )
    .expect("LEADING_LABEL: hardcoded regex is valid")
});

/// Drop a redundant `Note:` label from the start of rendered callout content
pub(crate) fn strip_admonition_label(content: &str) -> &str {
    match LEADING_LABEL.find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    }
}

/// Apply `f` to the trimmed core of `content`, keeping edge whitespace
pub(crate) fn with_edges(content: &str, f: impl FnOnce(&str) -> String) -> String {
    let core = content.trim();
    if core.is_empty() {
        return content.to_string();
    }
    let start = content.len() - content.trim_start().len();
    let end = start + core.len();
    format!("{}{}{}", &content[..start], f(core), &content[end..])
}

/// Whether either neighbouring character is part of a word
pub(crate) fn touches_word(before: Option<char>, after: Option<char>) -> bool {
    before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric)
}

/// Characters immediately around an element in its parent's text flow
pub(crate) fn neighbour_chars(doc: &Document, id: NodeId) -> (Option<char>, Option<char>) {
    let Some(parent) = doc.parent(id) else {
        return (None, None);
    };
    let siblings = doc.children(parent);
    let Some(pos) = siblings.iter().position(|&s| s == id) else {
        return (None, None);
    };
    let before = pos
        .checked_sub(1)
        .and_then(|p| siblings.get(p))
        .and_then(|&s| last_char(doc, s));
    let after = siblings.get(pos + 1).and_then(|&s| first_char(doc, s));
    (before, after)
}

fn last_char(doc: &Document, id: NodeId) -> Option<char> {
    match doc.text(id) {
        Some(text) => text.chars().next_back(),
        None => doc.text_content(id).chars().next_back(),
    }
}

fn first_char(doc: &Document, id: NodeId) -> Option<char> {
    match doc.text(id) {
        Some(text) => text.chars().next(),
        None => doc.text_content(id).chars().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::converter::context::Substitutions;
    use crate::tree::Node;

    #[test]
    fn test_strip_admonition_label_variants() {
        assert_eq!(strip_admonition_label("Note: Keep it dry."), "Keep it dry.");
        assert_eq!(strip_admonition_label("**Warning:** Hot."), "Hot.");
        assert_eq!(strip_admonition_label("*Tip:* Try this."), "Try this.");
        assert_eq!(strip_admonition_label("<strong>Note:</strong> Html."), "Html.");
        assert_eq!(strip_admonition_label("Notes are useful"), "Notes are useful");
    }

    #[test]
    fn test_image_ref_normalizes_and_records() {
        let doc = Document::from_node(
            Node::element("img", vec![])
                .with_attr("src", "../Resources/Images/shot.png")
                .with_attr("alt", "Screen shot")
                .with_attr("width", "400"),
        );
        let options = ConversionOptions::default();
        let subs = Substitutions::default();
        let mut ctx = ConversionContext::new(&options, &subs);
        let image = image_ref(&doc, doc.root(), &mut ctx).expect("Test operation should succeed");
        assert_eq!(image.src, "images/shot.png");
        assert_eq!(image.alt, "Screen shot");
        assert_eq!(image.width, Some(400));
        assert!(ctx.images.contains("images/shot.png"));
    }

    #[test]
    fn test_code_language_sources() {
        let doc = Document::from_node(Node::element(
            "pre",
            vec![Node::element("code", vec![Node::text("x")]).with_attr("class", "hljs language-Rust")],
        ));
        assert_eq!(code_language(&doc, doc.root()), Some("rust".to_string()));

        let doc = Document::from_node(Node::element("pre", vec![]).with_attr("data-language", "bash"));
        assert_eq!(code_language(&doc, doc.root()), Some("bash".to_string()));
    }

    #[test]
    fn test_resolve_href_drops_script_links() {
        let options = ConversionOptions::default();
        let subs = Substitutions::default();
        let ctx = ConversionContext::new(&options, &subs);
        assert_eq!(resolve_href("javascript:alert(1)", TargetFormat::AsciiDoc, &ctx), None);
        assert_eq!(
            resolve_href("topic.htm#part", TargetFormat::AsciiDoc, &ctx),
            Some("topic.adoc#part".to_string())
        );
    }
}
