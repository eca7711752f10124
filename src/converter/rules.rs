//! Element classification
//!
//! Every element resolves to exactly one [`Rule`]. The special-case rules are
//! tested in priority order inside [`classify`]; the first match wins and
//! anything left over becomes a [`Rule::Generic`] handled per tag. Emitters
//! match exhaustively on the result, so a rule can never be recognized
//! without also being emitted.

use super::list_processing::ListKind;
use crate::tree::{Document, NodeId, is_skipped_tag};

/// Callout flavour of an admonition block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionKind {
    /// Map a class token to a callout kind. Accepts the plain token and
    /// authoring-tool variants such as `mc-note` or `note-box`.
    pub(crate) fn from_class(token: &str) -> Option<Self> {
        let token = token.to_ascii_lowercase();
        token
            .split(['-', '_'])
            .find_map(|part| match part {
                "note" | "info" | "information" => Some(AdmonitionKind::Note),
                "tip" | "hint" => Some(AdmonitionKind::Tip),
                "important" | "attention" => Some(AdmonitionKind::Important),
                "warning" | "danger" => Some(AdmonitionKind::Warning),
                "caution" => Some(AdmonitionKind::Caution),
                _ => None,
            })
            .filter(|_| token.split(['-', '_']).count() <= 2)
    }

    /// Upper-case label used by AsciiDoc
    pub(crate) fn label(self) -> &'static str {
        match self {
            AdmonitionKind::Note => "NOTE",
            AdmonitionKind::Tip => "TIP",
            AdmonitionKind::Important => "IMPORTANT",
            AdmonitionKind::Warning => "WARNING",
            AdmonitionKind::Caution => "CAUTION",
        }
    }

    /// Title-case label used in prose
    pub(crate) fn title(self) -> &'static str {
        match self {
            AdmonitionKind::Note => "Note",
            AdmonitionKind::Tip => "Tip",
            AdmonitionKind::Important => "Important",
            AdmonitionKind::Warning => "Warning",
            AdmonitionKind::Caution => "Caution",
        }
    }
}

/// Per-tag fallback handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenericTag {
    Heading(u8),
    Paragraph,
    Strong,
    Emphasis,
    InlineCode,
    Underline,
    Strikethrough,
    Subscript,
    Superscript,
    Anchor,
    Image,
    LineBreak,
    HorizontalRule,
    Blockquote,
    List(ListKind),
    ListItem,
    Table,
    /// Block container whose children are emitted as blocks
    Block,
    /// Unknown or presentational inline element: children pass through
    Inline,
}

/// Resolved handling for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    /// Dropped with its subtree
    Skip,
    Admonition(AdmonitionKind),
    Collapsible,
    Snippet,
    Variable,
    CrossReference,
    CodeBlock,
    Figure,
    Keyboard,
    Generic(GenericTag),
}

impl Rule {
    /// Stable name for logging
    pub(crate) fn name(self) -> &'static str {
        match self {
            Rule::Skip => "skip",
            Rule::Admonition(_) => "admonition",
            Rule::Collapsible => "collapsible",
            Rule::Snippet => "snippet",
            Rule::Variable => "variable",
            Rule::CrossReference => "cross-reference",
            Rule::CodeBlock => "code-block",
            Rule::Figure => "figure",
            Rule::Keyboard => "keyboard",
            Rule::Generic(_) => "generic",
        }
    }
}

/// Index and marker tags that carry no reader-visible content
const SILENT_TAGS: &[&str] = &[
    "madcap:keyword",
    "madcap:indexmarker",
    "madcap:concept",
    "madcap:pagebreak",
];

/// Tags that may carry an admonition class
const ADMONITION_HOSTS: &[&str] = &["div", "p", "aside", "section", "blockquote", "article"];

/// Resolve the rule for an element. Text nodes are never classified.
pub(crate) fn classify(doc: &Document, id: NodeId) -> Rule {
    let Some(tag) = doc.tag(id) else {
        return Rule::Generic(GenericTag::Inline);
    };

    if is_skipped_tag(tag) || SILENT_TAGS.contains(&tag) || doc.attributes(id).is_some_and(|a| a.contains_key("hidden")) {
        return Rule::Skip;
    }

    if ADMONITION_HOSTS.contains(&tag)
        && let Some(kind) = doc.class_tokens(id).find_map(AdmonitionKind::from_class)
    {
        return Rule::Admonition(kind);
    }

    if tag == "details"
        || tag == "madcap:dropdown"
        || (tag == "div" && doc.has_class(id, "dropdown"))
    {
        return Rule::Collapsible;
    }

    if doc.attr(id, "data-snippet").is_some()
        || (matches!(tag, "madcap:snippetblock" | "madcap:snippettext") && doc.attr(id, "src").is_some())
    {
        return Rule::Snippet;
    }

    if doc.attr(id, "data-variable").is_some()
        || (tag == "madcap:variable" && doc.attr(id, "name").is_some())
    {
        return Rule::Variable;
    }

    if tag == "madcap:xref"
        || (tag == "a" && (doc.has_class(id, "xref") || doc.attr(id, "data-xref").is_some()))
    {
        return Rule::CrossReference;
    }

    if tag == "pre" {
        return Rule::CodeBlock;
    }

    if tag == "figure" && doc.find_descendant(id, "img").is_some() {
        return Rule::Figure;
    }

    if tag == "kbd" {
        return Rule::Keyboard;
    }

    Rule::Generic(generic_tag(tag))
}

fn generic_tag(tag: &str) -> GenericTag {
    match tag {
        "h1" => GenericTag::Heading(1),
        "h2" => GenericTag::Heading(2),
        "h3" => GenericTag::Heading(3),
        "h4" => GenericTag::Heading(4),
        "h5" => GenericTag::Heading(5),
        "h6" => GenericTag::Heading(6),
        "p" => GenericTag::Paragraph,
        "strong" | "b" => GenericTag::Strong,
        "em" | "i" | "cite" | "dfn" | "var" => GenericTag::Emphasis,
        "code" | "tt" | "samp" => GenericTag::InlineCode,
        "u" | "ins" => GenericTag::Underline,
        "s" | "del" | "strike" => GenericTag::Strikethrough,
        "sub" => GenericTag::Subscript,
        "sup" => GenericTag::Superscript,
        "a" => GenericTag::Anchor,
        "img" => GenericTag::Image,
        "br" => GenericTag::LineBreak,
        "hr" => GenericTag::HorizontalRule,
        "blockquote" => GenericTag::Blockquote,
        "ol" => GenericTag::List(ListKind::Ordered),
        "ul" | "menu" => GenericTag::List(ListKind::Unordered),
        "dl" => GenericTag::List(ListKind::Definition),
        "li" => GenericTag::ListItem,
        "table" => GenericTag::Table,
        "div" | "section" | "article" | "main" | "aside" | "header" | "footer" | "nav"
        | "body" | "html" | "#document" | "figure" | "figcaption" | "address" | "caption"
        | "dd" | "dt" | "tr" | "td" | "th" | "thead" | "tbody" | "tfoot" | "summary"
        | "fieldset" | "madcap:dropdownbody" | "madcap:dropdownhead" | "madcap:snippetblock" => {
            GenericTag::Block
        }
        _ => GenericTag::Inline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn classify_root(node: Node) -> Rule {
        let doc = Document::from_node(node);
        classify(&doc, doc.root())
    }

    #[test]
    fn test_admonition_classes() {
        assert_eq!(
            classify_root(Node::element("div", vec![]).with_attr("class", "mc-note")),
            Rule::Admonition(AdmonitionKind::Note)
        );
        assert_eq!(
            classify_root(Node::element("p", vec![]).with_attr("class", "Danger")),
            Rule::Admonition(AdmonitionKind::Warning)
        );
        assert_eq!(
            classify_root(Node::element("p", vec![]).with_attr("class", "attention")),
            Rule::Admonition(AdmonitionKind::Important)
        );
        // inline hosts never become callouts
        assert_eq!(
            classify_root(Node::element("span", vec![]).with_attr("class", "note")),
            Rule::Generic(GenericTag::Inline)
        );
    }

    #[test]
    fn test_unrelated_compound_class_is_not_admonition() {
        assert_eq!(AdmonitionKind::from_class("footnote-ref-list"), None);
        assert_eq!(AdmonitionKind::from_class("tip-box"), Some(AdmonitionKind::Tip));
    }

    #[test]
    fn test_priority_admonition_before_collapsible() {
        let node = Node::element("div", vec![]).with_attr("class", "dropdown warning");
        assert_eq!(classify_root(node), Rule::Admonition(AdmonitionKind::Warning));
    }

    #[test]
    fn test_special_forms() {
        assert_eq!(classify_root(Node::element("madcap:dropdown", vec![])), Rule::Collapsible);
        assert_eq!(
            classify_root(Node::element("span", vec![]).with_attr("data-variable", "General.Product")),
            Rule::Variable
        );
        assert_eq!(
            classify_root(Node::element("madcap:xref", vec![]).with_attr("href", "a.htm")),
            Rule::CrossReference
        );
        assert_eq!(classify_root(Node::element("pre", vec![])), Rule::CodeBlock);
        assert_eq!(classify_root(Node::element("kbd", vec![])), Rule::Keyboard);
        assert_eq!(classify_root(Node::element("script", vec![])), Rule::Skip);
        assert_eq!(
            classify_root(Node::element("madcap:snippetblock", vec![]).with_attr("src", "s.flsnp")),
            Rule::Snippet
        );
    }

    #[test]
    fn test_generic_fallbacks() {
        assert_eq!(
            classify_root(Node::element("h3", vec![])),
            Rule::Generic(GenericTag::Heading(3))
        );
        assert_eq!(
            classify_root(Node::element("ol", vec![])),
            Rule::Generic(GenericTag::List(ListKind::Ordered))
        );
        assert_eq!(
            classify_root(Node::element("custom-widget", vec![])),
            Rule::Generic(GenericTag::Inline)
        );
        // figure without an image is a plain block
        assert_eq!(
            classify_root(Node::element("figure", vec![Node::text("x")])),
            Rule::Generic(GenericTag::Block)
        );
    }
}
