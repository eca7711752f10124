//! Document tree model
//!
//! Input trees arrive either as an owned [`Node`] value or as HTML parsed with
//! [`Document::parse_html`]. Both are flattened into an arena [`Document`] whose
//! nodes are addressed by [`NodeId`]. The converter only ever reads the arena;
//! consumed subtrees are tracked by id in the conversion context, never by
//! mutating the tree.
//!
//! Arena construction and every whole-subtree query in this module are
//! iterative, so pathological nesting cannot exhaust the stack here.

mod node_util;
mod parse;

use std::collections::BTreeMap;

pub use node_util::{is_block_tag, is_skipped_tag, parse_px, style_property};

use crate::error::ConvertResult;

/// Synthetic tag given to the root of a parsed HTML document
pub const DOCUMENT_TAG: &str = "#document";

/// Owned input node: either text or an element with ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<Node>,
    },
}

impl Node {
    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// Create an element with no attributes
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            children,
        }
    }

    /// Add an attribute to an element. Text nodes are returned unchanged.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element { attributes, .. } = &mut self {
            attributes.insert(name.into().to_ascii_lowercase(), value.into());
        }
        self
    }
}

/// Index of a node inside a [`Document`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Text(String),
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable arena holding one document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Entry>,
    root: NodeId,
}

impl Document {
    /// Flatten an owned node tree into an arena.
    ///
    /// The given node becomes the root. Children keep their source order.
    #[must_use]
    pub fn from_node(node: Node) -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };

        // (node, parent) pairs; children are pushed reversed so they pop in order
        let mut stack: Vec<(Node, Option<NodeId>)> = vec![(node, None)];
        while let Some((node, parent)) = stack.pop() {
            match node {
                Node::Text(text) => {
                    doc.push(NodeData::Text(text), parent);
                }
                Node::Element {
                    tag,
                    attributes,
                    children,
                } => {
                    let id = doc.push(NodeData::Element { tag, attributes }, parent);
                    for child in children.into_iter().rev() {
                        stack.push((child, Some(id)));
                    }
                }
            }
        }
        doc
    }

    /// Parse an HTML string into an arena rooted at a synthetic
    /// [`DOCUMENT_TAG`] element.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Parse` if the byte stream cannot be read.
    pub fn parse_html(html: &str) -> ConvertResult<Self> {
        parse::parse_html(html)
    }

    pub(crate) fn empty_root() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.push(
            NodeData::Element {
                tag: DOCUMENT_TAG.to_string(),
                attributes: BTreeMap::new(),
            },
            None,
        );
        doc
    }

    pub(crate) fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Entry {
            data,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tag name of an element, `None` for text nodes
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Whether `id` is an element with the given tag
    #[must_use]
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Raw content of a text node, `None` for elements
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].data {
            NodeData::Text(text) => Some(text.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].data, NodeData::Element { .. })
    }

    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Option<&BTreeMap<String, String>> {
        match &self.nodes[id.index()].data {
            NodeData::Element { attributes, .. } => Some(attributes),
            NodeData::Text(_) => None,
        }
    }

    /// Attribute value; empty values are reported as absent
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .and_then(|attrs| attrs.get(name))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Element children only, in source order
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.is_element(child))
    }

    /// First element child with the given tag
    #[must_use]
    pub fn child_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.element_children(id).find(|&child| self.is_tag(child, tag))
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Pre-order traversal of the subtree rooted at `id`, including `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Whitespace-separated class tokens
    pub fn class_tokens(&self, id: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.attr(id, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// Case-insensitive class membership test
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_tokens(id)
            .any(|token| token.eq_ignore_ascii_case(class))
    }

    /// Concatenated text of the subtree with whitespace runs collapsed and
    /// the ends trimmed. Script and style content is excluded.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let raw = self.raw_text_content(id);
        let mut out = String::with_capacity(raw.len());
        for word in raw.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
        out
    }

    /// Concatenated text of the subtree as it appears in the source.
    /// Script and style content is excluded. Nested block elements and
    /// `<br>` are separated from their neighbours by a line break.
    #[must_use]
    pub fn raw_text_content(&self, id: NodeId) -> String {
        enum Step {
            Enter(NodeId),
            Leave,
        }

        fn break_line(out: &mut String) {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
        }

        let mut out = String::new();
        let mut stack = vec![Step::Enter(id)];
        while let Some(step) = stack.pop() {
            let current = match step {
                Step::Enter(current) => current,
                Step::Leave => {
                    break_line(&mut out);
                    continue;
                }
            };
            match &self.nodes[current.index()].data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element { tag, .. } => {
                    if is_skipped_tag(tag) {
                        continue;
                    }
                    if tag == "br" {
                        out.push('\n');
                        continue;
                    }
                    if current != id && is_block_tag(tag) {
                        break_line(&mut out);
                        stack.push(Step::Leave);
                    }
                    stack.extend(self.children(current).iter().rev().map(|&child| Step::Enter(child)));
                }
            }
        }
        out
    }

    /// Whether the subtree holds any non-whitespace text
    #[must_use]
    pub fn has_text(&self, id: NodeId) -> bool {
        self.descendants(id).any(|node| {
            self.text(node)
                .is_some_and(|text| !text.trim().is_empty())
        })
    }

    /// First descendant element (excluding `id` itself) with the given tag
    #[must_use]
    pub fn find_descendant(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id)
            .skip(1)
            .find(|&node| self.is_tag(node, tag))
    }
}

impl From<Node> for Document {
    fn from(node: Node) -> Self {
        Document::from_node(node)
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_node(Node::element(
            "div",
            vec![
                Node::element("p", vec![Node::text("Hello  "), Node::text(" world")])
                    .with_attr("class", "Note intro"),
                Node::element("script", vec![Node::text("var x = 1;")]),
                Node::element("ul", vec![Node::element("li", vec![Node::text("item")])]),
            ],
        ))
    }

    #[test]
    fn test_from_node_preserves_order_and_parents() {
        let doc = sample();
        let root = doc.root();
        assert_eq!(doc.tag(root), Some("div"));
        let kids: Vec<_> = doc.element_children(root).collect();
        assert_eq!(kids.len(), 3);
        assert_eq!(doc.tag(kids[0]), Some("p"));
        assert_eq!(doc.tag(kids[2]), Some("ul"));
        assert_eq!(doc.parent(kids[1]), Some(root));
    }

    #[test]
    fn test_text_content_collapses_and_skips_scripts() {
        let doc = sample();
        assert_eq!(doc.text_content(doc.root()), "Hello world item");
    }

    #[test]
    fn test_block_neighbours_are_separated() {
        let doc = Document::from_node(Node::element(
            "div",
            vec![
                Node::element("h2", vec![Node::text("Title")]),
                Node::element("p", vec![Node::text("one"), Node::element("br", vec![]), Node::text("two")]),
                Node::element("p", vec![Node::text("in"), Node::element("b", vec![Node::text("line")])]),
            ],
        ));
        assert_eq!(doc.raw_text_content(doc.root()), "Title\none\ntwo\ninline\n");
        assert_eq!(doc.text_content(doc.root()), "Title one two inline");
    }

    #[test]
    fn test_has_class_is_case_insensitive() {
        let doc = sample();
        let p = doc.child_by_tag(doc.root(), "p").expect("paragraph exists");
        assert!(doc.has_class(p, "note"));
        assert!(doc.has_class(p, "intro"));
        assert!(!doc.has_class(p, "warning"));
    }

    #[test]
    fn test_deep_tree_builds_without_recursion() {
        let mut node = Node::text("leaf");
        for _ in 0..10_000 {
            node = Node::element("div", vec![node]);
        }
        let doc = Document::from_node(node);
        assert_eq!(doc.len(), 10_001);
        assert_eq!(doc.text_content(doc.root()), "leaf");
        let leaf = doc
            .descendants(doc.root())
            .last()
            .expect("deepest node exists");
        assert_eq!(doc.ancestors(leaf).count(), 10_000);
    }

    #[test]
    fn test_empty_attribute_is_absent() {
        let doc = Document::from_node(Node::element("img", vec![]).with_attr("src", "  "));
        assert_eq!(doc.attr(doc.root(), "src"), None);
    }
}
