//! HTML parsing into the document arena
//!
//! html5ever builds an `RcDom`, which is then copied into the arena with an
//! explicit work stack. Comments, doctypes and processing instructions are
//! dropped; adjacent text nodes are kept as the parser produced them.

use std::collections::BTreeMap;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};

use super::{Document, NodeData, NodeId};
use crate::error::{ConvertError, ConvertResult};

pub(super) fn parse_html(html: &str) -> ConvertResult<Document> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| ConvertError::Parse(e.to_string()))?;

    let mut doc = Document::empty_root();
    let root = doc.root();

    let mut stack: Vec<(Handle, NodeId)> = dom
        .document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), root))
        .collect();

    let mut dropped = 0usize;
    while let Some((handle, parent)) = stack.pop() {
        match &handle.data {
            DomData::Text { contents } => {
                doc.push(NodeData::Text(contents.borrow().to_string()), Some(parent));
            }
            DomData::Element { name, attrs, .. } => {
                let attributes: BTreeMap<String, String> = attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();
                let id = doc.push(
                    NodeData::Element {
                        tag: name.local.to_string(),
                        attributes,
                    },
                    Some(parent),
                );
                for child in handle.children.borrow().iter().rev() {
                    stack.push((child.clone(), id));
                }
            }
            DomData::Document => {
                for child in handle.children.borrow().iter().rev() {
                    stack.push((child.clone(), parent));
                }
            }
            DomData::Doctype { .. }
            | DomData::Comment { .. }
            | DomData::ProcessingInstruction { .. } => dropped += 1,
        }
    }

    log::debug!(
        "Parsed HTML into {} arena nodes ({} non-content nodes dropped)",
        doc.len(),
        dropped
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DOCUMENT_TAG;

    #[test]
    fn test_parse_wraps_in_document_root() {
        let doc = parse_html("<p>Hello <b>world</b></p>").expect("Test operation should succeed");
        assert_eq!(doc.tag(doc.root()), Some(DOCUMENT_TAG));
        let p = doc
            .descendants(doc.root())
            .find(|&id| doc.is_tag(id, "p"))
            .expect("paragraph is parsed");
        assert_eq!(doc.text_content(p), "Hello world");
    }

    #[test]
    fn test_parse_keeps_namespaced_tags_and_drops_comments() {
        let html = r#"<body><!-- hidden --><madcap:dropdown><madcap:dropdownhead>Head</madcap:dropdownhead></madcap:dropdown></body>"#;
        let doc = parse_html(html).expect("Test operation should succeed");
        assert!(doc
            .descendants(doc.root())
            .any(|id| doc.is_tag(id, "madcap:dropdown")));
        assert_eq!(doc.text_content(doc.root()), "Head");
    }

    #[test]
    fn test_parse_lowercases_attribute_names() {
        let doc = parse_html(r#"<img SRC="a.png" Width="16">"#).expect("Test operation should succeed");
        let img = doc
            .descendants(doc.root())
            .find(|&id| doc.is_tag(id, "img"))
            .expect("image is parsed");
        assert_eq!(doc.attr(img, "src"), Some("a.png"));
        assert_eq!(doc.attr(img, "width"), Some("16"));
    }
}
