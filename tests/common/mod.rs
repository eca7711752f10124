//! Shared document builders for integration tests

#![allow(dead_code)]

use docshift::{Document, Node};

/// A complete HTML page around `body`
pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title><style>p {{ color: red; }}</style></head><body>{}</body></html>",
        html_escape::encode_text(title),
        body
    )
}

/// `depth` nested lists, one item per level, items labelled `level N`
pub fn nested_list(tag: &str, depth: usize) -> Node {
    fn level(tag: &str, n: usize, depth: usize) -> Node {
        let mut item = vec![Node::text(format!("level {n}"))];
        if n < depth {
            item.push(level(tag, n + 1, depth));
        }
        Node::element(tag, vec![Node::element("li", item)])
    }
    level(tag, 1, depth)
}

/// `depth` nested `<div>` elements around a single paragraph
pub fn nested_divs(depth: usize, text: &str) -> Document {
    let mut node = Node::element("p", vec![Node::text(text)]);
    for _ in 0..depth {
        node = Node::element("div", vec![node]);
    }
    Document::from_node(node)
}

/// A table with `rows` x `cols` data cells labelled `rNcM`
pub fn grid_table(rows: usize, cols: usize) -> Document {
    let body = (0..rows)
        .map(|r| {
            Node::element(
                "tr",
                (0..cols)
                    .map(|c| Node::element("td", vec![Node::text(format!("r{r}c{c}"))]))
                    .collect(),
            )
        })
        .collect();
    Document::from_node(Node::element("table", vec![Node::element("tbody", body)]))
}
