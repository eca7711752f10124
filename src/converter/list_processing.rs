//! List conversion with explicit nesting frames
//!
//! Lists are converted outside the generic walk: each `<li>` is split into
//! its main text and the blocks attached to it, nested lists are claimed
//! (marked processed) and converted directly with one more frame on the
//! context's list stack, and the collected [`ListBlock`] is handed to the
//! emitter for rendering.
//!
//! ## Depth handling
//!
//! 1. **Recursion guard** - a nested list reached at the recursion ceiling is
//!    rendered by the guard like any other element.
//!
//! 2. **List ceiling** - once `max_list_depth` frames are open, deeper lists
//!    are flattened into plain bullet lines attached to the parent item.
//!    Flattening still descends one level per list, so the recursion guard
//!    bounds it as well.

use super::context::ConversionContext;
use super::guard;
use super::text_util::single_line;
use super::walker::{Walker, push_chunk};
use crate::tree::{Document, NodeId, style_property};

// ============================================================================
// Data Structures
// ============================================================================

/// Kind of list, from its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    Ordered,
    Unordered,
    Definition,
}

/// Marker style requested by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListStyle {
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    Disc,
    Circle,
    Square,
    None,
}

impl ListStyle {
    /// Parse the HTML `type` attribute (`1`, `a`, `A`, `i`, `I`, `disc`, ...)
    fn from_type_attr(value: &str) -> Option<Self> {
        match value {
            "1" => Some(ListStyle::Decimal),
            "a" => Some(ListStyle::LowerAlpha),
            "A" => Some(ListStyle::UpperAlpha),
            "i" => Some(ListStyle::LowerRoman),
            "I" => Some(ListStyle::UpperRoman),
            other => Self::from_css(other),
        }
    }

    /// Parse a CSS `list-style-type` keyword
    fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "decimal" | "decimal-leading-zero" => Some(ListStyle::Decimal),
            "lower-alpha" | "lower-latin" => Some(ListStyle::LowerAlpha),
            "upper-alpha" | "upper-latin" => Some(ListStyle::UpperAlpha),
            "lower-roman" => Some(ListStyle::LowerRoman),
            "upper-roman" => Some(ListStyle::UpperRoman),
            "disc" => Some(ListStyle::Disc),
            "circle" => Some(ListStyle::Circle),
            "square" => Some(ListStyle::Square),
            "none" => Some(ListStyle::None),
            _ => None,
        }
    }
}

/// One open list on the context's list stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListFrame {
    pub(crate) level: u32,
    pub(crate) kind: ListKind,
    pub(crate) style: Option<ListStyle>,
    pub(crate) item_count: u32,
}

/// A line of a flattened list
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FlatLine {
    /// Plain item text, rendered behind a bullet
    Bullet(String),
    /// Already-rendered output (recursion guard text), emitted as is
    Raw(String),
}

/// Content attached to a list item after its main text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ItemBlock {
    /// Rendered block content (paragraph, code, image, note, ...)
    Content(String),
    /// A rendered nested list one level deeper
    List(String),
    /// Nested lists beyond the list ceiling
    Flattened(Vec<FlatLine>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ListItemBlock {
    /// Definition term, only for definition lists
    pub(crate) term: Option<String>,
    pub(crate) text: String,
    pub(crate) blocks: Vec<ItemBlock>,
}

/// A list ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListBlock {
    pub(crate) kind: ListKind,
    pub(crate) style: Option<ListStyle>,
    /// First number of an ordered list when it is not 1
    pub(crate) start: Option<u32>,
    /// Nesting level, 0 for a top-level list
    pub(crate) level: u32,
    pub(crate) items: Vec<ListItemBlock>,
}

// ============================================================================
// Public API
// ============================================================================

/// Convert a `<ul>`, `<ol>` or `<dl>` element.
///
/// # Arguments
///
/// * `walker` - Walker bound to the document and the target emitter
/// * `list_id` - The list element
/// * `ctx` - Conversion context; its list stack determines the level
///
/// # Returns
///
/// Rendered list text, or an empty string for a list without items
pub(crate) fn convert_list(walker: &Walker<'_>, list_id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
    let doc = walker.doc;
    let level = ctx.list_level();

    if level >= ctx.options.max_list_depth {
        warn_flattened(ctx);
        let mut lines = Vec::new();
        flatten_list(walker, list_id, ctx, &mut lines);
        if lines.is_empty() {
            return String::new();
        }
        return walker.emitter.render_flattened(&lines);
    }

    let kind = list_kind(doc, list_id);
    let style = list_style(doc, list_id);
    let start = match kind {
        ListKind::Ordered => doc
            .attr(list_id, "start")
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|&n| n != 1),
        _ => None,
    };

    let frame = ListFrame {
        level,
        kind,
        style,
        item_count: 0,
    };
    let (items, frame) = ctx.with_list_frame(frame, |ctx| match kind {
        ListKind::Definition => collect_definition_items(walker, list_id, ctx),
        ListKind::Ordered | ListKind::Unordered => collect_items(walker, list_id, ctx),
    });

    if items.is_empty() {
        return String::new();
    }

    tracing::debug!(
        "Converted {:?} list at level {} with {} items",
        frame.kind,
        frame.level,
        frame.item_count
    );

    walker.emitter.render_list(&ListBlock {
        kind,
        style,
        start,
        level,
        items,
    })
}

/// Whether a tag opens a list
#[inline]
pub(crate) fn is_list_tag(tag: &str) -> bool {
    matches!(tag, "ul" | "ol" | "dl" | "menu")
}

fn list_kind(doc: &Document, id: NodeId) -> ListKind {
    match doc.tag(id) {
        Some("ol") => ListKind::Ordered,
        Some("dl") => ListKind::Definition,
        _ => ListKind::Unordered,
    }
}

/// Marker style from the `type` attribute, inline style, or a class token
fn list_style(doc: &Document, id: NodeId) -> Option<ListStyle> {
    if let Some(value) = doc.attr(id, "type")
        && let Some(style) = ListStyle::from_type_attr(value)
    {
        return Some(style);
    }
    if let Some(css) = doc.attr(id, "style") {
        let from_css = style_property(css, "list-style-type")
            .and_then(ListStyle::from_css)
            .or_else(|| {
                style_property(css, "list-style")
                    .and_then(|v| v.split_whitespace().find_map(ListStyle::from_css))
            });
        if from_css.is_some() {
            return from_css;
        }
    }
    doc.class_tokens(id).find_map(ListStyle::from_css)
}

fn bump_item_count(ctx: &mut ConversionContext<'_>) {
    if let Some(frame) = ctx.list_stack.last_mut() {
        frame.item_count += 1;
    }
}

fn warn_flattened(ctx: &mut ConversionContext<'_>) {
    let limit = ctx.options.max_list_depth;
    ctx.warn(format!(
        "list nesting exceeds {limit} levels; deeper lists were flattened"
    ));
}

// ============================================================================
// Item collection
// ============================================================================

/// Items of an ordered or unordered list
fn collect_items(walker: &Walker<'_>, list_id: NodeId, ctx: &mut ConversionContext<'_>) -> Vec<ListItemBlock> {
    let doc = walker.doc;
    let mut items: Vec<ListItemBlock> = Vec::new();

    for &child in doc.children(list_id) {
        if ctx.is_processed(child) {
            continue;
        }
        match doc.tag(child) {
            Some("li") => {
                items.push(convert_item(walker, child, ctx));
                bump_item_count(ctx);
            }
            Some(tag) if is_list_tag(tag) => {
                // a list directly inside a list belongs to the previous item
                if let Some(block) = nested_list(walker, child, ctx) {
                    attach_block(&mut items, block);
                }
            }
            Some(_) => {
                let rendered = walker.process(child, ctx);
                let body = rendered.trim();
                if body.is_empty() {
                    continue;
                }
                if rendered.trim_start_matches([' ', '\t']).starts_with('\n') {
                    attach_block(&mut items, ItemBlock::Content(body.to_string()));
                } else {
                    items.push(ListItemBlock {
                        text: body.to_string(),
                        ..ListItemBlock::default()
                    });
                    bump_item_count(ctx);
                }
            }
            None => {
                let text = walker.process(child, ctx);
                if !text.trim().is_empty() {
                    items.push(ListItemBlock {
                        text: text.trim().to_string(),
                        ..ListItemBlock::default()
                    });
                    bump_item_count(ctx);
                }
            }
        }
    }
    items
}

/// Terms and definitions of a `<dl>`; each `<dt>` opens an item and the
/// following `<dd>` elements fill it
fn collect_definition_items(
    walker: &Walker<'_>,
    list_id: NodeId,
    ctx: &mut ConversionContext<'_>,
) -> Vec<ListItemBlock> {
    let doc = walker.doc;
    let mut items: Vec<ListItemBlock> = Vec::new();

    // `<div>` wrappers around dt/dd groups are transparent
    let mut entries: Vec<NodeId> = Vec::new();
    for child in doc.element_children(list_id) {
        if doc.is_tag(child, "div") {
            entries.extend(doc.element_children(child));
        } else {
            entries.push(child);
        }
    }

    for child in entries {
        if ctx.is_processed(child) {
            continue;
        }
        match doc.tag(child) {
            Some("dt") => {
                let term = single_line(&walker.walk_children(child, ctx));
                items.push(ListItemBlock {
                    term: Some(term),
                    ..ListItemBlock::default()
                });
                bump_item_count(ctx);
            }
            Some("dd") => {
                let body = convert_item(walker, child, ctx);
                match items.last_mut() {
                    Some(item) if item.text.is_empty() && item.blocks.is_empty() => {
                        item.text = body.text;
                        item.blocks = body.blocks;
                    }
                    Some(item) => {
                        if !body.text.is_empty() {
                            item.blocks.push(ItemBlock::Content(body.text));
                        }
                        item.blocks.extend(body.blocks);
                    }
                    None => {
                        items.push(body);
                        bump_item_count(ctx);
                    }
                }
            }
            Some(tag) if is_list_tag(tag) => {
                if let Some(block) = nested_list(walker, child, ctx) {
                    attach_block(&mut items, block);
                }
            }
            _ => {
                let rendered = walker.process(child, ctx);
                let body = rendered.trim();
                if !body.is_empty() {
                    attach_block(&mut items, ItemBlock::Content(body.to_string()));
                }
            }
        }
    }
    items
}

fn attach_block(items: &mut Vec<ListItemBlock>, block: ItemBlock) {
    match items.last_mut() {
        Some(item) => item.blocks.push(block),
        None => items.push(ListItemBlock {
            blocks: vec![block],
            ..ListItemBlock::default()
        }),
    }
}

/// Split one `<li>` (or `<dd>`) into main text and attached blocks.
///
/// Inline children form the main text. The first paragraph becomes the main
/// text when nothing precedes it. Every other block child, and inline text
/// that follows a block, is attached in source order.
fn convert_item(walker: &Walker<'_>, item_id: NodeId, ctx: &mut ConversionContext<'_>) -> ListItemBlock {
    let doc = walker.doc;
    let mut text = String::new();
    let mut pending = String::new();
    let mut blocks: Vec<ItemBlock> = Vec::new();

    for &child in doc.children(item_id) {
        if ctx.is_processed(child) {
            continue;
        }

        if doc.tag(child).is_some_and(is_list_tag) {
            flush_pending(&mut pending, &mut blocks);
            if let Some(block) = nested_list(walker, child, ctx) {
                blocks.push(block);
            }
            continue;
        }

        let rendered = walker.process(child, ctx);
        if rendered.is_empty() {
            continue;
        }

        let is_block = rendered.trim_start_matches([' ', '\t']).starts_with('\n');
        if !is_block {
            if blocks.is_empty() {
                push_chunk(&mut text, &rendered);
            } else {
                push_chunk(&mut pending, &rendered);
            }
            continue;
        }

        let body = rendered.trim();
        if body.is_empty() {
            continue;
        }
        if blocks.is_empty() && text.trim().is_empty() && doc.is_tag(child, "p") {
            text = body.to_string();
            continue;
        }
        flush_pending(&mut pending, &mut blocks);
        blocks.push(ItemBlock::Content(body.to_string()));
    }
    flush_pending(&mut pending, &mut blocks);

    // the item line holds one paragraph; the rest moves to the first block
    let text = text.trim();
    let text = match text.split_once("\n\n") {
        Some((head, rest)) if !rest.trim().is_empty() => {
            blocks.insert(0, ItemBlock::Content(rest.trim().to_string()));
            head.trim_end().to_string()
        }
        _ => text.to_string(),
    };

    ListItemBlock {
        term: None,
        text,
        blocks,
    }
}

fn flush_pending(pending: &mut String, blocks: &mut Vec<ItemBlock>) {
    let body = pending.trim();
    if !body.is_empty() {
        blocks.push(ItemBlock::Content(body.to_string()));
    }
    pending.clear();
}

/// Claim a nested list and convert it one level deeper.
fn nested_list(walker: &Walker<'_>, list_id: NodeId, ctx: &mut ConversionContext<'_>) -> Option<ItemBlock> {
    ctx.mark_processed(list_id);

    if ctx.at_depth_limit() {
        let rendered = guard::fallback(walker, list_id, ctx);
        let body = rendered.trim();
        return (!body.is_empty()).then(|| ItemBlock::Content(body.to_string()));
    }

    if ctx.list_level() >= ctx.options.max_list_depth {
        warn_flattened(ctx);
        let mut lines = Vec::new();
        ctx.descend(|ctx| flatten_list(walker, list_id, ctx, &mut lines));
        return (!lines.is_empty()).then_some(ItemBlock::Flattened(lines));
    }

    let rendered = ctx.descend(|ctx| convert_list(walker, list_id, ctx));
    let body = rendered.trim_matches('\n');
    (!body.trim().is_empty()).then(|| ItemBlock::List(body.to_string()))
}

/// Collect plain bullet lines for a list and everything nested in it.
fn flatten_list(
    walker: &Walker<'_>,
    list_id: NodeId,
    ctx: &mut ConversionContext<'_>,
    lines: &mut Vec<FlatLine>,
) {
    let doc = walker.doc;
    for child in doc.element_children(list_id) {
        if doc.tag(child).is_some_and(is_list_tag) {
            flatten_nested(walker, child, ctx, lines);
            continue;
        }

        let mut text = String::new();
        let mut nested = Vec::new();
        for &grandchild in doc.children(child) {
            if doc.tag(grandchild).is_some_and(is_list_tag) {
                nested.push(grandchild);
            } else {
                push_chunk(&mut text, &walker.process(grandchild, ctx));
            }
        }

        let line = single_line(&text);
        if !line.is_empty() {
            lines.push(FlatLine::Bullet(line));
        }
        for list in nested {
            flatten_nested(walker, list, ctx, lines);
        }
    }
}

fn flatten_nested(
    walker: &Walker<'_>,
    list_id: NodeId,
    ctx: &mut ConversionContext<'_>,
    lines: &mut Vec<FlatLine>,
) {
    if ctx.at_depth_limit() {
        let rendered = guard::fallback(walker, list_id, ctx);
        let body = rendered.trim();
        if !body.is_empty() {
            lines.push(FlatLine::Raw(body.to_string()));
        }
    } else {
        ctx.descend(|ctx| flatten_list(walker, list_id, ctx, lines));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tree::Node;

    #[test]
    fn test_list_style_sources() {
        let doc = Document::from_node(Node::element("ol", vec![]).with_attr("type", "a"));
        assert_eq!(list_style(&doc, doc.root()), Some(ListStyle::LowerAlpha));

        let doc = Document::from_node(
            Node::element("ol", vec![]).with_attr("style", "list-style-type: upper-roman"),
        );
        assert_eq!(list_style(&doc, doc.root()), Some(ListStyle::UpperRoman));

        let doc = Document::from_node(
            Node::element("ul", vec![]).with_attr("style", "list-style: square inside"),
        );
        assert_eq!(list_style(&doc, doc.root()), Some(ListStyle::Square));

        let doc = Document::from_node(Node::element("ol", vec![]).with_attr("class", "lower-alpha"));
        assert_eq!(list_style(&doc, doc.root()), Some(ListStyle::LowerAlpha));

        let doc = Document::from_node(Node::element("ol", vec![]));
        assert_eq!(list_style(&doc, doc.root()), None);
    }
}
