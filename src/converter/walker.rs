//! Depth-first dispatcher over the document arena
//!
//! [`Walker::process`] is the single entry point for turning a node into
//! target text: already-consumed nodes yield nothing, nodes at the depth
//! ceiling go to the recursion guard, and everything else is classified and
//! handed to the emitter one level deeper.

use super::context::ConversionContext;
use super::emitters::Emitter;
use super::guard;
use super::rules::classify;
use super::text_util::compress_whitespace;
use crate::tree::{Document, NodeId, is_block_tag, is_skipped_tag};

/// A document paired with the emitter rendering it
pub(crate) struct Walker<'d> {
    pub(crate) doc: &'d Document,
    pub(crate) emitter: &'d dyn Emitter,
}

impl<'d> Walker<'d> {
    pub(crate) fn new(doc: &'d Document, emitter: &'d dyn Emitter) -> Self {
        Self { doc, emitter }
    }

    /// Convert one node to target text.
    pub(crate) fn process(&self, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        if ctx.is_processed(id) {
            return String::new();
        }

        if let Some(text) = self.doc.text(id) {
            return self
                .emitter
                .positioned_text(&compress_whitespace(text), &|| opens_line(self.doc, id));
        }

        if ctx.at_depth_limit() {
            return guard::fallback(self, id, ctx);
        }

        let rule = classify(self.doc, id);
        tracing::trace!(
            "<{}> -> {} at depth {}",
            self.doc.tag(id).unwrap_or_default(),
            rule.name(),
            ctx.depth
        );
        ctx.descend(|ctx| self.emitter.emit(self, rule, id, ctx))
    }

    /// Convert all children of `id` in source order and join the results.
    pub(crate) fn walk_children(&self, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        let mut buffer = String::new();
        for &child in self.doc.children(id) {
            let chunk = self.process(child, ctx);
            push_chunk(&mut buffer, &chunk);
        }
        buffer
    }

    /// Convert the children of `id` except the ones in `skip`.
    pub(crate) fn walk_children_except(
        &self,
        id: NodeId,
        skip: &[NodeId],
        ctx: &mut ConversionContext<'_>,
    ) -> String {
        let mut buffer = String::new();
        for &child in self.doc.children(id) {
            if skip.contains(&child) {
                continue;
            }
            let chunk = self.process(child, ctx);
            push_chunk(&mut buffer, &chunk);
        }
        buffer
    }
}

/// Append a converted chunk to a buffer.
///
/// - Spaces at the start of a line are dropped
/// - Spaces before a chunk that starts a new line are dropped
/// - At most two consecutive newlines survive the join
/// - Two adjacent spaces across the join collapse to one
pub(crate) fn push_chunk(buffer: &mut String, chunk: &str) {
    if chunk.is_empty() {
        return;
    }

    let mut chunk = chunk;
    if buffer.is_empty() || buffer.ends_with('\n') {
        chunk = chunk.trim_start_matches([' ', '\t']);
    }
    if chunk.starts_with('\n') {
        let end = buffer.trim_end_matches([' ', '\t']).len();
        buffer.truncate(end);
    }

    // O(k) where k is the number of newlines at the join
    let buffer_newlines = buffer.bytes().rev().take_while(|&b| b == b'\n').count();
    let chunk_newlines = chunk.bytes().take_while(|&b| b == b'\n').count();
    if buffer.is_empty() {
        chunk = &chunk[chunk_newlines..];
    } else if buffer_newlines + chunk_newlines > 2 {
        let excess = (buffer_newlines + chunk_newlines - 2).min(chunk_newlines);
        chunk = &chunk[excess..];
    }

    if buffer.ends_with(' ') && chunk.starts_with(' ') {
        chunk = &chunk[1..];
    }
    buffer.push_str(chunk);
}

/// Whether `id` is the first visible content on its output line: nothing
/// but whitespace, skipped elements or inline wrappers separates it from the
/// start of the enclosing block or from a preceding block or `<br>`.
fn opens_line(doc: &Document, id: NodeId) -> bool {
    let mut current = id;
    while let Some(parent) = doc.parent(current) {
        let siblings = doc.children(parent);
        let position = siblings.iter().position(|&s| s == current).unwrap_or(0);
        for &before in siblings[..position].iter().rev() {
            match doc.tag(before) {
                None => {
                    if doc.text(before).is_some_and(|t| !t.trim().is_empty()) {
                        return false;
                    }
                }
                Some("br") => return true,
                Some(tag) if is_block_tag(tag) => return true,
                Some(tag) if is_skipped_tag(tag) => {}
                Some(_) => return false,
            }
        }
        match doc.tag(parent) {
            Some(tag) if is_block_tag(tag) => return true,
            _ => current = parent,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_chunk_caps_newlines() {
        let mut buffer = String::from("para one\n\n");
        push_chunk(&mut buffer, "\n\npara two\n\n");
        assert_eq!(buffer, "para one\n\npara two\n\n");
    }

    #[test]
    fn test_push_chunk_drops_line_start_spaces() {
        let mut buffer = String::from("line\n");
        push_chunk(&mut buffer, "  text");
        assert_eq!(buffer, "line\ntext");
    }

    #[test]
    fn test_push_chunk_trims_space_before_block() {
        let mut buffer = String::from("inline ");
        push_chunk(&mut buffer, "\n\nblock");
        assert_eq!(buffer, "inline\n\nblock");
    }

    #[test]
    fn test_push_chunk_collapses_double_space() {
        let mut buffer = String::from("a ");
        push_chunk(&mut buffer, " b");
        assert_eq!(buffer, "a b");
    }

    #[test]
    fn test_push_chunk_block_into_empty_buffer() {
        let mut buffer = String::new();
        push_chunk(&mut buffer, "\n\nblock\n\n");
        assert_eq!(buffer, "block\n\n");
    }
}
