//! Recursion guard fallback
//!
//! Reached when the context is at its depth ceiling. The subtree is rendered
//! from its flattened text without descending further: simple tags keep
//! minimal wrapping, everything else carries a visible truncation marker so
//! the loss can be audited in the output.

use super::context::ConversionContext;
use super::emitters::image_ref;
use super::walker::Walker;
use crate::tree::{NodeId, is_block_tag, is_skipped_tag};

/// Text carried by every truncation marker
pub const TRUNCATION_NOTICE: &str = "truncated: maximum nesting depth exceeded";

/// Render `id` without descending into it.
pub(crate) fn fallback(walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
    let doc = walker.doc;
    let emitter = walker.emitter;

    let Some(tag) = doc.tag(id) else {
        return doc.text(id).map(|t| emitter.text(t)).unwrap_or_default();
    };
    if is_skipped_tag(tag) {
        return String::new();
    }

    ctx.warn(format!(
        "maximum nesting depth {} reached at <{}>; deeper structure flattened to text",
        ctx.max_depth, tag
    ));

    let text = doc.text_content(id);
    let escaped = emitter.positioned_text(&text, &|| is_block_tag(tag));
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<u8>().unwrap_or(6);
            emitter.heading(level, &escaped, doc.attr(id, "id"))
        }
        "p" => emitter.paragraph(&escaped),
        "strong" | "b" => emitter.strong(&escaped),
        "em" | "i" => emitter.emphasis(&escaped),
        "code" | "tt" => emitter.code_span(&text),
        "a" => match doc.attr(id, "href") {
            Some(href) => emitter.link(href, &escaped, ctx),
            None => escaped,
        },
        "img" => image_ref(doc, id, ctx)
            .map(|image| emitter.image(&image))
            .unwrap_or_default(),
        "br" => emitter.line_break(),
        _ => {
            if text.is_empty() && doc.children(id).is_empty() {
                String::new()
            } else {
                emitter.truncated(&escaped)
            }
        }
    }
}
