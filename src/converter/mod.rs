//! Tree-to-text conversion pipeline
//!
//! Every conversion runs the same stages whatever the target format:
//!
//! 1. **Validate options** - rejected before any work starts
//! 2. **Title** - first `h1`, else `<title>`; emitted as a header when the
//!    format has one and `include_document_title` is set
//! 3. **Walk** - the [`walker::Walker`] dispatches every node through the
//!    format's [`emitters::Emitter`] with a fresh [`context::ConversionContext`]
//! 4. **Normalize** - the format's post-processing passes (optional)
//! 5. **Collect metadata** - warnings, images, word count, extracted variables
//!
//! A panic anywhere in stages 2-5 is caught and reported as
//! [`ConvertError::Internal`] for that document only.

use serde::Serialize;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

pub(crate) mod context;
pub mod emitters;
pub(crate) mod guard;
pub(crate) mod list_processing;
pub(crate) mod postprocessing;
pub mod resolver;
pub(crate) mod rules;
pub(crate) mod table;
pub(crate) mod text_util;
pub(crate) mod walker;

pub use context::Substitutions;
pub use guard::TRUNCATION_NOTICE;
pub use postprocessing::{normalize_asciidoc, normalize_html, normalize_markdown};

use crate::config::{ConversionOptions, TargetFormat};
use crate::error::{ConvertError, ConvertResult};
use crate::tree::{Document, NodeId};
use context::ConversionContext;
use emitters::Emitter;
use walker::{Walker, push_chunk};

/// Output of one document conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    /// Converted text in the target syntax
    pub content: String,

    /// `:name: value` attribute lines for extracted variables, sorted by
    /// name; only produced for AsciiDoc with `extract_variables`
    pub variables_file: Option<String>,

    pub metadata: ConversionMetadata,
}

/// Facts gathered while converting a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionMetadata {
    /// First `h1` text, else the `<title>` text
    pub title: Option<String>,

    /// Whitespace-separated words of the source text, scripts and styles
    /// excluded
    pub word_count: usize,

    /// Degradations in first-occurrence order, without duplicates
    pub warnings: Vec<String>,

    /// Normalized paths of every referenced image
    pub images: BTreeSet<String>,
}

/// Emitter for a target format
pub(crate) fn emitter_for(format: TargetFormat) -> &'static dyn Emitter {
    match format {
        TargetFormat::AsciiDoc => &emitters::asciidoc::EMITTER,
        TargetFormat::Markdown => &emitters::markdown::EMITTER,
        TargetFormat::Html => &emitters::html::EMITTER,
    }
}

/// Convert one document with the given emitter.
///
/// # Arguments
///
/// * `document` - Source tree; only read
/// * `emitter` - Format emitter
/// * `options` - Validated before anything else runs
/// * `substitutions` - Caller-supplied variables, snippets and cross references
/// * `label` - Document name used in `ConvertError::Internal`
///
/// # Returns
///
/// * `Ok(ConversionResult)` - Converted text plus metadata; degradations are
///   warnings, never errors
/// * `Err(ConvertError)` - Invalid options, or a fault caught inside this
///   document's conversion
pub(crate) fn run(
    document: &Document,
    emitter: &dyn Emitter,
    options: &ConversionOptions,
    substitutions: &Substitutions,
    label: &str,
) -> ConvertResult<ConversionResult> {
    options.validate()?;

    panic::catch_unwind(AssertUnwindSafe(|| {
        convert_document(document, emitter, options, substitutions)
    }))
    .map_err(|payload| {
        let error = ConvertError::from_panic(label, payload.as_ref());
        tracing::warn!("{}", error);
        error
    })
}

fn convert_document(
    doc: &Document,
    emitter: &dyn Emitter,
    options: &ConversionOptions,
    substitutions: &Substitutions,
) -> ConversionResult {
    let mut ctx = ConversionContext::new(options, substitutions);
    let title = find_title(doc);

    // Stage 1: document header
    let mut output = String::new();
    if options.include_document_title
        && let Some((text, heading)) = &title
        && let Some(header) = emitter.document_title(text, heading.is_some())
    {
        if let Some(h1) = heading {
            ctx.mark_processed(*h1);
        }
        output.push_str(&header);
        output.push_str("\n\n");
    }

    // Stage 2: walk
    let walker = Walker::new(doc, emitter);
    let body = walker.process(doc.root(), &mut ctx);
    push_chunk(&mut output, &body);

    // Stage 3: normalize
    let content = if options.normalize_output {
        emitter.normalize(&output)
    } else {
        output
    };

    // Stage 4: metadata
    let variables_file = (!ctx.used_variables.is_empty()).then(|| {
        ctx.used_variables
            .iter()
            .map(|(name, value)| format!(":{name}: {value}\n"))
            .collect::<String>()
    });
    let warnings = ctx.take_warnings();
    let images = std::mem::take(&mut ctx.images);

    tracing::debug!(
        "Converted document to {} ({} bytes, {} warnings, {} images)",
        emitter.format(),
        content.len(),
        warnings.len(),
        images.len()
    );

    ConversionResult {
        content,
        variables_file,
        metadata: ConversionMetadata {
            title: title.map(|(text, _)| text),
            word_count: doc.text_content(doc.root()).split_whitespace().count(),
            warnings,
            images,
        },
    }
}

/// Title text and, when it came from a heading, that heading's id
fn find_title(doc: &Document) -> Option<(String, Option<NodeId>)> {
    let root = doc.root();
    let from_heading = doc
        .descendants(root)
        .filter(|&id| doc.is_tag(id, "h1"))
        .find_map(|id| {
            let text = doc.text_content(id);
            (!text.is_empty()).then_some((text, Some(id)))
        });
    from_heading.or_else(|| {
        doc.descendants(root)
            .filter(|&id| doc.is_tag(id, "title"))
            .find_map(|id| {
                let text = doc.text_content(id);
                (!text.is_empty()).then_some((text, None))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn page() -> Document {
        Document::from_node(Node::element(
            "html",
            vec![
                Node::element("head", vec![Node::element("title", vec![Node::text("Tab title")])]),
                Node::element(
                    "body",
                    vec![
                        Node::element("h1", vec![Node::text("User Guide")]),
                        Node::element("p", vec![Node::text("Three words here.")]),
                    ],
                ),
            ],
        ))
    }

    #[test]
    fn test_title_absorbs_first_heading_in_asciidoc() {
        let result = emitters::asciidoc::convert(&page(), &ConversionOptions::default())
            .expect("Test operation should succeed");
        assert_eq!(result.content, "= User Guide\n\nThree words here.\n");
        assert_eq!(result.metadata.title.as_deref(), Some("User Guide"));
    }

    #[test]
    fn test_title_disabled_keeps_heading_in_body() {
        let options = ConversionOptions::default().with_document_title(false);
        let result = emitters::asciidoc::convert(&page(), &options).expect("Test operation should succeed");
        assert_eq!(result.content, "== User Guide\n\nThree words here.\n");
    }

    #[test]
    fn test_title_falls_back_to_title_element() {
        let doc = Document::from_node(Node::element(
            "html",
            vec![
                Node::element("head", vec![Node::element("title", vec![Node::text("Tab title")])]),
                Node::element("body", vec![Node::element("p", vec![Node::text("Body")])]),
            ],
        ));
        let result = emitters::markdown::convert(&doc, &ConversionOptions::default())
            .expect("Test operation should succeed");
        assert_eq!(result.content, "# Tab title\n\nBody\n");
    }

    #[test]
    fn test_word_count_excludes_head() {
        let result = emitters::html::convert(&page(), &ConversionOptions::default())
            .expect("Test operation should succeed");
        assert_eq!(result.metadata.word_count, 5);
    }

    #[test]
    fn test_invalid_options_rejected_before_walk() {
        let options = ConversionOptions::default().with_max_recursion_depth(0);
        let err = emitters::markdown::convert(&page(), &options).expect_err("zero depth must be rejected");
        assert!(matches!(err, ConvertError::InvalidOptions(_)));
    }

    #[test]
    fn test_variables_file_lines() {
        let doc = Document::from_node(Node::element(
            "p",
            vec![
                Node::text("Welcome to "),
                Node::element("span", vec![Node::text("X")]).with_attr("data-variable", "General.Product Name"),
            ],
        ));
        let subs = Substitutions::new().with_variable("General.Product Name", "Atlas");
        let options = ConversionOptions::default().with_extract_variables(true);

        let result = emitters::asciidoc::convert_with(&doc, &options, &subs).expect("Test operation should succeed");
        assert_eq!(result.content, "Welcome to {general_product_name}\n");
        assert_eq!(result.variables_file.as_deref(), Some(":general_product_name: Atlas\n"));

        let result = emitters::markdown::convert_with(&doc, &options, &subs).expect("Test operation should succeed");
        assert_eq!(result.content, "Welcome to Atlas\n");
        assert_eq!(result.variables_file, None);
    }
}
