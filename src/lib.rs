//! docshift: convert normalized documentation trees to AsciiDoc, Markdown
//! or sanitized HTML.
//!
//! # Usage
//!
//! ## Synchronous
//! ```rust
//! # use docshift::{convert_html, ConversionOptions, TargetFormat};
//! let html = "<html><body><h1>Title</h1><p>Content</p></body></html>";
//! let result = convert_html(html, TargetFormat::AsciiDoc, &ConversionOptions::default())?;
//! assert_eq!(result.content, "= Title\n\nContent\n");
//! # Ok::<(), docshift::ConvertError>(())
//! ```
//!
//! ## Asynchronous
//! ```rust
//! # use docshift::{convert_async, ConversionOptions, TargetFormat};
//! # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
//! let html = "<p>Content</p>".to_string();
//! let result = convert_async(html, TargetFormat::Markdown, ConversionOptions::default()).await?;
//! assert_eq!(result.content, "Content\n");
//! # Ok::<(), docshift::ConvertError>(())
//! # }).expect("conversion");
//! ```

pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod tree;

use std::time::Duration;

pub use batch::{BatchInput, BatchOutcome, convert_batch};
pub use config::{Alignment, ColumnSpec, ConversionOptions, TableLayout, TargetFormat};
pub use converter::emitters::{asciidoc, html, markdown};
pub use converter::{ConversionMetadata, ConversionResult, Substitutions, TRUNCATION_NOTICE};
pub use error::{ConvertError, ConvertResult};
pub use tree::{Document, Node, NodeId};

/// Convert a document tree to the target format.
///
/// # Errors
///
/// Returns `ConvertError::InvalidOptions` for rejected options and
/// `ConvertError::Internal` when the conversion of this document faults.
pub fn convert(
    document: &Document,
    format: TargetFormat,
    options: &ConversionOptions,
) -> ConvertResult<ConversionResult> {
    convert_with(document, format, options, &Substitutions::default())
}

/// Convert a document tree with variable, snippet and cross-reference
/// substitutions.
///
/// # Errors
///
/// See [`convert`].
pub fn convert_with(
    document: &Document,
    format: TargetFormat,
    options: &ConversionOptions,
    substitutions: &Substitutions,
) -> ConvertResult<ConversionResult> {
    converter::run(
        document,
        converter::emitter_for(format),
        options,
        substitutions,
        "document",
    )
}

/// Parse an HTML string and convert it.
///
/// # Errors
///
/// Returns `ConvertError::Parse` when the markup cannot be read, otherwise as
/// [`convert`].
pub fn convert_html(
    html: &str,
    format: TargetFormat,
    options: &ConversionOptions,
) -> ConvertResult<ConversionResult> {
    let document = Document::parse_html(html)?;
    convert(&document, format, options)
}

/// Convert HTML on the blocking thread pool.
///
/// Parsing and conversion are CPU-bound, so they run under
/// `tokio::task::spawn_blocking` and never stall the async executor.
///
/// # Errors
///
/// Returns `ConvertError::TaskJoin` if the blocking task panicked outside the
/// conversion's own panic boundary, otherwise as [`convert_html`].
pub async fn convert_async(
    html: String,
    format: TargetFormat,
    options: ConversionOptions,
) -> ConvertResult<ConversionResult> {
    tokio::task::spawn_blocking(move || convert_html(&html, format, &options))
        .await
        .map_err(|e| ConvertError::TaskJoin(e.to_string()))?
}

/// [`convert_async`] with a wall-clock budget.
///
/// On expiry the caller gets `ConvertError::Timeout` at once; the blocking
/// task runs to completion in the background and its result is discarded.
///
/// # Errors
///
/// Returns `ConvertError::Timeout` when `budget` elapses first, otherwise as
/// [`convert_async`].
pub async fn convert_with_timeout(
    html: String,
    format: TargetFormat,
    options: ConversionOptions,
    budget: Duration,
) -> ConvertResult<ConversionResult> {
    match tokio::time::timeout(budget, convert_async(html, format, options)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Conversion exceeded its {:?} budget", budget);
            Err(ConvertError::Timeout(budget))
        }
    }
}
