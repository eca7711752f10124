//! Parallel batch conversion
//!
//! Documents in a batch share nothing but the options and substitutions:
//! each is parsed and converted with its own context on the rayon pool, and
//! a fault in one document is reported on its own outcome.

use rayon::prelude::*;

use crate::config::{ConversionOptions, TargetFormat};
use crate::converter::{self, ConversionResult, Substitutions};
use crate::error::ConvertResult;
use crate::tree::Document;

/// One named HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    /// Label used in errors and logs, usually the source path
    pub name: String,
    pub html: String,
}

impl BatchInput {
    #[must_use]
    pub fn new(name: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            html: html.into(),
        }
    }
}

/// Result of converting one batch document
#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub result: ConvertResult<ConversionResult>,
}

/// Convert many documents in parallel.
///
/// # Arguments
///
/// * `inputs` - Named HTML documents
/// * `format` - Target format for every document
/// * `options` - Validated once, then shared read-only
/// * `substitutions` - Shared read-only by every document
///
/// # Returns
///
/// One outcome per input, in input order
///
/// # Errors
///
/// Returns `ConvertError::InvalidOptions` when the options are rejected;
/// per-document failures are carried in the outcomes instead.
pub fn convert_batch(
    inputs: &[BatchInput],
    format: TargetFormat,
    options: &ConversionOptions,
    substitutions: &Substitutions,
) -> ConvertResult<Vec<BatchOutcome>> {
    options.validate()?;
    let emitter = converter::emitter_for(format);

    let outcomes: Vec<BatchOutcome> = inputs
        .par_iter()
        .map(|input| {
            let result = Document::parse_html(&input.html)
                .and_then(|document| converter::run(&document, emitter, options, substitutions, &input.name));
            if let Err(e) = &result {
                tracing::warn!("Failed to convert {}: {}", input.name, e);
            }
            BatchOutcome {
                name: input.name.clone(),
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::debug!(
        "Converted batch of {} documents to {} ({} failed)",
        outcomes.len(),
        format,
        failed
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved_and_contexts_isolated() {
        let inputs: Vec<BatchInput> = (0..32)
            .map(|i| {
                let html = if i % 2 == 0 {
                    format!("<p>doc {i} <span data-variable=\"Missing.Var{i}\">x</span></p>")
                } else {
                    format!("<p>doc {i}</p>")
                };
                BatchInput::new(format!("doc{i}.htm"), html)
            })
            .collect();

        let outcomes = convert_batch(
            &inputs,
            TargetFormat::Markdown,
            &ConversionOptions::default(),
            &Substitutions::default(),
        )
        .expect("Test operation should succeed");

        assert_eq!(outcomes.len(), 32);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.name, format!("doc{i}.htm"));
            let result = outcome.result.as_ref().expect("Test operation should succeed");
            assert!(result.content.starts_with(&format!("doc {i}")));
            let expected_warnings = usize::from(i % 2 == 0);
            assert_eq!(result.metadata.warnings.len(), expected_warnings);
        }
    }

    #[test]
    fn test_invalid_options_rejected_once() {
        let options = ConversionOptions::default().with_max_list_depth(0);
        let result = convert_batch(
            &[BatchInput::new("a", "<p>a</p>")],
            TargetFormat::Html,
            &options,
            &Substitutions::default(),
        );
        assert!(result.is_err());
    }
}
