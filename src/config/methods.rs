//! Presets, builder methods and loading for `ConversionOptions`

use std::path::Path;

use super::types::{ConversionOptions, TableLayout};
use crate::error::{ConvertError, ConvertResult};

impl ConversionOptions {
    /// Create a new `ConversionOptions` with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Migration preset: foldable sections and extracted variables
    ///
    /// Keeps the structure of authoring-tool sources as close as the target
    /// syntax allows.
    #[must_use]
    pub fn faithful() -> Self {
        Self {
            extract_variables: true,
            use_collapsible_blocks: true,
            ..Self::default()
        }
    }

    /// Raw emitter output: no normalizer, no title header, links untouched
    #[must_use]
    pub fn raw() -> Self {
        Self {
            rewrite_links: false,
            include_document_title: false,
            normalize_output: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_extract_variables(mut self, extract: bool) -> Self {
        self.extract_variables = extract;
        self
    }

    #[must_use]
    pub fn with_rewrite_links(mut self, rewrite: bool) -> Self {
        self.rewrite_links = rewrite;
        self
    }

    #[must_use]
    pub fn with_collapsible_blocks(mut self, collapsible: bool) -> Self {
        self.use_collapsible_blocks = collapsible;
        self
    }

    #[must_use]
    pub fn with_table_layout(mut self, layout: TableLayout) -> Self {
        self.table_layout = layout;
        self
    }

    #[must_use]
    pub fn with_max_list_depth(mut self, depth: u32) -> Self {
        self.max_list_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: u32) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    #[must_use]
    pub fn with_document_title(mut self, include: bool) -> Self {
        self.include_document_title = include;
        self
    }

    #[must_use]
    pub fn with_normalize_output(mut self, normalize: bool) -> Self {
        self.normalize_output = normalize;
        self
    }

    /// Check option invariants before a conversion starts
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::InvalidOptions` when a depth ceiling is zero, or
    /// when an explicit table layout is empty or has a zero-width column.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.max_recursion_depth == 0 {
            return Err(ConvertError::InvalidOptions(
                "max_recursion_depth must be at least 1".into(),
            ));
        }
        if self.max_list_depth == 0 {
            return Err(ConvertError::InvalidOptions(
                "max_list_depth must be at least 1".into(),
            ));
        }
        if let TableLayout::Explicit(specs) = &self.table_layout {
            if specs.is_empty() {
                return Err(ConvertError::InvalidOptions(
                    "explicit table layout needs at least one column".into(),
                ));
            }
            if let Some(pos) = specs.iter().position(|spec| spec.width == 0) {
                return Err(ConvertError::InvalidOptions(format!(
                    "explicit column {} has zero width",
                    pos + 1
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate options from a JSON document
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Json` for malformed JSON and
    /// `ConvertError::InvalidOptions` when validation fails.
    pub fn from_json_str(json: &str) -> ConvertResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load and validate options from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Io` when the file cannot be read, otherwise as
    /// [`ConversionOptions::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }
}
