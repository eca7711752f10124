//! Core option types for document conversion
//!
//! This module contains `ConversionOptions` and the small enums it carries.
//! Every type here is serde-(de)serializable so options can be loaded from a
//! JSON file as well as built in code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target syntax produced by a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// AsciiDoc structured-text markup
    AsciiDoc,
    /// CommonMark-flavored Markdown
    Markdown,
    /// Sanitized HTML fragment with inline styling
    Html,
}

impl TargetFormat {
    /// File extension used for converted documents and rewritten links
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::AsciiDoc => "adoc",
            TargetFormat::Markdown => "md",
            TargetFormat::Html => "html",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetFormat::AsciiDoc => "asciidoc",
            TargetFormat::Markdown => "markdown",
            TargetFormat::Html => "html",
        };
        f.write_str(name)
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asciidoc" | "adoc" => Ok(TargetFormat::AsciiDoc),
            "markdown" | "md" => Ok(TargetFormat::Markdown),
            "html" | "htm" => Ok(TargetFormat::Html),
            other => Err(format!("unknown target format '{other}'")),
        }
    }
}

/// Horizontal alignment of a table column or cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// One caller-supplied column of an explicit table layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Relative width; must be at least 1
    pub width: u32,

    /// Default alignment for the column's cells
    #[serde(default)]
    pub alignment: Option<Alignment>,
}

impl ColumnSpec {
    #[must_use]
    pub fn new(width: u32) -> Self {
        Self {
            width,
            alignment: None,
        }
    }

    #[must_use]
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

/// How table column widths are decided
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLayout {
    /// Relative widths computed from rendered cell lengths
    #[default]
    Auto,
    /// Caller-supplied column specs; ignored with a warning when the column
    /// count does not match the table
    Explicit(Vec<ColumnSpec>),
}

/// Configuration options for a conversion call
///
/// Unset fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Record variable references for a separate attributes file instead of
    /// inlining their values (default: false)
    pub extract_variables: bool,

    /// Rewrite `.htm`/`.html` cross-document links to the target extension
    /// (default: true)
    pub rewrite_links: bool,

    /// Emit collapsible source sections as foldable blocks instead of
    /// headed sections (default: false)
    pub use_collapsible_blocks: bool,

    /// Column width strategy for tables (default: `Auto`)
    pub table_layout: TableLayout,

    /// List nesting level beyond which lists are flattened (default: 10)
    pub max_list_depth: u32,

    /// Hard ceiling on dispatcher recursion depth (default: 50)
    pub max_recursion_depth: u32,

    /// Emit the document title as a header where the format has one
    /// (default: true)
    pub include_document_title: bool,

    /// Run the post-processing normalizer over the emitted text
    /// (default: true)
    pub normalize_output: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            extract_variables: false,
            rewrite_links: true,
            use_collapsible_blocks: false,
            table_layout: TableLayout::Auto,
            max_list_depth: 10,
            max_recursion_depth: 50,
            include_document_title: true,
            normalize_output: true,
        }
    }
}
