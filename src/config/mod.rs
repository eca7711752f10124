//! Configuration module for document conversion
//!
//! This module provides `ConversionOptions`, its presets and builder methods,
//! and JSON loading with validation.

// Sub-modules
pub mod methods;
pub mod types;

// Re-exports for public API
pub use types::{Alignment, ColumnSpec, ConversionOptions, TableLayout, TargetFormat};
