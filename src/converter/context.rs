//! Per-call conversion state
//!
//! A fresh [`ConversionContext`] is created for every top-level document
//! conversion and dropped when it returns. Nothing in it is shared between
//! documents; only the caller's [`Substitutions`] and options are borrowed.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::list_processing::ListFrame;
use crate::config::ConversionOptions;
use crate::tree::NodeId;

/// Caller-supplied inline substitutions, read but never written by the
/// converter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Substitutions {
    /// Variable values keyed by qualified name (`Set.Name`)
    pub variables: BTreeMap<String, String>,
    /// Pre-rendered snippet text keyed by snippet path
    pub snippets: BTreeMap<String, String>,
    /// Link text for cross-reference targets keyed by target path
    pub cross_refs: BTreeMap<String, String>,
}

impl Substitutions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_snippet(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.snippets.insert(path.into(), text.into());
        self
    }

    #[must_use]
    pub fn with_cross_ref(mut self, target: impl Into<String>, text: impl Into<String>) -> Self {
        self.cross_refs.insert(target.into(), text.into());
        self
    }

    /// Snippet text by exact path, falling back to the file name alone
    pub(crate) fn snippet(&self, path: &str) -> Option<&str> {
        let normalized = path.replace('\\', "/");
        self.snippets
            .get(&normalized)
            .or_else(|| {
                let file = normalized.rsplit('/').next().unwrap_or(normalized.as_str());
                self.snippets
                    .iter()
                    .find(|(key, _)| key.rsplit('/').next() == Some(file))
                    .map(|(_, text)| text)
            })
            .map(String::as_str)
    }
}

/// Mutable state threaded through one document's walk
pub(crate) struct ConversionContext<'a> {
    pub(crate) options: &'a ConversionOptions,
    pub(crate) substitutions: &'a Substitutions,
    pub(crate) depth: u32,
    pub(crate) max_depth: u32,
    pub(crate) list_stack: SmallVec<[ListFrame; 8]>,
    /// Nesting of tables currently being extracted
    pub(crate) table_depth: u32,
    /// Level of the most recently emitted heading (1-6)
    pub(crate) last_heading_level: u8,
    pub(crate) images: BTreeSet<String>,
    pub(crate) used_variables: BTreeMap<String, String>,
    processed: AHashSet<NodeId>,
    warnings: Vec<String>,
    seen_warnings: AHashSet<String>,
}

impl<'a> ConversionContext<'a> {
    pub(crate) fn new(options: &'a ConversionOptions, substitutions: &'a Substitutions) -> Self {
        Self {
            options,
            substitutions,
            depth: 0,
            max_depth: options.max_recursion_depth,
            list_stack: SmallVec::new(),
            table_depth: 0,
            last_heading_level: 1,
            images: BTreeSet::new(),
            used_variables: BTreeMap::new(),
            processed: AHashSet::new(),
            warnings: Vec::new(),
            seen_warnings: AHashSet::new(),
        }
    }

    /// Whether further descent must go through the recursion guard
    #[inline]
    pub(crate) fn at_depth_limit(&self) -> bool {
        self.depth >= self.max_depth
    }

    /// Run `f` one level deeper.
    pub(crate) fn descend<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run `f` with a list frame pushed; the frame is popped afterwards and
    /// returned with the result.
    pub(crate) fn with_list_frame<R>(
        &mut self,
        frame: ListFrame,
        f: impl FnOnce(&mut Self) -> R,
    ) -> (R, ListFrame) {
        self.list_stack.push(frame);
        let result = f(self);
        let frame = self.list_stack.pop().unwrap_or(frame);
        (result, frame)
    }

    /// List nesting level of the next list to be entered (0 = top level)
    #[inline]
    pub(crate) fn list_level(&self) -> u32 {
        self.list_stack.len() as u32
    }

    pub(crate) fn is_processed(&self, id: NodeId) -> bool {
        self.processed.contains(&id)
    }

    /// Record that an ancestor has already emitted this subtree.
    pub(crate) fn mark_processed(&mut self, id: NodeId) {
        self.processed.insert(id);
    }

    /// Record a degradation. Repeated messages are kept once.
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.seen_warnings.insert(message.clone()) {
            tracing::warn!("{}", message);
            self.warnings.push(message);
        }
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descend_restores_depth() {
        let options = ConversionOptions::default();
        let subs = Substitutions::default();
        let mut ctx = ConversionContext::new(&options, &subs);
        let inner = ctx.descend(|ctx| ctx.descend(|ctx| ctx.depth));
        assert_eq!(inner, 2);
        assert_eq!(ctx.depth, 0);
    }

    #[test]
    fn test_warnings_are_deduplicated_in_order() {
        let options = ConversionOptions::default();
        let subs = Substitutions::default();
        let mut ctx = ConversionContext::new(&options, &subs);
        ctx.warn("b");
        ctx.warn("a");
        ctx.warn("b");
        assert_eq!(ctx.take_warnings(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_snippet_lookup_falls_back_to_file_name() {
        let subs = Substitutions::new().with_snippet("Resources/Snippets/Intro.flsnp", "Hello");
        assert_eq!(subs.snippet("../Snippets/Intro.flsnp"), Some("Hello"));
        assert_eq!(subs.snippet("Resources\\Snippets\\Intro.flsnp"), Some("Hello"));
        assert_eq!(subs.snippet("Other.flsnp"), None);
    }
}
