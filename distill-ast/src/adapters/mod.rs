//! Language Processors for distill-ast
//!
//! Each source language has a processor that walks the tree-sitter parse tree
//! and emits IR nodes. Processors implement the `LanguageProcessor` trait.
//!
//! - **PHP**: namespaces, use imports (grouped and aliased), classes,
//!   interfaces, traits, enums, functions, methods, properties, constants,
//!   PHPDoc type reconciliation and virtual `@property`/`@method` members

pub mod php_docblock;
pub mod php_processor;

use crate::error::Result;
use crate::ir::{DistilledError, DistilledFile, LanguageId, Location};

pub use php_processor::PhpProcessor;

/// Trait for language-specific processors
///
/// A processor owns its parser handle and per-run traversal state, so one
/// instance must not process two files at the same time (`&mut self`). The
/// state is reset at the start of every `process` call; the parser handle is
/// released when the processor is dropped.
pub trait LanguageProcessor: Send {
    /// The language this processor handles
    fn language(&self) -> LanguageId;

    /// Language-version hint recorded on produced files
    fn language_version(&self) -> &'static str;

    /// Convert source bytes into a distilled file
    ///
    /// Fails only when the parser cannot produce a tree at all.
    fn process(&mut self, source: &[u8], filename: &str) -> Result<DistilledFile>;
}

/// Convert a tree-sitter node into an IR location (1-based lines and columns)
pub fn node_location(node: &tree_sitter::Node) -> Location {
    let start = node.start_position();
    let end = node.end_position();
    Location {
        start_line: start.row + 1,
        start_column: start.column + 1,
        end_line: end.row + 1,
        end_column: end.column + 1,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}

/// Collect all children of a node, anonymous tokens included
pub fn children_of<'t>(node: &tree_sitter::Node<'t>) -> Vec<tree_sitter::Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Find the first child node of a kind
pub fn child_of_kind<'t>(node: &tree_sitter::Node<'t>, kind: &str) -> Option<tree_sitter::Node<'t>> {
    children_of(node).into_iter().find(|child| child.kind() == kind)
}

/// Find the first child whose kind is in `kinds`
pub fn child_of_kinds<'t>(
    node: &tree_sitter::Node<'t>,
    kinds: &[&str],
) -> Option<tree_sitter::Node<'t>> {
    children_of(node)
        .into_iter()
        .find(|child| kinds.contains(&child.kind()))
}

/// Slice the source text of a node, recording a diagnostic when the span
/// falls outside the buffer
pub fn checked_text(
    node: &tree_sitter::Node,
    source: &[u8],
    errors: &mut Vec<DistilledError>,
) -> String {
    let (start, end) = (node.start_byte(), node.end_byte());
    match source.get(start..end) {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => {
            errors.push(DistilledError::error(
                format!(
                    "span {}..{} of '{}' is outside the {}-byte source",
                    start,
                    end,
                    node.kind(),
                    source.len()
                ),
                Some(node_location(node)),
            ));
            String::new()
        }
    }
}

/// Record tree-sitter error and missing nodes as diagnostics
pub fn syntax_diagnostic(node: &tree_sitter::Node) -> Option<DistilledError> {
    if node.is_missing() {
        Some(DistilledError::error(
            format!("Missing syntax element '{}'", node.kind()),
            Some(node_location(node)),
        ))
    } else if node.is_error() {
        Some(DistilledError::error(
            "Syntax error",
            Some(node_location(node)),
        ))
    } else {
        None
    }
}
