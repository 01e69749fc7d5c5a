//! Language Formatters
//!
//! A formatter renders IR nodes as text in a target language. Formatters are
//! stateless: all context arrives as arguments, so one instance can be shared
//! across threads and files.

pub mod swift;

use distill_ast::{DistilledFile, DistilledNode, LanguageId};
use std::fmt;

pub use swift::SwiftFormatter;

/// Indentation unit used by all formatters
pub const INDENT: &str = "    ";

/// Renders IR nodes in one target language
pub trait LanguageFormatter: Send + Sync {
    /// The language this formatter renders
    fn language(&self) -> LanguageId;

    /// Write one node (and its members) at an indentation level
    ///
    /// Variants the target language cannot express are skipped, never
    /// reported as errors.
    fn write_node(&self, out: &mut dyn fmt::Write, node: &DistilledNode, indent: usize) -> fmt::Result;

    /// Render one node to a string
    fn format(&self, node: &DistilledNode, indent: usize) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_node(&mut out, node, indent);
        out
    }

    /// Render every top-level node of a file
    fn format_file(&self, file: &DistilledFile) -> String {
        let mut out = String::new();
        for node in &file.children {
            let _ = self.write_node(&mut out, node, 0);
        }
        out
    }
}

/// Get the formatter for a target language
pub fn formatter_for(language: LanguageId) -> Option<Box<dyn LanguageFormatter>> {
    match language {
        LanguageId::Swift => Some(Box::new(SwiftFormatter::new())),
        _ => None,
    }
}

/// Indentation prefix for a nesting level
pub fn indent_str(level: usize) -> String {
    INDENT.repeat(level)
}
