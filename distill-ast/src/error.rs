//! Error types for distill-ast
//!
//! Only a total parser failure is fatal. Everything else a processor runs into
//! is recorded as a [`DistilledError`](crate::ir::DistilledError) on the file
//! and processing continues.

use crate::ir::LanguageId;
use thiserror::Error;

/// Errors from processor operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    /// The external parser could not produce any tree
    #[error("Parse error in '{file}': {message}")]
    ParseError { file: String, message: String },

    /// No processor is registered for the language
    #[error("Unsupported language: {0:?}")]
    UnsupportedLanguage(LanguageId),

    /// The tree-sitter grammar could not be loaded into a parser
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl AstError {
    /// Create a parse error for a file
    pub fn parse_error(file: impl Into<String>, message: impl Into<String>) -> Self {
        AstError::ParseError {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborted the processing of a single file
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, AstError::ParseError { .. })
    }
}

/// Result type alias for AstError
pub type Result<T> = std::result::Result<T, AstError>;
