//! Error types for ai-distiller
//!
//! This module provides structured error handling using thiserror.

use distill_ast::{AstError, LanguageId};
use thiserror::Error;

/// Result type alias for distiller operations
pub type Result<T> = std::result::Result<T, DistillerError>;

/// Errors that can occur while distilling a source file
#[derive(Error, Debug)]
pub enum DistillerError {
    /// The source language could not be processed
    #[error("{0}")]
    Ast(#[from] AstError),

    /// JSON parsing or emission error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading input or configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// No formatter renders this target language
    #[error("No formatter for target language: {language:?}")]
    UnsupportedTarget { language: LanguageId },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DistillerError>,
    },
}

impl DistillerError {
    /// Wrap an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DistillerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        DistillerError::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = DistillerError::invalid_config("bad value");
        let wrapped = err.with_context("loading config");
        let msg = wrapped.to_string();
        assert!(msg.contains("loading config"));
        assert!(msg.contains("bad value"));
    }

    #[test]
    fn test_ast_error_conversion() {
        let err: DistillerError = AstError::UnsupportedLanguage(LanguageId::Go).into();
        assert!(matches!(err, DistillerError::Ast(_)));
        assert!(err.to_string().contains("Go"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DistillerError = io_err.into();
        assert!(matches!(err, DistillerError::Io(_)));
    }

    #[test]
    fn test_unsupported_target_display() {
        let err = DistillerError::UnsupportedTarget {
            language: LanguageId::Python,
        };
        assert!(err.to_string().contains("Python"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(DistillerError::invalid_config("missing field"));
        let err = result.context("reading distill.json").unwrap_err();
        assert!(matches!(err, DistillerError::WithContext { .. }));
        assert!(err.to_string().starts_with("reading distill.json"));
    }
}
