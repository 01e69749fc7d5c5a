//! distill-ast: Declaration IR and Language Processors
//!
//! This crate is the frontend of ai-distiller. It turns source code into a
//! compact, language-neutral declaration tree that formatters render back into
//! a target language.
//!
//! # Pipeline
//!
//! 1. A [`LanguageProcessor`] parses source bytes with tree-sitter
//! 2. A pre-pass ([`docblock::DocTable`]) anchors documentation comments to
//!    the declarations they describe
//! 3. A recursive descent emits [`DistilledNode`]s, reconciling concrete type
//!    hints with documented types
//!
//! Only a total parser failure is an error. Local anomalies are recorded in
//! [`DistilledFile::errors`] and processing continues.
//!
//! # Example
//!
//! ```rust,ignore
//! use distill_ast::{LanguageId, ProcessorRegistry};
//!
//! let registry = ProcessorRegistry::new();
//! let file = registry.process(b"<?php class User {}", "User.php", LanguageId::Php)?;
//!
//! for node in &file.children {
//!     println!("{} {:?}", node.kind(), node.name());
//! }
//! ```

pub mod adapters;
pub mod docblock;
pub mod error;
pub mod ir;
mod registry;

// Re-export core types for convenience
pub use ir::{
    // Diagnostics
    DiagnosticSeverity,
    DistilledError,
    // Nodes
    DistilledClass,
    DistilledComment,
    DistilledEnum,
    DistilledField,
    // Core types
    DistilledFile,
    DistilledFunction,
    DistilledImport,
    DistilledInterface,
    DistilledNode,
    DistilledTypeAlias,
    // Language
    LanguageId,
    Location,
    Modifier,
    NodeExtensions,
    Parameter,
    PhpExtensions,
    TypeRef,
    Visibility,
};

pub use adapters::{LanguageProcessor, PhpProcessor};
pub use docblock::TypeReconciler;
pub use error::{AstError, Result};
pub use registry::{ProcessorFactory, ProcessorRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
