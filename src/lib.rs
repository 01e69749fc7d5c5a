//! ai-distiller - Compact API views of source code
//!
//! This library drives the `distill-ast` frontend: it selects a language
//! processor, filters the resulting IR and renders it through a formatter.
//! It is consumed by the `distill` binary (src/bin/distill.rs).
//!
//! # Example
//!
//! ```rust,ignore
//! use distiller::{DistillConfig, Distiller};
//!
//! let distiller = Distiller::new(DistillConfig::default());
//! let swift = distiller.distill(b"<?php class User {}", "User.php")?;
//! assert!(swift.contains("class User"));
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod pipeline;

pub use config::DistillConfig;
pub use error::{DistillerError, Result, ResultExt};
pub use filter::{FilterOptions, OutputFormat};
pub use formatter::{formatter_for, LanguageFormatter, SwiftFormatter};
pub use pipeline::Distiller;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
