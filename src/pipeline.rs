//! Distillation pipeline
//!
//! detect language -> process -> filter -> render

use crate::config::DistillConfig;
use crate::error::{DistillerError, Result};
use crate::filter::OutputFormat;
use crate::formatter::formatter_for;
use distill_ast::{DistilledFile, LanguageId, ProcessorRegistry};
use tracing::{debug, warn};

/// Runs source files through processing, filtering and rendering
#[derive(Clone, Default)]
pub struct Distiller {
    config: DistillConfig,
    registry: ProcessorRegistry,
}

impl Distiller {
    pub fn new(config: DistillConfig) -> Self {
        Self {
            config,
            registry: ProcessorRegistry::new(),
        }
    }

    /// Use a custom processor registry
    pub fn with_registry(mut self, registry: ProcessorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &DistillConfig {
        &self.config
    }

    /// Process a file and apply the configured filter
    ///
    /// The language is detected from the filename extension.
    pub fn distill_file(&self, source: &[u8], filename: &str) -> Result<DistilledFile> {
        let language = LanguageId::from_filename(filename);
        debug!(file = filename, language = language.name(), "distilling");

        let file = self.registry.process(source, filename, language)?;
        if file.has_errors() {
            warn!(
                file = filename,
                diagnostics = file.errors.len(),
                "source has syntax errors; output may be partial"
            );
        }

        Ok(self.config.filter.apply(&file))
    }

    /// Distill a file to its configured output format
    pub fn distill(&self, source: &[u8], filename: &str) -> Result<String> {
        let file = self.distill_file(source, filename)?;
        self.render(&file)
    }

    /// Render an already filtered file
    pub fn render(&self, file: &DistilledFile) -> Result<String> {
        match self.config.filter.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(file)?),
            OutputFormat::Text => {
                let target = self.config.target;
                let formatter =
                    formatter_for(target).ok_or(DistillerError::UnsupportedTarget { language: target })?;
                debug!(language = target.name(), "rendering text projection");
                Ok(formatter.format_file(file))
            }
        }
    }
}
