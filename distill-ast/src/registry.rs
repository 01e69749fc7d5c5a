//! Processor Registry
//!
//! Processors own a parser handle and mutable traversal state, so the registry
//! hands out fresh instances instead of sharing one. Callers that process files
//! in parallel create one processor per worker.

use crate::adapters::{LanguageProcessor, PhpProcessor};
use crate::error::{AstError, Result};
use crate::ir::{DistilledFile, LanguageId};
use std::collections::BTreeMap;

/// Builds a new processor instance
pub type ProcessorFactory = fn() -> Result<Box<dyn LanguageProcessor>>;

fn php_processor() -> Result<Box<dyn LanguageProcessor>> {
    Ok(Box::new(PhpProcessor::new()?))
}

/// Registry of language processor factories
#[derive(Clone)]
pub struct ProcessorRegistry {
    factories: BTreeMap<LanguageId, ProcessorFactory>,
}

impl ProcessorRegistry {
    /// Create a registry with all built-in processors
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(LanguageId::Php, php_processor);
        registry
    }

    /// Create a registry with no processors
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) the factory for a language
    pub fn register(&mut self, language: LanguageId, factory: ProcessorFactory) {
        self.factories.insert(language, factory);
    }

    /// Get supported languages
    pub fn supported_languages(&self) -> Vec<LanguageId> {
        self.factories.keys().copied().collect()
    }

    /// Check if a language is supported
    pub fn supports(&self, language: LanguageId) -> bool {
        self.factories.contains_key(&language)
    }

    /// Create a fresh processor for a language
    pub fn create(&self, language: LanguageId) -> Result<Box<dyn LanguageProcessor>> {
        let factory = self
            .factories
            .get(&language)
            .ok_or(AstError::UnsupportedLanguage(language))?;
        factory()
    }

    /// Process one source buffer with a throwaway processor
    pub fn process(
        &self,
        source: &[u8],
        filename: &str,
        language: LanguageId,
    ) -> Result<DistilledFile> {
        self.create(language)?.process(source, filename)
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
