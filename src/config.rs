//! Distiller configuration
//!
//! A configuration file is a JSON object with an optional `filter` section and
//! an optional `target` language tag:
//!
//! ```json
//! { "target": "swift", "filter": { "include_private": true } }
//! ```

use crate::error::{DistillerError, Result, ResultExt};
use crate::filter::FilterOptions;
use distill_ast::LanguageId;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Complete configuration of one distillation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistillConfig {
    pub filter: FilterOptions,
    /// Language the text projection is rendered in
    pub target: LanguageId,
}

impl Default for DistillConfig {
    fn default() -> Self {
        Self {
            filter: FilterOptions::default(),
            target: LanguageId::Swift,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    filter: FilterOptions,
    target: Option<String>,
}

impl DistillConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let target = match raw.target {
            Some(tag) => match LanguageId::from_tag(&tag) {
                LanguageId::Unknown => {
                    return Err(DistillerError::invalid_config(format!(
                        "unknown target language '{}'",
                        tag
                    )))
                }
                language => language,
            },
            None => LanguageId::Swift,
        };

        Ok(Self {
            filter: raw.filter,
            target,
        })
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let context = format!("loading config {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(DistillerError::from)
            .context(context.clone())?;
        Self::from_json_str(&text).context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::OutputFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = DistillConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DistillConfig::default());
        assert_eq!(config.target, LanguageId::Swift);
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "target": "Swift",
            "filter": {
                "include_private": true,
                "include_implementation": true,
                "include_imports": false,
                "format": "json"
            }
        }"#;
        let config = DistillConfig::from_json_str(json).unwrap();
        assert!(config.filter.include_private);
        assert!(config.filter.include_implementation);
        assert!(!config.filter.include_imports);
        assert!(!config.filter.include_protected);
        assert_eq!(config.filter.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let err = DistillConfig::from_json_str(r#"{"target": "cobol"}"#).unwrap_err();
        assert!(matches!(err, DistillerError::InvalidConfig { .. }));
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = DistillConfig::from_json_str(r#"{"fliter": {}}"#).unwrap_err();
        assert!(matches!(err, DistillerError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"filter": {{"include_comments": true}}}}"#).unwrap();
        let config = DistillConfig::load(file.path()).unwrap();
        assert!(config.filter.include_comments);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = DistillConfig::load(Path::new("/nonexistent/distill.json")).unwrap_err();
        assert!(matches!(err, DistillerError::WithContext { .. }));
        assert!(err.to_string().contains("loading config"));
    }
}
