//! Content Filtering
//!
//! Filtering runs between processing and rendering. It never mutates the
//! processed IR; it builds a filtered copy so the same file can be rendered
//! under several configurations.

use distill_ast::{DistilledFile, DistilledNode, Visibility};
use serde::{Deserialize, Serialize};

/// Output format for a distilled file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Idiomatic text projection in the target language
    #[default]
    Text,
    /// The filtered IR as JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Which parts of the IR reach the output
///
/// Defaults select the public API: no private, protected or internal members,
/// no function bodies, imports on, comments off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub include_private: bool,
    pub include_protected: bool,
    pub include_internal: bool,
    /// Keep function bodies; without them functions render as signatures
    pub include_implementation: bool,
    pub include_imports: bool,
    pub include_comments: bool,
    pub format: OutputFormat,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            include_private: false,
            include_protected: false,
            include_internal: false,
            include_implementation: false,
            include_imports: true,
            include_comments: false,
            format: OutputFormat::Text,
        }
    }
}

impl FilterOptions {
    /// Options that keep every node and every body
    pub fn everything() -> Self {
        Self {
            include_private: true,
            include_protected: true,
            include_internal: true,
            include_implementation: true,
            include_imports: true,
            include_comments: true,
            format: OutputFormat::Text,
        }
    }

    /// Whether a declaration with this visibility is kept
    pub fn allows(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public | Visibility::Open => true,
            Visibility::Private | Visibility::FilePrivate => self.include_private,
            Visibility::Protected => self.include_protected,
            Visibility::Internal => self.include_internal,
        }
    }

    /// Build a filtered copy of a file
    pub fn apply(&self, file: &DistilledFile) -> DistilledFile {
        DistilledFile {
            path: file.path.clone(),
            language: file.language,
            version: file.version.clone(),
            location: file.location,
            children: self.filter_nodes(&file.children),
            errors: file.errors.clone(),
        }
    }

    /// Filter a list of sibling nodes, preserving order
    pub fn filter_nodes(&self, nodes: &[DistilledNode]) -> Vec<DistilledNode> {
        nodes.iter().filter_map(|n| self.filter_node(n)).collect()
    }

    /// Filter one node; `None` drops it
    pub fn filter_node(&self, node: &DistilledNode) -> Option<DistilledNode> {
        match node {
            DistilledNode::Import(_) => self.include_imports.then(|| node.clone()),
            DistilledNode::Comment(_) => self.include_comments.then(|| node.clone()),
            DistilledNode::Class(class) => {
                if !self.allows(class.visibility) {
                    return None;
                }
                let mut class = class.clone();
                class.children = self.filter_nodes(&class.children);
                Some(DistilledNode::Class(class))
            }
            DistilledNode::Interface(interface) => {
                if !self.allows(interface.visibility) {
                    return None;
                }
                let mut interface = interface.clone();
                interface.children = self.filter_nodes(&interface.children);
                Some(DistilledNode::Interface(interface))
            }
            DistilledNode::Enum(e) => {
                if !self.allows(e.visibility) {
                    return None;
                }
                let mut e = e.clone();
                e.children = self.filter_nodes(&e.children);
                Some(DistilledNode::Enum(e))
            }
            DistilledNode::Function(func) => {
                if !self.allows(func.visibility) {
                    return None;
                }
                let mut func = func.clone();
                if !self.include_implementation {
                    func.implementation = None;
                }
                Some(DistilledNode::Function(func))
            }
            DistilledNode::Field(field) => self.allows(field.visibility).then(|| node.clone()),
            DistilledNode::TypeAlias(alias) => self.allows(alias.visibility).then(|| node.clone()),
        }
    }
}
