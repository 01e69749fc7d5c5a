//! Core IR (Intermediate Representation) Types
//!
//! This module defines the language-neutral declaration model shared by every
//! processor (which produces it) and every formatter (which consumes it).
//! All types are designed for:
//!
//! 1. **Closed dispatch**: [`DistilledNode`] is a sum type, so adding a variant
//!    is a compile-time checked change at every emission and rendering site
//! 2. **Serialization**: Full serde support for structured output
//! 3. **Error Tolerance**: [`DistilledError`] diagnostics instead of aborts

use serde::{Deserialize, Serialize};

// ============================================================================
// Language Identification
// ============================================================================

/// Language identifier for source files and rendering targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Php,
    Swift,
    Python,
    TypeScript,
    JavaScript,
    Java,
    Go,
    Rust,
    Unknown,
}

impl LanguageId {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "php" | "phtml" | "php8" | "inc" => Self::Php,
            "swift" => Self::Swift,
            "py" | "pyw" | "pyi" => Self::Python,
            "ts" | "mts" | "cts" | "tsx" => Self::TypeScript,
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "java" => Self::Java,
            "go" => Self::Go,
            "rs" => Self::Rust,
            _ => Self::Unknown,
        }
    }

    /// Detect language from a file name or path
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Parse a language tag such as `"swift"` or `"PHP"`
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "php" => Self::Php,
            "swift" => Self::Swift,
            "python" => Self::Python,
            "typescript" => Self::TypeScript,
            "javascript" => Self::JavaScript,
            "java" => Self::Java,
            "go" => Self::Go,
            "rust" => Self::Rust,
            _ => Self::Unknown,
        }
    }

    /// Lowercase tag used in the IR (`DistilledFile::language`)
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Php => "php",
            Self::Swift => "swift",
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Java => "java",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Php => "PHP",
            Self::Swift => "Swift",
            Self::Python => "Python",
            Self::TypeScript => "TypeScript",
            Self::JavaScript => "JavaScript",
            Self::Java => "Java",
            Self::Go => "Go",
            Self::Rust => "Rust",
            Self::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// Location
// ============================================================================

/// Position of a node in its source file
///
/// Lines and columns are 1-based; byte offsets index the original buffer
/// (start inclusive, end exclusive).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Location {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Location {
    /// Check if this location contains a line number
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Check if the span is empty (synthesized nodes have empty spans)
    pub fn is_empty(&self) -> bool {
        self.start_byte >= self.end_byte
    }
}

// ============================================================================
// Shared vocabulary
// ============================================================================

/// Visibility of a declaration
///
/// Every emitted declaration carries exactly one; processors apply their
/// language default when the source is silent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Internal,
    FilePrivate,
    Open,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::FilePrivate => "fileprivate",
            Self::Open => "open",
        }
    }
}

/// Declaration modifier keywords, independent of any source syntax
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Static,
    Abstract,
    Final,
    Readonly,
    Mutating,
    Override,
    Async,
    Throws,
    Rethrows,
}

/// A syntactic type reference; never a resolved symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// A generic type parameter with its constraints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TypeParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<TypeRef>,
}

/// A function/method parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_variadic: bool,
}

/// Deprecation notice carried by a declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeprecationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Language extensions
// ============================================================================

/// Where a declaration came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberOrigin {
    /// A concrete declaration in the source
    #[default]
    Source,
    /// Synthesized from a documentation tag (virtual member)
    Docblock,
}

/// Access mode of a documentation-declared property
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldAccess {
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

/// PHP facts with no cross-language equivalent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PhpExtensions {
    #[serde(default)]
    pub is_trait: bool,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub is_enum_case: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_backing_type: Option<String>,
    #[serde(default)]
    pub origin: MemberOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<FieldAccess>,
    /// The raw tag a virtual member was synthesized from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_annotation: Option<String>,
}

/// Per-source-language side channel attached to a node
///
/// Generic consumers may ignore it entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "language", rename_all = "lowercase")]
pub enum NodeExtensions {
    Php(PhpExtensions),
}

impl NodeExtensions {
    pub fn php(&self) -> Option<&PhpExtensions> {
        match self {
            NodeExtensions::Php(ext) => Some(ext),
        }
    }
}

/// Read the PHP extension record of an optional extension slot
pub fn php_ext(extensions: &Option<NodeExtensions>) -> Option<&PhpExtensions> {
    extensions.as_ref().and_then(NodeExtensions::php)
}

/// Get (creating if needed) the PHP extension record of an extension slot
pub fn php_ext_mut(extensions: &mut Option<NodeExtensions>) -> &mut PhpExtensions {
    let NodeExtensions::Php(ext) =
        extensions.get_or_insert_with(|| NodeExtensions::Php(PhpExtensions::default()));
    ext
}

// ============================================================================
// File
// ============================================================================

/// Severity of a processing diagnostic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// A non-fatal structural problem found while processing a file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistilledError {
    pub message: String,
    pub severity: DiagnosticSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl DistilledError {
    pub fn warning(message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            message: message.into(),
            severity: DiagnosticSeverity::Warning,
            location,
        }
    }

    pub fn error(message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            message: message.into(),
            severity: DiagnosticSeverity::Error,
            location,
        }
    }
}

/// Root of the IR for one processed source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistilledFile {
    pub path: String,
    pub language: LanguageId,
    /// Language-version hint (e.g. `"8"` for PHP 8)
    pub version: String,
    pub location: Location,
    pub children: Vec<DistilledNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DistilledError>,
}

impl DistilledFile {
    /// Create a new empty file
    pub fn new(path: impl Into<String>, language: LanguageId, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language,
            version: version.into(),
            location: Location::default(),
            children: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Check if processing recorded any diagnostics
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total number of nodes in the tree (including nested members)
    pub fn total_nodes(&self) -> usize {
        fn count(nodes: &[DistilledNode]) -> usize {
            nodes.iter().map(|n| 1 + count(n.children())).sum()
        }
        count(&self.children)
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Kind of import statement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    Namespace,
    Use,
    Function,
    Const,
}

/// One imported name with its optional local alias
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ImportedSymbol {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Comment flavor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommentFormat {
    Line,
    Block,
    Docblock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistilledImport {
    pub location: Location,
    pub import_type: ImportType,
    pub module: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<ImportedSymbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DistilledClass {
    pub location: Location,
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DistilledNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    /// Raw doc block kept verbatim when it carries API-defining tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_docblock: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DistilledInterface {
    pub location: Location,
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DistilledNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DistilledEnum {
    pub location: Location,
    pub name: String,
    pub visibility: Visibility,
    /// Raw-value / backing type, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DistilledNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DistilledFunction {
    pub location: Location,
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,
    /// Verbatim body source, braces included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DistilledField {
    pub location: Location,
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub has_getter: bool,
    #[serde(default)]
    pub has_setter: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DistilledTypeAlias {
    pub location: Location,
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    pub type_ref: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistilledComment {
    pub location: Location,
    pub text: String,
    pub format: CommentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<NodeExtensions>,
}

/// A node of the distilled tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistilledNode {
    Import(DistilledImport),
    Class(DistilledClass),
    Interface(DistilledInterface),
    Enum(DistilledEnum),
    Function(DistilledFunction),
    Field(DistilledField),
    TypeAlias(DistilledTypeAlias),
    Comment(DistilledComment),
}

impl DistilledNode {
    /// Stable lowercase name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Import(_) => "import",
            Self::Class(_) => "class",
            Self::Interface(_) => "interface",
            Self::Enum(_) => "enum",
            Self::Function(_) => "function",
            Self::Field(_) => "field",
            Self::TypeAlias(_) => "type_alias",
            Self::Comment(_) => "comment",
        }
    }

    /// Declared name (module path for imports, `None` for comments)
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Import(n) => Some(&n.module),
            Self::Class(n) => Some(&n.name),
            Self::Interface(n) => Some(&n.name),
            Self::Enum(n) => Some(&n.name),
            Self::Function(n) => Some(&n.name),
            Self::Field(n) => Some(&n.name),
            Self::TypeAlias(n) => Some(&n.name),
            Self::Comment(_) => None,
        }
    }

    /// Visibility of declarations; imports and comments have none
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            Self::Class(n) => Some(n.visibility),
            Self::Interface(n) => Some(n.visibility),
            Self::Enum(n) => Some(n.visibility),
            Self::Function(n) => Some(n.visibility),
            Self::Field(n) => Some(n.visibility),
            Self::TypeAlias(n) => Some(n.visibility),
            Self::Import(_) | Self::Comment(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Import(n) => n.description.as_deref(),
            Self::Class(n) => n.description.as_deref(),
            Self::Interface(n) => n.description.as_deref(),
            Self::Enum(n) => n.description.as_deref(),
            Self::Function(n) => n.description.as_deref(),
            Self::Field(n) => n.description.as_deref(),
            Self::TypeAlias(n) => n.description.as_deref(),
            Self::Comment(n) => n.description.as_deref(),
        }
    }

    pub fn deprecated(&self) -> Option<&DeprecationInfo> {
        match self {
            Self::Import(n) => n.deprecated.as_ref(),
            Self::Class(n) => n.deprecated.as_ref(),
            Self::Interface(n) => n.deprecated.as_ref(),
            Self::Enum(n) => n.deprecated.as_ref(),
            Self::Function(n) => n.deprecated.as_ref(),
            Self::Field(n) => n.deprecated.as_ref(),
            Self::TypeAlias(n) => n.deprecated.as_ref(),
            Self::Comment(n) => n.deprecated.as_ref(),
        }
    }

    pub fn extensions(&self) -> Option<&NodeExtensions> {
        match self {
            Self::Import(n) => n.extensions.as_ref(),
            Self::Class(n) => n.extensions.as_ref(),
            Self::Interface(n) => n.extensions.as_ref(),
            Self::Enum(n) => n.extensions.as_ref(),
            Self::Function(n) => n.extensions.as_ref(),
            Self::Field(n) => n.extensions.as_ref(),
            Self::TypeAlias(n) => n.extensions.as_ref(),
            Self::Comment(n) => n.extensions.as_ref(),
        }
    }

    /// Nested members (empty for leaf variants)
    pub fn children(&self) -> &[DistilledNode] {
        match self {
            Self::Class(n) => &n.children,
            Self::Interface(n) => &n.children,
            Self::Enum(n) => &n.children,
            Self::Import(_)
            | Self::Function(_)
            | Self::Field(_)
            | Self::TypeAlias(_)
            | Self::Comment(_) => &[],
        }
    }
}
