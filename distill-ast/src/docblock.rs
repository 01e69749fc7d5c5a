//! Doc-Annotation Extractor
//!
//! Pulls structured type hints (`@var`, `@return`, `@param`) and deprecation
//! notices out of free-text documentation comments, and anchors each
//! documentation comment to the source line of the declaration it precedes.
//!
//! The anchoring runs as a separate pre-pass ([`DocTable::collect`]) because a
//! comment and the declaration it documents are siblings in the CST: the main
//! walk can only reconcile concrete and documented types if the documentation
//! is already available when the declaration is visited.

use crate::ir::{DeprecationInfo, TypeRef};
use std::collections::{BTreeMap, BTreeSet};

/// Generic wrappers that denote a plain list of one element type
const COLLECTION_WRAPPERS: &[&str] = &["array", "list", "non-empty-array", "non-empty-list"];

/// Concrete PHP types too broad to beat a documented type
pub const PHP_WEAK_TYPES: &[&str] = &[
    "array", "mixed", "object", "callable", "iterable", "string", "int", "bool", "float",
];

// ============================================================================
// Annotation record
// ============================================================================

/// Type information declared by one documentation comment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocAnnotation {
    /// `@var` type for properties and constants
    pub var_type: Option<String>,
    /// `@return` type for functions
    pub return_type: Option<String>,
    /// `@param` types keyed by parameter name (without the `$` sigil)
    pub param_types: BTreeMap<String, String>,
    /// `@deprecated` notice
    pub deprecated: Option<DeprecationInfo>,
}

/// Strip comment delimiters and per-line `*` markers
pub fn doc_lines(text: &str) -> Vec<String> {
    let body = text.trim();
    let body = body
        .strip_prefix("/**")
        .or_else(|| body.strip_prefix("/*"))
        .unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    body.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').unwrap_or(line).trim().to_string()
        })
        .collect()
}

/// Parse a documentation comment into an annotation record
///
/// Returns `None` unless at least one recognized tag is present, so callers
/// can tell "no documented type" apart from an empty record.
pub fn parse_doc_annotation(text: &str) -> Option<DocAnnotation> {
    let mut info = DocAnnotation::default();
    let mut recognized = false;

    for line in doc_lines(text) {
        let Some((tag, rest)) = split_tag(&line) else {
            continue;
        };

        match tag {
            "@var" => {
                if let Some((ty, _)) = split_type_token(rest) {
                    info.var_type = Some(normalize_collection_type(ty));
                    recognized = true;
                }
            }
            "@return" => {
                if let Some((ty, _)) = split_type_token(rest) {
                    info.return_type = Some(normalize_collection_type(ty));
                    recognized = true;
                }
            }
            "@param" => {
                if let Some((name, ty)) = split_param_tag(rest) {
                    info.param_types.insert(name, normalize_collection_type(&ty));
                    recognized = true;
                }
            }
            "@deprecated" => {
                info.deprecated = Some(parse_deprecation(rest));
                recognized = true;
            }
            _ => {}
        }
    }

    recognized.then_some(info)
}

/// Split `@tag rest` into the tag and its trimmed content
pub fn split_tag(line: &str) -> Option<(&str, &str)> {
    if !line.starts_with('@') {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((tag, rest)) => Some((tag, rest.trim())),
        None => Some((line, "")),
    }
}

/// Read one type expression off the front of `text`
///
/// Whitespace inside `<>`, `()`, `[]` or `{}` belongs to the type, so
/// `array<string, User> $users` yields `array<string, User>`.
pub fn split_type_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() || text.starts_with('$') {
        return None;
    }

    let mut depth = 0i32;
    for (idx, ch) in text.char_indices() {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            c if c.is_whitespace() && depth <= 0 => {
                return Some((&text[..idx], text[idx..].trim_start()));
            }
            _ => {}
        }
    }
    Some((text, ""))
}

/// Split `@param` content into `(name, type)`
///
/// The first `$name` token delimits the type (everything before it) from the
/// parameter name (up to the next whitespace).
fn split_param_tag(content: &str) -> Option<(String, String)> {
    let dollar = content.find('$')?;
    if dollar == 0 {
        return None;
    }

    let ty = content[..dollar]
        .trim()
        .trim_end_matches("...")
        .trim_end_matches('&')
        .trim();
    let rest = &content[dollar + 1..];
    let name = rest
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or_default();

    if ty.is_empty() || name.is_empty() {
        return None;
    }
    Some((name.to_string(), ty.to_string()))
}

/// Rewrite single-element collection generics into bracket-array form
///
/// `array<User>` becomes `User[]`; keyed forms such as `array<string, User>`
/// cannot be linearized without loss and are returned unchanged.
pub fn normalize_collection_type(type_name: &str) -> String {
    let trimmed = type_name.trim();

    let (Some(open), true) = (trimmed.find('<'), trimmed.ends_with('>')) else {
        return trimmed.to_string();
    };

    let wrapper = trimmed[..open].trim();
    if !COLLECTION_WRAPPERS
        .iter()
        .any(|w| w.eq_ignore_ascii_case(wrapper))
    {
        return trimmed.to_string();
    }

    let inner = trimmed[open + 1..trimmed.len() - 1].trim();
    if inner.is_empty() || has_top_level_comma(inner) {
        return trimmed.to_string();
    }
    format!("{}[]", inner)
}

fn has_top_level_comma(text: &str) -> bool {
    let mut depth = 0i32;
    for ch in text.chars() {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

/// Parse `@deprecated` content into version and description
///
/// The leading token is a version only if it contains digits or dots;
/// otherwise the whole content is the description.
pub fn parse_deprecation(content: &str) -> DeprecationInfo {
    let content = content.trim();
    if content.is_empty() {
        return DeprecationInfo::default();
    }

    let (first, rest) = match content.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (content, ""),
    };

    if first.chars().any(|c| c.is_ascii_digit() || c == '.') {
        DeprecationInfo {
            version: Some(first.to_string()),
            description: (!rest.is_empty()).then(|| rest.to_string()),
        }
    } else {
        DeprecationInfo {
            version: None,
            description: Some(content.to_string()),
        }
    }
}

// ============================================================================
// Type reconciliation
// ============================================================================

/// Decides between a concrete type annotation and a documented type
///
/// The concrete type wins unless it is missing or one of the configured weak
/// types. The override never replaces a specific concrete type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReconciler {
    weak_types: BTreeSet<String>,
}

impl TypeReconciler {
    /// Create a reconciler with a custom weak-type set
    pub fn new<I, S>(weak_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            weak_types: weak_types
                .into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// The PHP weak-type set
    pub fn php() -> Self {
        Self::new(PHP_WEAK_TYPES)
    }

    pub fn is_weak(&self, type_name: &str) -> bool {
        self.weak_types.contains(&type_name.trim().to_ascii_lowercase())
    }

    /// Pick the resolved type for a declaration
    pub fn reconcile(&self, concrete: Option<TypeRef>, documented: Option<&str>) -> Option<TypeRef> {
        let documented = documented.map(str::trim).filter(|d| !d.is_empty());
        match (concrete, documented) {
            (Some(c), Some(d)) if c.is_empty() || self.is_weak(&c.name) => Some(TypeRef::new(d)),
            (None, Some(d)) => Some(TypeRef::new(d)),
            (concrete, _) => concrete,
        }
    }
}

impl Default for TypeReconciler {
    fn default() -> Self {
        Self::php()
    }
}

// ============================================================================
// Line-anchored pre-pass
// ============================================================================

/// How documentation comments are recognized and anchored in one grammar
#[derive(Debug, Clone, Copy)]
pub struct AnchorRules {
    /// CST kind of comment nodes
    pub comment_kind: &'static str,
    /// Prefix that marks a comment as documentation
    pub doc_prefix: &'static str,
    /// Named sibling kinds skipped when looking for the documented declaration
    pub transparent_kinds: &'static [&'static str],
}

/// Anchoring rules for the PHP grammar
pub const PHP_ANCHOR_RULES: AnchorRules = AnchorRules {
    comment_kind: "comment",
    doc_prefix: "/**",
    transparent_kinds: &["comment", "php_tag", "text_interpolation"],
};

/// The declaration a documentation comment was anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocAnchor {
    /// 1-based start line of the documented declaration
    pub target_line: usize,
    /// CST kind of the documented declaration
    pub target_kind: &'static str,
}

/// Line and CST kind of a documented declaration
///
/// Several declarations can start on one line (`class A { public function f() {} }`),
/// so the line alone does not identify the target.
type DocKey = (usize, &'static str);

/// Documentation comments indexed by the declaration they precede
#[derive(Debug, Clone, Default)]
pub struct DocTable {
    annotations: BTreeMap<DocKey, DocAnnotation>,
    raw: BTreeMap<DocKey, String>,
    anchors: BTreeMap<usize, DocAnchor>,
}

impl DocTable {
    /// Walk the whole tree once and anchor every documentation comment
    pub fn collect(root: tree_sitter::Node<'_>, source: &[u8], rules: &AnchorRules) -> Self {
        let mut table = Self::default();
        table.visit(root, source, rules);
        table
    }

    fn visit(&mut self, node: tree_sitter::Node<'_>, source: &[u8], rules: &AnchorRules) {
        if node.kind() == rules.comment_kind {
            let text = node
                .utf8_text(source)
                .map(str::to_string)
                .unwrap_or_default();
            if text.starts_with(rules.doc_prefix) {
                if let Some(anchor) = next_declaration(node, rules) {
                    let key = (anchor.target_line, anchor.target_kind);
                    if let Some(info) = parse_doc_annotation(&text) {
                        self.annotations.insert(key, info);
                    }
                    self.raw.insert(key, text);
                    self.anchors.insert(node.start_byte(), anchor);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, source, rules);
        }
    }

    /// Annotation for a declaration of `kind` starting on `line`
    pub fn annotation_at(&self, line: usize, kind: &'static str) -> Option<&DocAnnotation> {
        self.annotations.get(&(line, kind))
    }

    /// Raw documentation text for a declaration of `kind` starting on `line`
    pub fn raw_at(&self, line: usize, kind: &'static str) -> Option<&str> {
        self.raw.get(&(line, kind)).map(String::as_str)
    }

    /// Anchor of the documentation comment starting at `start_byte`
    pub fn anchor_for(&self, start_byte: usize) -> Option<&DocAnchor> {
        self.anchors.get(&start_byte)
    }

    /// Number of anchored documentation comments
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// Find the first named, non-transparent sibling after a comment
fn next_declaration(comment: tree_sitter::Node<'_>, rules: &AnchorRules) -> Option<DocAnchor> {
    let mut sibling = comment.next_sibling();
    while let Some(node) = sibling {
        if node.is_named() && !rules.transparent_kinds.contains(&node.kind()) {
            return Some(DocAnchor {
                target_line: node.start_position().row + 1,
                target_kind: node.kind(),
            });
        }
        sibling = node.next_sibling();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_php(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    // =========================================================================
    // Tag Extraction Tests
    // =========================================================================

    #[test]
    fn test_no_tags_yields_none() {
        assert!(parse_doc_annotation("/** Just a description. */").is_none());
        assert!(parse_doc_annotation("/**\n * @author Someone\n */").is_none());
    }

    #[test]
    fn test_var_tag() {
        let info = parse_doc_annotation("/** @var User[] $users */").unwrap();
        assert_eq!(info.var_type.as_deref(), Some("User[]"));
    }

    #[test]
    fn test_return_tag_keeps_spaced_generic() {
        let doc = "/**\n * @return array<string, User> keyed by email\n */";
        let info = parse_doc_annotation(doc).unwrap();
        assert_eq!(info.return_type.as_deref(), Some("array<string, User>"));
    }

    #[test]
    fn test_param_tags() {
        let doc = r#"/**
         * Find users.
         *
         * @param string $x the needle
         * @param array<int> $ids
         * @param callable(int): bool $filter
         * @param $untyped ignored
         */"#;
        let info = parse_doc_annotation(doc).unwrap();
        assert_eq!(info.param_types.get("x").map(String::as_str), Some("string"));
        assert_eq!(info.param_types.get("ids").map(String::as_str), Some("int[]"));
        assert_eq!(
            info.param_types.get("filter").map(String::as_str),
            Some("callable(int): bool")
        );
        assert!(!info.param_types.contains_key("untyped"));
    }

    #[test]
    fn test_variadic_param_tag() {
        let info = parse_doc_annotation("/** @param string ...$parts */").unwrap();
        assert_eq!(info.param_types.get("parts").map(String::as_str), Some("string"));
    }

    #[test]
    fn test_deprecated_tag_is_recognized() {
        let info = parse_doc_annotation("/** @deprecated 2.0 use save() */").unwrap();
        let dep = info.deprecated.unwrap();
        assert_eq!(dep.version.as_deref(), Some("2.0"));
        assert_eq!(dep.description.as_deref(), Some("use save()"));
    }

    #[test]
    fn test_doc_lines_strip_markers() {
        let lines = doc_lines("/**\n * First\n *\n * @var int\n */");
        assert!(lines.contains(&"First".to_string()));
        assert!(lines.contains(&"@var int".to_string()));
    }

    // =========================================================================
    // Normalization Tests
    // =========================================================================

    #[test]
    fn test_normalize_single_argument() {
        assert_eq!(normalize_collection_type("array<User>"), "User[]");
        assert_eq!(normalize_collection_type("list<int>"), "int[]");
        assert_eq!(normalize_collection_type("non-empty-list<Order>"), "Order[]");
    }

    #[test]
    fn test_normalize_keyed_is_unchanged() {
        assert_eq!(normalize_collection_type("array<string, User>"), "array<string, User>");
        assert_eq!(normalize_collection_type("array<int,User[]>"), "array<int,User[]>");
    }

    #[test]
    fn test_normalize_nested_single_argument() {
        assert_eq!(
            normalize_collection_type("array<array<string, int>>"),
            "array<string, int>[]"
        );
    }

    #[test]
    fn test_normalize_other_generics_untouched() {
        assert_eq!(normalize_collection_type("Collection<User>"), "Collection<User>");
        assert_eq!(normalize_collection_type("User[]"), "User[]");
        assert_eq!(normalize_collection_type("array<User>|null"), "array<User>|null");
    }

    // =========================================================================
    // Deprecation Tests
    // =========================================================================

    #[test]
    fn test_deprecation_with_version() {
        let dep = parse_deprecation("1.2 use Y instead");
        assert_eq!(dep.version.as_deref(), Some("1.2"));
        assert_eq!(dep.description.as_deref(), Some("use Y instead"));
    }

    #[test]
    fn test_deprecation_version_only() {
        let dep = parse_deprecation("3.0");
        assert_eq!(dep.version.as_deref(), Some("3.0"));
        assert_eq!(dep.description, None);
    }

    #[test]
    fn test_deprecation_without_version() {
        let dep = parse_deprecation("use the new API");
        assert_eq!(dep.version, None);
        assert_eq!(dep.description.as_deref(), Some("use the new API"));
    }

    #[test]
    fn test_deprecation_empty() {
        assert_eq!(parse_deprecation("  "), DeprecationInfo::default());
    }

    // =========================================================================
    // Reconciliation Tests
    // =========================================================================

    #[test]
    fn test_missing_concrete_type_takes_doc() {
        let r = TypeReconciler::php();
        assert_eq!(r.reconcile(None, Some("string")), Some(TypeRef::new("string")));
    }

    #[test]
    fn test_weak_concrete_type_takes_doc() {
        let r = TypeReconciler::php();
        let resolved = r.reconcile(Some(TypeRef::new("array")), Some("User[]"));
        assert_eq!(resolved, Some(TypeRef::new("User[]")));
        let resolved = r.reconcile(Some(TypeRef::new("Mixed")), Some("Order"));
        assert_eq!(resolved, Some(TypeRef::new("Order")));
    }

    #[test]
    fn test_specific_concrete_type_wins() {
        let r = TypeReconciler::php();
        let resolved = r.reconcile(Some(TypeRef::new("User")), Some("mixed"));
        assert_eq!(resolved, Some(TypeRef::new("User")));
    }

    #[test]
    fn test_no_doc_keeps_concrete() {
        let r = TypeReconciler::php();
        assert_eq!(r.reconcile(Some(TypeRef::new("array")), None), Some(TypeRef::new("array")));
        assert_eq!(r.reconcile(None, Some("  ")), None);
    }

    #[test]
    fn test_custom_weak_set() {
        let r = TypeReconciler::new(["Any"]);
        assert!(r.is_weak("any"));
        assert!(!r.is_weak("array"));
        let resolved = r.reconcile(Some(TypeRef::new("array")), Some("User[]"));
        assert_eq!(resolved, Some(TypeRef::new("array")));
    }

    // =========================================================================
    // DocTable Tests
    // =========================================================================

    #[test]
    fn test_doc_table_anchors_to_next_declaration() {
        let source = "<?php\n/**\n * @return User\n */\nfunction find($id) {}\n";
        let tree = parse_php(source);
        let table = DocTable::collect(tree.root_node(), source.as_bytes(), &PHP_ANCHOR_RULES);

        assert_eq!(table.len(), 1);
        let info = table.annotation_at(5, "function_definition").unwrap();
        assert_eq!(info.return_type.as_deref(), Some("User"));
        assert!(table.raw_at(5, "function_definition").unwrap().contains("@return User"));
        assert!(table.annotation_at(2, "function_definition").is_none());
        assert!(table.annotation_at(5, "class_declaration").is_none());
    }

    #[test]
    fn test_doc_table_skips_intermediate_comments() {
        let source = "<?php\n/** @var int */\n// spacer\nconst A = 1;\n";
        let tree = parse_php(source);
        let table = DocTable::collect(tree.root_node(), source.as_bytes(), &PHP_ANCHOR_RULES);

        let doc_start = source.find("/**").unwrap();
        let anchor = table.anchor_for(doc_start).unwrap();
        assert_eq!(anchor.target_line, 4);
        assert_eq!(anchor.target_kind, "const_declaration");
    }

    #[test]
    fn test_doc_table_ignores_plain_comments() {
        let source = "<?php\n/* @var int */\n$a = 1;\n";
        let tree = parse_php(source);
        let table = DocTable::collect(tree.root_node(), source.as_bytes(), &PHP_ANCHOR_RULES);
        assert!(table.is_empty());
    }

    #[test]
    fn test_doc_table_records_untagged_raw_text() {
        let source = "<?php\n/**\n * A user.\n */\nclass User {}\n";
        let tree = parse_php(source);
        let table = DocTable::collect(tree.root_node(), source.as_bytes(), &PHP_ANCHOR_RULES);
        assert!(table.annotation_at(5, "class_declaration").is_none());
        assert!(table.raw_at(5, "class_declaration").unwrap().contains("A user."));
    }

    #[test]
    fn test_doc_table_separates_declarations_on_one_line() {
        let source = "<?php
class A { /** @deprecated 2.0 */ public function f() {} }
";
        let tree = parse_php(source);
        let table = DocTable::collect(tree.root_node(), source.as_bytes(), &PHP_ANCHOR_RULES);

        assert!(table.raw_at(2, "method_declaration").is_some());
        assert!(table.raw_at(2, "class_declaration").is_none());
    }
}
