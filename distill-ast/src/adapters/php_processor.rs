//! PHP Language Processor
//!
//! Converts a tree-sitter-php parse tree into the distilled IR in two passes:
//!
//! 1. [`DocTable::collect`] anchors every `/** ... */` block to the line of the
//!    declaration it documents.
//! 2. A recursive descent over the tree emits IR nodes, reconciling concrete
//!    type hints with the documented types from pass 1.
//!
//! Traits and enums are emitted as [`DistilledClass`] nodes with a marker in
//! their [`PhpExtensions`]. Constructor parameters carrying a visibility are
//! promoted to fields on the enclosing class.

use std::collections::BTreeMap;
use std::mem;

use tracing::{debug, trace};
use tree_sitter::Node;

use super::php_docblock::parse_class_docblock;
use super::{
    checked_text, child_of_kind, child_of_kinds, children_of, node_location, syntax_diagnostic,
    LanguageProcessor,
};
use crate::docblock::{doc_lines, DocAnnotation, DocTable, TypeReconciler, PHP_ANCHOR_RULES};
use crate::error::{AstError, Result};
use crate::ir::{
    php_ext_mut, CommentFormat, DistilledClass, DistilledComment, DistilledError, DistilledField,
    DistilledFile, DistilledFunction, DistilledImport, DistilledInterface, DistilledNode,
    ImportType, ImportedSymbol, LanguageId, Modifier, Parameter, TypeRef, Visibility,
};

/// Language-version hint recorded on every processed file
pub const PHP_VERSION_HINT: &str = "8";

/// CST kinds that spell a type
const TYPE_KINDS: &[&str] = &[
    "named_type",
    "optional_type",
    "union_type",
    "intersection_type",
    "primitive_type",
    "disjunctive_normal_form_type",
    "bottom_type",
    "type",
];

/// Declarations that absorb their doc block instead of emitting a comment
const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "trait_declaration",
    "enum_declaration",
];

/// Parents under which an attribute list stands alone and decorates the next declaration
const STATEMENT_CONTAINER_KINDS: &[&str] = &[
    "program",
    "compound_statement",
    "declaration_list",
    "enum_declaration_list",
    "ERROR",
];

const PARAMETER_KINDS: &[&str] = &[
    "simple_parameter",
    "variadic_parameter",
    "property_promotion_parameter",
];

/// Names that are never resolved against the alias table or namespace
const RESERVED_TYPE_NAMES: &[&str] = &[
    "int", "float", "string", "bool", "array", "mixed", "object", "callable", "iterable", "void",
    "never", "null", "false", "true", "self", "static", "parent",
];

/// Per-run traversal state, reset at the start of every `process` call
#[derive(Debug, Default)]
struct PhpState {
    namespace: String,
    /// Short name (or alias) to fully qualified name
    aliases: BTreeMap<String, String>,
    /// Names of the enclosing type declarations, innermost last
    type_stack: Vec<String>,
    /// Attributes seen before the declaration they belong to
    pending_attributes: Vec<String>,
    docs: DocTable,
}

/// PHP processor backed by tree-sitter-php
pub struct PhpProcessor {
    parser: tree_sitter::Parser,
    reconciler: TypeReconciler,
    state: PhpState,
}

impl PhpProcessor {
    /// Create a processor with the PHP grammar loaded
    pub fn new() -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| AstError::TreeSitterError(e.to_string()))?;

        Ok(Self {
            parser,
            reconciler: TypeReconciler::php(),
            state: PhpState::default(),
        })
    }

    /// Replace the weak-type policy used for doc/code type reconciliation
    pub fn with_type_reconciler(mut self, reconciler: TypeReconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Alias table built by the last `process` call
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.state.aliases
    }

    /// Namespace in effect at the end of the last `process` call
    pub fn namespace(&self) -> &str {
        &self.state.namespace
    }

    /// Resolve a type name as written in source to a fully qualified name
    ///
    /// Fully qualified names (`\Foo\Bar`) pass through without the leading
    /// separator, the first segment of other names is looked up in the alias
    /// table, and unknown names are placed in the current namespace.
    pub fn resolve_type_name(&self, name: &str) -> String {
        let name = name.trim();
        if let Some(qualified) = name.strip_prefix('\\') {
            return qualified.to_string();
        }
        if name.is_empty() || RESERVED_TYPE_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
            return name.to_string();
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        if let Some(full) = self.state.aliases.get(first) {
            return match rest {
                Some(rest) => format!("{}\\{}", full, rest),
                None => full.clone(),
            };
        }

        if self.state.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{}", self.state.namespace, name)
        }
    }
}

impl LanguageProcessor for PhpProcessor {
    fn language(&self) -> LanguageId {
        LanguageId::Php
    }

    fn language_version(&self) -> &'static str {
        PHP_VERSION_HINT
    }

    fn process(&mut self, source: &[u8], filename: &str) -> Result<DistilledFile> {
        self.state = PhpState::default();

        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| AstError::parse_error(filename, "tree-sitter produced no tree"))?;
        let root = tree.root_node();

        // Pass 1: anchor doc blocks to declaration lines
        self.state.docs = DocTable::collect(root, source, &PHP_ANCHOR_RULES);

        // Pass 2: build the IR
        let mut file = DistilledFile::new(filename, LanguageId::Php, PHP_VERSION_HINT);
        file.location = node_location(&root);

        let mut walker = Walker {
            source,
            state: &mut self.state,
            reconciler: &self.reconciler,
            errors: Vec::new(),
        };
        walker.visit_children(root, &mut file.children);
        file.errors = walker.errors;

        debug!(
            file = filename,
            nodes = file.total_nodes(),
            doc_blocks = self.state.docs.len(),
            diagnostics = file.errors.len(),
            "processed PHP file"
        );

        Ok(file)
    }
}

/// Which PHP construct a class-like node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassFlavor {
    Class,
    Trait,
    Enum,
}

/// One clause of a `use` import
struct UseClause {
    path: String,
    alias: Option<String>,
    import_type: Option<ImportType>,
}

/// Pass-2 traversal over one tree
struct Walker<'a> {
    source: &'a [u8],
    state: &'a mut PhpState,
    reconciler: &'a TypeReconciler,
    errors: Vec<DistilledError>,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        if let Some(diagnostic) = syntax_diagnostic(&node) {
            self.errors.push(diagnostic);
        }

        match node.kind() {
            "comment" => self.visit_comment(node, out),
            "attribute_list" => self.queue_attributes(node),
            "anonymous_class" => self.visit_anonymous_class(node),
            "object_creation_expression" if child_of_kind(&node, "declaration_list").is_some() => {
                self.visit_anonymous_class(node)
            }
            "namespace_definition" => self.visit_namespace(node, out),
            "namespace_use_declaration" => self.visit_namespace_use(node, out),
            "class_declaration" => self.visit_class(node, ClassFlavor::Class, out),
            "trait_declaration" => self.visit_class(node, ClassFlavor::Trait, out),
            "enum_declaration" => self.visit_class(node, ClassFlavor::Enum, out),
            "interface_declaration" => self.visit_interface(node, out),
            "function_definition" | "method_declaration" => self.visit_function(node, out),
            "property_declaration" => self.visit_property(node, out),
            "const_declaration" => self.visit_const(node, out),
            "use_declaration" => {
                trace!(line = node.start_position().row + 1, "trait use outside a type body");
            }
            _ => self.visit_children(node, out),
        }
    }

    fn visit_children(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        for child in children_of(&node) {
            self.visit(child, out);
        }
    }

    fn text(&mut self, node: &Node<'_>) -> String {
        checked_text(node, self.source, &mut self.errors)
    }

    fn warn(&mut self, message: impl Into<String>, node: &Node<'_>) {
        self.errors
            .push(DistilledError::warning(message, Some(node_location(node))));
    }

    fn take_pending_attributes(&mut self) -> Vec<String> {
        mem::take(&mut self.state.pending_attributes)
    }

    // ------------------------------------------------------------------------
    // Comments and attributes
    // ------------------------------------------------------------------------

    /// Queue a free-standing attribute list for the next declaration
    ///
    /// Lists attached to an expression (closures, arrow functions) belong to
    /// that expression and are dropped.
    fn queue_attributes(&mut self, node: Node<'_>) {
        let standalone = node
            .parent()
            .is_some_and(|p| STATEMENT_CONTAINER_KINDS.contains(&p.kind()));
        if standalone {
            let attributes = self.attribute_texts(node);
            self.state.pending_attributes.extend(attributes);
        } else {
            trace!(line = node.start_position().row + 1, "expression attributes dropped");
        }
    }

    fn visit_comment(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        if let Some(anchor) = self.state.docs.anchor_for(node.start_byte()) {
            if TYPE_DECLARATION_KINDS.contains(&anchor.target_kind) {
                trace!(line = anchor.target_line, "doc block absorbed by type declaration");
                return;
            }
        }

        let raw = self.text(&node);
        let (format, text) = classify_comment(&raw);
        out.push(DistilledNode::Comment(DistilledComment {
            location: node_location(&node),
            text,
            format,
            description: None,
            deprecated: None,
            extensions: None,
        }));
    }

    /// Each `#[...]` entry of an attribute list, without the delimiters
    fn attribute_texts(&mut self, list: Node<'_>) -> Vec<String> {
        let mut attributes = Vec::new();
        for group in children_of(&list) {
            for attribute in children_of(&group) {
                if attribute.kind() == "attribute" {
                    attributes.push(self.text(&attribute));
                }
            }
        }

        if attributes.is_empty() {
            let text = self.text(&list);
            let inner = text.trim().trim_start_matches("#[").trim_end_matches(']').trim();
            if !inner.is_empty() {
                attributes.push(inner.to_string());
            }
        }
        attributes
    }

    // ------------------------------------------------------------------------
    // Namespaces and imports
    // ------------------------------------------------------------------------

    fn visit_namespace(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        let name = node
            .child_by_field_name("name")
            .or_else(|| child_of_kind(&node, "namespace_name"))
            .map(|n| self.text(&n))
            .unwrap_or_default();

        if !name.is_empty() {
            out.push(DistilledNode::Import(DistilledImport {
                location: node_location(&node),
                import_type: ImportType::Namespace,
                module: name.clone(),
                symbols: Vec::new(),
                description: None,
                deprecated: None,
                extensions: None,
            }));
        }

        let body = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(&node, "compound_statement"));
        match body {
            Some(body) => {
                let outer = mem::replace(&mut self.state.namespace, name);
                self.visit_children(body, out);
                self.state.namespace = outer;
            }
            None => self.state.namespace = name,
        }
    }

    fn visit_namespace_use(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        let mut import_type = ImportType::Use;
        let mut prefix = String::new();
        let mut clauses: Vec<(Node<'_>, bool)> = Vec::new();

        for child in children_of(&node) {
            match child.kind() {
                "function" => import_type = ImportType::Function,
                "const" => import_type = ImportType::Const,
                "namespace_name" | "namespace_name_as_prefix" => {
                    prefix = self.text(&child).trim_matches('\\').to_string();
                }
                "namespace_use_clause" => clauses.push((child, false)),
                "namespace_use_group" => {
                    for clause in children_of(&child) {
                        if matches!(
                            clause.kind(),
                            "namespace_use_clause" | "namespace_use_group_clause"
                        ) {
                            clauses.push((clause, true));
                        }
                    }
                }
                _ => {}
            }
        }

        for (clause, grouped) in clauses {
            let Some(parsed) = self.use_clause(clause) else {
                self.warn("use clause without a name", &clause);
                continue;
            };

            let full = if grouped && !prefix.is_empty() {
                format!("{}\\{}", prefix, parsed.path)
            } else {
                parsed.path
            };
            self.register_alias(&full, parsed.alias.as_deref());

            out.push(DistilledNode::Import(DistilledImport {
                location: node_location(&clause),
                import_type: parsed.import_type.unwrap_or(import_type),
                module: full.clone(),
                symbols: vec![ImportedSymbol {
                    name: full,
                    alias: parsed.alias,
                }],
                description: None,
                deprecated: None,
                extensions: None,
            }));
        }
    }

    fn use_clause(&mut self, clause: Node<'_>) -> Option<UseClause> {
        let mut path: Option<String> = None;
        let mut alias = None;
        let mut import_type = None;
        let mut after_as = false;

        for child in children_of(&clause) {
            match child.kind() {
                "function" => import_type = Some(ImportType::Function),
                "const" => import_type = Some(ImportType::Const),
                "as" => after_as = true,
                "namespace_aliasing_clause" => {
                    alias = child_of_kind(&child, "name").map(|n| self.text(&n));
                }
                "name" | "qualified_name" | "namespace_name" => {
                    let text = self.text(&child);
                    if after_as {
                        alias = Some(text);
                    } else if path.is_none() {
                        path = Some(text.trim_start_matches('\\').to_string());
                    }
                }
                _ => {}
            }
        }

        path.filter(|p| !p.is_empty()).map(|path| UseClause {
            path,
            alias,
            import_type,
        })
    }

    fn register_alias(&mut self, full: &str, alias: Option<&str>) {
        let key = match alias {
            Some(alias) => alias.to_string(),
            None => full.rsplit('\\').next().unwrap_or(full).to_string(),
        };
        self.state.aliases.insert(key, full.to_string());
    }

    // ------------------------------------------------------------------------
    // Type declarations
    // ------------------------------------------------------------------------

    fn visit_class(&mut self, node: Node<'_>, flavor: ClassFlavor, out: &mut Vec<DistilledNode>) {
        let location = node_location(&node);
        let mut class = DistilledClass {
            location,
            decorators: self.take_pending_attributes(),
            ..Default::default()
        };
        match flavor {
            ClassFlavor::Class => {}
            ClassFlavor::Trait => php_ext_mut(&mut class.extensions).is_trait = true,
            ClassFlavor::Enum => {
                class.modifiers.push(Modifier::Final);
                php_ext_mut(&mut class.extensions).is_enum = true;
            }
        }

        let children = children_of(&node);
        let mut body = None;
        for (index, child) in children.iter().enumerate() {
            match child.kind() {
                "attribute_list" => {
                    let attributes = self.attribute_texts(*child);
                    class.decorators.extend(attributes);
                }
                "abstract_modifier" => add_modifier(&mut class.modifiers, Modifier::Abstract),
                "final_modifier" => add_modifier(&mut class.modifiers, Modifier::Final),
                "readonly_modifier" => add_modifier(&mut class.modifiers, Modifier::Readonly),
                "name" => class.name = self.text(child),
                "base_clause" => {
                    let names = self.type_names(*child);
                    class.extends.extend(names);
                }
                "class_interface_clause" => {
                    let names = self.type_names(*child);
                    class.implements.extend(names);
                }
                "declaration_list" | "enum_declaration_list" => body = Some(*child),
                ":" if flavor == ClassFlavor::Enum => {
                    if let Some(backing) = children[index + 1..].iter().find(|c| c.is_named()) {
                        let backing = self.text(backing);
                        php_ext_mut(&mut class.extensions).enum_backing_type = Some(backing);
                    }
                }
                _ => {}
            }
        }

        if class.name.is_empty() {
            self.warn(format!("{} without a name", node.kind()), &node);
        }

        let mut virtual_members = Vec::new();
        if let Some(raw) = self.state.docs.raw_at(location.start_line, node.kind()).map(str::to_string) {
            let doc = parse_class_docblock(&raw);
            class.description = doc.description;
            class.deprecated = doc.deprecated;
            class.api_docblock = doc.api_docblock;
            if let Some(visibility) = doc.visibility {
                class.visibility = visibility;
            }
            virtual_members = doc.members;
            self.errors.extend(doc.diagnostics.into_iter().map(|mut d| {
                d.location = Some(location);
                d
            }));
        }

        if let Some(body) = body {
            let name = class.name.clone();
            self.visit_type_body(body, &name, &mut class.children, &mut class.mixins);
        }
        class.children.extend(virtual_members);

        out.push(DistilledNode::Class(class));
    }

    /// `new class { ... }` is an expression; its members never reach the file
    fn visit_anonymous_class(&mut self, node: Node<'_>) {
        let Some(body) = child_of_kind(&node, "declaration_list") else {
            return;
        };
        let outer = self.take_pending_attributes();
        let mut members = Vec::new();
        let mut mixins = Vec::new();
        self.visit_type_body(body, "class@anonymous", &mut members, &mut mixins);
        self.state.pending_attributes = outer;
        trace!(
            line = node.start_position().row + 1,
            members = members.len(),
            "anonymous class skipped"
        );
    }

    fn visit_interface(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        let location = node_location(&node);
        let mut interface = DistilledInterface {
            location,
            ..Default::default()
        };
        // Interfaces carry no decorator list; attributes are consumed here
        self.take_pending_attributes();

        let mut body = None;
        for child in children_of(&node) {
            match child.kind() {
                "name" => interface.name = self.text(&child),
                "base_clause" | "interface_extends_clause" => {
                    let names = self.type_names(child);
                    interface.extends.extend(names);
                }
                "declaration_list" => body = Some(child),
                _ => {}
            }
        }

        if let Some(raw) = self.state.docs.raw_at(location.start_line, node.kind()).map(str::to_string) {
            let doc = parse_class_docblock(&raw);
            interface.description = doc.description;
            interface.deprecated = doc.deprecated;
            if let Some(visibility) = doc.visibility {
                interface.visibility = visibility;
            }
        }

        if let Some(body) = body {
            self.state.type_stack.push(interface.name.clone());
            for member in children_of(&body) {
                if member.kind() == "method_declaration" {
                    self.visit_function(member, &mut interface.children);
                } else if member.is_named() && member.kind() != "comment" {
                    trace!(kind = member.kind(), "skipping non-method interface member");
                }
            }
            self.state.type_stack.pop();
        }

        out.push(DistilledNode::Interface(interface));
    }

    /// Visit the members of a class, trait or enum body
    fn visit_type_body(
        &mut self,
        body: Node<'_>,
        owner: &str,
        members: &mut Vec<DistilledNode>,
        mixins: &mut Vec<TypeRef>,
    ) {
        self.state.type_stack.push(owner.to_string());
        for child in children_of(&body) {
            match child.kind() {
                "use_declaration" => {
                    let traits = self.type_names(child);
                    mixins.extend(traits);
                }
                "enum_case" => {
                    let case = self.enum_case(child);
                    members.push(DistilledNode::Field(case));
                }
                _ => self.visit(child, members),
            }
        }
        self.state.type_stack.pop();
    }

    /// Direct `name`/`qualified_name` children as type references
    fn type_names(&mut self, node: Node<'_>) -> Vec<TypeRef> {
        children_of(&node)
            .into_iter()
            .filter(|c| matches!(c.kind(), "name" | "qualified_name"))
            .map(|c| TypeRef::new(self.text(&c)))
            .collect()
    }

    fn enum_case(&mut self, node: Node<'_>) -> DistilledField {
        let mut field = DistilledField {
            location: node_location(&node),
            modifiers: vec![Modifier::Static, Modifier::Final],
            decorators: self.take_pending_attributes(),
            ..Default::default()
        };
        php_ext_mut(&mut field.extensions).is_enum_case = true;

        for child in children_of(&node) {
            match child.kind() {
                "attribute_list" => {
                    let attributes = self.attribute_texts(child);
                    field.decorators.extend(attributes);
                }
                "name" if field.name.is_empty() => field.name = self.text(&child),
                _ => {}
            }
        }

        field.default_value = match node.child_by_field_name("value") {
            Some(value) => Some(self.text(&value)),
            None => self.value_after_equals(node),
        };
        field
    }

    // ------------------------------------------------------------------------
    // Functions and methods
    // ------------------------------------------------------------------------

    fn visit_function(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        let location = node_location(&node);
        let mut func = DistilledFunction {
            location,
            decorators: self.take_pending_attributes(),
            ..Default::default()
        };

        let children = children_of(&node);
        let mut params = None;
        for child in &children {
            match child.kind() {
                "attribute_list" => {
                    let attributes = self.attribute_texts(*child);
                    func.decorators.extend(attributes);
                }
                "visibility_modifier" => func.visibility = parse_visibility(&self.text(child)),
                "static_modifier" => add_modifier(&mut func.modifiers, Modifier::Static),
                "abstract_modifier" => add_modifier(&mut func.modifiers, Modifier::Abstract),
                "final_modifier" => add_modifier(&mut func.modifiers, Modifier::Final),
                "name" => func.name = self.text(child),
                "formal_parameters" => params = Some(*child),
                "compound_statement" => func.implementation = Some(self.text(child)),
                _ => {}
            }
        }

        if func.name.is_empty() {
            self.warn(format!("{} without a name", node.kind()), &node);
        }

        let doc = self.state.docs.annotation_at(location.start_line, node.kind()).cloned();
        let promote = func.name.eq_ignore_ascii_case("__construct") && !self.state.type_stack.is_empty();

        let mut promoted = Vec::new();
        if let Some(list) = params {
            for param_node in children_of(&list) {
                if !PARAMETER_KINDS.contains(&param_node.kind()) {
                    continue;
                }
                let param = self.parameter(param_node, doc.as_ref());
                if promote && param_node.kind() == "property_promotion_parameter" {
                    promoted.push(self.promoted_field(param_node, &param));
                }
                func.parameters.push(param);
            }
        }

        let concrete_return = return_type_node(&node, &children).map(|t| TypeRef::new(self.text(&t).trim()));
        let documented_return = doc.as_ref().and_then(|d| d.return_type.as_deref());
        func.returns = self.reconciler.reconcile(concrete_return, documented_return);
        func.deprecated = doc.and_then(|d| d.deprecated);

        out.extend(promoted.into_iter().map(DistilledNode::Field));
        out.push(DistilledNode::Function(func));
    }

    fn parameter(&mut self, node: Node<'_>, doc: Option<&DocAnnotation>) -> Parameter {
        let name = node
            .child_by_field_name("name")
            .or_else(|| child_of_kinds(&node, &["variable_name", "by_ref"]))
            .map(|n| self.text(&n))
            .unwrap_or_default();
        let name = name.trim_start_matches('&').trim_start_matches('$').to_string();
        if name.is_empty() {
            self.warn("parameter without a name", &node);
        }

        let concrete = self.concrete_type(node);
        let documented = doc.and_then(|d| d.param_types.get(&name)).map(String::as_str);
        let is_variadic = node.kind() == "variadic_parameter"
            || children_of(&node).iter().any(|c| c.kind() == "...");

        Parameter {
            type_ref: self.reconciler.reconcile(concrete, documented),
            default_value: self.default_value(node),
            name,
            is_variadic,
        }
    }

    fn promoted_field(&mut self, node: Node<'_>, param: &Parameter) -> DistilledField {
        let mut field = DistilledField {
            location: node_location(&node),
            name: param.name.clone(),
            type_ref: param.type_ref.clone(),
            default_value: param.default_value.clone(),
            ..Default::default()
        };

        for child in children_of(&node) {
            match child.kind() {
                "visibility_modifier" => field.visibility = parse_visibility(&self.text(&child)),
                "readonly_modifier" => add_modifier(&mut field.modifiers, Modifier::Readonly),
                "attribute_list" => {
                    let attributes = self.attribute_texts(child);
                    field.decorators.extend(attributes);
                }
                _ => {}
            }
        }
        field
    }

    // ------------------------------------------------------------------------
    // Properties and constants
    // ------------------------------------------------------------------------

    fn visit_property(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        let mut decorators = self.take_pending_attributes();
        let mut visibility = Visibility::Public;
        let mut modifiers = Vec::new();
        let mut concrete = None;
        let mut elements = Vec::new();

        for child in children_of(&node) {
            match child.kind() {
                "attribute_list" => {
                    let attributes = self.attribute_texts(child);
                    decorators.extend(attributes);
                }
                "visibility_modifier" => visibility = parse_visibility(&self.text(&child)),
                "static_modifier" => add_modifier(&mut modifiers, Modifier::Static),
                "readonly_modifier" => add_modifier(&mut modifiers, Modifier::Readonly),
                "final_modifier" => add_modifier(&mut modifiers, Modifier::Final),
                "property_element" => elements.push(child),
                kind if TYPE_KINDS.contains(&kind) => {
                    concrete = Some(TypeRef::new(self.text(&child).trim()));
                }
                _ => {}
            }
        }

        let doc = self
            .state
            .docs
            .annotation_at(node.start_position().row + 1, node.kind())
            .cloned();
        let type_ref = self
            .reconciler
            .reconcile(concrete, doc.as_ref().and_then(|d| d.var_type.as_deref()));
        let deprecated = doc.and_then(|d| d.deprecated);

        for element in elements {
            let name = element
                .child_by_field_name("name")
                .or_else(|| child_of_kind(&element, "variable_name"))
                .map(|n| self.text(&n))
                .unwrap_or_default();
            let name = name.trim_start_matches('$').to_string();
            if name.is_empty() {
                self.warn("property without a name", &element);
                continue;
            }

            out.push(DistilledNode::Field(DistilledField {
                location: node_location(&element),
                name,
                visibility,
                modifiers: modifiers.clone(),
                type_ref: type_ref.clone(),
                default_value: self.default_value(element),
                decorators: decorators.clone(),
                deprecated: deprecated.clone(),
                ..Default::default()
            }));
        }
    }

    fn visit_const(&mut self, node: Node<'_>, out: &mut Vec<DistilledNode>) {
        let mut decorators = self.take_pending_attributes();
        let mut visibility = Visibility::Public;
        let mut concrete = None;
        let mut elements = Vec::new();

        for child in children_of(&node) {
            match child.kind() {
                "attribute_list" => {
                    let attributes = self.attribute_texts(child);
                    decorators.extend(attributes);
                }
                "visibility_modifier" => visibility = parse_visibility(&self.text(&child)),
                "const_element" => elements.push(child),
                kind if TYPE_KINDS.contains(&kind) => {
                    concrete = Some(TypeRef::new(self.text(&child).trim()));
                }
                _ => {}
            }
        }

        let doc = self
            .state
            .docs
            .annotation_at(node.start_position().row + 1, node.kind())
            .cloned();
        let type_ref = self
            .reconciler
            .reconcile(concrete, doc.as_ref().and_then(|d| d.var_type.as_deref()));
        let deprecated = doc.and_then(|d| d.deprecated);

        for element in elements {
            let name = child_of_kind(&element, "name")
                .map(|n| self.text(&n))
                .unwrap_or_default();
            if name.is_empty() {
                self.warn("constant without a name", &element);
                continue;
            }

            out.push(DistilledNode::Field(DistilledField {
                location: node_location(&element),
                name,
                visibility,
                modifiers: vec![Modifier::Static, Modifier::Final],
                type_ref: type_ref.clone(),
                default_value: self.value_after_equals(element),
                decorators: decorators.clone(),
                deprecated: deprecated.clone(),
                ..Default::default()
            }));
        }
    }

    // ------------------------------------------------------------------------
    // Shared extraction helpers
    // ------------------------------------------------------------------------

    fn concrete_type(&mut self, node: Node<'_>) -> Option<TypeRef> {
        node.child_by_field_name("type")
            .or_else(|| child_of_kinds(&node, TYPE_KINDS))
            .map(|t| TypeRef::new(self.text(&t).trim()))
            .filter(|t| !t.is_empty())
    }

    fn default_value(&mut self, node: Node<'_>) -> Option<String> {
        if let Some(value) = node.child_by_field_name("default_value") {
            let text = self.text(&value);
            return Some(strip_initializer(&text));
        }
        if let Some(initializer) = child_of_kind(&node, "property_initializer") {
            let text = self.text(&initializer);
            return Some(strip_initializer(&text));
        }
        self.value_after_equals(node)
    }

    /// Text of the first named node after an `=` token
    fn value_after_equals(&mut self, node: Node<'_>) -> Option<String> {
        let children = children_of(&node);
        let equals = children.iter().position(|c| c.kind() == "=")?;
        let value = children[equals + 1..]
            .iter()
            .find(|c| c.is_named() && c.kind() != "comment")?;
        Some(self.text(value))
    }
}

/// Return-type node of a function, by field or after the `:` token
fn return_type_node<'t>(node: &Node<'t>, children: &[Node<'t>]) -> Option<Node<'t>> {
    if let Some(return_type) = node.child_by_field_name("return_type") {
        return Some(return_type);
    }
    let colon = children.iter().position(|c| c.kind() == ":")?;
    children[colon + 1..]
        .iter()
        .find(|c| TYPE_KINDS.contains(&c.kind()))
        .copied()
}

fn strip_initializer(text: &str) -> String {
    let text = text.trim();
    text.strip_prefix('=').unwrap_or(text).trim().to_string()
}

fn add_modifier(modifiers: &mut Vec<Modifier>, modifier: Modifier) {
    if !modifiers.contains(&modifier) {
        modifiers.push(modifier);
    }
}

/// Map a PHP visibility keyword; anything unrecognized is public
fn parse_visibility(keyword: &str) -> Visibility {
    match keyword.trim().to_ascii_lowercase().as_str() {
        "private" => Visibility::Private,
        "protected" => Visibility::Protected,
        _ => Visibility::Public,
    }
}

/// Classify a raw comment and strip its delimiters
pub fn classify_comment(raw: &str) -> (CommentFormat, String) {
    let raw = raw.trim();
    if raw.starts_with("/**") && raw != "/**/" {
        (CommentFormat::Docblock, doc_lines(raw).join("\n").trim().to_string())
    } else if let Some(body) = raw.strip_prefix("/*") {
        let body = body.strip_suffix("*/").unwrap_or(body);
        (CommentFormat::Block, body.trim().to_string())
    } else if let Some(body) = raw.strip_prefix("//") {
        (CommentFormat::Line, body.trim().to_string())
    } else {
        (CommentFormat::Line, raw.trim_start_matches('#').trim().to_string())
    }
}
