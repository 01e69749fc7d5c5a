//! Swift projection
//!
//! Renders the IR as Swift-flavored declarations. Type names are written as
//! they appear in the IR; only declaration syntax is translated.
//!
//! Visibility mapping: `protected` has no Swift equivalent and falls back to
//! `internal`. PHP enums render as `enum`, PHP traits as `protocol`.

use super::{indent_str, LanguageFormatter};
use distill_ast::ir::{
    php_ext, DeprecationInfo, DistilledClass, DistilledComment, DistilledEnum, DistilledField,
    DistilledFunction, DistilledImport, DistilledInterface, DistilledTypeAlias, Parameter,
    TypeParam,
};
use distill_ast::{DistilledNode, LanguageId, Modifier, NodeExtensions, Visibility};
use std::fmt::{self, Write};

/// Swift formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiftFormatter;

impl SwiftFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageFormatter for SwiftFormatter {
    fn language(&self) -> LanguageId {
        LanguageId::Swift
    }

    fn write_node(&self, out: &mut dyn Write, node: &DistilledNode, indent: usize) -> fmt::Result {
        if opens_section(node) {
            writeln!(out)?;
        }
        write_preamble(out, &indent_str(indent), node)?;

        match node {
            DistilledNode::Import(import) => write_import(out, import, indent),
            DistilledNode::Class(class) => {
                let ext = php_ext(&class.extensions);
                if ext.is_some_and(|e| e.is_enum) {
                    self.write_php_enum(out, class, indent)
                } else if ext.is_some_and(|e| e.is_trait) {
                    self.write_trait(out, class, indent)
                } else {
                    self.write_class(out, class, indent)
                }
            }
            DistilledNode::Interface(interface) => self.write_protocol(out, interface, indent),
            DistilledNode::Enum(e) => self.write_enum(out, e, indent),
            DistilledNode::Function(func) => write_function(out, func, indent),
            DistilledNode::Field(field) => write_field(out, field, indent),
            DistilledNode::TypeAlias(alias) => write_type_alias(out, alias, indent),
            DistilledNode::Comment(comment) => write_comment(out, comment, indent),
        }
    }
}

impl SwiftFormatter {
    fn write_members(&self, out: &mut dyn Write, members: &[DistilledNode], indent: usize) -> fmt::Result {
        for member in members {
            self.write_node(out, member, indent)?;
        }
        Ok(())
    }

    fn write_class(&self, out: &mut dyn Write, class: &DistilledClass, indent: usize) -> fmt::Result {
        let pad = indent_str(indent);
        let mut keywords = format!("{} ", visibility_keyword(class.visibility));
        if class.modifiers.contains(&Modifier::Final) {
            keywords.push_str("final ");
        }
        write!(out, "{}{}class {}{}", pad, keywords, class.name, type_params(&class.type_params))?;

        let inheritance: Vec<&str> = class
            .extends
            .iter()
            .chain(&class.implements)
            .chain(&class.mixins)
            .map(|t| t.name.as_str())
            .collect();
        if !inheritance.is_empty() {
            write!(out, ": {}", inheritance.join(", "))?;
        }
        writeln!(out, " {{")?;

        self.write_members(out, &class.children, indent + 1)?;
        writeln!(out, "{}}}", pad)
    }

    fn write_trait(&self, out: &mut dyn Write, class: &DistilledClass, indent: usize) -> fmt::Result {
        let pad = indent_str(indent);
        write!(out, "{}{} protocol {}", pad, visibility_keyword(class.visibility), class.name)?;
        if !class.mixins.is_empty() {
            let mixins: Vec<&str> = class.mixins.iter().map(|t| t.name.as_str()).collect();
            write!(out, ": {}", mixins.join(", "))?;
        }
        writeln!(out, " {{")?;

        self.write_members(out, &class.children, indent + 1)?;
        writeln!(out, "{}}}", pad)
    }

    /// PHP enum: backing type first, then implemented interfaces
    fn write_php_enum(&self, out: &mut dyn Write, class: &DistilledClass, indent: usize) -> fmt::Result {
        let pad = indent_str(indent);
        write!(out, "{}{} enum {}", pad, visibility_keyword(class.visibility), class.name)?;
        let backing = php_ext(&class.extensions).and_then(|e| e.enum_backing_type.as_deref());
        let conformances: Vec<&str> = backing
            .into_iter()
            .chain(class.implements.iter().map(|t| t.name.as_str()))
            .chain(class.mixins.iter().map(|t| t.name.as_str()))
            .collect();
        if !conformances.is_empty() {
            write!(out, ": {}", conformances.join(", "))?;
        }
        writeln!(out, " {{")?;

        for member in &class.children {
            match member {
                DistilledNode::Field(field) if is_enum_case(member) => {
                    write_preamble(out, &indent_str(indent + 1), member)?;
                    write_enum_case(out, field, indent + 1)?;
                }
                other => self.write_node(out, other, indent + 1)?,
            }
        }
        writeln!(out, "{}}}", pad)
    }

    fn write_protocol(&self, out: &mut dyn Write, interface: &DistilledInterface, indent: usize) -> fmt::Result {
        let pad = indent_str(indent);
        write!(
            out,
            "{}{} protocol {}{}",
            pad,
            visibility_keyword(interface.visibility),
            interface.name,
            type_params(&interface.type_params)
        )?;
        if !interface.extends.is_empty() {
            let extends: Vec<&str> = interface.extends.iter().map(|t| t.name.as_str()).collect();
            write!(out, ": {}", extends.join(", "))?;
        }
        writeln!(out, " {{")?;

        self.write_members(out, &interface.children, indent + 1)?;
        writeln!(out, "{}}}", pad)
    }

    /// Enum whose field members are all cases
    fn write_enum(&self, out: &mut dyn Write, e: &DistilledEnum, indent: usize) -> fmt::Result {
        let pad = indent_str(indent);
        write!(out, "{}{} enum {}", pad, visibility_keyword(e.visibility), e.name)?;
        if let Some(raw) = e.type_ref.as_ref().filter(|t| !t.is_empty()) {
            write!(out, ": {}", raw.name)?;
        }
        writeln!(out, " {{")?;

        for member in &e.children {
            match member {
                DistilledNode::Field(field) => {
                    write_preamble(out, &indent_str(indent + 1), member)?;
                    write_enum_case(out, field, indent + 1)?;
                }
                other => self.write_node(out, other, indent + 1)?,
            }
        }
        writeln!(out, "{}}}", pad)
    }
}

fn write_import(out: &mut dyn Write, import: &DistilledImport, indent: usize) -> fmt::Result {
    writeln!(out, "{}import {}", indent_str(indent), import.module.replace('\\', "."))
}

fn write_comment(out: &mut dyn Write, comment: &DistilledComment, indent: usize) -> fmt::Result {
    let pad = indent_str(indent);
    for line in comment.text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            writeln!(out, "{}//", pad)?;
        } else {
            writeln!(out, "{}// {}", pad, line)?;
        }
    }
    Ok(())
}

fn write_function(out: &mut dyn Write, func: &DistilledFunction, indent: usize) -> fmt::Result {
    let pad = indent_str(indent);
    let mut keywords = format!("{} ", visibility_keyword(func.visibility));
    for (modifier, keyword) in [
        (Modifier::Static, "static "),
        (Modifier::Final, "final "),
        (Modifier::Override, "override "),
        (Modifier::Mutating, "mutating "),
    ] {
        if func.modifiers.contains(&modifier) {
            keywords.push_str(keyword);
        }
    }

    if is_initializer(&func.name) {
        write!(out, "{}{}init", pad, keywords)?;
    } else {
        write!(out, "{}{}func {}", pad, keywords, func.name)?;
    }
    write!(out, "{}({})", type_params(&func.type_params), parameters(&func.parameters))?;

    if func.modifiers.contains(&Modifier::Async) {
        write!(out, " async")?;
    }
    if func.modifiers.contains(&Modifier::Throws) {
        write!(out, " throws")?;
    } else if func.modifiers.contains(&Modifier::Rethrows) {
        write!(out, " rethrows")?;
    }

    if let Some(returns) = func.returns.as_ref().filter(|t| !t.is_empty() && t.name != "Void") {
        write!(out, " -> {}", returns.name)?;
    }

    match func.implementation.as_deref() {
        Some(body) => {
            writeln!(out, " {{")?;
            let inner = indent_str(indent + 1);
            for line in body_lines(body) {
                if line.is_empty() {
                    writeln!(out)?;
                } else {
                    writeln!(out, "{}{}", inner, line)?;
                }
            }
            writeln!(out, "{}}}", pad)
        }
        None => writeln!(out),
    }
}

fn write_field(out: &mut dyn Write, field: &DistilledField, indent: usize) -> fmt::Result {
    let pad = indent_str(indent);
    let binding = if field.modifiers.contains(&Modifier::Final) || field.modifiers.contains(&Modifier::Readonly) {
        "let"
    } else {
        "var"
    };
    let statik = if field.modifiers.contains(&Modifier::Static) {
        "static "
    } else {
        ""
    };

    write!(out, "{}{} {}{} {}", pad, visibility_keyword(field.visibility), statik, binding, field.name)?;
    if let Some(ty) = field.type_ref.as_ref().filter(|t| !t.is_empty()) {
        write!(out, ": {}", ty.name)?;
    }

    match field.default_value.as_deref() {
        Some(value) => write!(out, " = {}", value)?,
        None => match (field.has_getter, field.has_setter) {
            (true, true) => write!(out, " {{ get set }}")?,
            (true, false) => write!(out, " {{ get }}")?,
            (false, true) => write!(out, " {{ set }}")?,
            (false, false) => {}
        },
    }
    writeln!(out)
}

fn write_enum_case(out: &mut dyn Write, field: &DistilledField, indent: usize) -> fmt::Result {
    let pad = indent_str(indent);
    write!(out, "{}case {}", pad, field.name)?;
    if let Some(value) = field.default_value.as_deref() {
        write!(out, " = {}", value)?;
    } else if let Some(payload) = field.type_ref.as_ref().filter(|t| !t.is_empty()) {
        if payload.name.starts_with('(') {
            write!(out, "{}", payload.name)?;
        } else {
            write!(out, "({})", payload.name)?;
        }
    }
    writeln!(out)
}

fn write_type_alias(out: &mut dyn Write, alias: &DistilledTypeAlias, indent: usize) -> fmt::Result {
    let pad = indent_str(indent);
    writeln!(
        out,
        "{}{} typealias {}{} = {}",
        pad,
        visibility_keyword(alias.visibility),
        alias.name,
        type_params(&alias.type_params),
        alias.type_ref.name
    )
}

/// Declarations set off from their siblings by a blank line
fn opens_section(node: &DistilledNode) -> bool {
    matches!(
        node,
        DistilledNode::Class(_)
            | DistilledNode::Interface(_)
            | DistilledNode::Enum(_)
            | DistilledNode::TypeAlias(_)
    )
}

fn is_enum_case(node: &DistilledNode) -> bool {
    node.extensions()
        .and_then(NodeExtensions::php)
        .is_some_and(|e| e.is_enum_case)
}

fn decorators(node: &DistilledNode) -> &[String] {
    match node {
        DistilledNode::Class(n) => &n.decorators,
        DistilledNode::Function(n) => &n.decorators,
        DistilledNode::Field(n) => &n.decorators,
        _ => &[],
    }
}

/// Doc lines, deprecation and attribute lines above a declaration
fn write_preamble(out: &mut dyn Write, pad: &str, node: &DistilledNode) -> fmt::Result {
    if let Some(description) = node.description() {
        for line in description.lines() {
            writeln!(out, "{}/// {}", pad, line.trim())?;
        }
    }
    if let Some(deprecation) = node.deprecated() {
        match deprecation_message(deprecation) {
            Some(message) => writeln!(
                out,
                "{}@available(*, deprecated, message: \"{}\")",
                pad,
                message.replace('\\', "\\\\").replace('"', "\\\"")
            )?,
            None => writeln!(out, "{}@available(*, deprecated)", pad)?,
        }
    }
    for decorator in decorators(node) {
        writeln!(out, "{}@{}", pad, decorator.trim_start_matches('@'))?;
    }
    Ok(())
}

fn deprecation_message(info: &DeprecationInfo) -> Option<String> {
    match (info.version.as_deref(), info.description.as_deref()) {
        (Some(version), Some(description)) => Some(format!("since {}: {}", version, description)),
        (Some(version), None) => Some(format!("since {}", version)),
        (None, Some(description)) => Some(description.to_string()),
        (None, None) => None,
    }
}

/// Swift visibility keyword; `protected` falls back to `internal`
pub fn visibility_keyword(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Private => "private",
        Visibility::Protected | Visibility::Internal => "internal",
        Visibility::FilePrivate => "fileprivate",
        Visibility::Open => "open",
    }
}

fn is_initializer(name: &str) -> bool {
    name == "init" || name == "__construct"
}

fn type_params(params: &[TypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = params
        .iter()
        .map(|p| match p.constraints.first() {
            Some(constraint) => format!("{}: {}", p.name, constraint.name),
            None => p.name.clone(),
        })
        .collect();
    format!("<{}>", rendered.join(", "))
}

fn parameters(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| {
            let mut rendered = p.name.clone();
            if let Some(ty) = p.type_ref.as_ref().filter(|t| !t.is_empty()) {
                rendered.push_str(": ");
                rendered.push_str(&ty.name);
            }
            if p.is_variadic {
                rendered.push_str("...");
            } else if let Some(default) = p.default_value.as_deref() {
                rendered.push_str(" = ");
                rendered.push_str(default);
            }
            rendered
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Body lines without the outer braces, dedented to a common margin
fn body_lines(body: &str) -> Vec<String> {
    let body = body.trim();
    let inner = body
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .unwrap_or(body);

    let lines: Vec<&str> = inner.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };
    let lines = &lines[first..=last];

    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l.get(margin..).unwrap_or_else(|| l.trim_start()).to_string()
            }
        })
        .collect()
}
