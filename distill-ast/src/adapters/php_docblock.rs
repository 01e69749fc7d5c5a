//! PHP class doc blocks
//!
//! A class-level PHPDoc block can change the class itself (`@api`,
//! `@internal`, `@deprecated`, free-text description) and can declare members
//! that only exist at runtime through magic accessors (`@property`,
//! `@property-read`, `@property-write`, `@method`). Those become virtual
//! `Field`/`Function` nodes flagged with [`MemberOrigin::Docblock`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::docblock::{
    doc_lines, normalize_collection_type, parse_deprecation, split_tag, split_type_token,
};
use crate::ir::{
    php_ext_mut, DeprecationInfo, DistilledError, DistilledField, DistilledFunction,
    DistilledNode, FieldAccess, MemberOrigin, Modifier, Parameter, TypeRef, Visibility,
};

lazy_static! {
    // name(params) [description]
    static ref METHOD_HEADER: Regex = Regex::new(r"^(\w+)\s*\(([^)]*)\)(.*)$").unwrap();
}

/// Tags whose presence makes a class doc block part of the public contract
const API_TAGS: &[&str] = &[
    "@property",
    "@property-read",
    "@property-write",
    "@method",
    "@deprecated",
    "@api",
    "@internal",
    "@throws",
];

/// Everything a class doc block contributes to its class
#[derive(Debug, Clone, Default)]
pub struct ClassDocblock {
    pub description: Option<String>,
    pub deprecated: Option<DeprecationInfo>,
    /// Visibility forced by `@api` / `@internal`
    pub visibility: Option<Visibility>,
    /// Virtual members in tag order
    pub members: Vec<DistilledNode>,
    /// Raw block, kept only when API-defining tags are present
    pub api_docblock: Option<String>,
    /// Malformed tags that were skipped
    pub diagnostics: Vec<DistilledError>,
}

/// Parse a class doc block
pub fn parse_class_docblock(text: &str) -> ClassDocblock {
    let mut doc = ClassDocblock::default();
    let mut description: Vec<String> = Vec::new();
    let mut seen_tag = false;
    let mut has_api_tags = false;

    for line in doc_lines(text) {
        if let Some((tag, content)) = split_tag(&line) {
            seen_tag = true;
            if API_TAGS.contains(&tag) || tag.starts_with("@psalm-") || tag.starts_with("@phpstan-")
            {
                has_api_tags = true;
            }
            apply_tag(&mut doc, tag, content);
        } else if !line.is_empty() && !seen_tag {
            description.push(line);
        }
    }

    if !description.is_empty() {
        doc.description = Some(description.join(" "));
    }
    if has_api_tags {
        doc.api_docblock = Some(text.to_string());
    }
    doc
}

fn apply_tag(doc: &mut ClassDocblock, tag: &str, content: &str) {
    match tag {
        "@property" | "@property-read" | "@property-write" => {
            match parse_property_tag(tag, content) {
                Some(field) => doc.members.push(DistilledNode::Field(field)),
                None => doc.diagnostics.push(DistilledError::warning(
                    format!("{} tag without a $name: '{}'", tag, content),
                    None,
                )),
            }
        }
        "@method" => match parse_method_tag(content) {
            Some(method) => doc.members.push(DistilledNode::Function(method)),
            None => doc.diagnostics.push(DistilledError::warning(
                format!("unparseable @method signature: '{}'", content),
                None,
            )),
        },
        "@deprecated" => doc.deprecated = Some(parse_deprecation(content)),
        "@api" => doc.visibility = Some(Visibility::Public),
        "@internal" => doc.visibility = Some(Visibility::Internal),
        _ => {}
    }
}

/// Parse `@property[-read|-write] [Type] $name [description]`
pub fn parse_property_tag(tag: &str, content: &str) -> Option<DistilledField> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    let name_index = parts.iter().position(|p| p.starts_with('$'))?;
    let name = parts[name_index].trim_start_matches('$');
    if name.is_empty() {
        return None;
    }

    let type_name = parts[..name_index].join(" ");
    let description = parts[name_index + 1..].join(" ");

    let (access, has_getter, has_setter) = match tag {
        "@property-read" => (FieldAccess::ReadOnly, true, false),
        "@property-write" => (FieldAccess::WriteOnly, false, true),
        _ => (FieldAccess::ReadWrite, true, true),
    };

    let mut field = DistilledField {
        name: name.to_string(),
        visibility: Visibility::Public,
        type_ref: (!type_name.is_empty()).then(|| TypeRef::new(normalize_collection_type(&type_name))),
        has_getter,
        has_setter,
        description: (!description.is_empty()).then_some(description),
        ..Default::default()
    };

    let ext = php_ext_mut(&mut field.extensions);
    ext.origin = MemberOrigin::Docblock;
    ext.access_mode = Some(access);
    ext.source_annotation = Some(format!("{} {}", tag, content).trim().to_string());

    Some(field)
}

/// Parse `@method [static] [ReturnType] name(params) [description]`
pub fn parse_method_tag(content: &str) -> Option<DistilledFunction> {
    let mut rest = content.trim();
    let mut is_static = false;
    if let Some(after) = rest.strip_prefix("static") {
        if after.starts_with(char::is_whitespace) {
            is_static = true;
            rest = after.trim_start();
        }
    }

    // The return type is optional and may contain spaces (`array<string, int>`)
    let (return_type, header) = match split_type_token(rest) {
        Some((token, after)) if !METHOD_HEADER.is_match(token) && !after.starts_with('(') => {
            (token, after)
        }
        _ => ("", rest),
    };

    let caps = METHOD_HEADER.captures(header)?;
    let name = caps.get(1)?.as_str();
    let params = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let description = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();

    let mut method = DistilledFunction {
        name: name.to_string(),
        visibility: Visibility::Public,
        returns: (!return_type.is_empty()).then(|| TypeRef::new(normalize_collection_type(return_type))),
        parameters: parse_method_params(params),
        description: (!description.is_empty()).then(|| description.to_string()),
        ..Default::default()
    };
    if is_static {
        method.modifiers.push(Modifier::Static);
    }

    let ext = php_ext_mut(&mut method.extensions);
    ext.origin = MemberOrigin::Docblock;
    ext.source_annotation = Some(format!("@method {}", content).trim().to_string());

    Some(method)
}

/// Best-effort split of `Type $name = default, ...$rest`
fn parse_method_params(params: &str) -> Vec<Parameter> {
    params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|param| {
            let (decl, default_value) = match param.split_once('=') {
                Some((decl, default)) => (decl.trim(), Some(default.trim().to_string())),
                None => (param, None),
            };

            let parts: Vec<&str> = decl.split_whitespace().collect();
            let (raw_name, type_name) = match parts.split_last() {
                Some((last, rest)) => (*last, rest.join(" ")),
                None => return None,
            };

            let is_variadic = raw_name.contains("...") || type_name.ends_with("...");
            let name = raw_name
                .trim_start_matches('&')
                .trim_start_matches("...")
                .trim_start_matches('$');
            let type_name = type_name.trim_end_matches("...").trim();

            Some(Parameter {
                name: name.to_string(),
                type_ref: (!type_name.is_empty()).then(|| TypeRef::new(normalize_collection_type(type_name))),
                default_value,
                is_variadic,
            })
        })
        .collect()
}
