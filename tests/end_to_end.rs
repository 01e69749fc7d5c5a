//! End-to-end distillation tests
//!
//! Source text goes through the PHP processor, the filter and the Swift
//! formatter exactly as the `distill` binary runs them.

use distill_ast::ir::{php_ext, php_ext_mut};
use distill_ast::{
    DistilledClass, DistilledEnum, DistilledField, DistilledFile, DistilledNode, LanguageId,
    Modifier, PhpProcessor, TypeRef, Visibility,
};
use distill_ast::LanguageProcessor;
use distiller::{DistillConfig, Distiller, FilterOptions, LanguageFormatter, OutputFormat, SwiftFormatter};

fn process(source: &str) -> DistilledFile {
    let mut processor = PhpProcessor::new().unwrap();
    processor.process(source.as_bytes(), "test.php").unwrap()
}

fn class_named<'a>(file: &'a DistilledFile, name: &str) -> &'a DistilledClass {
    file.children
        .iter()
        .find_map(|n| match n {
            DistilledNode::Class(c) if c.name == name => Some(c),
            _ => None,
        })
        .unwrap_or_else(|| panic!("class {} not found", name))
}

fn member<'a>(class: &'a DistilledClass, name: &str) -> &'a DistilledNode {
    class
        .children
        .iter()
        .find(|n| n.name() == Some(name))
        .unwrap_or_else(|| panic!("member {} not found", name))
}

const ACCOUNT: &str = r#"<?php
namespace App;

/**
 * Customer account.
 *
 * @deprecated 1.2 use Y instead
 */
class Account
{
    private int $balance = 0;

    /**
     * @param string $x the label
     */
    public function label($x): string
    {
        return $x;
    }
}
"#;

// ============================================================================
// Documented class scenario
// ============================================================================

#[test]
fn test_account_ir() {
    let file = process(ACCOUNT);
    assert!(!file.has_errors());

    let account = class_named(&file, "Account");
    assert_eq!(account.visibility, Visibility::Public);

    let deprecated = account.deprecated.as_ref().unwrap();
    assert_eq!(deprecated.version.as_deref(), Some("1.2"));
    assert_eq!(deprecated.description.as_deref(), Some("use Y instead"));

    let DistilledNode::Field(balance) = member(account, "balance") else {
        panic!("balance should be a field");
    };
    assert_eq!(balance.visibility, Visibility::Private);

    let DistilledNode::Function(label) = member(account, "label") else {
        panic!("label should be a function");
    };
    assert_eq!(label.parameters[0].type_ref, Some(TypeRef::new("string")));
}

#[test]
fn test_account_rendering_hides_private_field() {
    let out = Distiller::default().distill(ACCOUNT.as_bytes(), "Account.php").unwrap();

    assert!(out.contains("@available(*, deprecated, message: \"since 1.2: use Y instead\")"));
    assert!(out.contains("public class Account {"));
    assert!(out.contains("    public func label(x: string) -> string\n"));
    assert!(!out.contains("balance"));
}

#[test]
fn test_account_rendering_with_private() {
    let config = DistillConfig {
        filter: FilterOptions {
            include_private: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let out = Distiller::new(config).distill(ACCOUNT.as_bytes(), "Account.php").unwrap();
    assert!(out.contains("    private var balance: int = 0\n"));
    assert!(out.contains("func label"));
}

// ============================================================================
// Enum scenario
// ============================================================================

fn enum_case(name: &str, value: Option<&str>, payload: Option<&str>) -> DistilledNode {
    let mut field = DistilledField {
        name: name.to_string(),
        modifiers: vec![Modifier::Static, Modifier::Final],
        default_value: value.map(str::to_string),
        type_ref: payload.map(TypeRef::new),
        ..Default::default()
    };
    php_ext_mut(&mut field.extensions).is_enum_case = true;
    DistilledNode::Field(field)
}

#[test]
fn test_enum_cases_render_value_and_payload() {
    let e = DistilledNode::Enum(DistilledEnum {
        name: "Shape".to_string(),
        children: vec![enum_case("A", Some("1"), None), enum_case("B", None, Some("Payload"))],
        ..Default::default()
    });

    let out = SwiftFormatter::new().format(&e, 0);
    assert!(out.contains("    case A = 1\n"));
    assert!(out.contains("    case B(Payload)\n"));

    for case in e.children() {
        let DistilledNode::Field(field) = case else {
            panic!("cases are fields");
        };
        assert!(field.modifiers.contains(&Modifier::Static));
        assert!(field.modifiers.contains(&Modifier::Final));
    }
}

#[test]
fn test_php_backed_enum_end_to_end() {
    let source = "<?php\nenum Level: int {\n    case Low = 1;\n    case High = 2;\n}\n";
    let file = process(source);
    let level = class_named(&file, "Level");
    assert!(php_ext(&level.extensions).unwrap().is_enum);

    let out = Distiller::default().distill(source.as_bytes(), "Level.php").unwrap();
    assert!(out.contains("public enum Level: int {"));
    assert!(out.contains("    case Low = 1\n"));
    assert!(out.contains("    case High = 2\n"));
}

// ============================================================================
// Imports, promotion and type reconciliation
// ============================================================================

#[test]
fn test_grouped_imports_render_as_dotted_paths() {
    let source = "<?php\nuse App\\Models\\{User, Post as Article};\n";
    let out = Distiller::default().distill(source.as_bytes(), "imports.php").unwrap();
    assert!(out.contains("import App.Models.User\n"));
    assert!(out.contains("import App.Models.Post\n"));
}

#[test]
fn test_promoted_constructor_parameters() {
    let source = r#"<?php
class Point {
    public function __construct(public int $x, private int $y = 0) {}
}
"#;
    let file = process(source);
    let point = class_named(&file, "Point");

    let DistilledNode::Field(x) = member(point, "x") else {
        panic!("x should be promoted");
    };
    assert_eq!(x.type_ref, Some(TypeRef::new("int")));
    assert_eq!(x.visibility, Visibility::Public);

    let DistilledNode::Field(y) = member(point, "y") else {
        panic!("y should be promoted");
    };
    assert_eq!(y.visibility, Visibility::Private);

    let DistilledNode::Function(ctor) = member(point, "__construct") else {
        panic!("constructor missing");
    };
    assert_eq!(ctor.parameters.len(), 2);

    let out = Distiller::default().distill(source.as_bytes(), "Point.php").unwrap();
    assert!(out.contains("public var x: int\n"));
    assert!(out.contains("public init(x: int, y: int = 0)\n"));
    assert!(!out.contains("var y"));
}

#[test]
fn test_weak_types_are_overridden_specific_types_kept() {
    let source = r#"<?php
class Store {
    /**
     * @param Order[] $items
     * @param string $key
     * @return Collection<int, Order>
     */
    public function put(array $items, Uuid $key): mixed {}
}
"#;
    let file = process(source);
    let DistilledNode::Function(put) = member(class_named(&file, "Store"), "put") else {
        panic!("put missing");
    };
    assert_eq!(put.parameters[0].type_ref, Some(TypeRef::new("Order[]")));
    assert_eq!(put.parameters[1].type_ref, Some(TypeRef::new("Uuid")));
    assert_eq!(put.returns, Some(TypeRef::new("Collection<int, Order>")));
}

// ============================================================================
// Output properties
// ============================================================================

#[test]
fn test_rendering_is_idempotent() {
    let distiller = Distiller::default();
    let first = distiller.distill(ACCOUNT.as_bytes(), "Account.php").unwrap();
    let second = distiller.distill(ACCOUNT.as_bytes(), "Account.php").unwrap();
    assert_eq!(first, second);

    let file = distiller.distill_file(ACCOUNT.as_bytes(), "Account.php").unwrap();
    let formatter = SwiftFormatter::new();
    assert_eq!(formatter.format_file(&file), formatter.format_file(&file));
}

#[test]
fn test_json_output_is_filtered_ir() {
    let config = DistillConfig {
        filter: FilterOptions {
            format: OutputFormat::Json,
            ..Default::default()
        },
        ..Default::default()
    };
    let out = Distiller::new(config).distill(ACCOUNT.as_bytes(), "Account.php").unwrap();
    let file: DistilledFile = serde_json::from_str(&out).unwrap();

    assert_eq!(file.language, LanguageId::Php);
    let account = class_named(&file, "Account");
    assert!(account.children.iter().all(|n| n.name() != Some("balance")));
}

#[test]
fn test_broken_source_still_distills() {
    let source = "<?php\nclass Ok { public function a() {} }\nclass Broken { public function (\n";
    let file = process(source);
    assert!(file.has_errors());
    assert!(class_named(&file, "Ok").children.iter().any(|n| n.name() == Some("a")));

    let out = Distiller::default().distill(source.as_bytes(), "broken.php").unwrap();
    assert!(out.contains("class Ok"));
}
