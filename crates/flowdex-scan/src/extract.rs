//! Signature extraction from Python module source.
//!
//! Modules are parsed with tree-sitter, never executed. Top-level `def` and
//! `async def` statements (including decorated ones) are the locally-owned
//! callables of a module; names that arrive via `import` are not definitions
//! and so are never attributed here — re-exports stay with their defining
//! module. A top-level `alias = local_function` assignment exposes the alias
//! under this module, matching the attribution a runtime member walk would
//! produce.
//!
//! Annotations and defaults are captured tri-state: absent stays absent,
//! present values become structural descriptors. Values with no structural
//! form are carried as opaque source text rather than dropped.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;
use tree_sitter::{Node, Parser};

use flowdex_core::{
    Function, ModulePath, ParamKind, Parameter, Provided, ScanError, Signature, ValueRepr,
};

/// Base classes that make a module-local class an enumerated type.
const ENUM_BASES: [&str; 5] = ["Enum", "IntEnum", "StrEnum", "Flag", "IntFlag"];

/// A class defined at the top level of the module being extracted, usable
/// as a structural annotation descriptor.
enum LocalType {
    /// Enumerated type: ordered member name → member value pairs.
    Enum(Vec<(String, ValueRepr)>),
    /// Plain class: ordered public class-level attributes.
    Class(Vec<(String, ValueRepr)>),
}

/// Extract every locally-owned function of one module.
///
/// Any failure to read or parse the module converts to a single
/// `ModuleLoadFailure` tagged with the module's path; callers continue with
/// sibling modules.
pub fn extract_module(module: &ModulePath, file: &Path) -> Result<Vec<Function>, ScanError> {
    let source = std::fs::read(file)
        .map_err(|err| ScanError::module_load_failure(module.as_str(), err.to_string()))?;

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|err| ScanError::module_load_failure(module.as_str(), err.to_string()))?;

    let tree = parser.parse(&source, None).ok_or_else(|| {
        ScanError::module_load_failure(module.as_str(), "parser produced no syntax tree")
    })?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ScanError::module_load_failure(
            module.as_str(),
            "module source contains syntax errors",
        ));
    }

    let types = collect_local_types(root, &source);

    let mut functions: Vec<Function> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        let definition = match statement.kind() {
            "function_definition" => Some(statement),
            "decorated_definition" => statement
                .child_by_field_name("definition")
                .filter(|inner| inner.kind() == "function_definition"),
            _ => None,
        };

        if let Some(definition) = definition {
            if let Some(function) = extract_function(definition, &source, module, &types) {
                upsert(&mut functions, &mut index_by_name, function);
            }
            continue;
        }

        // `alias = local_function`: the alias is owned by this module because
        // its target is. An alias of an imported name has no local target and
        // is ignored.
        if statement.kind() == "expression_statement" {
            if let Some((alias, target)) = simple_alias(statement, &source) {
                if let Some(&index) = index_by_name.get(&target) {
                    let aliased =
                        Function::new(module.clone(), alias, functions[index].signature.clone());
                    upsert(&mut functions, &mut index_by_name, aliased);
                }
            }
        }
    }

    Ok(functions)
}

/// Insert or replace by name; a redefined name is an anomaly, not an error.
fn upsert(
    functions: &mut Vec<Function>,
    index_by_name: &mut HashMap<String, usize>,
    function: Function,
) {
    match index_by_name.get(&function.name) {
        Some(&index) => {
            warn!(
                module = %function.module,
                name = %function.name,
                "name redefined; later definition wins"
            );
            functions[index] = function;
        }
        None => {
            index_by_name.insert(function.name.clone(), functions.len());
            functions.push(function);
        }
    }
}

/// Detect a top-level `alias = target` between two bare identifiers.
fn simple_alias(statement: Node, source: &[u8]) -> Option<(String, String)> {
    let assignment = statement.named_child(0)?;
    if assignment.kind() != "assignment" {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    let right = assignment.child_by_field_name("right")?;
    (left.kind() == "identifier" && right.kind() == "identifier")
        .then(|| (node_text(left, source), node_text(right, source)))
}

/// Build one function value from a `function_definition` node.
fn extract_function(
    node: Node,
    source: &[u8],
    module: &ModulePath,
    types: &HashMap<String, LocalType>,
) -> Option<Function> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let params_node = node.child_by_field_name("parameters")?;

    let mut parameters: Vec<Parameter> = Vec::new();
    let mut keyword_only = false;
    let mut cursor = params_node.walk();
    for param in params_node.named_children(&mut cursor) {
        match param.kind() {
            "positional_separator" => {
                // Everything before `/` may only be passed positionally.
                for parameter in &mut parameters {
                    if parameter.kind == ParamKind::PositionalOrKeyword {
                        parameter.kind = ParamKind::PositionalOnly;
                    }
                }
            }
            "keyword_separator" => keyword_only = true,
            _ => {
                if let Some(parameter) =
                    extract_parameter(param, source, types, &mut keyword_only)
                {
                    parameters.push(parameter);
                }
            }
        }
    }

    let return_annotation = match node.child_by_field_name("return_type") {
        Some(annotation) => Provided::Present(annotation_repr(annotation, source, types)),
        None => Provided::Absent,
    };

    Some(Function::new(
        module.clone(),
        name,
        Signature::new(parameters, return_annotation),
    ))
}

/// Build one parameter from a node inside a `parameters` list.
fn extract_parameter(
    node: Node,
    source: &[u8],
    types: &HashMap<String, LocalType>,
    keyword_only: &mut bool,
) -> Option<Parameter> {
    match node.kind() {
        "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            let (name, kind) = pattern_name_kind(node, source, keyword_only)?;
            Some(Parameter::new(name, kind))
        }
        "typed_parameter" => {
            let pattern = node.named_child(0)?;
            let (name, kind) = pattern_name_kind(pattern, source, keyword_only)?;
            let mut parameter = Parameter::new(name, kind);
            if let Some(annotation) = node.child_by_field_name("type") {
                parameter =
                    parameter.with_annotation(annotation_repr(annotation, source, types));
            }
            Some(parameter)
        }
        "default_parameter" => {
            let pattern = node.child_by_field_name("name")?;
            let (name, kind) = pattern_name_kind(pattern, source, keyword_only)?;
            let mut parameter = Parameter::new(name, kind);
            if let Some(value) = node.child_by_field_name("value") {
                parameter = parameter.with_default(default_repr(value, source, types));
            }
            Some(parameter)
        }
        "typed_default_parameter" => {
            let pattern = node.child_by_field_name("name")?;
            let (name, kind) = pattern_name_kind(pattern, source, keyword_only)?;
            let mut parameter = Parameter::new(name, kind);
            if let Some(annotation) = node.child_by_field_name("type") {
                parameter =
                    parameter.with_annotation(annotation_repr(annotation, source, types));
            }
            if let Some(value) = node.child_by_field_name("value") {
                parameter = parameter.with_default(default_repr(value, source, types));
            }
            Some(parameter)
        }
        // Legacy tuple parameters have no canonical representation.
        _ => None,
    }
}

/// Name and kind of a parameter pattern, tracking the keyword-only region.
fn pattern_name_kind(
    pattern: Node,
    source: &[u8],
    keyword_only: &mut bool,
) -> Option<(String, ParamKind)> {
    match pattern.kind() {
        "identifier" => {
            let kind = if *keyword_only {
                ParamKind::KeywordOnly
            } else {
                ParamKind::PositionalOrKeyword
            };
            Some((node_text(pattern, source), kind))
        }
        "list_splat_pattern" => {
            // `*args` opens the keyword-only region for what follows.
            *keyword_only = true;
            let name = pattern
                .named_child(0)
                .map(|inner| node_text(inner, source))
                .unwrap_or_default();
            Some((name, ParamKind::VarPositional))
        }
        "dictionary_splat_pattern" => {
            let name = pattern
                .named_child(0)
                .map(|inner| node_text(inner, source))
                .unwrap_or_default();
            Some((name, ParamKind::VarKeyword))
        }
        _ => None,
    }
}

// ── Value descriptors ─────────────────────────────────────────────────────

/// Descriptor for an annotation expression.
fn annotation_repr(
    node: Node,
    source: &[u8],
    types: &HashMap<String, LocalType>,
) -> ValueRepr {
    let expr = if node.kind() == "type" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    };
    match expr.kind() {
        "string" | "concatenated_string" => ValueRepr::Str(string_content(expr, source)),
        "none" => ValueRepr::Null,
        "identifier" | "attribute" => named_repr(&node_text(expr, source), types),
        _ => ValueRepr::Opaque(node_text(expr, source)),
    }
}

/// Descriptor for a named reference (annotation or bare default).
fn named_repr(text: &str, types: &HashMap<String, LocalType>) -> ValueRepr {
    if let Some(label) = temporal_label(text) {
        return ValueRepr::Temporal(label);
    }
    match types.get(text) {
        Some(LocalType::Enum(members)) => ValueRepr::Enum(members.clone()),
        Some(LocalType::Class(attrs)) if !attrs.is_empty() => ValueRepr::Map(attrs.clone()),
        _ => ValueRepr::Opaque(text.to_string()),
    }
}

/// Descriptor for a default-value expression.
fn default_repr(node: Node, source: &[u8], types: &HashMap<String, LocalType>) -> ValueRepr {
    match node.kind() {
        "integer" => {
            let text = node_text(node, source);
            parse_int(&text)
                .map(ValueRepr::Int)
                .unwrap_or(ValueRepr::Opaque(text))
        }
        "float" => {
            let text = node_text(node, source);
            text.parse::<f64>()
                .map(ValueRepr::Float)
                .unwrap_or(ValueRepr::Opaque(text))
        }
        "string" | "concatenated_string" => ValueRepr::Str(string_content(node, source)),
        "true" => ValueRepr::Bool(true),
        "false" => ValueRepr::Bool(false),
        "none" => ValueRepr::Null,
        "unary_operator" => {
            let text = node_text(node, source);
            if text.starts_with('-') {
                if let Some(argument) = node.child_by_field_name("argument") {
                    match default_repr(argument, source, types) {
                        ValueRepr::Int(value) => return ValueRepr::Int(-value),
                        ValueRepr::Float(value) => return ValueRepr::Float(-value),
                        _ => {}
                    }
                }
            }
            ValueRepr::Opaque(text)
        }
        "list" | "tuple" | "set" => {
            let mut cursor = node.walk();
            ValueRepr::List(
                node.named_children(&mut cursor)
                    .map(|item| default_repr(item, source, types))
                    .collect(),
            )
        }
        "dictionary" => {
            let mut entries = Vec::new();
            let mut cursor = node.walk();
            for pair in node.named_children(&mut cursor) {
                if pair.kind() != "pair" {
                    // Splatted dict contents are not statically known.
                    return ValueRepr::Opaque(node_text(node, source));
                }
                let (Some(key), Some(value)) = (
                    pair.child_by_field_name("key"),
                    pair.child_by_field_name("value"),
                ) else {
                    continue;
                };
                let key_text = if key.kind() == "string" {
                    string_content(key, source)
                } else {
                    node_text(key, source)
                };
                entries.push((key_text, default_repr(value, source, types)));
            }
            ValueRepr::Map(entries)
        }
        "call" => node
            .child_by_field_name("function")
            .and_then(|function| temporal_label(&node_text(function, source)))
            .map(ValueRepr::Temporal)
            .unwrap_or_else(|| ValueRepr::Opaque(node_text(node, source))),
        "attribute" => {
            let text = node_text(node, source);
            if let Some(label) = temporal_label(&text) {
                return ValueRepr::Temporal(label);
            }
            // A module-local enum member: dump its public attributes.
            if let Some((base, member)) = text.split_once('.') {
                if let Some(LocalType::Enum(members)) = types.get(base) {
                    if let Some((_, value)) = members.iter().find(|(name, _)| name == member) {
                        return ValueRepr::Map(vec![
                            ("name".to_string(), ValueRepr::Str(member.to_string())),
                            ("value".to_string(), value.clone()),
                        ]);
                    }
                }
            }
            ValueRepr::Opaque(text)
        }
        "identifier" => named_repr(&node_text(node, source), types),
        _ => ValueRepr::Opaque(node_text(node, source)),
    }
}

/// Fixed descriptive label for date/time-like names; exact instants are not
/// meaningful to the consumer.
fn temporal_label(name: &str) -> Option<String> {
    const KNOWN: [(&str, &str); 6] = [
        ("datetime.datetime", "datetime.datetime"),
        ("datetime.date", "datetime.date"),
        ("datetime.time", "datetime.time"),
        ("datetime", "datetime.datetime"),
        ("date", "datetime.date"),
        ("time", "datetime.time"),
    ];
    for (pattern, label) in KNOWN {
        let dotted_prefix = name
            .strip_prefix(pattern)
            .map(|rest| rest.starts_with('.'))
            .unwrap_or(false);
        if name == pattern || dotted_prefix {
            return Some(label.to_string());
        }
    }
    None
}

/// Parse an integer literal, including hex/octal/binary and `_` separators.
fn parse_int(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|ch| *ch != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}

/// Content of a string literal, quotes and prefixes stripped.
fn string_content(node: Node, source: &[u8]) -> String {
    let mut content = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_content" | "escape_sequence" => {
                content.push_str(&node_text(child, source));
            }
            "string" => content.push_str(&string_content(child, source)),
            _ => {}
        }
    }
    content
}

// ── Module-local type registry ────────────────────────────────────────────

/// Collect top-level class definitions usable as annotation descriptors.
fn collect_local_types(root: Node, source: &[u8]) -> HashMap<String, LocalType> {
    let mut types = HashMap::new();
    // Registry for literal parsing while the registry itself is being built.
    let empty = HashMap::new();

    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        let class_node = match statement.kind() {
            "class_definition" => Some(statement),
            "decorated_definition" => statement
                .child_by_field_name("definition")
                .filter(|inner| inner.kind() == "class_definition"),
            _ => None,
        };
        let Some(class_node) = class_node else {
            continue;
        };
        let Some(name_node) = class_node.child_by_field_name("name") else {
            continue;
        };

        let name = node_text(name_node, source);
        let is_enum = class_node
            .child_by_field_name("superclasses")
            .map(|bases| has_enum_base(bases, source))
            .unwrap_or(false);
        let members = class_attributes(class_node, source, &empty);

        let local_type = if is_enum {
            LocalType::Enum(members)
        } else {
            LocalType::Class(members)
        };
        types.insert(name, local_type);
    }
    types
}

/// True if any base class names an enum type.
fn has_enum_base(bases: Node, source: &[u8]) -> bool {
    let mut cursor = bases.walk();
    let result = bases.named_children(&mut cursor).any(|base| {
        let text = node_text(base, source);
        let tail = text.rsplit('.').next().unwrap_or(&text);
        ENUM_BASES.contains(&tail)
    });
    result
}

/// Ordered public class-level attribute assignments.
fn class_attributes(
    class_node: Node,
    source: &[u8],
    types: &HashMap<String, LocalType>,
) -> Vec<(String, ValueRepr)> {
    let mut attributes = Vec::new();
    let Some(body) = class_node.child_by_field_name("body") else {
        return attributes;
    };

    let mut cursor = body.walk();
    for statement in body.named_children(&mut cursor) {
        if statement.kind() != "expression_statement" {
            continue;
        }
        let Some(assignment) = statement
            .named_child(0)
            .filter(|inner| inner.kind() == "assignment")
        else {
            continue;
        };
        let Some(left) = assignment
            .child_by_field_name("left")
            .filter(|inner| inner.kind() == "identifier")
        else {
            continue;
        };
        let name = node_text(left, source);
        if name.starts_with('_') {
            continue;
        }
        let Some(right) = assignment.child_by_field_name("right") else {
            continue;
        };
        attributes.push((name, default_repr(right, source, types)));
    }
    attributes
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn extract(source: &str) -> Vec<Function> {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(&file, source).unwrap();
        extract_module(&ModulePath::new("pkg.mod"), &file).unwrap()
    }

    fn extract_err(source: &str) -> ScanError {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(&file, source).unwrap();
        extract_module(&ModulePath::new("pkg.mod"), &file).unwrap_err()
    }

    #[test]
    fn extracts_top_level_functions_only() {
        let functions = extract(
            r#"
def outer():
    def inner():
        pass
    return inner

class Widget:
    def method(self):
        pass

async def later():
    pass
"#,
        );
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["outer", "later"]);
        assert_eq!(functions[0].module, ModulePath::new("pkg.mod"));
    }

    #[test]
    fn imported_names_are_not_attributed_here() {
        let functions = extract(
            r#"
from helpers import shared
import os

def local_fn(x):
    return shared(x)
"#,
        );
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["local_fn"]);
    }

    #[test]
    fn parameter_kinds_cover_the_full_convention() {
        let functions = extract("def f(a, /, b, *args, c, d=1, **kwargs):\n    pass\n");
        let signature = &functions[0].signature;
        let kinds: Vec<(String, ParamKind)> = signature
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("a".to_string(), ParamKind::PositionalOnly),
                ("b".to_string(), ParamKind::PositionalOrKeyword),
                ("args".to_string(), ParamKind::VarPositional),
                ("c".to_string(), ParamKind::KeywordOnly),
                ("d".to_string(), ParamKind::KeywordOnly),
                ("kwargs".to_string(), ParamKind::VarKeyword),
            ]
        );
    }

    #[test]
    fn keyword_separator_without_varargs() {
        let functions = extract("def f(a, *, b):\n    pass\n");
        let signature = &functions[0].signature;
        assert_eq!(signature.parameters[0].kind, ParamKind::PositionalOrKeyword);
        assert_eq!(signature.parameters[1].kind, ParamKind::KeywordOnly);
    }

    #[test]
    fn absent_and_present_fields_stay_distinct() {
        let functions = extract("def f(bare, annotated: int, empty: ''):\n    pass\n");
        let signature = &functions[0].signature;
        assert!(signature.parameter("bare").unwrap().annotation.is_absent());
        assert_eq!(
            signature.parameter("annotated").unwrap().annotation,
            Provided::Present(ValueRepr::Opaque("int".to_string()))
        );
        // An empty-string descriptor is present, not absent.
        assert_eq!(
            signature.parameter("empty").unwrap().annotation,
            Provided::Present(ValueRepr::Str(String::new()))
        );
        assert!(signature.return_annotation.is_absent());
    }

    #[test]
    fn literal_defaults_become_structured_values() {
        let functions = extract(
            "def f(a=1, b=-3, c=0xff, d=1_000, e=2.5, f='s', g=True, h=None, i=[1, 2], j=(3,), k={'x': 1}):\n    pass\n",
        );
        let signature = &functions[0].signature;
        let default = |name: &str| {
            signature
                .parameter(name)
                .unwrap()
                .default
                .as_present()
                .unwrap()
                .clone()
        };
        assert_eq!(default("a"), ValueRepr::Int(1));
        assert_eq!(default("b"), ValueRepr::Int(-3));
        assert_eq!(default("c"), ValueRepr::Int(255));
        assert_eq!(default("d"), ValueRepr::Int(1000));
        assert_eq!(default("e"), ValueRepr::Float(2.5));
        assert_eq!(default("f"), ValueRepr::Str("s".to_string()));
        assert_eq!(default("g"), ValueRepr::Bool(true));
        assert_eq!(default("h"), ValueRepr::Null);
        assert_eq!(
            default("i"),
            ValueRepr::List(vec![ValueRepr::Int(1), ValueRepr::Int(2)])
        );
        assert_eq!(default("j"), ValueRepr::List(vec![ValueRepr::Int(3)]));
        assert_eq!(
            default("k"),
            ValueRepr::Map(vec![("x".to_string(), ValueRepr::Int(1))])
        );
    }

    #[test]
    fn falsy_defaults_are_present() {
        let functions = extract("def f(a=0, b='', c=False, d=None):\n    pass\n");
        for parameter in &functions[0].signature.parameters {
            assert!(
                parameter.default.is_present(),
                "{} lost its falsy default",
                parameter.name
            );
        }
    }

    #[test]
    fn local_enum_annotations_become_ordered_mappings() {
        let functions = extract(
            r#"
from enum import Enum

class Color(Enum):
    RED = 1
    GREEN = 2
    BLUE = 3

def paint(color: Color, fallback=Color.RED):
    pass
"#,
        );
        let signature = &functions[0].signature;
        assert_eq!(
            signature.parameter("color").unwrap().annotation,
            Provided::Present(ValueRepr::Enum(vec![
                ("RED".to_string(), ValueRepr::Int(1)),
                ("GREEN".to_string(), ValueRepr::Int(2)),
                ("BLUE".to_string(), ValueRepr::Int(3)),
            ]))
        );
        // A member default dumps its public attributes.
        assert_eq!(
            signature.parameter("fallback").unwrap().default,
            Provided::Present(ValueRepr::Map(vec![
                ("name".to_string(), ValueRepr::Str("RED".to_string())),
                ("value".to_string(), ValueRepr::Int(1)),
            ]))
        );
    }

    #[test]
    fn local_class_annotations_dump_public_attributes() {
        let functions = extract(
            r#"
class Defaults:
    host = "localhost"
    port = 8080
    _secret = "hidden"

class Empty:
    pass

def connect(options: Defaults, other: Empty):
    pass
"#,
        );
        let signature = &functions[0].signature;
        assert_eq!(
            signature.parameter("options").unwrap().annotation,
            Provided::Present(ValueRepr::Map(vec![
                ("host".to_string(), ValueRepr::Str("localhost".to_string())),
                ("port".to_string(), ValueRepr::Int(8080)),
            ]))
        );
        // No public attributes: fall back to the class name.
        assert_eq!(
            signature.parameter("other").unwrap().annotation,
            Provided::Present(ValueRepr::Opaque("Empty".to_string()))
        );
    }

    #[test]
    fn temporal_values_reduce_to_labels() {
        let functions = extract(
            "def f(when: datetime.date = date.today(), at: datetime.datetime = datetime.now()):\n    pass\n",
        );
        let signature = &functions[0].signature;
        let when = signature.parameter("when").unwrap();
        assert_eq!(
            when.annotation,
            Provided::Present(ValueRepr::Temporal("datetime.date".to_string()))
        );
        assert_eq!(
            when.default,
            Provided::Present(ValueRepr::Temporal("datetime.date".to_string()))
        );
        let at = signature.parameter("at").unwrap();
        assert_eq!(
            at.default,
            Provided::Present(ValueRepr::Temporal("datetime.datetime".to_string()))
        );
    }

    #[test]
    fn return_annotations_are_captured() {
        let functions = extract("def f() -> str:\n    return ''\n");
        assert_eq!(
            functions[0].signature.return_annotation,
            Provided::Present(ValueRepr::Opaque("str".to_string()))
        );
    }

    #[test]
    fn string_annotations_keep_their_content() {
        let functions = extract("def f(x: 'Widget') -> 'Widget':\n    return x\n");
        let signature = &functions[0].signature;
        assert_eq!(
            signature.parameter("x").unwrap().annotation,
            Provided::Present(ValueRepr::Str("Widget".to_string()))
        );
    }

    #[test]
    fn local_alias_is_exposed_with_the_same_signature() {
        let functions = extract(
            r#"
from os import getcwd

def original(x, y=2):
    return x + y

alias = original
borrowed = getcwd
"#,
        );
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["original", "alias"]);
        assert_eq!(functions[0].signature, functions[1].signature);
    }

    #[test]
    fn redefined_name_keeps_the_later_definition() {
        let functions = extract(
            r#"
def twice(a):
    pass

def twice(a, b):
    pass
"#,
        );
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].signature.parameters.len(), 2);
    }

    #[test]
    fn decorated_functions_are_extracted() {
        let functions = extract(
            r#"
@staticmethod
def decorated(x: int) -> int:
    return x
"#,
        );
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "decorated");
    }

    #[test]
    fn syntax_errors_convert_to_module_load_failure() {
        let error = extract_err("def broken(:\n");
        assert_eq!(error.subject, "pkg.mod");
        assert_eq!(error.kind, flowdex_core::ScanErrorKind::ModuleLoadFailure);
    }

    #[test]
    fn unreadable_file_converts_to_module_load_failure() {
        let missing = Path::new("/nonexistent/never/mod.py");
        let error = extract_module(&ModulePath::new("pkg.mod"), missing).unwrap_err();
        assert_eq!(error.kind, flowdex_core::ScanErrorKind::ModuleLoadFailure);
        assert_eq!(error.subject, "pkg.mod");
    }

    #[test]
    fn empty_module_yields_no_functions() {
        assert!(extract("").is_empty());
        assert!(extract("X = 1\n").is_empty());
    }
}
