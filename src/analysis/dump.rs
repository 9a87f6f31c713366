//! Stable textual serialization of syntax subtrees.
//!
//! A dump looks like
//!
//! ```text
//! return_statement(children=[identifier("x", lineno=2, col_offset=11, end_lineno=2, end_col_offset=12)], lineno=2, col_offset=4, end_lineno=2, end_col_offset=12)
//! ```
//!
//! Field order comes from [`SCHEMA`], never from iteration order, so the
//! output for a given input is byte-identical across runs and platforms.
//! Bump [`DUMP_FORMAT_VERSION`] whenever the rendering or the table changes.

use std::fmt::Write;

use tree_sitter::Node;

/// Version of the dump format.
pub const DUMP_FORMAT_VERSION: u32 = 2;

/// A field slot in a node schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Rendered as a list even when it holds zero or one node.
    pub repeated: bool,
}

const fn one(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        repeated: false,
    }
}

const fn many(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        repeated: true,
    }
}

/// Canonical field order per node kind of the Python grammar.
///
/// Kinds listed here always render every slot (`None` / `[]` when absent).
/// Kinds not listed render the fields they carry in order of appearance.
pub static SCHEMA: &[(&str, &[FieldSpec])] = &[
    (
        "function_definition",
        &[
            one("name"),
            one("type_parameters"),
            one("parameters"),
            one("return_type"),
            one("body"),
        ],
    ),
    (
        "class_definition",
        &[
            one("name"),
            one("type_parameters"),
            one("superclasses"),
            one("body"),
        ],
    ),
    ("decorated_definition", &[one("definition")]),
    ("default_parameter", &[one("name"), one("value")]),
    ("typed_parameter", &[one("type")]),
    (
        "typed_default_parameter",
        &[one("name"), one("type"), one("value")],
    ),
    ("lambda", &[one("parameters"), one("body")]),
    (
        "if_statement",
        &[one("condition"), one("consequence"), many("alternative")],
    ),
    ("elif_clause", &[one("condition"), one("consequence")]),
    ("else_clause", &[one("body")]),
    (
        "for_statement",
        &[one("left"), one("right"), one("body"), one("alternative")],
    ),
    (
        "while_statement",
        &[one("condition"), one("body"), one("alternative")],
    ),
    ("try_statement", &[one("body")]),
    ("with_statement", &[one("body")]),
    ("assignment", &[one("left"), one("type"), one("right")]),
    (
        "augmented_assignment",
        &[one("left"), one("operator"), one("right")],
    ),
    (
        "binary_operator",
        &[one("left"), one("operator"), one("right")],
    ),
    (
        "boolean_operator",
        &[one("left"), one("operator"), one("right")],
    ),
    ("comparison_operator", &[many("operators")]),
    ("unary_operator", &[one("operator"), one("argument")]),
    ("not_operator", &[one("argument")]),
    ("named_expression", &[one("name"), one("value")]),
    ("call", &[one("function"), one("arguments")]),
    ("attribute", &[one("object"), one("attribute")]),
    ("subscript", &[one("value"), many("subscript")]),
    ("keyword_argument", &[one("name"), one("value")]),
    ("pair", &[one("key"), one("value")]),
    ("import_statement", &[many("name")]),
    ("import_from_statement", &[one("module_name"), many("name")]),
];

/// Unfielded keywords that change what a node means, rendered as boolean
/// flags after the fields (`async=True`).
pub static MODIFIERS: &[(&str, &[&str])] = &[
    ("function_definition", &["async"]),
    ("for_statement", &["async"]),
    ("with_statement", &["async"]),
    ("for_in_clause", &["async"]),
    ("yield", &["from"]),
];

/// Modifier keywords tracked for a node kind.
pub fn modifiers_for(kind: &str) -> &'static [&'static str] {
    MODIFIERS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

/// Look up the schema for a node kind.
pub fn schema_for(kind: &str) -> Option<&'static [FieldSpec]> {
    SCHEMA
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, fields)| *fields)
}

/// Serialize `node` and its subtree.
pub fn dump_node(node: Node, source: &[u8]) -> String {
    let mut out = String::new();
    write_node(&mut out, node, source);
    out
}

/// Named children split into field slots and unfielded children.
struct Slots<'tree> {
    fields: Vec<(&'static str, Vec<Node<'tree>>)>,
    children: Vec<Node<'tree>>,
    /// Unfielded anonymous tokens, by kind.
    keywords: Vec<&'static str>,
}

fn collect_slots<'tree>(node: Node<'tree>) -> Slots<'tree> {
    let mut slots = Slots {
        fields: Vec::new(),
        children: Vec::new(),
        keywords: Vec::new(),
    };

    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return slots;
    }
    loop {
        let child = cursor.node();
        if !child.is_extra() {
            match cursor.field_name() {
                Some(field) => match slots.fields.iter_mut().find(|(name, _)| *name == field) {
                    Some((_, nodes)) => nodes.push(child),
                    None => slots.fields.push((field, vec![child])),
                },
                None if child.is_named() => slots.children.push(child),
                None => slots.keywords.push(child.kind()),
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    slots
}

fn write_node(out: &mut String, node: Node, source: &[u8]) {
    if !node.is_named() {
        write_text(out, node, source);
        return;
    }

    let slots = collect_slots(node);
    out.push_str(node.kind());
    out.push('(');

    let modifiers = modifiers_for(node.kind());
    if slots.fields.is_empty() && slots.children.is_empty() && modifiers.is_empty() {
        write_text(out, node, source);
        out.push_str(", ");
        write_position(out, node);
        out.push(')');
        return;
    }

    let schema = schema_for(node.kind()).unwrap_or(&[]);
    for spec in schema {
        let nodes = slots
            .fields
            .iter()
            .find(|(name, _)| *name == spec.name)
            .map(|(_, nodes)| nodes.as_slice())
            .unwrap_or(&[]);
        write_field(out, spec.name, nodes, spec.repeated, source);
    }
    for (name, nodes) in &slots.fields {
        if schema.iter().any(|spec| spec.name == *name) {
            continue;
        }
        write_field(out, name, nodes, false, source);
    }
    // Punctuation is implied by the node kind; only modifiers are kept.
    for keyword in modifiers {
        let present = if slots.keywords.contains(keyword) { "True" } else { "False" };
        let _ = write!(out, "{}={}, ", keyword, present);
    }
    if !slots.children.is_empty() {
        out.push_str("children=");
        write_list(out, &slots.children, source);
        out.push_str(", ");
    }

    write_position(out, node);
    out.push(')');
}

fn write_field(out: &mut String, name: &str, nodes: &[Node], repeated: bool, source: &[u8]) {
    out.push_str(name);
    out.push('=');
    match nodes {
        [] if repeated => out.push_str("[]"),
        [] => out.push_str("None"),
        [single] if !repeated => write_node(out, *single, source),
        _ => write_list(out, nodes, source),
    }
    out.push_str(", ");
}

fn write_list(out: &mut String, nodes: &[Node], source: &[u8]) {
    out.push('[');
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_node(out, *node, source);
    }
    out.push(']');
}

fn write_text(out: &mut String, node: Node, source: &[u8]) {
    let text = node.utf8_text(source).unwrap_or("");
    // Debug formatting gives a quoted, escaped, platform-independent literal.
    let _ = write!(out, "{:?}", text);
}

fn write_position(out: &mut String, node: Node) {
    let start = node.start_position();
    let end = node.end_position();
    let _ = write!(
        out,
        "lineno={}, col_offset={}, end_lineno={}, end_col_offset={}",
        start.row + 1,
        start.column,
        end.row + 1,
        end.column
    );
}
