//! Python language analyzer using tree-sitter.

use tracing::{debug, error};
use tree_sitter::{Language, Node, Parser};

use crate::analysis::docstring::function_docstring;
use crate::analysis::dump::dump_node;
use crate::analysis::{AnalysisError, FunctionRecord, LanguageAnalyzer, ParsedFile, Span};

/// Longest snippet quoted in a syntax error message.
const ERROR_SNIPPET_LEN: usize = 40;

pub struct PythonAnalyzer {
    language: Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, AnalysisError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Pre-order walk. `scope` holds the names of enclosing classes and
    /// functions.
    fn visit(
        &self,
        parsed: &ParsedFile,
        node: Node,
        scope: &mut Vec<String>,
        records: &mut Vec<FunctionRecord>,
    ) -> Result<(), AnalysisError> {
        let pushed = match node.kind() {
            "function_definition" => {
                let record = self.function_record(parsed, node, scope)?;
                scope.push(record.name.clone());
                records.push(record);
                true
            }
            "class_definition" => match node.child_by_field_name("name") {
                Some(name) => {
                    scope.push(parsed.node_text(name).to_string());
                    true
                }
                None => false,
            },
            _ => false,
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(parsed, child, scope, records)?;
        }

        if pushed {
            scope.pop();
        }
        Ok(())
    }

    fn function_record(
        &self,
        parsed: &ParsedFile,
        node: Node,
        scope: &[String],
    ) -> Result<FunctionRecord, AnalysisError> {
        let name_node = node.child_by_field_name("name").ok_or_else(|| {
            let err = AnalysisError::malformed(&parsed.path, node, "function definition has no name");
            error!("{}", err);
            err
        })?;
        let name = parsed.node_text(name_node).to_string();
        if name.is_empty() {
            let err = AnalysisError::malformed(&parsed.path, name_node, "function name is empty");
            error!("{}", err);
            return Err(err);
        }

        let parameters = self.parameters(parsed, node)?;

        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| function_docstring(body, parsed.source_bytes()));

        let source_text = parsed.node_slice(node).map(str::to_string);
        if source_text.is_none() {
            debug!(file = %parsed.path, function = %name, "source span could not be sliced");
        }

        let qualified_name = if scope.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", scope.join("."), name)
        };

        Ok(FunctionRecord {
            qualified_name,
            parameters,
            docstring,
            source_text,
            tree_dump: dump_node(node, parsed.source_bytes()),
            is_async: is_async(node),
            decorators: decorators(parsed, node),
            span: Span::from_node(node),
            name,
        })
    }

    /// Parameter identifiers in declaration order.
    fn parameters(&self, parsed: &ParsedFile, func: Node) -> Result<Vec<String>, AnalysisError> {
        let params = func.child_by_field_name("parameters").ok_or_else(|| {
            let err = AnalysisError::malformed(&parsed.path, func, "function definition has no parameter list");
            error!("{}", err);
            err
        })?;

        let mut names = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.is_extra() {
                continue;
            }
            match param.kind() {
                // Bare `*` and `/` separate parameter groups; they name nothing.
                "keyword_separator" | "positional_separator" => continue,
                "tuple_pattern" => {
                    let pos = param.start_position();
                    return Err(AnalysisError::Parse {
                        file: parsed.path.clone(),
                        message: "tuple parameters are not valid Python 3".to_string(),
                        line: pos.row + 1,
                        column: pos.column + 1,
                    });
                }
                _ => {}
            }
            let ident = parameter_identifier(param).ok_or_else(|| {
                let err = AnalysisError::malformed(&parsed.path, param, "parameter has no identifier");
                error!("{}", err);
                err
            })?;
            names.push(parsed.node_text(ident).to_string());
        }
        Ok(names)
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// The identifier a parameter binds, with annotations, defaults and splat
/// markers stripped.
fn parameter_identifier(node: Node) -> Option<Node> {
    match node.kind() {
        "identifier" => Some(node),
        "default_parameter" | "typed_default_parameter" => node
            .child_by_field_name("name")
            .and_then(parameter_identifier),
        "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            // The bound pattern precedes the `type` field.
            node.named_child(0).and_then(parameter_identifier)
        }
        _ => None,
    }
}

fn is_async(func: Node) -> bool {
    func.child(0).is_some_and(|c| c.kind() == "async")
}

/// Decorators attached through an enclosing `decorated_definition`.
fn decorators(parsed: &ParsedFile, func: Node) -> Vec<String> {
    let Some(parent) = func.parent().filter(|p| p.kind() == "decorated_definition") else {
        return Vec::new();
    };
    let mut cursor = parent.walk();
    let decorators = parent
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "decorator")
        .map(|n| parsed.node_text(n).trim_start_matches('@').trim().to_string())
        .collect();
    decorators
}

/// First ERROR or MISSING node in pre-order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

/// First Python 2 construct in pre-order. The grammar accepts these but
/// they are syntax errors in Python 3.
fn legacy_syntax(node: Node) -> Option<(Node, &'static str)> {
    match node.kind() {
        "print_statement" => return Some((node, "print statement is not valid Python 3")),
        "exec_statement" => return Some((node, "exec statement is not valid Python 3")),
        "comparison_operator" | "except_clause" => {
            let (token, message) = if node.kind() == "comparison_operator" {
                ("<>", "'<>' is not valid Python 3, use '!='")
            } else {
                (",", "'except X, name' is not valid Python 3, use 'as'")
            };
            let mut cursor = node.walk();
            let found = node
                .children(&mut cursor)
                .find(|c| !c.is_named() && c.kind() == token);
            if let Some(found) = found {
                return Some((found, message));
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = legacy_syntax(child) {
            return Some(found);
        }
    }
    None
}

fn syntax_error(path: &str, root: Node, source: &str) -> AnalysisError {
    let Some(node) = first_error(root) else {
        return AnalysisError::Parse {
            file: path.to_string(),
            message: "syntax error".to_string(),
            line: 1,
            column: 1,
        };
    };

    let pos = node.start_position();
    let message = if node.is_missing() {
        format!("syntax error: missing {}", node.kind())
    } else {
        let text = node.utf8_text(source.as_bytes()).unwrap_or("");
        let snippet: String = text
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(ERROR_SNIPPET_LEN)
            .collect();
        if snippet.trim().is_empty() {
            "syntax error".to_string()
        } else {
            format!("syntax error near {:?}", snippet.trim())
        }
    };

    AnalysisError::Parse {
        file: path.to_string(),
        message,
        line: pos.row + 1,
        column: pos.column + 1,
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &str, source: String) -> Result<ParsedFile, AnalysisError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| AnalysisError::Parse {
                file: path.to_string(),
                message: "parser produced no tree".to_string(),
                line: 1,
                column: 1,
            })?;

        if tree.root_node().has_error() {
            return Err(syntax_error(path, tree.root_node(), &source));
        }
        if let Some((node, message)) = legacy_syntax(tree.root_node()) {
            let pos = node.start_position();
            return Err(AnalysisError::Parse {
                file: path.to_string(),
                message: message.to_string(),
                line: pos.row + 1,
                column: pos.column + 1,
            });
        }

        Ok(ParsedFile {
            tree,
            source,
            path: path.to_string(),
        })
    }

    fn extract_functions(&self, parsed: &ParsedFile) -> Result<Vec<FunctionRecord>, AnalysisError> {
        let mut records = Vec::new();
        let mut scope = Vec::new();
        self.visit(parsed, parsed.tree.root_node(), &mut scope, &mut records)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<FunctionRecord> {
        let analyzer = PythonAnalyzer::new();
        let parsed = analyzer.parse("test.py", source.to_string()).unwrap();
        analyzer.extract_functions(&parsed).unwrap()
    }

    fn names(records: &[FunctionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_docstring_and_parameters() {
        let records = extract("def f(a, b):\n    \"doc\"\n    return a+b\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "f");
        assert_eq!(records[0].parameters, vec!["a", "b"]);
        assert_eq!(records[0].docstring.as_deref(), Some("doc"));
    }

    #[test]
    fn test_no_docstring() {
        let records = extract("def f(a):\n    x = \"not doc\"\n    return x\n");
        assert_eq!(records[0].docstring, None);

        let records = extract("def f():\n    return 1\n    \"late\"\n");
        assert_eq!(records[0].docstring, None);
    }

    #[test]
    fn test_fstring_is_not_docstring() {
        let records = extract("def f(x):\n    f\"value {x}\"\n");
        assert_eq!(records[0].docstring, None);
    }

    #[test]
    fn test_concatenated_docstring() {
        let records = extract("def f():\n    \"one \" \"two\"\n");
        assert_eq!(records[0].docstring.as_deref(), Some("one two"));
    }

    #[test]
    fn test_multiline_docstring_is_cleaned() {
        let source = "def f():\n    \"\"\"Summary.\n\n    Details.\n    \"\"\"\n    pass\n";
        let records = extract(source);
        assert_eq!(records[0].docstring.as_deref(), Some("Summary.\n\nDetails."));
    }

    #[test]
    fn test_parameter_order_preserved() {
        let records = extract("def g(z, a, m):\n    pass\n");
        assert_eq!(records[0].parameters, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parameter_kinds_reduced_to_identifiers() {
        let source = "def h(a, /, b: int, c=1, d: str = \"x\", *args, e, **kwargs):\n    pass\n";
        let records = extract(source);
        assert_eq!(
            records[0].parameters,
            vec!["a", "b", "c", "d", "args", "e", "kwargs"]
        );
    }

    #[test]
    fn test_typed_splat_parameters() {
        let records = extract("def h(*args: int, **kwargs: str):\n    pass\n");
        assert_eq!(records[0].parameters, vec!["args", "kwargs"]);
    }

    #[test]
    fn test_keyword_only_separator_skipped() {
        let records = extract("def k(a, *, b):\n    pass\n");
        assert_eq!(records[0].parameters, vec!["a", "b"]);
    }

    #[test]
    fn test_nested_functions_are_siblings() {
        let records = extract("def outer():\n    def inner():\n        pass\n    pass\n");
        assert_eq!(names(&records), vec!["outer", "inner"]);
        assert_eq!(records[1].qualified_name, "outer.inner");
        assert!(records[0].tree_dump.contains("identifier(\"inner\""));
    }

    #[test]
    fn test_preorder_document_order() {
        let source = r#"
def first():
    def first_inner():
        pass

class Holder:
    def method(self):
        def helper():
            pass

    if True:
        def conditional(self):
            pass

def last():
    pass
"#;
        let records = extract(source);
        assert_eq!(
            names(&records),
            vec!["first", "first_inner", "method", "helper", "conditional", "last"]
        );
        assert_eq!(records[2].qualified_name, "Holder.method");
        assert_eq!(records[3].qualified_name, "Holder.method.helper");
        assert_eq!(records[2].parameters, vec!["self"]);
    }

    #[test]
    fn test_source_text_is_verbatim() {
        let source = "x = 1\n\ndef spaced( a ,b ):\n    return   a\n";
        let records = extract(source);
        let text = records[0].source_text.as_deref().unwrap();
        assert!(text.starts_with("def spaced( a ,b ):"));
        assert!(text.trim_end().ends_with("return   a"));
        assert_eq!(records[0].span.start_line, 3);
    }

    #[test]
    fn test_nested_source_text_keeps_indentation() {
        let records = extract("class C:\n    def m(self):\n        return 1\n");
        let text = records[0].source_text.as_deref().unwrap();
        assert!(text.starts_with("def m(self):\n        return 1"));
    }

    #[test]
    fn test_async_and_decorators() {
        let source = "@cache\n@route(\"/x\")\nasync def handler(req):\n    pass\n";
        let records = extract(source);
        assert!(records[0].is_async);
        assert_eq!(records[0].decorators, vec!["cache", "route(\"/x\")"]);
        assert!(records[0].source_text.as_deref().unwrap().starts_with("async def"));
    }

    #[test]
    fn test_empty_file() {
        assert!(extract("").is_empty());
        assert!(extract("import os\nx = 1\n").is_empty());
    }

    #[test]
    fn test_syntax_error_reported_with_position() {
        let analyzer = PythonAnalyzer::new();
        let err = analyzer
            .parse("bad.py", "def broken(:\n    pass\n".to_string())
            .err()
            .expect("syntax error");
        match err {
            AnalysisError::Parse { file, line, .. } => {
                assert_eq!(file, "bad.py");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn parse_error(source: &str) -> (usize, usize, String) {
        let analyzer = PythonAnalyzer::new();
        match analyzer.parse("legacy.py", source.to_string()) {
            Err(AnalysisError::Parse {
                line,
                column,
                message,
                ..
            }) => (line, column, message),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("{source:?} should be rejected"),
        }
    }

    #[test]
    fn test_print_statement_rejected() {
        let (line, column, message) = parse_error("def f(x):\n    print \"hi\", x\n");
        assert_eq!((line, column), (2, 5));
        assert!(message.contains("print"));
    }

    #[test]
    fn test_exec_statement_rejected() {
        let (line, _, message) = parse_error("def g(a):\n    exec \"code\"\n");
        assert_eq!(line, 2);
        assert!(message.contains("exec"));
    }

    #[test]
    fn test_diamond_operator_rejected() {
        let (line, column, message) = parse_error("def g(a):\n    if a <> 1:\n        pass\n");
        assert_eq!((line, column), (2, 10));
        assert!(message.contains("<>"));
    }

    #[test]
    fn test_except_comma_rejected() {
        let source = "def h():\n    try:\n        pass\n    except ValueError, e:\n        pass\n";
        let (line, column, message) = parse_error(source);
        assert_eq!((line, column), (4, 22));
        assert!(message.contains("except"));
    }

    #[test]
    fn test_unclosed_paren_at_eof_rejected() {
        let (line, _, _) = parse_error("def f(a):\n    return (a\n");
        assert!(line >= 2);
    }

    #[test]
    fn test_python3_forms_still_accepted() {
        let source = "def f(x):\n    print(\"hi\", x)\n    if x != 1:\n        pass\n    try:\n        pass\n    except (ValueError, KeyError) as e:\n        raise\n";
        let records = extract(source);
        assert_eq!(names(&records), vec!["f"]);
    }

    #[test]
    fn test_dump_deterministic_across_runs() {
        let source = "def f(a, b=2):\n    \"doc\"\n    return [x for x in a if x > b]\n";
        assert_eq!(extract(source)[0].tree_dump, extract(source)[0].tree_dump);
    }
}
