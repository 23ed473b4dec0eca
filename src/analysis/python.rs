//! Python structure extraction on top of tree-sitter

use super::types::{AnalysisError, ClassInfo, CodeStructure, FunctionInfo, StructuralSummary};
use tracing::debug;
use tree_sitter::{Node, Parser};

/// Parse `code` and summarize its functions, classes and imports.
///
/// Never fails: syntax errors and parser problems come back as
/// [`CodeStructure::Error`] carrying the original snippet.
pub fn analyze(code: &str) -> CodeStructure {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
        return CodeStructure::Error(AnalysisError {
            error: format!("Failed to load Python grammar: {}", e),
            raw_code: code.to_string(),
        });
    }

    let Some(tree) = parser.parse(code, None) else {
        return CodeStructure::Error(AnalysisError {
            error: "Parser produced no syntax tree".to_string(),
            raw_code: code.to_string(),
        });
    };

    let root = tree.root_node();
    if root.has_error() {
        debug!("Snippet has syntax errors");
        return CodeStructure::Error(AnalysisError::syntax(code));
    }

    let source = code.as_bytes();
    let mut summary = StructuralSummary::default();

    // Pre-order, so entries come out in source order
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            // Python 2 statements the grammar still accepts
            "print_statement" | "exec_statement" => {
                debug!(kind = node.kind(), "Snippet uses Python 2 syntax");
                return CodeStructure::Error(AnalysisError::syntax(code));
            }
            "import_statement" => collect_plain_imports(node, source, &mut summary.imports),
            "import_from_statement" => collect_from_imports(node, source, &mut summary.imports),
            "future_import_statement" => {
                collect_future_imports(node, source, &mut summary.imports)
            }
            "function_definition" if !is_async(node) => {
                summary.functions.push(function_info(node, source));
            }
            "class_definition" => summary.classes.push(class_info(node, source)),
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    debug!(
        functions = summary.functions.len(),
        classes = summary.classes.len(),
        imports = summary.imports.len(),
        "Analyzed snippet"
    );
    CodeStructure::Summary(summary)
}

fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

/// `a . b` and `a.b` both render as `a.b`
fn dotted_name(node: Node, source: &[u8]) -> String {
    if node.kind() != "dotted_name" {
        return text(node, source).to_string();
    }
    let mut cursor = node.walk();
    let parts: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .map(|child| text(child, source))
        .collect();
    parts.join(".")
}

/// The imported name of `x` or `x as y`
fn imported_name(node: Node, source: &[u8]) -> String {
    match node.kind() {
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|name| dotted_name(name, source))
            .unwrap_or_default(),
        _ => dotted_name(node, source),
    }
}

fn collect_plain_imports(node: Node, source: &[u8], imports: &mut Vec<String>) {
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        imports.push(imported_name(name, source));
    }
}

fn collect_from_imports(node: Node, source: &[u8], imports: &mut Vec<String>) {
    let module = node
        .child_by_field_name("module_name")
        .map(|module| module_name(module, source))
        .unwrap_or_default();

    let mut cursor = node.walk();
    let names: Vec<String> = node
        .children_by_field_name("name", &mut cursor)
        .map(|name| imported_name(name, source))
        .collect();

    if names.is_empty() {
        let mut cursor = node.walk();
        let wildcard = node
            .named_children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import");
        if wildcard {
            imports.push(format!("{}.*", module));
        }
        return;
    }

    for name in names {
        imports.push(format!("{}.{}", module, name));
    }
}

/// Relative imports keep only the module part: `from ..pkg import x` is `pkg`
fn module_name(node: Node, source: &[u8]) -> String {
    if node.kind() != "relative_import" {
        return dotted_name(node, source);
    }
    let mut cursor = node.walk();
    let dotted = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "dotted_name");
    dotted
        .map(|module| dotted_name(module, source))
        .unwrap_or_default()
}

fn collect_future_imports(node: Node, source: &[u8], imports: &mut Vec<String>) {
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        imports.push(format!("__future__.{}", imported_name(name, source)));
    }
}

fn is_async(node: Node) -> bool {
    node.child(0).is_some_and(|first| first.kind() == "async")
}

fn function_info(node: Node, source: &[u8]) -> FunctionInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();

    let args = node
        .child_by_field_name("parameters")
        .map(|params| positional_args(params, source))
        .unwrap_or_default();

    let returns = node
        .child_by_field_name("return_type")
        .and_then(|annotation| bare_name(annotation, source));

    FunctionInfo {
        name,
        args,
        returns,
    }
}

/// Names of the positional-or-keyword parameters.
///
/// Parameters before `/` are positional-only and dropped; collection stops
/// at `*`, `*args` or `**kwargs`.
fn positional_args(params: Node, source: &[u8]) -> Vec<String> {
    let mut args = Vec::new();
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "identifier" => args.push(text(param, source).to_string()),
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = param.child_by_field_name("name") {
                    args.push(text(name, source).to_string());
                }
            }
            "typed_parameter" => {
                let mut inner = param.walk();
                let first = param.named_children(&mut inner).next();
                match first {
                    Some(id) if id.kind() == "identifier" => {
                        args.push(text(id, source).to_string())
                    }
                    // `*args: T` or `**kw: T`
                    _ => break,
                }
            }
            "positional_separator" => args.clear(),
            "keyword_separator" | "list_splat_pattern" | "dictionary_splat_pattern" => break,
            _ => {}
        }
    }

    args
}

/// `-> int` gives `int`; anything richer (`-> list[int]`, `-> None`) gives nothing
fn bare_name(annotation: Node, source: &[u8]) -> Option<String> {
    let target = if annotation.kind() == "type" {
        let mut cursor = annotation.walk();
        let mut children = annotation.named_children(&mut cursor);
        let only = children.next()?;
        if children.next().is_some() {
            return None;
        }
        only
    } else {
        annotation
    };

    (target.kind() == "identifier").then(|| text(target, source).to_string())
}

fn class_info(node: Node, source: &[u8]) -> ClassInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for stmt in body.named_children(&mut cursor) {
            let def = match stmt.kind() {
                "decorated_definition" => stmt.child_by_field_name("definition"),
                _ => Some(stmt),
            };
            if let Some(def) = def {
                if def.kind() == "function_definition" && !is_async(def) {
                    if let Some(method) = def.child_by_field_name("name") {
                        methods.push(text(method, source).to_string());
                    }
                }
            }
        }
    }

    ClassInfo { name, methods }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(code: &str) -> StructuralSummary {
        match analyze(code) {
            CodeStructure::Summary(summary) => summary,
            CodeStructure::Error(e) => panic!("unexpected analysis error: {}", e.error),
        }
    }

    #[test]
    fn test_simple_function() {
        let s = summary("def f(a, b):\n    return a + b");
        assert_eq!(
            s.functions,
            vec![FunctionInfo {
                name: "f".into(),
                args: vec!["a".into(), "b".into()],
                returns: None,
            }]
        );
        assert!(s.classes.is_empty());
        assert!(s.imports.is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let code = "def f(:";
        assert_eq!(
            analyze(code),
            CodeStructure::Error(AnalysisError {
                error: "Syntax error in code".into(),
                raw_code: code.into(),
            })
        );
    }

    #[test]
    fn test_python2_print_is_syntax_error() {
        for code in ["print \"hello\"", "print >>f, x", "def f(a, b):\n    print a + b\n"] {
            assert_eq!(
                analyze(code),
                CodeStructure::Error(AnalysisError::syntax(code)),
                "{:?}",
                code
            );
        }
    }

    #[test]
    fn test_python2_exec_is_syntax_error() {
        let code = "exec \"x = 1\"";
        assert_eq!(analyze(code), CodeStructure::Error(AnalysisError::syntax(code)));
        assert!(analyze("exec code in ns").is_error());
    }

    #[test]
    fn test_print_and_exec_calls_are_valid() {
        let s = summary("def f(a):\n    print(a)\n    exec(\"x = 1\")\n");
        assert_eq!(s.functions[0].name, "f");
    }

    #[test]
    fn test_empty_snippet() {
        assert_eq!(summary(""), StructuralSummary::default());
    }

    #[test]
    fn test_class_with_methods() {
        let code = "class Stack:\n    def push(self, x):\n        pass\n\n    @property\n    def size(self) -> int:\n        return 0\n";
        let s = summary(code);
        assert_eq!(
            s.classes,
            vec![ClassInfo {
                name: "Stack".into(),
                methods: vec!["push".into(), "size".into()],
            }]
        );
        let names: Vec<&str> = s.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["push", "size"]);
        assert_eq!(s.functions[1].args, vec!["self".to_string()]);
        assert_eq!(s.functions[1].returns.as_deref(), Some("int"));
    }

    #[test]
    fn test_nested_function_is_not_a_method() {
        let code = "class A:\n    def outer(self):\n        def inner():\n            pass\n";
        let s = summary(code);
        assert_eq!(s.classes[0].methods, vec!["outer".to_string()]);
        assert_eq!(s.functions.len(), 2);
    }

    #[test]
    fn test_imports() {
        let code = "import os, numpy as np\nimport a.b\nfrom typing import List, Dict as D\nfrom .pkg import util\nfrom . import sibling\nfrom m import *\nfrom __future__ import annotations\n";
        assert_eq!(
            summary(code).imports,
            vec![
                "os",
                "numpy",
                "a.b",
                "typing.List",
                "typing.Dict",
                "pkg.util",
                ".sibling",
                "m.*",
                "__future__.annotations",
            ]
        );
    }

    #[test]
    fn test_parameter_kinds() {
        let code = "def f(p, /, a, b: int = 1, c=2, *args, k, **kw):\n    pass\n";
        assert_eq!(summary(code).functions[0].args, vec!["a", "b", "c"]);

        let code = "def g(x: str, *, y):\n    pass\n";
        assert_eq!(summary(code).functions[0].args, vec!["x"]);
    }

    #[test]
    fn test_return_annotations() {
        let code = "def a() -> str: pass\ndef b() -> list[int]: pass\ndef c() -> None: pass\n";
        let returns: Vec<Option<String>> =
            summary(code).functions.into_iter().map(|f| f.returns).collect();
        assert_eq!(returns, vec![Some("str".to_string()), None, None]);
    }

    #[test]
    fn test_async_def_skipped() {
        let code = "async def fetch(url):\n    pass\n\ndef sync(x):\n    pass\n";
        let names: Vec<String> = summary(code).functions.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["sync".to_string()]);
    }

    #[test]
    fn test_deterministic() {
        let code = "import os\nclass A:\n    def m(self): pass\n";
        assert_eq!(analyze(code), analyze(code));
    }
}
