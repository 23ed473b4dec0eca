//! Structure analysis through the public API

use docsmith::analysis::{analyze, ClassInfo, CodeStructure, FunctionInfo, StructuralSummary};
use serde_json::json;

fn summary(code: &str) -> StructuralSummary {
    analyze(code)
        .summary()
        .cloned()
        .unwrap_or_else(|| panic!("snippet should parse: {}", code))
}

#[test]
fn test_module_inventory_in_source_order() {
    let code = r#"
import json
from collections import OrderedDict as OD

def load(path, strict=True) -> dict:
    with open(path) as f:
        return json.load(f)

class Cache:
    def __init__(self, size):
        self.size = size

    def get(self, key, default=None):
        return default

def dump(obj, *args, indent=2, **kwargs):
    return json.dumps(obj)
"#;
    let s = summary(code);

    assert_eq!(s.imports, vec!["json", "collections.OrderedDict"]);
    assert_eq!(
        s.functions,
        vec![
            FunctionInfo {
                name: "load".into(),
                args: vec!["path".into(), "strict".into()],
                returns: Some("dict".into()),
            },
            FunctionInfo {
                name: "__init__".into(),
                args: vec!["self".into(), "size".into()],
                returns: None,
            },
            FunctionInfo {
                name: "get".into(),
                args: vec!["self".into(), "key".into(), "default".into()],
                returns: None,
            },
            FunctionInfo {
                name: "dump".into(),
                args: vec!["obj".into()],
                returns: None,
            },
        ]
    );
    assert_eq!(
        s.classes,
        vec![ClassInfo {
            name: "Cache".into(),
            methods: vec!["__init__".into(), "get".into()],
        }]
    );
}

#[test]
fn test_summary_json_shape() {
    let value = serde_json::to_value(analyze("def f(a, b):\n    return a + b")).unwrap();
    assert_eq!(
        value,
        json!({
            "functions": [{"name": "f", "args": ["a", "b"], "returns": null}],
            "classes": [],
            "imports": []
        })
    );
}

#[test]
fn test_error_json_shape() {
    let code = "class :";
    let value = serde_json::to_value(analyze(code)).unwrap();
    assert_eq!(
        value,
        json!({"error": "Syntax error in code", "raw_code": "class :"})
    );
}

#[test]
fn test_error_shape_round_trips() {
    let structure = analyze("def f(:");
    let json = serde_json::to_string(&structure).unwrap();
    let parsed: CodeStructure = serde_json::from_str(&json).unwrap();
    assert!(parsed.is_error());
    assert_eq!(parsed, structure);
}

#[test]
fn test_whitespace_and_comments_only() {
    assert_eq!(summary("# nothing here\n\n"), StructuralSummary::default());
}

#[test]
fn test_nested_classes_are_listed() {
    let code = "class Outer:\n    class Inner:\n        def m(self):\n            pass\n";
    let s = summary(code);
    let names: Vec<&str> = s.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Outer", "Inner"]);
    assert!(s.classes[0].methods.is_empty());
    assert_eq!(s.classes[1].methods, vec!["m".to_string()]);
}
