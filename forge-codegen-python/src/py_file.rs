//! Structured Python file generation.
//!
//! Imports are grouped the way isort does it: standard library, third
//! party, then the generated project's own packages.

use crudforge_codegen::{CodeBuilder, ImportCollector, Renderable};
use serde_json::Value;

const STDLIB: &[&str] = &[
    "__future__",
    "base64",
    "collections",
    "contextlib",
    "dataclasses",
    "datetime",
    "decimal",
    "functools",
    "itertools",
    "logging",
    "math",
    "os",
    "pathlib",
    "re",
    "threading",
    "time",
    "typing",
    "uuid",
];

const FIRST_PARTY: &[&str] = &["app", "tests"];

/// Longest import line before it is wrapped in parentheses.
const LINE_LIMIT: usize = 88;

fn section(module: &str) -> usize {
    let top = module.split('.').next().unwrap_or(module);
    if STDLIB.contains(&top) {
        0
    } else if FIRST_PARTY.contains(&top) {
        2
    } else {
        1
    }
}

fn from_import(module: &str, symbols: &[&str]) -> String {
    let line = format!("from {} import {}", module, symbols.join(", "));
    if line.len() <= LINE_LIMIT {
        return line;
    }
    let names: String = symbols.iter().map(|s| format!("    {s},\n")).collect();
    format!("from {module} import (\n{names})")
}

/// Render collected imports. Modules without symbols become `import x`.
///
/// ```
/// use crudforge_codegen::ImportCollector;
/// use crudforge_codegen_python::render_imports;
///
/// let mut imports = ImportCollector::new();
/// imports.add("app.models.post", "Post");
/// imports.add("sqlalchemy", "select");
/// imports.add_module("uuid");
///
/// assert_eq!(
///     render_imports(&imports),
///     "import uuid\n\nfrom sqlalchemy import select\n\nfrom app.models.post import Post"
/// );
/// ```
pub fn render_imports(imports: &ImportCollector) -> String {
    let mut groups: [Vec<(bool, &str, String)>; 3] = Default::default();
    for (module, symbols) in imports.iter() {
        let line = if symbols.is_empty() {
            format!("import {module}")
        } else {
            let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
            from_import(module, &symbols)
        };
        groups[section(module)].push((!symbols.is_empty(), module, line));
    }

    groups
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(|mut group| {
            // plain imports first, then from-imports, each by module
            group.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
            group
                .into_iter()
                .map(|(_, _, line)| line)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A double-quoted Python string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Python literal for a JSON value.
pub fn py_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".into(),
        Value::Bool(true) => "True".into(),
        Value::Bool(false) => "False".into(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(py_literal).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", quote(k), py_literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// A Python module: docstring, imports, then top-level items separated by
/// two blank lines.
#[derive(Debug, Default)]
pub struct PyFile {
    doc: Option<String>,
    imports: ImportCollector,
    body: Vec<String>,
}

impl PyFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module docstring.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// `from module import symbol`
    pub fn import(mut self, module: &str, symbol: &str) -> Self {
        self.imports.add(module, symbol);
        self
    }

    pub fn import_all<'s>(
        mut self,
        module: &str,
        symbols: impl IntoIterator<Item = &'s str>,
    ) -> Self {
        for symbol in symbols {
            self.imports.add(module, symbol);
        }
        self
    }

    /// `import module`
    pub fn import_module(mut self, module: &str) -> Self {
        self.imports.add_module(module);
        self
    }

    pub fn imports_mut(&mut self) -> &mut ImportCollector {
        &mut self.imports
    }

    pub fn add(mut self, node: &impl Renderable) -> Self {
        self.body.push(CodeBuilder::python().emit_node(node).build());
        self
    }

    pub fn raw(mut self, code: impl Into<String>) -> Self {
        let mut code = code.into();
        if !code.ends_with('\n') {
            code.push('\n');
        }
        self.body.push(code);
        self
    }

    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        if let Some(doc) = &self.doc {
            sections.push(format!("\"\"\"{}\"\"\"\n", doc));
        }
        if !self.imports.is_empty() {
            sections.push(render_imports(&self.imports) + "\n");
        }
        let head = sections.join("\n");
        let body = self.body.join("\n\n");
        match (head.is_empty(), body.is_empty()) {
            (true, _) => body,
            (false, true) => head,
            (false, false) => format!("{head}\n\n{body}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plain_imports_come_first() {
        let mut imports = ImportCollector::new();
        imports.add("decimal", "Decimal");
        imports.add_module("datetime");
        imports.add("typing", "Any");
        assert_eq!(
            render_imports(&imports),
            "import datetime\nfrom decimal import Decimal\nfrom typing import Any"
        );
    }

    #[test]
    fn test_long_imports_wrap() {
        let mut imports = ImportCollector::new();
        for symbol in [
            "BigInteger",
            "Boolean",
            "DateTime",
            "ForeignKey",
            "Integer",
            "String",
            "Text",
            "text",
        ] {
            imports.add("sqlalchemy", symbol);
        }
        let out = render_imports(&imports);
        assert!(out.starts_with("from sqlalchemy import (\n    BigInteger,\n"));
        assert!(out.ends_with("    text,\n)"));
    }

    #[test]
    fn test_file_sections() {
        let file = PyFile::new()
            .doc("Tags.")
            .import("fastapi", "APIRouter")
            .raw("router = APIRouter()")
            .raw("def f() -> None:\n    pass");
        assert_eq!(
            file.render(),
            "\"\"\"Tags.\"\"\"\n\nfrom fastapi import APIRouter\n\n\nrouter = APIRouter()\n\n\ndef f() -> None:\n    pass\n"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(py_literal(&json!(true)), "True");
        assert_eq!(py_literal(&json!({"key": "value"})), "{\"key\": \"value\"}");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
