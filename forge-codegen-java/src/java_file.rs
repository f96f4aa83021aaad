//! Structured Java source generation.
//!
//! A file is a package clause, one sorted import block (static imports
//! first) and its type declarations.

use crudforge_codegen::ImportCollector;
use serde_json::Value;

/// Render collected imports as `import a.b.C;` lines in ASCII order.
///
/// Classes from `own_package` and `java.lang` need no import and are
/// dropped.
///
/// ```
/// use crudforge_codegen::ImportCollector;
/// use crudforge_codegen_java::render_imports;
///
/// let mut imports = ImportCollector::new();
/// imports.add("java.util", "List");
/// imports.add("jakarta.persistence", "Entity");
/// imports.add("com.example.blog.post", "Post");
///
/// assert_eq!(
///     render_imports(&imports, "com.example.blog.post"),
///     "import jakarta.persistence.Entity;\nimport java.util.List;"
/// );
/// ```
pub fn render_imports(imports: &ImportCollector, own_package: &str) -> String {
    let mut lines: Vec<String> = imports
        .iter()
        .filter(|(module, _)| *module != own_package && *module != "java.lang")
        .flat_map(|(module, symbols)| {
            symbols
                .iter()
                .map(move |symbol| format!("import {module}.{symbol};"))
        })
        .collect();
    lines.sort();
    lines.join("\n")
}

/// A double-quoted Java string literal.
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

/// Java expression building a JSON sample for a request body map.
pub fn java_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => format!(
            "List.of({})",
            items.iter().map(java_literal).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "Map.of({})",
            map.iter()
                .map(|(k, v)| format!("{}, {}", quote(k), java_literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Split `a.b.C` into its package and simple name.
fn split_class(fqcn: &str) -> (&str, &str) {
    fqcn.rsplit_once('.').unwrap_or(("", fqcn))
}

/// A Java compilation unit.
#[derive(Debug, Default)]
pub struct JavaFile {
    package: String,
    imports: ImportCollector,
    statics: ImportCollector,
    body: Vec<String>,
}

impl JavaFile {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Import a class by its fully qualified name.
    pub fn import(mut self, fqcn: &str) -> Self {
        add_class(&mut self.imports, fqcn);
        self
    }

    pub fn import_all<'s>(mut self, classes: impl IntoIterator<Item = &'s str>) -> Self {
        for fqcn in classes {
            add_class(&mut self.imports, fqcn);
        }
        self
    }

    /// `import static a.b.C.member;`
    pub fn import_static(mut self, fqcn: &str, member: &str) -> Self {
        self.statics.add(fqcn, member);
        self
    }

    pub fn imports_mut(&mut self) -> &mut ImportCollector {
        &mut self.imports
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
        let mut sections = vec![format!("package {};\n", self.package)];
        if !self.statics.is_empty() {
            let statics = render_imports(&self.statics, "").replace("import ", "import static ");
            sections.push(statics + "\n");
        }
        let imports = render_imports(&self.imports, &self.package);
        if !imports.is_empty() {
            sections.push(imports + "\n");
        }
        sections.extend(self.body.iter().cloned());
        sections.join("\n")
    }
}

/// Record `fqcn` in a collector keyed by package.
pub fn add_class(imports: &mut ImportCollector, fqcn: &str) {
    let (package, class) = split_class(fqcn);
    imports.add(package, class);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_file_layout() {
        let file = JavaFile::new("com.example.blog.post")
            .import("java.util.List")
            .import("com.example.blog.post.Post")
            .import("java.lang.String")
            .import_static("org.springframework.test.web.servlet.result.MockMvcResultMatchers", "status")
            .raw("public final class Posts {\n}");
        assert_eq!(
            file.render(),
            "package com.example.blog.post;\n\nimport static org.springframework.test.web.servlet.result.MockMvcResultMatchers.status;\n\nimport java.util.List;\n\npublic final class Posts {\n}\n"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(java_literal(&json!([1, 2])), "List.of(1, 2)");
        assert_eq!(java_literal(&json!({"key": "value"})), "Map.of(\"key\", \"value\")");
        assert_eq!(java_literal(&json!(9.99)), "9.99");
    }
}
