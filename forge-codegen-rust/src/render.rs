//! Rust source file assembly.

use crudforge_codegen::{CodeBuilder, ImportCollector, Renderable};

/// Render imports as `use` statements, grouped std / external / crate.
///
/// ```
/// use crudforge_codegen::ImportCollector;
/// use crudforge_codegen_rust::render_imports;
///
/// let mut imports = ImportCollector::new();
/// imports.add("crate::state", "AppState");
/// imports.add("axum", "Router");
/// imports.add("axum", "Json");
/// imports.add("std::sync", "Arc");
///
/// assert_eq!(
///     render_imports(&imports),
///     "use std::sync::Arc;\n\nuse axum::{Json, Router};\n\nuse crate::state::AppState;"
/// );
/// ```
pub fn render_imports(imports: &ImportCollector) -> String {
    let mut groups: [Vec<String>; 3] = Default::default();
    for (module, symbols) in imports.iter() {
        let line = match symbols.len() {
            0 => format!("use {};", module),
            1 => format!(
                "use {}::{};",
                module,
                symbols.iter().next().map(String::as_str).unwrap_or_default()
            ),
            _ => {
                let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
                format!("use {}::{{{}}};", module, symbols.join(", "))
            }
        };
        groups[import_group(module)].push(line);
    }

    groups
        .iter_mut()
        .filter(|g| !g.is_empty())
        .map(|g| {
            g.sort();
            g.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn import_group(module: &str) -> usize {
    match module.split("::").next().unwrap_or(module) {
        "std" | "core" | "alloc" => 0,
        "crate" | "super" | "self" => 2,
        _ => 1,
    }
}

/// A Rust source file: module docs, imports and items separated by blank lines.
#[derive(Debug, Default)]
pub struct RustFile {
    module_doc: Vec<String>,
    imports: ImportCollector,
    items: Vec<String>,
}

impl RustFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `//!` line.
    pub fn module_doc(mut self, text: impl Into<String>) -> Self {
        self.module_doc.push(text.into());
        self
    }

    pub fn import(mut self, module: &str, symbol: &str) -> Self {
        self.imports.add(module, symbol);
        self
    }

    pub fn import_module(mut self, module: &str) -> Self {
        self.imports.add_module(module);
        self
    }

    pub fn imports_mut(&mut self) -> &mut ImportCollector {
        &mut self.imports
    }

    /// Add a rendered node as a top-level item.
    pub fn add(mut self, node: &impl Renderable) -> Self {
        self.items.push(CodeBuilder::rust().emit_node(node).build());
        self
    }

    /// Add raw source as a top-level item.
    pub fn raw(mut self, code: impl Into<String>) -> Self {
        let mut code = code.into();
        if !code.ends_with('\n') {
            code.push('\n');
        }
        self.items.push(code);
        self
    }

    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        if !self.module_doc.is_empty() {
            let doc: Vec<String> = self
                .module_doc
                .iter()
                .map(|line| if line.is_empty() { "//!".to_string() } else { format!("//! {}", line) })
                .collect();
            sections.push(doc.join("\n") + "\n");
        }
        if !self.imports.is_empty() {
            sections.push(render_imports(&self.imports) + "\n");
        }
        sections.extend(self.items.iter().cloned());
        sections.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Struct;

    #[test]
    fn test_render_imports_single_group() {
        let mut imports = ImportCollector::new();
        imports.add("serde", "Serialize");
        imports.add("serde", "Deserialize");
        assert_eq!(render_imports(&imports), "use serde::{Deserialize, Serialize};");
    }

    #[test]
    fn test_render_module_import() {
        let mut imports = ImportCollector::new();
        imports.add_module("crate::repositories::post as repo");
        assert_eq!(render_imports(&imports), "use crate::repositories::post as repo;");
    }

    #[test]
    fn test_rust_file_sections() {
        let file = RustFile::new()
            .module_doc("Post model.")
            .import("serde", "Serialize")
            .add(&Struct::new("Post").derive("Serialize"))
            .raw("pub const TABLE: &str = \"posts\";");
        assert_eq!(
            file.render(),
            "//! Post model.\n\nuse serde::Serialize;\n\n#[derive(Serialize)]\npub struct Post {}\n\npub const TABLE: &str = \"posts\";\n"
        );
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(RustFile::new().render(), "");
    }
}
