//! Structured TypeScript file generation.
//!
//! Imports are collected per module and rendered ahead of the body, with
//! packages before relative paths.

use crudforge_codegen::{CodeBuilder, ImportCollector, Renderable};

/// Render collected imports as `import { ... } from '...'` statements.
///
/// Modules added without symbols become side-effect imports.
///
/// ```
/// use crudforge_codegen::ImportCollector;
/// use crudforge_codegen_typescript::render_imports;
///
/// let mut imports = ImportCollector::new();
/// imports.add("./post.entity", "Post");
/// imports.add("@nestjs/common", "Injectable");
/// imports.add("@nestjs/common", "Get");
///
/// assert_eq!(
///     render_imports(&imports),
///     "import { Get, Injectable } from '@nestjs/common';\n\nimport { Post } from './post.entity';"
/// );
/// ```
pub fn render_imports(imports: &ImportCollector) -> String {
    let mut packages = Vec::new();
    let mut relative = Vec::new();
    for (module, symbols) in imports.iter() {
        let line = if symbols.is_empty() {
            format!("import '{}';", module)
        } else {
            let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
            format!("import {{ {} }} from '{}';", symbols.join(", "), module)
        };
        if module.starts_with('.') {
            relative.push((module, line));
        } else {
            packages.push((module, line));
        }
    }

    [packages, relative]
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(|mut group| {
            group.sort_by(|a, b| a.0.cmp(b.0));
            group
                .into_iter()
                .map(|(_, line)| line)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A TypeScript source file: imports followed by body items separated by
/// blank lines.
#[derive(Debug, Default)]
pub struct CodeFile {
    imports: ImportCollector,
    body: Vec<String>,
}

impl CodeFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a named export.
    pub fn import(mut self, module: &str, symbol: &str) -> Self {
        self.imports.add(module, symbol);
        self
    }

    /// Import several named exports of one module.
    pub fn import_all<'s>(mut self, module: &str, symbols: impl IntoIterator<Item = &'s str>) -> Self {
        for symbol in symbols {
            self.imports.add(module, symbol);
        }
        self
    }

    /// Import a module for its side effects only.
    pub fn import_module(mut self, module: &str) -> Self {
        self.imports.add_module(module);
        self
    }

    pub fn imports_mut(&mut self) -> &mut ImportCollector {
        &mut self.imports
    }

    /// Add a body element.
    pub fn add(mut self, node: &impl Renderable) -> Self {
        self.body.push(CodeBuilder::typescript().emit_node(node).build());
        self
    }

    /// Add raw source as a body element.
    pub fn raw(mut self, code: impl Into<String>) -> Self {
        let mut code = code.into();
        if !code.ends_with('\n') {
            code.push('\n');
        }
        self.body.push(code);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.body.is_empty()
    }

    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        if !self.imports.is_empty() {
            sections.push(render_imports(&self.imports) + "\n");
        }
        sections.extend(self.body.iter().cloned());
        sections.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Class;

    #[test]
    fn test_side_effect_import_sorts_with_packages() {
        let mut imports = ImportCollector::new();
        imports.add_module("reflect-metadata");
        imports.add("@nestjs/core", "NestFactory");
        assert_eq!(
            render_imports(&imports),
            "import { NestFactory } from '@nestjs/core';\nimport 'reflect-metadata';"
        );
    }

    #[test]
    fn test_code_file_sections() {
        let file = CodeFile::new()
            .import("@nestjs/common", "Module")
            .add(&Class::new("TagModule").decorator("Module({})"))
            .raw("export const TAGS = 'tags';");
        assert_eq!(
            file.render(),
            "import { Module } from '@nestjs/common';\n\n@Module({})\nexport class TagModule {}\n\nexport const TAGS = 'tags';\n"
        );
    }

    #[test]
    fn test_empty_file() {
        let file = CodeFile::new();
        assert!(file.is_empty());
        assert_eq!(file.render(), "");
    }
}
