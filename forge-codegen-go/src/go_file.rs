//! Go source file assembly.

use crudforge_codegen::{CodeBuilder, CodeFragment, ImportCollector, Renderable};

/// Render collected imports as a Go import block: standard library, then
/// third-party modules, then this module's `internal/` packages.
///
/// Symbols recorded for a module are import names (`_` for side-effect
/// imports, or an alias).
///
/// ```
/// use crudforge_codegen::ImportCollector;
/// use crudforge_codegen_go::render_imports;
///
/// let mut imports = ImportCollector::new();
/// imports.add_module("blog/internal/models");
/// imports.add_module("github.com/go-chi/chi/v5");
/// imports.add_module("net/http");
/// imports.add_module("context");
///
/// assert_eq!(
///     render_imports(&imports),
///     "import (\n\t\"context\"\n\t\"net/http\"\n\n\t\"github.com/go-chi/chi/v5\"\n\n\t\"blog/internal/models\"\n)"
/// );
/// ```
pub fn render_imports(imports: &ImportCollector) -> String {
    let mut groups: [Vec<(String, String)>; 3] = Default::default();
    for (module, names) in imports.iter() {
        let lines: Vec<String> = if names.is_empty() {
            vec![format!("\"{}\"", module)]
        } else {
            names.iter().map(|n| format!("{} \"{}\"", n, module)).collect()
        };
        groups[import_group(module)].extend(lines.into_iter().map(|line| (module.to_string(), line)));
    }

    let groups: Vec<String> = groups
        .into_iter()
        .filter(|g| !g.is_empty())
        .map(|mut g| {
            g.sort();
            g.into_iter()
                .map(|(_, line)| format!("\t{}", line))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    match groups.as_slice() {
        [] => String::new(),
        [single] if single.lines().count() == 1 => format!("import {}", single.trim_start()),
        _ => format!("import (\n{}\n)", groups.join("\n\n")),
    }
}

/// Third-party paths have a dot in their first element; the standard library
/// never does.
fn import_group(module: &str) -> usize {
    if module.contains("/internal/") {
        2
    } else if module.split('/').next().unwrap_or(module).contains('.') {
        1
    } else {
        0
    }
}

/// Interpreted Go string literal.
///
/// ```
/// use crudforge_codegen_go::quote;
///
/// assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
/// ```
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A Go source file: package clause, imports and top-level declarations.
#[derive(Debug)]
pub struct GoFile {
    package: String,
    doc: Option<String>,
    imports: ImportCollector,
    body: Vec<String>,
}

impl GoFile {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            doc: None,
            imports: ImportCollector::new(),
            body: Vec::new(),
        }
    }

    /// Package comment, rendered above the package clause.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    pub fn import(mut self, path: &str) -> Self {
        self.imports.add_module(path);
        self
    }

    /// Import a package under a name (`_` for drivers).
    pub fn import_as(mut self, path: &str, name: &str) -> Self {
        self.imports.add(path, name);
        self
    }

    pub fn imports_mut(&mut self) -> &mut ImportCollector {
        &mut self.imports
    }

    pub fn add(mut self, node: &impl Renderable) -> Self {
        self.body.push(CodeBuilder::go().emit_node(node).build());
        self
    }

    /// Add a raw declaration.
    pub fn raw(mut self, code: impl Into<String>) -> Self {
        let mut code = code.into();
        if !code.ends_with('\n') {
            code.push('\n');
        }
        self.body.push(code);
        self
    }

    pub fn render(&self) -> String {
        let mut head = String::new();
        if let Some(doc) = &self.doc {
            for line in doc.lines() {
                head.push_str(&format!("// {}\n", line).replace("// \n", "//\n"));
            }
        }
        head.push_str(&format!("package {}\n", self.package));

        let mut sections = vec![head];
        if !self.imports.is_empty() {
            sections.push(render_imports(&self.imports) + "\n");
        }
        sections.extend(self.body.iter().cloned());
        sections.join("\n")
    }
}

/// A struct type declaration with gofmt column alignment.
#[derive(Debug, Clone)]
pub struct GoStruct {
    name: String,
    doc: Option<String>,
    fields: Vec<(String, String, Option<String>)>,
}

impl GoStruct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            fields: Vec::new(),
        }
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.fields.push((name.into(), ty.into(), None));
        self
    }

    /// Field with a struct tag, given without backquotes.
    pub fn tagged(
        mut self,
        name: impl Into<String>,
        ty: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        self.fields.push((name.into(), ty.into(), Some(tag.into())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Renderable for GoStruct {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut out = Vec::new();
        if let Some(doc) = &self.doc {
            out.extend(doc.lines().map(|line| CodeFragment::comment("//", line)));
        }
        if self.fields.is_empty() {
            out.push(CodeFragment::line(format!("type {} struct{{}}", self.name)));
            return out;
        }
        let name_width = self.fields.iter().map(|f| f.0.len()).max().unwrap_or(0);
        let type_width = self
            .fields
            .iter()
            .filter(|f| f.2.is_some())
            .map(|f| f.1.len())
            .max()
            .unwrap_or(0);

        let body = self
            .fields
            .iter()
            .map(|(name, ty, tag)| {
                let line = match tag {
                    Some(tag) => format!("{name:name_width$} {ty:type_width$} `{tag}`"),
                    None => format!("{name:name_width$} {ty}"),
                };
                CodeFragment::line(line.trim_end())
            })
            .collect();
        out.push(CodeFragment::block(
            format!("type {} struct {{", self.name),
            body,
            Some("}"),
        ));
        out
    }
}

/// A function or method declaration with a free-form body.
#[derive(Debug, Clone)]
pub struct GoFunc {
    doc: Option<String>,
    signature: String,
    body: Vec<String>,
}

impl GoFunc {
    /// `signature` is everything between `func ` and the opening brace.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            doc: None,
            signature: signature.into(),
            body: Vec::new(),
        }
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// Append body lines; `\n` separated, empty lines kept.
    pub fn body(mut self, code: impl AsRef<str>) -> Self {
        self.body
            .extend(code.as_ref().split('\n').map(|l| l.to_string()));
        self
    }
}

impl Renderable for GoFunc {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut out = Vec::new();
        if let Some(doc) = &self.doc {
            out.extend(doc.lines().map(|line| CodeFragment::comment("//", line)));
        }
        let body = self
            .body
            .iter()
            .map(|line| {
                if line.is_empty() {
                    CodeFragment::Blank
                } else {
                    CodeFragment::line(line.clone())
                }
            })
            .collect();
        out.push(CodeFragment::block(
            format!("func {} {{", self.signature),
            body,
            Some("}"),
        ));
        out
    }
}
