//! Line-oriented source writer shared by every target.

use super::{CodeFragment, Indent, Renderable};

/// Accumulates source text, tracking the indentation level.
///
/// Supports consuming methods (returning `Self`) for chaining and mutable
/// methods (prefixed with `push_`, returning `&mut Self`) for loops.
///
/// # Example
///
/// ```
/// use crudforge_codegen::builder::CodeBuilder;
///
/// let code = CodeBuilder::go()
///     .line("func main() {")
///     .indent()
///     .line("run()")
///     .dedent()
///     .line("}")
///     .build();
///
/// assert_eq!(code, "func main() {\n\trun()\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent_level: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    pub fn new(indent: Indent) -> Self {
        Self {
            indent_level: 0,
            indent,
            buffer: String::new(),
        }
    }

    pub fn rust() -> Self {
        Self::new(Indent::RUST)
    }

    pub fn typescript() -> Self {
        Self::new(Indent::TYPESCRIPT)
    }

    pub fn go() -> Self {
        Self::new(Indent::GO)
    }

    pub fn python() -> Self {
        Self::new(Indent::PYTHON)
    }

    pub fn java() -> Self {
        Self::new(Indent::JAVA)
    }

    // push_* variants, for use inside loops

    /// Indented line followed by a newline.
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add every line of a multi-line snippet at the current indentation.
    ///
    /// Blank lines stay empty; a single trailing newline is ignored.
    pub fn push_lines(&mut self, text: &str) -> &mut Self {
        for line in text.strip_suffix('\n').unwrap_or(text).split('\n') {
            if line.trim().is_empty() {
                self.push_blank();
            } else {
                self.push_line(line);
            }
        }
        self
    }

    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Verbatim text: no indentation, no newline.
    pub fn push_raw(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(s);
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Add a line comment (`prefix text`).
    pub fn push_comment(&mut self, prefix: &str, text: &str) -> &mut Self {
        self.write_indent();
        self.buffer.push_str(prefix);
        if !text.is_empty() {
            self.buffer.push(' ');
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
        self
    }

    /// Emit a Renderable node.
    pub fn emit(&mut self, node: &impl Renderable) -> &mut Self {
        for fragment in node.to_fragments() {
            self.apply_fragment(fragment);
        }
        self
    }

    pub fn apply_fragment(&mut self, fragment: CodeFragment) {
        match fragment {
            CodeFragment::Line(s) => {
                self.push_line(&s);
            }
            CodeFragment::Blank => {
                self.push_blank();
            }
            CodeFragment::Raw(s) => {
                self.push_raw(&s);
            }
            CodeFragment::Block {
                header,
                body,
                close,
            } => {
                self.push_line(&header);
                self.push_indent();
                for f in body {
                    self.apply_fragment(f);
                }
                self.push_dedent();
                if let Some(c) = close {
                    self.push_line(&c);
                }
            }
            CodeFragment::Indent(fragments) => {
                self.push_indent();
                for f in fragments {
                    self.apply_fragment(f);
                }
                self.push_dedent();
            }
            CodeFragment::Sequence(fragments) => {
                for f in fragments {
                    self.apply_fragment(f);
                }
            }
            CodeFragment::Comment { prefix, text } => {
                self.push_comment(prefix, &text);
            }
        }
    }

    // chaining variants

    pub fn line(mut self, s: &str) -> Self {
        self.push_line(s);
        self
    }

    pub fn lines(mut self, text: &str) -> Self {
        self.push_lines(text);
        self
    }

    pub fn blank(mut self) -> Self {
        self.push_blank();
        self
    }

    pub fn raw(mut self, s: &str) -> Self {
        self.push_raw(s);
        self
    }

    pub fn indent(mut self) -> Self {
        self.push_indent();
        self
    }

    pub fn dedent(mut self) -> Self {
        self.push_dedent();
        self
    }

    /// Add a header line and an indented body, without a closing line
    /// (Python, YAML).
    pub fn block<F>(self, header: &str, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let builder = self.line(header).indent();
        f(builder).dedent()
    }

    /// Header, indented body, then `close` at the header's level.
    ///
    /// ```
    /// use crudforge_codegen::builder::CodeBuilder;
    ///
    /// let code = CodeBuilder::typescript()
    ///     .block_with_close("export class Post {", "}", |b| b.line("id!: number;"))
    ///     .build();
    /// assert_eq!(code, "export class Post {\n  id!: number;\n}\n");
    /// ```
    pub fn block_with_close<F>(self, header: &str, close: &str, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let builder = self.line(header).indent();
        f(builder).dedent().line(close)
    }

    /// Add a doc or line comment (`prefix text`).
    pub fn doc(mut self, prefix: &str, text: &str) -> Self {
        self.push_comment(prefix, text);
        self
    }

    pub fn rust_doc(self, text: &str) -> Self {
        self.doc("///", text)
    }

    /// Add a single-line JSDoc/Javadoc comment (`/** text */`).
    pub fn jsdoc(mut self, text: &str) -> Self {
        self.write_indent();
        self.buffer.push_str("/** ");
        self.buffer.push_str(text);
        self.buffer.push_str(" */\n");
        self
    }

    pub fn emit_node(mut self, node: &impl Renderable) -> Self {
        self.emit(node);
        self
    }

    pub fn when<F>(self, condition: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition { f(self) } else { self }
    }

    /// Fold `f` over `items`.
    pub fn each<T, I, F>(mut self, items: I, f: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(Self, T) -> Self,
    {
        for item in items {
            self = f(self, item);
        }
        self
    }

    pub fn build(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(self.indent.as_str());
        }
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::rust()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let code = CodeBuilder::rust()
            .line("fn main() {")
            .indent()
            .line("println!(\"Hello\");")
            .dedent()
            .line("}")
            .build();

        assert_eq!(code, "fn main() {\n    println!(\"Hello\");\n}\n");
    }

    #[test]
    fn test_python_block() {
        let code = CodeBuilder::python()
            .block("def health():", |b| b.line("return {\"status\": \"ok\"}"))
            .line("x = 1")
            .build();

        assert_eq!(code, "def health():\n    return {\"status\": \"ok\"}\nx = 1\n");
    }

    #[test]
    fn test_lines_respects_indent() {
        let code = CodeBuilder::go()
            .indent()
            .lines("if err != nil {\n\treturn err\n}\n\nreturn nil\n")
            .build();

        assert_eq!(code, "\tif err != nil {\n\t\treturn err\n\t}\n\n\treturn nil\n");
    }

    #[test]
    fn test_conditional_and_each() {
        let code = CodeBuilder::java()
            .when(false, |b| b.line("@Deprecated"))
            .line("enum Status {")
            .indent()
            .each(["DRAFT", "PUBLISHED"], |b, v| b.line(&format!("{},", v)))
            .dedent()
            .line("}")
            .build();

        assert_eq!(code, "enum Status {\n    DRAFT,\n    PUBLISHED,\n}\n");
    }

    #[test]
    fn test_comments() {
        let code = CodeBuilder::typescript()
            .jsdoc("A blog post")
            .doc("//", "")
            .rust_doc("field")
            .build();

        assert_eq!(code, "/** A blog post */\n//\n/// field\n");
    }

    #[test]
    fn test_emit_block_fragment() {
        struct Handler;
        impl Renderable for Handler {
            fn to_fragments(&self) -> Vec<CodeFragment> {
                vec![
                    CodeFragment::comment("//", "List posts"),
                    CodeFragment::block(
                        "func list() {",
                        vec![CodeFragment::line("return")],
                        Some("}"),
                    ),
                ]
            }
        }

        let mut builder = CodeBuilder::go();
        builder.emit(&Handler);
        assert_eq!(builder.build(), "// List posts\nfunc list() {\n\treturn\n}\n");
    }
}
