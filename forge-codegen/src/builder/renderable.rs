//! Intermediate representation for composable code pieces.

/// A piece of code, independent of indentation.
///
/// Nodes produce fragments; a [`CodeBuilder`](super::CodeBuilder) applies
/// them at its current indentation level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeFragment {
    /// A single line.
    Line(String),
    /// An empty line.
    Blank,
    /// Text emitted as-is, without indentation or newline.
    Raw(String),
    /// A header line, an indented body and an optional closing line.
    Block {
        header: String,
        body: Vec<CodeFragment>,
        close: Option<String>,
    },
    /// Fragments one level deeper.
    Indent(Vec<CodeFragment>),
    /// Fragments at the current level.
    Sequence(Vec<CodeFragment>),
    /// A line comment with the given prefix (`///`, `//`, `#`).
    Comment { prefix: &'static str, text: String },
}

impl CodeFragment {
    pub fn line(s: impl Into<String>) -> Self {
        Self::Line(s.into())
    }

    pub fn block(
        header: impl Into<String>,
        body: Vec<CodeFragment>,
        close: Option<&str>,
    ) -> Self {
        Self::Block {
            header: header.into(),
            body,
            close: close.map(str::to_string),
        }
    }

    pub fn comment(prefix: &'static str, text: impl Into<String>) -> Self {
        Self::Comment {
            prefix,
            text: text.into(),
        }
    }
}

/// Types that can be rendered to code fragments.
pub trait Renderable {
    fn to_fragments(&self) -> Vec<CodeFragment>;
}

impl Renderable for CodeFragment {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![self.clone()]
    }
}

impl<T: Renderable> Renderable for Vec<T> {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        self.iter().flat_map(Renderable::to_fragments).collect()
    }
}
