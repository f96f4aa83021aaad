//! Indentation units per target language.

/// One level of indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Spaces with the specified width.
    Spaces(u8),
    /// Tab character.
    Tab,
}

impl Indent {
    pub const RUST: Self = Self::Spaces(4);
    pub const TYPESCRIPT: Self = Self::Spaces(2);
    /// gofmt uses tabs.
    pub const GO: Self = Self::Tab;
    pub const PYTHON: Self = Self::Spaces(4);
    pub const JAVA: Self = Self::Spaces(4);

    /// String for one indent level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spaces(2) => "  ",
            Self::Spaces(8) => "        ",
            Self::Spaces(_) => "    ",
            Self::Tab => "\t",
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::RUST
    }
}
