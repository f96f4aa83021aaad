//! Naming conventions for generated languages.

use crudforge_core::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};
use crudforge_schema::Target;

/// Language-specific naming rules.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    /// Language name used in diagnostics.
    pub language: &'static str,
    /// Entity name to type name (`blog_post` -> `BlogPost`).
    pub to_type: fn(&str) -> String,
    /// Entity name to file stem (`BlogPost` -> `blog_post` or `blog-post`).
    pub to_file: fn(&str) -> String,
    /// Column name to field/property name.
    pub to_field: fn(&str) -> String,
    pub reserved_words: &'static [&'static str],
    /// Escape a reserved word (e.g., `type` -> `r#type` in Rust).
    pub escape_reserved: fn(&str) -> String,
}

impl NamingConvention {
    pub fn for_target(target: Target) -> &'static NamingConvention {
        match target {
            Target::RustAxum => &RUST_NAMING,
            Target::TypescriptNestjs => &TYPESCRIPT_NAMING,
            Target::GoGin | Target::GoChi => &GO_NAMING,
            Target::PythonFastapi => &PYTHON_NAMING,
            Target::JavaSpring => &JAVA_NAMING,
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    /// Get a safe name, escaping if necessary.
    pub fn safe_name(&self, name: &str) -> String {
        if self.is_reserved(name) {
            (self.escape_reserved)(name)
        } else {
            name.to_string()
        }
    }

    pub fn type_name(&self, name: &str) -> String {
        self.safe_name(&(self.to_type)(name))
    }

    /// File names are never escaped.
    pub fn file_name(&self, name: &str) -> String {
        (self.to_file)(name)
    }

    pub fn field_name(&self, name: &str) -> String {
        self.safe_name(&(self.to_field)(name))
    }

    /// Whether a column name collides with a reserved word once converted.
    pub fn field_is_reserved(&self, name: &str) -> bool {
        self.is_reserved(&(self.to_field)(name))
    }
}

fn suffix_underscore(name: &str) -> String {
    format!("{}_", name)
}

pub const RUST_NAMING: NamingConvention = NamingConvention {
    language: "Rust",
    to_type: to_pascal_case,
    to_file: to_snake_case,
    to_field: to_snake_case,
    reserved_words: &[
        "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else",
        "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
        "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
        "trait", "true", "type", "unsafe", "use", "where", "while", "yield",
    ],
    escape_reserved: |name| format!("r#{}", name),
};

pub const TYPESCRIPT_NAMING: NamingConvention = NamingConvention {
    language: "TypeScript",
    to_type: to_pascal_case,
    to_file: to_kebab_case,
    to_field: to_camel_case,
    reserved_words: &[
        "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
        "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
        "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
        "true", "try", "typeof", "var", "void", "while", "with",
    ],
    escape_reserved: suffix_underscore,
};

pub const GO_NAMING: NamingConvention = NamingConvention {
    language: "Go",
    to_type: to_pascal_case,
    to_file: to_snake_case,
    to_field: to_camel_case,
    reserved_words: &[
        "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
        "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
        "return", "select", "struct", "switch", "type", "var",
    ],
    escape_reserved: suffix_underscore,
};

pub const PYTHON_NAMING: NamingConvention = NamingConvention {
    language: "Python",
    to_type: to_pascal_case,
    to_file: to_snake_case,
    to_field: to_snake_case,
    reserved_words: &[
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield",
    ],
    escape_reserved: suffix_underscore,
};

pub const JAVA_NAMING: NamingConvention = NamingConvention {
    language: "Java",
    to_type: to_pascal_case,
    to_file: to_pascal_case,
    to_field: to_camel_case,
    reserved_words: &[
        "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
        "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
        "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
        "interface", "long", "native", "new", "package", "private", "protected", "public",
        "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
        "throw", "throws", "transient", "try", "void", "volatile", "while",
    ],
    escape_reserved: suffix_underscore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_escaping() {
        assert_eq!(RUST_NAMING.field_name("type"), "r#type");
        assert_eq!(RUST_NAMING.field_name("title"), "title");
        assert_eq!(RUST_NAMING.type_name("blog_posts"), "BlogPosts");
    }

    #[test]
    fn test_camel_case_targets() {
        assert_eq!(TYPESCRIPT_NAMING.field_name("created_at"), "createdAt");
        assert_eq!(TYPESCRIPT_NAMING.file_name("BlogPost"), "blog-post");
        assert_eq!(JAVA_NAMING.field_name("default"), "default_");
        assert_eq!(JAVA_NAMING.file_name("blog_post"), "BlogPost");
        assert!(GO_NAMING.field_is_reserved("range"));
    }

    #[test]
    fn test_for_target() {
        assert_eq!(NamingConvention::for_target(Target::GoChi).language, "Go");
        assert_eq!(
            NamingConvention::for_target(Target::PythonFastapi).field_name("from"),
            "from_"
        );
    }
}
