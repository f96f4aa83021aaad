//! Rust struct builder.

use crudforge_codegen::{CodeFragment, Renderable};

/// A field in a Rust struct.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub doc: Option<String>,
    pub attrs: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            doc: None,
            attrs: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }
}

/// Builder for public Rust structs.
#[derive(Debug, Clone)]
pub struct Struct {
    name: String,
    doc: Option<String>,
    derives: Vec<String>,
    attrs: Vec<String>,
    fields: Vec<Field>,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            derives: Vec::new(),
            attrs: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn derive(mut self, derive: impl Into<String>) -> Self {
        self.derives.push(derive.into());
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    fn fields_to_fragments(&self) -> Vec<CodeFragment> {
        self.fields
            .iter()
            .flat_map(|field| {
                let mut fragments = Vec::new();
                if let Some(doc) = &field.doc {
                    fragments.push(CodeFragment::comment("///", doc.clone()));
                }
                for attr in &field.attrs {
                    fragments.push(CodeFragment::line(format!("#[{}]", attr)));
                }
                fragments.push(CodeFragment::line(format!(
                    "pub {}: {},",
                    field.name, field.ty
                )));
                fragments
            })
            .collect()
    }
}

impl Renderable for Struct {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments = Vec::new();

        if let Some(doc) = &self.doc {
            fragments.push(CodeFragment::comment("///", doc.clone()));
        }

        if !self.derives.is_empty() {
            fragments.push(CodeFragment::line(format!(
                "#[derive({})]",
                self.derives.join(", ")
            )));
        }

        for attr in &self.attrs {
            fragments.push(CodeFragment::line(format!("#[{}]", attr)));
        }

        if self.fields.is_empty() {
            fragments.push(CodeFragment::line(format!("pub struct {} {{}}", self.name)));
        } else {
            fragments.push(CodeFragment::block(
                format!("pub struct {} {{", self.name),
                self.fields_to_fragments(),
                Some("}"),
            ));
        }

        fragments
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::CodeBuilder;

    use super::*;

    fn build(s: &Struct) -> String {
        CodeBuilder::rust().emit_node(s).build()
    }

    #[test]
    fn test_empty_struct() {
        assert_eq!(build(&Struct::new("Empty")), "pub struct Empty {}\n");
    }

    #[test]
    fn test_struct_with_fields_and_derives() {
        let s = Struct::new("Post")
            .doc("A row of the `posts` table.")
            .derive("Debug")
            .derive("sqlx::FromRow")
            .field(Field::new("id", "i64"))
            .field(Field::new("r#type", "String").attr("sqlx(rename = \"type\")"));
        assert_eq!(
            build(&s),
            "/// A row of the `posts` table.\n\
             #[derive(Debug, sqlx::FromRow)]\n\
             pub struct Post {\n    \
                 pub id: i64,\n    \
                 #[sqlx(rename = \"type\")]\n    \
                 pub r#type: String,\n\
             }\n"
        );
    }
}
