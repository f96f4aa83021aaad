//! TypeScript class builder.

use crudforge_codegen::{CodeFragment, Renderable};

/// One fragment per line of a decorator, so multi-line arguments keep the
/// member's indentation.
fn decorator(text: &str) -> impl Iterator<Item = CodeFragment> + '_ {
    text.lines().enumerate().map(|(i, line)| {
        if i == 0 {
            CodeFragment::line(format!("@{}", line))
        } else {
            CodeFragment::line(line)
        }
    })
}

/// A class property with its decorators.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    ty: String,
    decorators: Vec<String>,
    optional: bool,
    doc: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            decorators: Vec::new(),
            optional: false,
            doc: None,
        }
    }

    /// Add a decorator, written without the leading `@`.
    pub fn decorator(mut self, decorator: impl Into<String>) -> Self {
        self.decorators.push(decorator.into());
        self
    }

    /// `name?: T` instead of the definite `name!: T`.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl Renderable for Property {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut out = Vec::new();
        if let Some(doc) = &self.doc {
            out.push(CodeFragment::line(format!("/** {} */", doc)));
        }
        out.extend(self.decorators.iter().flat_map(|d| decorator(d)));
        let marker = if self.optional { "?" } else { "!" };
        out.push(CodeFragment::line(format!("{}{}: {};", self.name, marker, self.ty)));
        out
    }
}

/// A method with decorators and a free-form body.
#[derive(Debug, Clone)]
pub struct Method {
    signature: String,
    decorators: Vec<String>,
    body: Vec<String>,
}

impl Method {
    /// `signature` is everything before the opening brace, such as
    /// `async show(@Param('id') id: string): Promise<Post>`.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            decorators: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn decorator(mut self, decorator: impl Into<String>) -> Self {
        self.decorators.push(decorator.into());
        self
    }

    /// Set the body; each line of `content` is one body line.
    pub fn body(mut self, content: impl AsRef<str>) -> Self {
        self.body = content.as_ref().lines().map(str::to_string).collect();
        self
    }
}

impl Renderable for Method {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut out: Vec<CodeFragment> =
            self.decorators.iter().flat_map(|d| decorator(d)).collect();
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
            format!("{} {{", self.signature),
            body,
            Some("}"),
        ));
        out
    }
}

#[derive(Debug, Clone)]
enum Member {
    Property(Property),
    Method(Method),
    /// Lines emitted verbatim, such as a constructor.
    Raw(String),
}

/// Builder for exported TypeScript classes.
#[derive(Debug, Clone)]
pub struct Class {
    name: String,
    decorators: Vec<String>,
    implements: Option<String>,
    members: Vec<Member>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decorators: Vec::new(),
            implements: None,
            members: Vec::new(),
        }
    }

    pub fn decorator(mut self, decorator: impl Into<String>) -> Self {
        self.decorators.push(decorator.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements = Some(interface.into());
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.members.push(Member::Property(property));
        self
    }

    pub fn properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.members
            .extend(properties.into_iter().map(Member::Property));
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.members.push(Member::Method(method));
        self
    }

    pub fn raw(mut self, code: impl Into<String>) -> Self {
        self.members.push(Member::Raw(code.into()));
        self
    }
}

impl Renderable for Class {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut out: Vec<CodeFragment> =
            self.decorators.iter().flat_map(|d| decorator(d)).collect();

        let mut body = Vec::new();
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                body.push(CodeFragment::Blank);
            }
            match member {
                Member::Property(p) => body.extend(p.to_fragments()),
                Member::Method(m) => body.extend(m.to_fragments()),
                Member::Raw(code) => body.extend(code.lines().map(|l| {
                    if l.is_empty() {
                        CodeFragment::Blank
                    } else {
                        CodeFragment::line(l)
                    }
                })),
            }
        }

        let header = match &self.implements {
            Some(interface) => format!("export class {} implements {} {{", self.name, interface),
            None => format!("export class {} {{", self.name),
        };
        if body.is_empty() {
            out.push(CodeFragment::line(format!("{}}}", header)));
        } else {
            out.push(CodeFragment::block(header, body, Some("}")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::CodeBuilder;

    use super::*;

    #[test]
    fn test_entity_class() {
        let class = Class::new("Tag")
            .decorator("Entity({ name: 'tags' })")
            .property(Property::new("id", "number").decorator("PrimaryGeneratedColumn()"))
            .property(
                Property::new("name", "string").decorator("Column({ type: 'varchar', length: 50 })"),
            );
        let code = CodeBuilder::typescript().emit_node(&class).build();
        assert_eq!(
            code,
            "@Entity({ name: 'tags' })\nexport class Tag {\n  @PrimaryGeneratedColumn()\n  id!: number;\n\n  @Column({ type: 'varchar', length: 50 })\n  name!: string;\n}\n"
        );
    }

    #[test]
    fn test_method_with_decorators() {
        let class = Class::new("TagController").method(
            Method::new("list(): string[]")
                .decorator("Get()")
                .body("return [];"),
        );
        let code = CodeBuilder::typescript().emit_node(&class).build();
        assert_eq!(
            code,
            "export class TagController {\n  @Get()\n  list(): string[] {\n    return [];\n  }\n}\n"
        );
    }

    #[test]
    fn test_empty_class_and_optional_property() {
        let code = CodeBuilder::typescript()
            .emit_node(&Class::new("TagModule").decorator("Module({})"))
            .build();
        assert_eq!(code, "@Module({})\nexport class TagModule {}\n");

        let code = CodeBuilder::typescript()
            .emit_node(&Property::new("name", "string | null").optional())
            .build();
        assert_eq!(code, "name?: string | null;\n");
    }

    #[test]
    fn test_multiline_decorator_keeps_indent() {
        let class = Class::new("Post").property(
            Property::new("tags", "Tag[]")
                .decorator("JoinTable({\n  name: 'post_tags',\n})")
                .optional(),
        );
        let code = CodeBuilder::typescript().emit_node(&class).build();
        assert_eq!(
            code,
            "export class Post {\n  @JoinTable({\n    name: 'post_tags',\n  })\n  tags?: Tag[];\n}\n"
        );
    }
}
