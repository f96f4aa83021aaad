use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field};

use crate::{
    java_file::{JavaFile, add_class, quote},
    project::JavaProject,
};

/// Which body a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtoKind {
    Create,
    Update,
    Response,
}

impl DtoKind {
    pub fn class_name(self, entity: &Entity) -> String {
        let suffix = match self {
            DtoKind::Create => "CreateRequest",
            DtoKind::Update => "UpdateRequest",
            DtoKind::Response => "Response",
        };
        format!("{}{suffix}", entity.name)
    }
}

/// `<entity>/<Entity>{CreateRequest,UpdateRequest,Response}.java`: the JSON
/// bodies, as records keyed by column name.
pub struct DtoJava<'a> {
    project: JavaProject<'a>,
    entity: &'a Entity,
    kind: DtoKind,
}

impl<'a> DtoJava<'a> {
    pub fn new(project: JavaProject<'a>, entity: &'a Entity, kind: DtoKind) -> Self {
        Self {
            project,
            entity,
            kind,
        }
    }

    /// Fields carried by the record, in column order.
    pub fn fields(project: JavaProject<'a>, entity: &'a Entity, kind: DtoKind) -> Vec<&'a Field> {
        match kind {
            DtoKind::Create => entity.insertable_fields().collect(),
            DtoKind::Update => entity.updatable_fields().collect(),
            DtoKind::Response => entity
                .fields
                .iter()
                .filter(|f| !project.is_secret(entity, f))
                .collect(),
        }
    }

    fn component(&self, file: &mut JavaFile, field: &Field) -> String {
        let prop = self.project.prop(field);
        let mut annotations = Vec::new();
        if prop != field.name {
            add_class(file.imports_mut(), "com.fasterxml.jackson.annotation.JsonProperty");
            annotations.push(format!("@JsonProperty({})", quote(&field.name)));
        }
        if self.kind == DtoKind::Create && field.required_on_create() {
            add_class(file.imports_mut(), "jakarta.validation.constraints.NotNull");
            annotations.push("@NotNull".to_string());
        }
        if self.kind != DtoKind::Response {
            if let Some(max) = field.ty.max_length() {
                add_class(file.imports_mut(), "jakarta.validation.constraints.Size");
                annotations.push(format!("@Size(max = {max})"));
            }
        }
        self.project.use_type(file.imports_mut(), &field.ty);
        annotations.push(format!("{} {prop}", self.project.field_type(field)));
        format!("        {}", annotations.join(" "))
    }
}

impl GeneratedFile for DtoJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.source_path(
            base,
            &self.project.entity_package(self.entity),
            &self.kind.class_name(self.entity),
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut file = JavaFile::new(self.project.entity_package(self.entity));
        let components = Self::fields(self.project, self.entity, self.kind)
            .into_iter()
            .map(|field| self.component(&mut file, field))
            .collect::<Vec<_>>()
            .join(",\n");
        let class = self.kind.class_name(self.entity);
        let record = if components.is_empty() {
            format!("public record {class}() {{\n}}")
        } else {
            format!("public record {class}(\n{components}) {{\n}}")
        };
        file.raw(record).render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    fn render(name: &str, kind: DtoKind) -> String {
        let ctx = compile_sql(BLOG_SQL, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let entity = model.entity(name).unwrap();
        DtoJava::new(JavaProject::new(&model, &computed), entity, kind).render()
    }

    #[test]
    fn test_create_request() {
        let out = render("Post", DtoKind::Create);
        assert!(out.contains("public record PostCreateRequest(\n"));
        assert!(out.contains("        @JsonProperty(\"author_id\") @NotNull Long authorId,\n"));
        assert!(out.contains("        @NotNull @Size(max = 200) String title,\n"));
        assert!(out.contains("        Boolean published) {\n}\n"));
        assert!(!out.contains("createdAt"));
    }

    #[test]
    fn test_update_request_is_optional() {
        let out = render("Post", DtoKind::Update);
        assert!(out.contains("        @Size(max = 200) String title,\n"));
        assert!(!out.contains("@NotNull"));
        assert!(!out.contains(" Long id"));
    }

    #[test]
    fn test_response_hides_password() {
        let out = render("User", DtoKind::Response);
        assert!(out.contains("        Long id,\n"));
        assert!(out.contains("        @JsonProperty(\"created_at\") OffsetDateTime createdAt) {\n}\n"));
        assert!(out.contains("import java.time.OffsetDateTime;\n"));
        assert!(!out.contains("password"));
        assert!(!out.contains("@Size"));
    }
}
