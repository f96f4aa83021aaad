use std::path::{Path, PathBuf};

use crudforge_codegen::TypeMapper;
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field as ColumnField};

use crate::{
    ast::{Field, Struct},
    project::RustProject,
    render::RustFile,
};

/// `src/models/<entity>.rs`: the row type and its request/response bodies.
pub struct ModelRs<'a> {
    project: RustProject<'a>,
    entity: &'a Entity,
}

impl<'a> ModelRs<'a> {
    pub fn new(project: RustProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    fn is_secret(&self, field: &ColumnField) -> bool {
        self.entity
            .password_field()
            .is_some_and(|p| p.name == field.name)
    }

    fn field(&self, field: &ColumnField, ty: String) -> Field {
        let mut out = Field::new(self.project.field_name(field), ty);
        if let Some(description) = &field.description {
            out = out.doc(description.clone());
        }
        out
    }

    fn row(&self) -> Struct {
        let fields = self.entity.fields.iter().map(|f| {
            let mut field = self.field(f, self.project.field_type(f));
            if let Some(rename) = self.project.rename_attr(f) {
                field = field.attr(rename);
            }
            if self.is_secret(f) {
                field = field.attr("serde(skip_serializing)");
            }
            field
        });
        let doc = self
            .entity
            .description
            .clone()
            .unwrap_or_else(|| format!("A row of the `{}` table.", self.entity.table));
        Struct::new(&self.entity.name)
            .doc(doc)
            .derive("Debug")
            .derive("Clone")
            .derive("Serialize")
            .derive("sqlx::FromRow")
            .fields(fields)
    }

    /// Required columns are plain; the rest fall back to the column default.
    fn create(&self) -> Struct {
        let fields = self.entity.insertable_fields().map(|f| {
            let ty = if f.required_on_create() {
                self.project.types.map_type(&f.ty)
            } else {
                self.project.types.map_optional(&f.ty)
            };
            self.field(f, ty)
        });
        Struct::new(format!("Create{}", self.entity.name))
            .derive("Debug")
            .derive("Clone")
            .derive("Deserialize")
            .fields(fields)
    }

    /// Absent fields keep their current value.
    fn update(&self) -> Struct {
        let fields = self
            .entity
            .updatable_fields()
            .map(|f| self.field(f, self.project.types.map_optional(&f.ty)));
        Struct::new(format!("Update{}", self.entity.name))
            .derive("Debug")
            .derive("Clone")
            .derive("Default")
            .derive("Deserialize")
            .fields(fields)
    }

    fn response(&self) -> Struct {
        let fields = self
            .entity
            .fields
            .iter()
            .filter(|f| !self.is_secret(f))
            .map(|f| Field::new(self.project.field_name(f), self.project.field_type(f)));
        Struct::new(format!("{}Response", self.entity.name))
            .doc("Response body; credential columns are never sent.")
            .derive("Debug")
            .derive("Clone")
            .derive("Serialize")
            .fields(fields)
    }

    fn response_from(&self) -> String {
        let name = &self.entity.name;
        let assignments: Vec<String> = self
            .entity
            .fields
            .iter()
            .filter(|f| !self.is_secret(f))
            .map(|f| {
                let field = self.project.field_name(f);
                format!("            {field}: row.{field},")
            })
            .collect();
        format!(
            "impl From<{name}> for {name}Response {{\n    fn from(row: {name}) -> Self {{\n        Self {{\n{}\n        }}\n    }}\n}}",
            assignments.join("\n")
        )
    }
}

impl GeneratedFile for ModelRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src")
            .join("models")
            .join(format!("{}.rs", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        RustFile::new()
            .import("serde", "Deserialize")
            .import("serde", "Serialize")
            .add(&self.row())
            .add(&self.create())
            .add(&self.update())
            .add(&self.response())
            .raw(self.response_from())
            .render()
    }
}
