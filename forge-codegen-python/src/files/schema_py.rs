use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field};

use crate::{
    project::PyProject,
    py_file::{PyFile, quote},
};

/// `app/schemas/<entity>.py`: pydantic request and response models.
pub struct SchemaPy<'a> {
    project: PyProject<'a>,
    entity: &'a Entity,
}

impl<'a> SchemaPy<'a> {
    pub fn new(project: PyProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    pub fn create_name(entity: &Entity) -> String {
        format!("{}Create", entity.name)
    }

    pub fn update_name(entity: &Entity) -> String {
        format!("{}Update", entity.name)
    }

    pub fn response_name(entity: &Entity) -> String {
        format!("{}Response", entity.name)
    }

    fn response_fields(&self) -> impl Iterator<Item = &'a Field> + '_ {
        self.entity
            .fields
            .iter()
            .filter(|f| !self.project.is_secret(self.entity, f))
    }

    /// One annotated attribute. `optional` makes it nullable with a `None`
    /// default; inputs also carry their length limit.
    fn attribute(&self, file: &mut PyFile, field: &Field, optional: bool, input: bool) -> String {
        let imports = file.imports_mut();
        self.project.use_type(imports, &field.ty);
        let mut ty = self.project.types.schema_type(&field.ty);
        if matches!(&field.ty, ColumnType::Enum(values) if !values.is_empty()) {
            imports.add("typing", "Literal");
        }
        if optional || (field.nullable && !field.primary_key) {
            ty.push_str(" | None");
        }

        let attr = self.project.attr(field);
        let mut constraints = Vec::new();
        if attr != field.name {
            constraints.push(format!("alias={}", quote(&field.name)));
        }
        if let Some(max) = field.ty.max_length().filter(|_| input) {
            constraints.push(format!("max_length={max}"));
        }

        let value = match (optional, constraints.is_empty()) {
            (false, true) => String::new(),
            (true, true) => " = None".to_string(),
            (false, false) => format!(" = Field({})", constraints.join(", ")),
            (true, false) => format!(" = Field(default=None, {})", constraints.join(", ")),
        };
        if !constraints.is_empty() {
            imports.add("pydantic", "Field");
        }
        format!("    {attr}: {ty}{value}\n")
    }

    fn config(&self, file: &mut PyFile, from_attributes: bool, fields: &[&Field]) -> String {
        let mut options = Vec::new();
        if from_attributes {
            options.push("from_attributes=True");
        }
        if fields.iter().any(|f| self.project.attr(f) != f.name) {
            options.push("populate_by_name=True");
        }
        if fields.iter().any(|f| f.ty == ColumnType::Binary) {
            options.push("ser_json_bytes=\"base64\"");
            options.push("val_json_bytes=\"base64\"");
        }
        if options.is_empty() {
            return String::new();
        }
        file.imports_mut().add("pydantic", "ConfigDict");
        format!("    model_config = ConfigDict({})\n\n", options.join(", "))
    }

    fn class(&self, file: &mut PyFile, name: String, config: String, attributes: Vec<String>) -> String {
        file.imports_mut().add("pydantic", "BaseModel");
        let body = if attributes.is_empty() && config.is_empty() {
            "    pass\n".to_string()
        } else {
            format!("{config}{}", attributes.concat())
        };
        format!("class {name}(BaseModel):\n{body}")
    }
}

impl GeneratedFile for SchemaPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app")
            .join("schemas")
            .join(format!("{}.py", self.project.module(self.entity)))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let mut file = PyFile::new().doc(format!(
            "Request and response shapes for {}.",
            entity.plural.replace('_', " ")
        ));

        let create_fields: Vec<&Field> = entity.insertable_fields().collect();
        let attributes = create_fields
            .iter()
            .map(|f| self.attribute(&mut file, f, !f.required_on_create(), true))
            .collect();
        let config = self.config(&mut file, false, &create_fields);
        let create = self.class(&mut file, Self::create_name(entity), config, attributes);

        let update_fields: Vec<&Field> = entity.updatable_fields().collect();
        let attributes = update_fields
            .iter()
            .map(|f| self.attribute(&mut file, f, true, true))
            .collect();
        let config = self.config(&mut file, false, &update_fields);
        let update = self.class(&mut file, Self::update_name(entity), config, attributes);

        let response_fields: Vec<&Field> = self.response_fields().collect();
        let attributes = response_fields
            .iter()
            .map(|f| self.attribute(&mut file, f, false, false))
            .collect();
        let config = self.config(&mut file, true, &response_fields);
        let response = self.class(&mut file, Self::response_name(entity), config, attributes);

        file.raw(create).raw(update).raw(response).render()
    }
}
