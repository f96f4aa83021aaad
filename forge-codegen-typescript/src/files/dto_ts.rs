//! Request and response shapes under `src/<entity>/dto/`.

use std::path::{Path, PathBuf};

use crudforge_codegen::TypeMapper;
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field};

use crate::{
    ast::{Class, Property},
    code_file::CodeFile,
    project::TsProject,
};

/// class-validator decorators for a request field.
fn validators(field: &Field, optional: bool) -> Vec<String> {
    let mut out = Vec::new();
    if optional {
        out.push("IsOptional()".to_string());
    }
    match &field.ty {
        ty if ty.is_integer() => out.push("IsInt()".into()),
        ColumnType::Decimal { .. } | ColumnType::Real | ColumnType::Double => {
            out.push("IsNumber()".into())
        }
        ColumnType::Boolean => out.push("IsBoolean()".into()),
        ColumnType::Uuid => out.push("IsUUID()".into()),
        ColumnType::Date | ColumnType::Timestamp | ColumnType::TimestampTz => {
            out.push("IsDateString()".into())
        }
        ColumnType::Json => out.push("IsObject()".into()),
        ColumnType::Binary => {
            out.push("IsArray()".into());
            out.push("IsInt({ each: true })".into());
        }
        ColumnType::Enum(values) => {
            let values: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
            out.push(format!("IsIn([{}])", values.join(", ")));
        }
        ty => {
            if field.name.to_ascii_lowercase().contains("email") {
                out.push("IsEmail()".into());
            } else {
                out.push("IsString()".into());
            }
            if let Some(max) = ty.max_length() {
                out.push(format!("MaxLength({})", max));
            }
        }
    }
    out
}

/// Decorator name of a validator call (`MaxLength(50)` -> `MaxLength`).
fn symbol(call: &str) -> &str {
    call.split('(').next().unwrap_or(call)
}

/// Which request a DTO validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtoKind {
    Create,
    Update,
}

/// `dto/create-<entity>.dto.ts` or `dto/update-<entity>.dto.ts`.
pub struct RequestDtoTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
    kind: DtoKind,
}

impl<'a> RequestDtoTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity, kind: DtoKind) -> Self {
        Self {
            project,
            entity,
            kind,
        }
    }

    pub fn class_name(entity: &Entity, kind: DtoKind) -> String {
        match kind {
            DtoKind::Create => format!("Create{}Dto", entity.name),
            DtoKind::Update => format!("Update{}Dto", entity.name),
        }
    }

    fn fields(&self) -> Vec<&'a Field> {
        match self.kind {
            DtoKind::Create => self.entity.insertable_fields().collect(),
            DtoKind::Update => self.entity.updatable_fields().collect(),
        }
    }
}

impl GeneratedFile for RequestDtoTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        let prefix = match self.kind {
            DtoKind::Create => "create",
            DtoKind::Update => "update",
        };
        base.join("src")
            .join(&dir)
            .join("dto")
            .join(format!("{}-{}.dto.ts", prefix, dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut file = CodeFile::new();
        let mut properties = Vec::new();
        for field in self.fields() {
            let required = self.kind == DtoKind::Create && field.required_on_create();
            let calls = validators(field, !required);
            for call in &calls {
                file.imports_mut().add("class-validator", symbol(call));
            }

            let ty = self.project.types.dto_type(&field.ty);
            let mut property = if required {
                Property::new(self.project.prop(field), ty)
            } else if field.nullable {
                Property::new(self.project.prop(field), format!("{} | null", ty)).optional()
            } else {
                Property::new(self.project.prop(field), ty).optional()
            };
            for call in calls {
                property = property.decorator(call);
            }
            properties.push(property);
        }

        file.add(&Class::new(Self::class_name(self.entity, self.kind)).properties(properties))
            .render()
    }
}

/// `dto/<entity>-response.dto.ts`: the JSON shape returned by the API.
pub struct ResponseDtoTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
}

impl<'a> ResponseDtoTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Response", entity.name)
    }

    /// Response type of a column; bytes are sent as number arrays.
    pub fn field_type(project: &TsProject<'_>, field: &Field) -> String {
        let ty = match field.ty {
            ColumnType::Binary => "number[]".to_string(),
            _ => project.types.map_type(&field.ty),
        };
        if field.nullable && !field.primary_key {
            format!("{} | null", ty)
        } else {
            ty
        }
    }
}

impl GeneratedFile for ResponseDtoTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        base.join("src")
            .join(&dir)
            .join("dto")
            .join(format!("{}-response.dto.ts", dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let properties = self
            .entity
            .fields
            .iter()
            .filter(|f| !self.project.is_secret(self.entity, f))
            .map(|f| {
                let mut property =
                    Property::new(self.project.prop(f), Self::field_type(&self.project, f));
                if let Some(description) = &f.description {
                    property = property.doc(description.clone());
                }
                property
            });
        CodeFile::new()
            .add(&Class::new(Self::class_name(self.entity)).properties(properties))
            .render()
    }
}
