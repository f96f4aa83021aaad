use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field};

use super::dto_ts::{DtoKind, RequestDtoTs, ResponseDtoTs};
use crate::{code_file::CodeFile, project::TsProject};

/// `src/<entity>/<entity>.mapper.ts`: conversions between the entity and
/// its DTOs.
pub struct MapperTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
}

impl<'a> MapperTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Mapper", entity.name)
    }

    /// Request value converted to the entity's property type.
    fn from_request(&self, field: &Field, required: bool) -> String {
        let access = format!("dto.{}", self.project.prop(field));
        if !self.project.types.needs_conversion(&field.ty) {
            return access;
        }
        let converted = self.project.types.convert(&field.ty, &access);
        if required {
            converted
        } else {
            format!("{0} == null ? {0} : {1}", access, converted)
        }
    }

    fn to_response(&self, field: &Field) -> String {
        let access = format!("row.{}", self.project.prop(field));
        match field.ty {
            ColumnType::Binary if field.nullable => {
                format!("{0} == null ? {0} : Array.from({0})", access)
            }
            ColumnType::Binary => format!("Array.from({})", access),
            _ => access,
        }
    }

    fn request_method(&self, kind: DtoKind) -> String {
        let (name, fields): (&str, Vec<&Field>) = match kind {
            DtoKind::Create => ("fromCreate", self.entity.insertable_fields().collect()),
            DtoKind::Update => ("fromUpdate", self.entity.updatable_fields().collect()),
        };
        let values: Vec<String> = fields
            .iter()
            .map(|f| {
                let required = kind == DtoKind::Create && f.required_on_create();
                format!("      {}: {},", self.project.prop(f), self.from_request(f, required))
            })
            .collect();
        let dto = RequestDtoTs::class_name(self.entity, kind);
        if values.is_empty() {
            return format!(
                "  static {name}(_dto: {dto}): Partial<{entity}> {{\n    return {{}};\n  }}",
                entity = self.entity.name
            );
        }
        format!(
            "  static {name}(dto: {dto}): Partial<{entity}> {{\n    return compact({{\n{values}\n    }});\n  }}",
            entity = self.entity.name,
            values = values.join("\n"),
        )
    }
}

impl GeneratedFile for MapperTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        base.join("src").join(&dir).join(format!("{}.mapper.ts", dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let dir = self.project.dir(self.entity);
        let name = &self.entity.name;
        let response = ResponseDtoTs::class_name(self.entity);

        let mut file = CodeFile::new()
            .import(&format!("./{}.entity", dir), name)
            .import(&format!("./dto/{}-response.dto", dir), &response)
            .import(
                &format!("./dto/create-{}.dto", dir),
                &RequestDtoTs::class_name(self.entity, DtoKind::Create),
            )
            .import(
                &format!("./dto/update-{}.dto", dir),
                &RequestDtoTs::class_name(self.entity, DtoKind::Update),
            );
        let has_values = self.entity.insertable_fields().next().is_some()
            || self.entity.updatable_fields().next().is_some();
        if has_values {
            file = file.import("../common/mapping", "compact");
        }

        let response_values: Vec<String> = self
            .entity
            .fields
            .iter()
            .filter(|f| !self.project.is_secret(self.entity, f))
            .map(|f| format!("      {}: {},", self.project.prop(f), self.to_response(f)))
            .collect();

        file.raw(format!(
            "export class {mapper} {{\n  static toResponse(row: {name}): {response} {{\n    return {{\n{values}\n    }};\n  }}\n\n{create}\n\n{update}\n}}",
            mapper = Self::class_name(self.entity),
            values = response_values.join("\n"),
            create = self.request_method(DtoKind::Create),
            update = self.request_method(DtoKind::Update),
        ))
        .render()
    }
}
