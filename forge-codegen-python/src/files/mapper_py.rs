use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::Entity;

use crate::{files::SchemaPy, project::PyProject, py_file::PyFile};

/// `app/mappers/<entity>.py`: conversions between rows and API shapes.
pub struct MapperPy<'a> {
    project: PyProject<'a>,
    entity: &'a Entity,
}

impl<'a> MapperPy<'a> {
    pub fn new(project: PyProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }
}

impl GeneratedFile for MapperPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app")
            .join("mappers")
            .join(format!("{}.py", self.project.module(self.entity)))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let name = &entity.name;
        let module = self.project.module(entity);
        let create = SchemaPy::create_name(entity);
        let update = SchemaPy::update_name(entity);
        let response = SchemaPy::response_name(entity);

        PyFile::new()
            .doc(format!("Conversions between {name} rows and API shapes."))
            .import("collections.abc", "Iterable")
            .import("typing", "Any")
            .import(&format!("app.models.{module}"), name)
            .import_all(
                &format!("app.schemas.{module}"),
                [create.as_str(), update.as_str(), response.as_str()],
            )
            .raw(format!(
                r#"def to_model(body: {create}) -> {name}:
    """Build a new row. Omitted and null fields fall back to column defaults."""
    return {name}(**body.model_dump(exclude_none=True))"#
            ))
            .raw(format!(
                r#"def changes(body: {update}) -> dict[str, Any]:
    """Only the fields the client sent."""
    return body.model_dump(exclude_unset=True)"#
            ))
            .raw(format!(
                r#"def to_response(row: {name}) -> {response}:
    return {response}.model_validate(row)"#
            ))
            .raw(format!(
                r#"def to_responses(rows: Iterable[{name}]) -> list[{response}]:
    return [to_response(row) for row in rows]"#
            ))
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_mapper_functions() {
        let ctx = compile_sql(BLOG_SQL, Target::PythonFastapi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let tag = model.entity("Tag").unwrap();
        let out = MapperPy::new(PyProject::new(&model, &computed), tag).render();

        assert!(out.contains("from app.schemas.tag import TagCreate, TagResponse, TagUpdate\n"));
        assert!(out.contains("def to_model(body: TagCreate) -> Tag:\n"));
        assert!(out.contains("    return body.model_dump(exclude_unset=True)\n"));
        assert!(out.contains("def to_responses(rows: Iterable[Tag]) -> list[TagResponse]:\n"));
    }
}
