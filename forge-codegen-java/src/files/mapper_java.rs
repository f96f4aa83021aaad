use std::path::{Path, PathBuf};

use crudforge_codegen::CodeBuilder;
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::Entity;

use crate::{
    files::{DtoJava, DtoKind},
    java_file::JavaFile,
    project::JavaProject,
};

/// `<entity>/<Entity>Mapper.java`: conversions between records and the
/// entity.
pub struct MapperJava<'a> {
    project: JavaProject<'a>,
    entity: &'a Entity,
}

impl<'a> MapperJava<'a> {
    pub fn new(project: JavaProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Mapper", entity.name)
    }
}

impl GeneratedFile for MapperJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.source_path(
            base,
            &self.project.entity_package(self.entity),
            &Self::class_name(self.entity),
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let project = self.project;
        let name = &entity.name;
        let create = DtoKind::Create.class_name(entity);
        let update = DtoKind::Update.class_name(entity);
        let response = DtoKind::Response.class_name(entity);

        let body = CodeBuilder::java()
            .line("@Component")
            .block_with_close(&format!("public class {} {{", Self::class_name(entity)), "}", |b| {
                b.blank()
                    .block_with_close(
                        &format!("public {name} toEntity({create} request) {{"),
                        "}",
                        |b| {
                            DtoJava::fields(project, entity, DtoKind::Create)
                                .into_iter()
                                .fold(b.line(&format!("{name} entity = new {name}();")), |b, f| {
                                    b.line(&format!(
                                        "entity.set{}(request.{}());",
                                        project.accessor(f),
                                        project.prop(f)
                                    ))
                                })
                                .line("return entity;")
                        },
                    )
                    .blank()
                    .line("/** Copies the fields the request sets; absent fields keep their value. */")
                    .block_with_close(
                        &format!("public void apply({update} request, {name} entity) {{"),
                        "}",
                        |b| {
                            DtoJava::fields(project, entity, DtoKind::Update)
                                .into_iter()
                                .fold(b, |b, f| {
                                    let prop = project.prop(f);
                                    b.block_with_close(
                                        &format!("if (request.{prop}() != null) {{"),
                                        "}",
                                        |b| {
                                            b.line(&format!(
                                                "entity.set{}(request.{prop}());",
                                                project.accessor(f)
                                            ))
                                        },
                                    )
                                })
                        },
                    )
                    .blank()
                    .block_with_close(
                        &format!("public {response} toResponse({name} entity) {{"),
                        "}",
                        |b| {
                            let args = DtoJava::fields(project, entity, DtoKind::Response)
                                .into_iter()
                                .map(|f| format!("entity.get{}()", project.accessor(f)))
                                .collect::<Vec<_>>()
                                .join(",\n        ");
                            b.lines(&format!("return new {response}(\n        {args});"))
                        },
                    )
                    .blank()
                    .block_with_close(
                        &format!("public List<{response}> toResponses(Collection<{name}> entities) {{"),
                        "}",
                        |b| b.line("return entities.stream().map(this::toResponse).toList();"),
                    )
            })
            .build();

        JavaFile::new(project.entity_package(entity))
            .import_all([
                "java.util.Collection",
                "java.util.List",
                "org.springframework.stereotype.Component",
            ])
            .raw(body)
            .render()
    }
}
