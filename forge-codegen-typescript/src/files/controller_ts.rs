use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile, singularize};
use crudforge_ir::{Entity, Field, RelationKind};

use super::{
    dto_ts::{DtoKind, RequestDtoTs, ResponseDtoTs},
    mapper_ts::MapperTs,
    repository_ts::{RepositoryTs, relation_methods},
    service_ts::ServiceTs,
};
use crate::{
    ast::{Class, Method},
    code_file::CodeFile,
    project::TsProject,
};

/// `src/<entity>/<entity>.controller.ts`: the REST routes of one entity.
pub struct ControllerTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> ControllerTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Controller", entity.name)
    }

    /// `@Param(...)` declaration for a route parameter of `entity`'s column.
    fn param(&self, entity: &Entity, column: &str, name: &str, file: &mut CodeFile) -> String {
        let ty = self.project.key_type(entity, column);
        match self.project.key_pipe(entity, column) {
            Some(pipe) => {
                file.imports_mut().add("@nestjs/common", pipe);
                format!("@Param('{name}', {pipe}) {name}: {ty}")
            }
            None => format!("@Param('{name}') {name}: {ty}"),
        }
    }

    fn write(&self, method: Method) -> Method {
        if self.project.features().auth {
            method.decorator("UseGuards(JwtAuthGuard)")
        } else {
            method
        }
    }

    fn crud(&self, file: &mut CodeFile) -> Vec<Method> {
        let response = ResponseDtoTs::class_name(self.entity);
        let create = RequestDtoTs::class_name(self.entity, DtoKind::Create);
        let update = RequestDtoTs::class_name(self.entity, DtoKind::Update);
        let id = self.param(self.entity, &self.key.name, "id", file);

        vec![
            Method::new(format!(
                "list(@Query() query: PaginationQuery): Promise<{response}[]>"
            ))
            .decorator("Get()")
            .body("return this.service.list(query);"),
            Method::new(format!("show({id}): Promise<{response}>"))
                .decorator("Get(':id')")
                .body("return this.service.get(id);"),
            self.write(
                Method::new(format!("create(@Body() dto: {create}): Promise<{response}>"))
                    .decorator("Post()")
                    .body("return this.service.create(dto);"),
            ),
            self.write(
                Method::new(format!(
                    "update({id}, @Body() dto: {update}): Promise<{response}>"
                ))
                .decorator("Put(':id')")
                .body("return this.service.update(id, dto);"),
            ),
            self.write(
                Method::new(format!("destroy({id}): Promise<void>"))
                    .decorator("Delete(':id')")
                    .decorator("HttpCode(204)")
                    .body("return this.service.remove(id);"),
            ),
        ]
    }

    fn relations(&self, file: &mut CodeFile) -> Vec<Method> {
        let own = self.entity.kebab_name().replace('-', " ");
        let id = self.param(self.entity, &self.key.name, "id", file);
        let mut methods = Vec::new();

        for relation in &self.entity.relations {
            let Some(target) = self.project.navigable(self.entity, relation) else {
                continue;
            };
            let names = relation_methods(relation);
            let response = ResponseDtoTs::class_name(target);
            let mapper = MapperTs::class_name(target);
            let route = relation.route();
            if target.name != self.entity.name {
                let dir = self.project.dir(target);
                file.imports_mut()
                    .add(&format!("../{0}/dto/{0}-response.dto", dir), &response);
                file.imports_mut()
                    .add(&self.project.sibling_import(target, "mapper"), &mapper);
            } else {
                file.imports_mut()
                    .add(&format!("./{}.mapper", self.project.dir(target)), &mapper);
            }

            match relation.kind {
                RelationKind::ManyToOne => methods.push(
                    Method::new(format!("async {}({id}): Promise<{response}>", relation.camel_name()))
                        .decorator(format!("Get(':id/{route}')"))
                        .body(format!(
                            "const row = await this.repository.{}(id);\nif (!row) {{\n  throw new NotFoundException(`{} of {own} ${{id}} not found`);\n}}\nreturn {mapper}.toResponse(row);",
                            names[0],
                            relation.name.replace('_', " "),
                        )),
                ),
                RelationKind::OneToMany | RelationKind::ManyToMany => methods.push(
                    Method::new(format!(
                        "async {}({id}): Promise<{response}[]>",
                        relation.camel_name()
                    ))
                    .decorator(format!("Get(':id/{route}')"))
                    .body(format!(
                        "const rows = await this.repository.{}(id);\nif (!rows) {{\n  throw new NotFoundException(`{own} ${{id}} not found`);\n}}\nreturn rows.map((row) => {mapper}.toResponse(row));",
                        names[0],
                    )),
                ),
            }

            if relation.kind == RelationKind::ManyToMany {
                let other = format!("{}Id", singularize(&relation.camel_name()));
                let other_param =
                    self.param(target, &relation.remote_column, &other, file);
                let item = format!("':id/{route}/:{other}'");
                methods.push(self.write(
                    Method::new(format!("async {}({id}, {other_param}): Promise<void>", names[1]))
                        .decorator(format!("Put({item})"))
                        .decorator("HttpCode(204)")
                        .body(format!(
                            "await this.service.get(id);\nawait this.repository.{}(id, {other});",
                            names[1]
                        )),
                ));
                methods.push(self.write(
                    Method::new(format!("async {}({id}, {other_param}): Promise<void>", names[2]))
                        .decorator(format!("Delete({item})"))
                        .decorator("HttpCode(204)")
                        .body(format!(
                            "if (!(await this.repository.{}(id, {other}))) {{\n  throw new NotFoundException('{} link not found');\n}}",
                            names[2],
                            singularize(&relation.name).replace('_', " "),
                        )),
                ));
            }
        }
        if !methods.is_empty() {
            file.imports_mut().add("@nestjs/common", "NotFoundException");
        }
        methods
    }
}

impl GeneratedFile for ControllerTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        base.join("src")
            .join(&dir)
            .join(format!("{}.controller.ts", dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let dir = self.project.dir(self.entity);
        let service = ServiceTs::class_name(self.entity);
        let repository = RepositoryTs::class_name(self.entity);

        let mut file = CodeFile::new()
            .import_all(
                "@nestjs/common",
                ["Body", "Controller", "Delete", "Get", "HttpCode", "Post", "Put", "Query"],
            )
            .import("../common/pagination", "PaginationQuery")
            .import(
                &format!("./dto/create-{}.dto", dir),
                &RequestDtoTs::class_name(self.entity, DtoKind::Create),
            )
            .import(
                &format!("./dto/{}-response.dto", dir),
                &ResponseDtoTs::class_name(self.entity),
            )
            .import(
                &format!("./dto/update-{}.dto", dir),
                &RequestDtoTs::class_name(self.entity, DtoKind::Update),
            )
            .import(&format!("./{}.repository", dir), &repository)
            .import(&format!("./{}.service", dir), &service);
        if self.project.features().auth {
            file = file
                .import("@nestjs/common", "UseGuards")
                .import("../auth/jwt-auth.guard", "JwtAuthGuard");
        }
        file.imports_mut().add("@nestjs/common", "Param");

        let mut class = Class::new(Self::class_name(self.entity))
            .decorator(format!("Controller('{}')", self.entity.route()))
            .raw(format!(
                "constructor(\n  private readonly service: {service},\n  private readonly repository: {repository},\n) {{}}"
            ));
        for method in self.crud(&mut file) {
            class = class.method(method);
        }
        for method in self.relations(&mut file) {
            class = class.method(method);
        }
        file.add(&class).render()
    }
}
