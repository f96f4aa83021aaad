use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile, singularize};
use crudforge_ir::{Entity, Field, RelationKind};

use crate::{
    files::{RepositoryPy, SchemaPy, ServicePy},
    project::{PyProject, relation_methods},
    py_file::{PyFile, quote},
};

/// `app/routers/<entity>.py`: the APIRouter for one entity.
pub struct RouterPy<'a> {
    project: PyProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> RouterPy<'a> {
    pub fn new(project: PyProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    /// Module alias of the mapper for `target`.
    fn mapper(&self, file: &mut PyFile, target: &Entity) -> String {
        let module = self.project.module(target);
        let alias = if target.name == self.entity.name {
            "mapper".to_string()
        } else {
            format!("{module}_mapper")
        };
        file.imports_mut()
            .add("app.mappers", &format!("{module} as {alias}"));
        alias
    }

    fn response(&self, file: &mut PyFile, target: &Entity) -> String {
        let name = SchemaPy::response_name(target);
        file.imports_mut()
            .add(&format!("app.schemas.{}", self.project.module(target)), &name);
        name
    }

    /// Route decorator arguments of a mutating route.
    fn write(&self, status: Option<&str>) -> String {
        let mut args = Vec::new();
        if let Some(status) = status {
            args.push(format!("status_code=status.{status}"));
        }
        if self.project.features().auth {
            args.push("dependencies=WRITE".to_string());
        }
        args.iter().map(|a| format!(", {a}")).collect()
    }

    fn crud_routes(&self, file: &mut PyFile, key_type: &str) -> Vec<String> {
        let entity = self.entity;
        let stem = self.project.var(entity);
        let plural = entity.plural.clone();
        let mapper = self.mapper(file, entity);
        let response = self.response(file, entity);
        let create = SchemaPy::create_name(entity);
        let update = SchemaPy::update_name(entity);
        file.imports_mut().add(
            &format!("app.schemas.{}", self.project.module(entity)),
            &create,
        );
        file.imports_mut().add(
            &format!("app.schemas.{}", self.project.module(entity)),
            &update,
        );

        vec![
            format!(
                "@router.get(\"\")\ndef list_{plural}(service: Service, page: Paging) -> list[{response}]:\n    return {mapper}.to_responses(service.page(page.limit, page.offset))"
            ),
            format!(
                "@router.get(\"/{{id}}\")\ndef get_{stem}(id: {key_type}, service: Service) -> {response}:\n    return {mapper}.to_response(service.get(id))"
            ),
            format!(
                "@router.post(\"\"{})\ndef create_{stem}(body: {create}, service: Service) -> {response}:\n    return {mapper}.to_response(service.create({mapper}.to_model(body)))",
                self.write(Some("HTTP_201_CREATED"))
            ),
            format!(
                "@router.put(\"/{{id}}\"{})\ndef update_{stem}(id: {key_type}, body: {update}, service: Service) -> {response}:\n    return {mapper}.to_response(service.update(id, {mapper}.changes(body)))",
                self.write(None)
            ),
            format!(
                "@router.delete(\"/{{id}}\"{})\ndef delete_{stem}(id: {key_type}, service: Service) -> Response:\n    service.delete(id)\n    return Response(status_code=status.HTTP_204_NO_CONTENT)",
                self.write(Some("HTTP_204_NO_CONTENT"))
            ),
        ]
    }

    fn relation_routes(&self, file: &mut PyFile, key_type: &str) -> Vec<String> {
        let stem = self.project.var(self.entity);
        let own = self.entity.file_stem().replace('_', " ");
        let mut routes = Vec::new();

        for relation in &self.entity.relations {
            let Some(target) = self.project.navigable(relation) else {
                continue;
            };
            let [lookup, add, remove] = relation_methods(relation);
            let mapper = self.mapper(file, target);
            let response = self.response(file, target);
            let route = relation.route();
            let handler = format!("{stem}_{}", relation.name);

            match relation.kind {
                RelationKind::ManyToOne => {
                    file.imports_mut().add("app.errors", "ApiError");
                    routes.push(format!(
                        "@router.get(\"/{{id}}/{route}\")\ndef {handler}(id: {key_type}, service: Service) -> {response}:\n    row = service.repo.{lookup}(id)\n    if row is None:\n        raise ApiError.not_found(f\"{} of {own} {{id}} not found\")\n    return {mapper}.to_response(row)",
                        relation.name.replace('_', " ")
                    ));
                }
                RelationKind::OneToMany | RelationKind::ManyToMany => {
                    routes.push(format!(
                        "@router.get(\"/{{id}}/{route}\")\ndef {handler}(id: {key_type}, service: Service) -> list[{response}]:\n    service.get(id)\n    return {mapper}.to_responses(service.repo.{lookup}(id))"
                    ));
                }
            }
            if relation.kind != RelationKind::ManyToMany {
                continue;
            }

            file.imports_mut().add("app.errors", "ApiError");
            let other = self.project.related_param(relation);
            let other_type = self.project.key_type(target, &relation.remote_column);
            self.project
                .use_key_type(file.imports_mut(), target, &relation.remote_column);
            let singular = singularize(&relation.name);
            let path = format!("/{{id}}/{route}/{{{other}}}");
            routes.push(format!(
                "@router.put({}{})\ndef add_{stem}_{singular}(id: {key_type}, {other}: {other_type}, service: Service) -> Response:\n    service.get(id)\n    service.repo.{add}(id, {other})\n    return Response(status_code=status.HTTP_204_NO_CONTENT)",
                quote(&path),
                self.write(Some("HTTP_204_NO_CONTENT"))
            ));
            routes.push(format!(
                "@router.delete({}{})\ndef remove_{stem}_{singular}(id: {key_type}, {other}: {other_type}, service: Service) -> Response:\n    if not service.repo.{remove}(id, {other}):\n        raise ApiError.not_found(\"{} link not found\")\n    return Response(status_code=status.HTTP_204_NO_CONTENT)",
                quote(&path),
                self.write(Some("HTTP_204_NO_CONTENT")),
                singular.replace('_', " ")
            ));
        }
        routes
    }
}

impl GeneratedFile for RouterPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app")
            .join("routers")
            .join(format!("{}.py", self.project.module(self.entity)))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let module = self.project.module(entity);
        let service = ServicePy::type_name(entity);
        let repo = RepositoryPy::type_name(entity);
        let key_type = self.project.key_type(entity, &self.key.name);

        let mut file = PyFile::new()
            .doc(format!("HTTP routes for {}.", entity.plural.replace('_', " ")))
            .import("typing", "Annotated")
            .import_all("fastapi", ["APIRouter", "Depends", "Response", "status"])
            .import("sqlalchemy.orm", "Session")
            .import("app.database", "get_session")
            .import("app.pagination", "Paging")
            .import(&format!("app.repositories.{module}"), &repo)
            .import(&format!("app.services.{module}"), &service);
        self.project
            .use_key_type(file.imports_mut(), entity, &self.key.name);

        let crud = self.crud_routes(&mut file, &key_type);
        let relations = self.relation_routes(&mut file, &key_type);

        let mut head = format!(
            "router = APIRouter(prefix=\"/{}\", tags=[{}])",
            entity.route(),
            quote(&entity.route())
        );
        if self.project.features().auth {
            file = file.import("app.auth", "require_user");
            head.push_str("\n\n# Mutating routes need a bearer token.\nWRITE = [Depends(require_user)]");
        }

        let file = file
            .raw(head)
            .raw(format!(
                "def get_service(session: Annotated[Session, Depends(get_session)]) -> {service}:\n    return {service}({repo}(session))"
            ))
            .raw(format!("Service = Annotated[{service}, Depends(get_service)]"));
        crud.into_iter()
            .chain(relations)
            .fold(file, |file, route| file.raw(route))
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_ir::Features;
    use crudforge_schema::Target;

    use super::*;

    fn post_router(features: Features) -> String {
        let ctx = compile_sql_with(BLOG_SQL, Target::PythonFastapi, features).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let post = model.entity("Post").unwrap();
        RouterPy::new(PyProject::new(&model, &computed), post, post.id_field().unwrap()).render()
    }

    #[test]
    fn test_crud_routes() {
        let out = post_router(Features::default());
        assert!(out.contains("router = APIRouter(prefix=\"/posts\", tags=[\"posts\"])\n"));
        assert!(out.contains("Service = Annotated[PostService, Depends(get_service)]\n"));
        assert!(out.contains("@router.get(\"\")\ndef list_posts(service: Service, page: Paging) -> list[PostResponse]:\n"));
        assert!(out.contains("@router.post(\"\", status_code=status.HTTP_201_CREATED)\n"));
        assert!(out.contains("def delete_post(id: int, service: Service) -> Response:\n"));
        assert!(!out.contains("require_user"));
    }

    #[test]
    fn test_relation_routes() {
        let out = post_router(Features::default());
        assert!(out.contains("@router.get(\"/{id}/author\")\ndef post_author(id: int, service: Service) -> UserResponse:\n"));
        assert!(out.contains("        raise ApiError.not_found(f\"author of post {id} not found\")\n"));
        assert!(out.contains("    return comment_mapper.to_responses(service.repo.comments(id))\n"));
        assert!(out.contains(
            "@router.put(\"/{id}/tags/{tag_id}\", status_code=status.HTTP_204_NO_CONTENT)\ndef add_post_tag(id: int, tag_id: int, service: Service) -> Response:\n"
        ));
        assert!(out.contains("        raise ApiError.not_found(\"tag link not found\")\n"));
        assert!(out.contains("from app.mappers import (\n    comment as comment_mapper,\n    post as mapper,\n"));
    }

    #[test]
    fn test_auth_guards_writes() {
        let out = post_router(all_features());
        assert!(out.contains("WRITE = [Depends(require_user)]\n"));
        assert!(out.contains("@router.put(\"/{id}\", dependencies=WRITE)\n"));
        assert!(out.contains("@router.post(\"\", status_code=status.HTTP_201_CREATED, dependencies=WRITE)\n"));
        assert!(out.contains("@router.get(\"/{id}\")\n"));
    }

    #[test]
    fn test_uuid_path_parameter() {
        let ctx = compile_sql(PRODUCT_SQL, Target::PythonFastapi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let product = model.entity("Product").unwrap();
        let out = RouterPy::new(
            PyProject::new(&model, &computed),
            product,
            product.id_field().unwrap(),
        )
        .render();
        assert!(out.contains("def get_product(id: uuid.UUID, service: Service) -> ProductResponse:\n"));
    }
}
