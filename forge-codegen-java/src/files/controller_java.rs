use std::path::{Path, PathBuf};

use crudforge_codegen::CodeBuilder;
use crudforge_core::{FileRules, GeneratedFile, singularize};
use crudforge_ir::{Entity, Field, RelationKind};

use crate::{
    files::{DtoKind, MapperJava, RepositoryJava, ServiceJava},
    java_file::{JavaFile, add_class, quote},
    project::{JavaProject, relation_methods},
};

/// `<entity>/<Entity>Controller.java`: the REST routes of one entity.
pub struct ControllerJava<'a> {
    project: JavaProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

/// A constructor-injected dependency.
struct Injected {
    class: String,
    field: String,
}

impl<'a> ControllerJava<'a> {
    pub fn new(project: JavaProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    /// Field holding the mapper of `target`, injecting it on first use.
    fn mapper(&self, file: &mut JavaFile, injected: &mut Vec<Injected>, target: &Entity) -> String {
        let field = if target.name == self.entity.name {
            "mapper".to_string()
        } else {
            format!("{}Mapper", target.camel_name())
        };
        if !injected.iter().any(|i| i.field == field) {
            add_class(file.imports_mut(), &self.project.entity_class(target, "Mapper"));
            injected.push(Injected {
                class: MapperJava::class_name(target),
                field: field.clone(),
            });
        }
        field
    }

    fn response(&self, file: &mut JavaFile, target: &Entity) -> String {
        let class = DtoKind::Response.class_name(target);
        add_class(
            file.imports_mut(),
            &format!("{}.{class}", self.project.entity_package(target)),
        );
        class
    }

    fn crud_routes(&self, key_type: &str) -> Vec<String> {
        let entity = self.entity;
        let response = DtoKind::Response.class_name(entity);
        let create = DtoKind::Create.class_name(entity);
        let update = DtoKind::Update.class_name(entity);
        vec![
            format!(
                "@GetMapping\npublic List<{response}> list(\n        @RequestParam(required = false) Integer limit,\n        @RequestParam(required = false) Integer offset) {{\n    return mapper.toResponses(service.list(Paging.of(limit, offset)));\n}}"
            ),
            format!(
                "@GetMapping(\"/{{id}}\")\npublic {response} get(@PathVariable {key_type} id) {{\n    return mapper.toResponse(service.get(id));\n}}"
            ),
            format!(
                "@PostMapping\n@ResponseStatus(HttpStatus.CREATED)\npublic {response} create(@Valid @RequestBody {create} request) {{\n    return mapper.toResponse(service.create(mapper.toEntity(request)));\n}}"
            ),
            format!(
                "@PutMapping(\"/{{id}}\")\npublic {response} update(@PathVariable {key_type} id, @Valid @RequestBody {update} request) {{\n    return mapper.toResponse(service.update(id, entity -> mapper.apply(request, entity)));\n}}"
            ),
            format!(
                "@DeleteMapping(\"/{{id}}\")\n@ResponseStatus(HttpStatus.NO_CONTENT)\npublic void delete(@PathVariable {key_type} id) {{\n    service.delete(id);\n}}"
            ),
        ]
    }

    fn relation_routes(
        &self,
        file: &mut JavaFile,
        injected: &mut Vec<Injected>,
        key_type: &str,
    ) -> Vec<String> {
        let p = self.project;
        let own = self.entity.file_stem().replace('_', " ");
        let mut routes = Vec::new();

        for relation in &self.entity.relations {
            let Some(target) = p.navigable(relation) else {
                continue;
            };
            let [lookup, add, remove] = relation_methods(relation);
            let mapper = self.mapper(file, injected, target);
            let response = self.response(file, target);
            let route = relation.route();
            let handler = format!("get{}", relation.pascal_name());

            match relation.kind {
                RelationKind::ManyToOne => routes.push(format!(
                    "@GetMapping(\"/{{id}}/{route}\")\npublic {response} {handler}(@PathVariable {key_type} id) {{\n    return repository.{lookup}(id)\n            .map({mapper}::toResponse)\n            .orElseThrow(() -> ApiException.notFound(\"{} of {own} \" + id + \" not found\"));\n}}",
                    relation.name.replace('_', " ")
                )),
                RelationKind::OneToMany | RelationKind::ManyToMany => routes.push(format!(
                    "@GetMapping(\"/{{id}}/{route}\")\npublic List<{response}> {handler}(@PathVariable {key_type} id) {{\n    service.get(id);\n    return {mapper}.toResponses(repository.{lookup}(id));\n}}"
                )),
            }
            if relation.kind != RelationKind::ManyToMany {
                continue;
            }

            let other = p.related_param(relation);
            let other_type = p.key_type(target, &relation.remote_column);
            if let Some(field) = target.field(&relation.remote_column) {
                p.use_type(file.imports_mut(), &field.ty);
            }
            let path = quote(&format!("/{{id}}/{route}/{{{other}}}"));
            let params = format!("@PathVariable {key_type} id, @PathVariable {other_type} {other}");
            routes.push(format!(
                "@PutMapping({path})\n@ResponseStatus(HttpStatus.NO_CONTENT)\npublic void {add}({params}) {{\n    service.get(id);\n    repository.{add}(id, {other});\n}}"
            ));
            routes.push(format!(
                "@DeleteMapping({path})\n@ResponseStatus(HttpStatus.NO_CONTENT)\npublic void {remove}({params}) {{\n    if (repository.{remove}(id, {other}) == 0) {{\n        throw ApiException.notFound(\"{} link not found\");\n    }}\n}}",
                singularize(&relation.name).replace('_', " ")
            ));
        }
        routes
    }
}

impl GeneratedFile for ControllerJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.source_path(
            base,
            &self.project.entity_package(self.entity),
            &format!("{}Controller", self.entity.name),
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let p = self.project;
        let key_type = p.key_type(entity, &self.key.name);
        let class = format!("{}Controller", entity.name);

        let mut file = JavaFile::new(p.entity_package(entity)).import_all([
            "jakarta.validation.Valid",
            "java.util.List",
            "org.springframework.http.HttpStatus",
            "org.springframework.web.bind.annotation.DeleteMapping",
            "org.springframework.web.bind.annotation.GetMapping",
            "org.springframework.web.bind.annotation.PathVariable",
            "org.springframework.web.bind.annotation.PostMapping",
            "org.springframework.web.bind.annotation.PutMapping",
            "org.springframework.web.bind.annotation.RequestBody",
            "org.springframework.web.bind.annotation.RequestMapping",
            "org.springframework.web.bind.annotation.RequestParam",
            "org.springframework.web.bind.annotation.ResponseStatus",
            "org.springframework.web.bind.annotation.RestController",
        ]);
        file = file.import(&format!("{}.Paging", p.package("common")));
        p.use_type(file.imports_mut(), &self.key.ty);

        let mut injected = vec![Injected {
            class: ServiceJava::class_name(entity),
            field: "service".into(),
        }];
        self.mapper(&mut file, &mut injected, entity);
        let crud = self.crud_routes(&key_type);
        let relations = self.relation_routes(&mut file, &mut injected, &key_type);
        if !relations.is_empty() {
            file = file.import(&format!("{}.ApiException", p.package("common")));
            injected.insert(
                1,
                Injected {
                    class: RepositoryJava::class_name(entity),
                    field: "repository".into(),
                },
            );
        }

        let params = injected
            .iter()
            .map(|i| format!("{} {}", i.class, i.field))
            .collect::<Vec<_>>()
            .join(", ");
        let body = CodeBuilder::java()
            .line("@RestController")
            .line(&format!("@RequestMapping({})", quote(&format!("/{}", entity.route()))))
            .block_with_close(&format!("public class {class} {{"), "}", |b| {
                let b = injected
                    .iter()
                    .fold(b.blank(), |b, i| b.line(&format!("private final {} {};", i.class, i.field)))
                    .blank()
                    .block_with_close(&format!("public {class}({params}) {{"), "}", |b| {
                        injected.iter().fold(b, |b, i| {
                            b.line(&format!("this.{} = {};", i.field, i.field))
                        })
                    });
                crud.iter()
                    .chain(&relations)
                    .fold(b, |b, route| b.blank().lines(route))
            })
            .build();
        file.raw(body).render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    fn render(sql: &str, name: &str) -> String {
        let ctx = compile_sql(sql, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let entity = model.entity(name).unwrap();
        ControllerJava::new(JavaProject::new(&model, &computed), entity, entity.id_field().unwrap())
            .render()
    }

    #[test]
    fn test_crud_routes() {
        let out = render(BLOG_SQL, "Post");
        assert!(out.contains("@RestController\n@RequestMapping(\"/posts\")\npublic class PostController {\n"));
        assert!(out.contains("        return mapper.toResponses(service.list(Paging.of(limit, offset)));\n"));
        assert!(out.contains(
            "    @PostMapping\n    @ResponseStatus(HttpStatus.CREATED)\n    public PostResponse create(@Valid @RequestBody PostCreateRequest request) {\n"
        ));
        assert!(out.contains("    public void delete(@PathVariable Long id) {\n"));
    }

    #[test]
    fn test_injects_related_mappers() {
        let out = render(BLOG_SQL, "Post");
        assert!(out.contains(
            "    public PostController(PostService service, PostRepository repository, PostMapper mapper, UserMapper userMapper, CommentMapper commentMapper, TagMapper tagMapper) {\n"
        ));
        assert!(out.contains("import com.example.blog.user.UserMapper;\n"));
        assert!(out.contains("import com.example.blog.user.UserResponse;\n"));
    }

    #[test]
    fn test_relation_routes() {
        let out = render(BLOG_SQL, "Post");
        assert!(out.contains("    @GetMapping(\"/{id}/author\")\n    public UserResponse getAuthor(@PathVariable Long id) {\n"));
        assert!(out.contains(
            "                .orElseThrow(() -> ApiException.notFound(\"author of post \" + id + \" not found\"));\n"
        ));
        assert!(out.contains("        return commentMapper.toResponses(repository.findComments(id));\n"));
        assert!(out.contains(
            "    @PutMapping(\"/{id}/tags/{tagId}\")\n    @ResponseStatus(HttpStatus.NO_CONTENT)\n    public void addTag(@PathVariable Long id, @PathVariable Integer tagId) {\n"
        ));
        assert!(out.contains("            throw ApiException.notFound(\"tag link not found\");\n"));
    }

    #[test]
    fn test_uuid_path_variable() {
        let out = render(PRODUCT_SQL, "Product");
        assert!(out.contains("    public ProductResponse get(@PathVariable UUID id) {\n"));
        assert!(out.contains("import java.util.UUID;\n"));
        assert!(!out.contains("ProductRepository"));
    }
}
