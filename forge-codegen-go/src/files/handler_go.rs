use std::path::{Path, PathBuf};

use crudforge_codegen::TypeMapper;
use crudforge_core::{FileRules, GeneratedFile, singularize, to_camel_case};
use crudforge_ir::{ColumnType, Entity, Field, Relation, RelationKind};

use crate::{
    files::{MapperGo, ModelGo, RepositoryGo, ServiceGo},
    go_file::{GoFile, GoFunc, GoStruct},
    project::{Flavor, GoProject, relation_methods},
};

/// One method on one path, relative to the collection.
struct Route {
    method: &'static str,
    path: String,
    handler: String,
    writes: bool,
}

/// `internal/handlers/<entity>.go`: the HTTP surface of one entity.
pub struct HandlerGo<'a> {
    project: GoProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> HandlerGo<'a> {
    pub fn new(project: GoProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn type_name(entity: &Entity) -> String {
        format!("{}Handler", entity.name)
    }

    fn flavor(&self) -> Flavor {
        self.project.flavor
    }

    fn method(&self, name: &str) -> GoFunc {
        GoFunc::new(
            self.flavor()
                .handler(&format!("h *{}", Self::type_name(self.entity)), name),
        )
    }

    /// Handler method and route parameter of the related key of a
    /// many-to-many route (`tagKey`, `tagID`).
    fn related(relation: &Relation) -> (String, String) {
        let one = to_camel_case(&singularize(&relation.name));
        (format!("{one}Key"), RepositoryGo::related_param(relation))
    }

    fn relations(&self) -> impl Iterator<Item = (&'a Relation, &'a Entity)> + '_ {
        self.entity
            .relations
            .iter()
            .filter_map(|r| self.project.navigable(r).map(|target| (r, target)))
    }

    fn routes(&self) -> Vec<Route> {
        let f = self.flavor();
        let id = format!("/{}", f.segment("id"));
        let root = match f {
            Flavor::Gin => "",
            Flavor::Chi => "/",
        };
        let route = |method, path: &str, handler: &str, writes| Route {
            method,
            path: path.to_string(),
            handler: handler.to_string(),
            writes,
        };

        let mut routes = vec![
            route("GET", root, "list", false),
            route("POST", root, "create", true),
            route("GET", &id, "get", false),
            route("PUT", &id, "update", true),
            route("DELETE", &id, "delete", true),
        ];
        for (relation, _) in self.relations() {
            let names = relation_methods(relation).map(|n| to_camel_case(&n));
            let base = format!("{}/{}", id, relation.route());
            routes.push(route("GET", &base, &names[0], false));
            if relation.kind == RelationKind::ManyToMany {
                let (_, param) = Self::related(relation);
                let item = format!("{}/{}", base, f.segment(&param));
                routes.push(route("PUT", &item, &names[1], true));
                routes.push(route("DELETE", &item, &names[2], true));
            }
        }
        routes
    }

    fn register(&self) -> GoFunc {
        let routes = self.routes();
        let reads = routes.iter().filter(|r| !r.writes);
        let writes = routes.iter().filter(|r| r.writes);
        let doc = format!(
            "mounts the {} routes under /{}. Writes pass through guard.",
            self.entity.file_stem().replace('_', " "),
            self.entity.route()
        );
        let handler = Self::type_name(self.entity);

        match self.flavor() {
            Flavor::Gin => {
                let line = |group: &str, r: &Route| {
                    format!("{group}.{}(\"{}\", h.{})", r.method, r.path, r.handler)
                };
                let mut body = vec![format!("g := r.Group(\"/{}\")", self.entity.route())];
                body.extend(reads.map(|r| line("g", r)));
                body.push("w := g.Group(\"\", guard...)".into());
                body.extend(writes.map(|r| line("w", r)));
                GoFunc::new(format!(
                    "(h *{handler}) Register(r gin.IRouter, guard ...gin.HandlerFunc)"
                ))
                .doc(format!("Register {doc}"))
                .body(body.join("\n"))
            }
            Flavor::Chi => {
                let line = |pad: &str, r: &Route| {
                    let method = r.method[..1].to_string() + &r.method[1..].to_ascii_lowercase();
                    format!("{pad}r.{method}(\"{}\", h.{})", r.path, r.handler)
                };
                let mut body = vec!["r := chi.NewRouter()".to_string()];
                body.extend(reads.map(|r| line("", r)));
                body.push("r.Group(func(r chi.Router) {".into());
                body.push("\tr.Use(guard...)".into());
                body.extend(writes.map(|r| line("\t", r)));
                body.push("})".into());
                body.push("return r".into());
                GoFunc::new(format!(
                    "(h *{handler}) Routes(guard ...func(http.Handler) http.Handler) chi.Router"
                ))
                .doc(format!("Routes {doc}"))
                .body(body.join("\n"))
            }
        }
    }

    /// Parser of one route parameter into the column's Go type.
    fn key_parser(&self, name: &str, ty: &ColumnType, file: &mut GoFile) -> GoFunc {
        let go_type = self.project.types.map_type(ty);
        let body = match go_type.as_str() {
            "int64" => "return parseInt(raw, 64)".to_string(),
            "int32" | "int16" => {
                let bits = &go_type[3..];
                format!("v, err := parseInt(raw, {bits})\nreturn {go_type}(v), err")
            }
            "string" if *ty == ColumnType::Uuid => {
                file.imports_mut().add_module("github.com/google/uuid");
                file.imports_mut().add_module("strconv");
                file.imports_mut().add_module(&self.project.internal("apierr"));
                "if err := uuid.Validate(raw); err != nil {\n\treturn \"\", apierr.BadRequest(\"invalid id \" + strconv.Quote(raw))\n}\nreturn raw, nil".to_string()
            }
            "string" => "return raw, nil".to_string(),
            _ => {
                file.imports_mut().add_module("fmt");
                file.imports_mut().add_module("strconv");
                file.imports_mut().add_module(&self.project.internal("apierr"));
                format!(
                    "var v {go_type}\nif _, err := fmt.Sscan(raw, &v); err != nil {{\n\treturn v, apierr.BadRequest(\"invalid id \" + strconv.Quote(raw))\n}}\nreturn v, nil"
                )
            }
        };
        GoFunc::new(format!(
            "(h *{}) {name}(raw string) ({go_type}, error)",
            Self::type_name(self.entity)
        ))
        .body(body)
    }

    /// Parse the `id` route parameter, failing the request on error.
    fn id(&self) -> String {
        let f = self.flavor();
        format!("id, err := h.key({})\n{}", f.param("id"), f.check())
    }

    fn crud(&self) -> Vec<GoFunc> {
        let f = self.flavor();
        let name = &self.entity.name;
        let ctx = f.ctx();
        let check = f.check();
        let many = MapperGo::many(self.entity);

        vec![
            self.method("list").body(format!(
                "limit, offset, err := {}\n{check}\nrows, err := h.service.List({ctx}, limit, offset)\n{check}\n{}",
                f.page(),
                f.json("http.StatusOK", &format!("models.{many}(rows)"))
            )),
            self.method("get").body(format!(
                "{}\nrow, err := h.service.Get({ctx}, id)\n{check}\n{}",
                self.id(),
                f.json("http.StatusOK", "row.Response()")
            )),
            self.method("create").body(format!(
                "var in models.{}\nif err := {}; err != nil {{\n\t{}\n\treturn\n}}\nrow, err := h.service.Create({ctx}, in)\n{check}\n{}",
                ModelGo::create_type(self.entity),
                f.bind("&in"),
                f.fail("err"),
                f.json("http.StatusCreated", "row.Response()")
            )),
            self.method("update").body(format!(
                "{}\nvar in models.Update{name}\nif err := {}; err != nil {{\n\t{}\n\treturn\n}}\nrow, err := h.service.Update({ctx}, id, in)\n{check}\n{}",
                self.id(),
                f.bind("&in"),
                f.fail("err"),
                f.json("http.StatusOK", "row.Response()")
            )),
            self.method("delete").body(format!(
                "{}\nif err := h.service.Delete({ctx}, id); err != nil {{\n\t{}\n\treturn\n}}\n{}",
                self.id(),
                f.fail("err"),
                f.no_content()
            )),
        ]
    }

    fn relation_handlers(&self, file: &mut GoFile) -> Vec<GoFunc> {
        let f = self.flavor();
        let ctx = f.ctx();
        let check = f.check();
        let own = self.entity.file_stem().replace('_', " ");
        let parent_exists = format!(
            "if _, err := h.service.Get({ctx}, id); err != nil {{\n\t{}\n\treturn\n}}",
            f.fail("err")
        );
        let mut funcs = Vec::new();

        for (relation, target) in self.relations() {
            let [lookup, add, remove] = relation_methods(relation);
            let handler = |method: &str| self.method(&to_camel_case(method));

            match relation.kind {
                RelationKind::ManyToOne => {
                    file.imports_mut().add_module("fmt");
                    file.imports_mut().add_module(&self.project.internal("apierr"));
                    funcs.push(handler(&lookup).body(format!(
                        "{}\nrow, err := h.repo.{lookup}({ctx}, id)\n{check}\nif row == nil {{\n\t{}\n\treturn\n}}\n{}",
                        self.id(),
                        f.fail(&format!(
                            "apierr.NotFound(fmt.Sprintf(\"{} of {own} %v not found\", id))",
                            relation.name.replace('_', " ")
                        )),
                        f.json("http.StatusOK", "row.Response()")
                    )));
                }
                RelationKind::OneToMany | RelationKind::ManyToMany => {
                    funcs.push(handler(&lookup).body(format!(
                        "{}\n{parent_exists}\nrows, err := h.repo.{lookup}({ctx}, id)\n{check}\n{}",
                        self.id(),
                        f.json("http.StatusOK", &format!("models.{}(rows)", MapperGo::many(target)))
                    )));
                }
            }
            if relation.kind != RelationKind::ManyToMany {
                continue;
            }

            file.imports_mut().add_module(&self.project.internal("apierr"));
            let (parser, param) = Self::related(relation);
            let other = RepositoryGo::related_param(relation);
            let ids = format!(
                "{}\n{other}, err := h.{parser}({})\n{check}",
                self.id(),
                f.param(&param)
            );
            funcs.push(handler(&add).body(format!(
                "{ids}\n{parent_exists}\nif err := h.repo.{add}({ctx}, id, {other}); err != nil {{\n\t{}\n\treturn\n}}\n{}",
                f.fail("err"),
                f.no_content()
            )));
            funcs.push(handler(&remove).body(format!(
                "{ids}\nremoved, err := h.repo.{remove}({ctx}, id, {other})\n{check}\nif !removed {{\n\t{}\n\treturn\n}}\n{}",
                f.fail(&format!(
                    "apierr.NotFound(\"{} link not found\")",
                    singularize(&relation.name).replace('_', " ")
                )),
                f.no_content()
            )));
        }
        funcs
    }

    fn parsers(&self, file: &mut GoFile) -> Vec<GoFunc> {
        let mut parsers = vec![self.key_parser("key", &self.key.ty, file)];
        for (relation, target) in self.relations() {
            if relation.kind != RelationKind::ManyToMany {
                continue;
            }
            let ty = target
                .field(&relation.remote_column)
                .map(|f| f.ty.clone())
                .unwrap_or(ColumnType::BigInt);
            let (name, _) = Self::related(relation);
            parsers.push(self.key_parser(&name, &ty, file));
        }
        parsers
    }
}

impl GeneratedFile for HandlerGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal")
            .join("handlers")
            .join(format!("{}.go", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let name = Self::type_name(self.entity);
        let service = ServiceGo::type_name(self.entity);
        let repo = RepositoryGo::type_name(self.entity);

        let mut file = GoFile::new("handlers")
            .import("net/http")
            .import(self.flavor().import())
            .import(&self.project.internal("models"))
            .import(&self.project.internal("repository"))
            .import(&self.project.internal("service"));
        let relations = self.relation_handlers(&mut file);
        let parsers = self.parsers(&mut file);

        let file = file
            .add(
                &GoStruct::new(&name)
                    .field("service", format!("*service.{service}"))
                    .field("repo", format!("*repository.{repo}")),
            )
            .add(
                &GoFunc::new(format!(
                    "New{name}(svc *service.{service}, repo *repository.{repo}) *{name}"
                ))
                .body(format!("return &{name}{{service: svc, repo: repo}}")),
            )
            .add(&self.register());
        self.crud()
            .iter()
            .chain(relations.iter())
            .chain(parsers.iter())
            .fold(file, |file, func| file.add(func))
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_gin_post_handler() {
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Gin);
        let post = model.entity("Post").unwrap();
        let out = HandlerGo::new(project, post, post.id_field().unwrap()).render();

        assert!(out.contains("func (h *PostHandler) Register(r gin.IRouter, guard ...gin.HandlerFunc) {"));
        assert!(out.contains("\tg := r.Group(\"/posts\")\n\tg.GET(\"\", h.list)\n"));
        assert!(out.contains("\tw.PUT(\"/:id/tags/:tagID\", h.addTag)\n"));
        assert!(out.contains("\tg.GET(\"/:id/author\", h.author)\n"));
        assert!(out.contains("c.JSON(http.StatusCreated, row.Response())"));
        assert!(out.contains("func (h *PostHandler) key(raw string) (int64, error) {\n\treturn parseInt(raw, 64)\n}"));
        assert!(out.contains("v, err := parseInt(raw, 32)\n\treturn int32(v), err"));
        assert!(out.contains("apierr.NotFound(fmt.Sprintf(\"author of post %v not found\", id))"));
        assert!(out.contains("apierr.NotFound(\"tag link not found\")"));
    }

    #[test]
    fn test_chi_routes_group_writes() {
        let ctx = compile_sql(BLOG_SQL, Target::GoChi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Chi);
        let tag = model.entity("Tag").unwrap();
        let out = HandlerGo::new(project, tag, tag.id_field().unwrap()).render();

        assert!(out.contains("\t\"github.com/go-chi/chi/v5\"\n"));
        assert!(out.contains(
            "\tr.Group(func(r chi.Router) {\n\t\tr.Use(guard...)\n\t\tr.Post(\"/\", h.create)\n"
        ));
        assert!(out.contains("\tr.Get(\"/{id}\", h.get)\n"));
        assert!(out.contains("func (h *TagHandler) delete(w http.ResponseWriter, r *http.Request) {"));
        assert!(out.contains("w.WriteHeader(http.StatusNoContent)"));
    }

    #[test]
    fn test_uuid_key_is_validated() {
        let ctx = compile_sql(PRODUCT_SQL, Target::GoChi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Chi);
        let product = model.entity("Product").unwrap();
        let out = HandlerGo::new(project, product, product.id_field().unwrap()).render();

        assert!(out.contains("if err := uuid.Validate(raw); err != nil {"));
        assert!(out.contains("\t\"github.com/google/uuid\"\n"));
    }
}
