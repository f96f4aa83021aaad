use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crudforge_core::{FileRules, GeneratedFile, singularize, to_snake_case};
use crudforge_ir::{Entity, Field, RelationKind};

use super::repository_rs::relation_fns;
use crate::{
    ast::{Fn, Param},
    project::RustProject,
    render::RustFile,
};

/// One method on one path.
struct Route {
    path: String,
    method: &'static str,
    handler: String,
    writes: bool,
}

/// `src/handlers/<entity>.rs`: the HTTP surface of one entity.
pub struct HandlerRs<'a> {
    project: RustProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> HandlerRs<'a> {
    pub fn new(project: RustProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    fn key_type(&self) -> String {
        self.project.column_type(self.entity, &self.key.name)
    }

    fn state() -> Param {
        Param::new("State(state)", "State<AppState>")
    }

    fn path_id(&self) -> Param {
        Param::new("Path(id)", format!("Path<{}>", self.key_type()))
    }

    fn routes(&self) -> Vec<Route> {
        let route = |path: &str, method, handler: &str, writes| Route {
            path: path.to_string(),
            method,
            handler: handler.to_string(),
            writes,
        };
        let mut routes = vec![
            route("/", "get", "list", false),
            route("/", "post", "create", true),
            route("/:id", "get", "show", false),
            route("/:id", "put", "update", true),
            route("/:id", "delete", "destroy", true),
        ];
        for relation in &self.entity.relations {
            if self.project.target(relation).is_none() {
                continue;
            }
            let names = relation_fns(relation);
            let base = format!("/:id/{}", relation.route());
            routes.push(route(&base, "get", &names[0], false));
            if relation.kind == RelationKind::ManyToMany {
                let item = format!(
                    "{}/:{}_id",
                    base,
                    singularize(&to_snake_case(&relation.name))
                );
                routes.push(route(&item, "put", &names[1], true));
                routes.push(route(&item, "delete", &names[2], true));
            }
        }
        routes
    }

    /// Chain routes into `.route(path, method(handler).other(handler))` lines.
    fn route_lines(routes: &[&Route], free_fns: &mut BTreeSet<&'static str>) -> Vec<String> {
        let mut paths: Vec<&str> = Vec::new();
        for r in routes {
            if !paths.contains(&r.path.as_str()) {
                paths.push(&r.path);
            }
        }
        paths
            .into_iter()
            .map(|path| {
                let calls: Vec<String> = routes
                    .iter()
                    .filter(|r| r.path == path)
                    .enumerate()
                    .map(|(i, r)| {
                        if i == 0 {
                            free_fns.insert(r.method);
                        }
                        format!("{}({})", r.method, r.handler)
                    })
                    .collect();
                format!(".route(\"{}\", {})", path, calls.join("."))
            })
            .collect()
    }

    fn router(&self, free_fns: &mut BTreeSet<&'static str>) -> Fn {
        let routes = self.routes();
        if !self.project.features().auth {
            let all: Vec<&Route> = routes.iter().collect();
            let lines = Self::route_lines(&all, free_fns);
            return Fn::new("router")
                .returns("Router<AppState>")
                .body(format!("Router::new()\n    {}", lines.join("\n    ")));
        }

        let reads: Vec<&Route> = routes.iter().filter(|r| !r.writes).collect();
        let writes: Vec<&Route> = routes.iter().filter(|r| r.writes).collect();
        let read_lines = Self::route_lines(&reads, free_fns);
        let write_lines = Self::route_lines(&writes, free_fns);
        Fn::new("router")
            .doc("Reads are public; writes require a bearer token.")
            .param(Param::new("state", "AppState"))
            .returns("Router<AppState>")
            .body(format!(
                "let read = Router::new()\n    {};\nlet write = Router::new()\n    {}\n    .route_layer(middleware::from_fn_with_state(state, require_auth));\nread.merge(write)",
                read_lines.join("\n    "),
                write_lines.join("\n    ")
            ))
    }

    fn crud(&self) -> Vec<Fn> {
        let name = &self.entity.name;
        let response = format!("{name}Response");
        vec![
            Fn::new("list")
                .private()
                .async_()
                .param(Self::state())
                .param(Param::new("Query(page)", "Query<Pagination>"))
                .returns(format!("AppResult<Json<Vec<{response}>>>"))
                .body(format!(
                    "let rows = service::list(&state.db, page.limit(), page.offset()).await?;\nOk(Json(rows.into_iter().map({response}::from).collect()))"
                )),
            Fn::new("show")
                .private()
                .async_()
                .param(Self::state())
                .param(self.path_id())
                .returns(format!("AppResult<Json<{response}>>"))
                .body("Ok(Json(service::get(&state.db, id).await?.into()))"),
            Fn::new("create")
                .private()
                .async_()
                .param(Self::state())
                .param(Param::new("Json(input)", format!("Json<Create{name}>")))
                .returns(format!("AppResult<(StatusCode, Json<{response}>)>"))
                .body("let row = service::create(&state.db, input).await?;\nOk((StatusCode::CREATED, Json(row.into())))"),
            Fn::new("update")
                .private()
                .async_()
                .param(Self::state())
                .param(self.path_id())
                .param(Param::new("Json(input)", format!("Json<Update{name}>")))
                .returns(format!("AppResult<Json<{response}>>"))
                .body("Ok(Json(service::update(&state.db, id, input).await?.into()))"),
            Fn::new("destroy")
                .private()
                .async_()
                .param(Self::state())
                .param(self.path_id())
                .returns("AppResult<StatusCode>")
                .body("service::delete(&state.db, id).await?;\nOk(StatusCode::NO_CONTENT)"),
        ]
    }

    fn relation_handlers(&self, file: &mut RustFile) -> Vec<Fn> {
        let key_arg = self.project.key_arg(self.key);
        let own = self.entity.file_stem().replace('_', " ");
        let mut fns = Vec::new();

        for relation in &self.entity.relations {
            let Some(target) = self.project.target(relation) else {
                continue;
            };
            let names = relation_fns(relation);
            let response = format!("{}Response", target.name);
            file.imports_mut().add(
                &format!("crate::models::{}", target.file_stem()),
                &response,
            );

            match relation.kind {
                RelationKind::ManyToOne => {
                    file.imports_mut().add("crate::error", "AppError");
                    fns.push(
                        Fn::new(&names[0])
                            .private()
                            .async_()
                            .param(Self::state())
                            .param(self.path_id())
                            .returns(format!("AppResult<Json<{response}>>"))
                            .body(format!(
                                "let row = repo::{}(&state.db, id)\n    .await?\n    .ok_or_else(|| AppError::NotFound(\"{} of {}\".to_string()))?;\nOk(Json(row.into()))",
                                names[0],
                                relation.name.replace('_', " "),
                                own
                            )),
                    );
                }
                RelationKind::OneToMany => fns.push(self.collection(&names[0], &response, key_arg)),
                RelationKind::ManyToMany => {
                    file.imports_mut().add("crate::error", "AppError");
                    let other = format!("{}_id", singularize(&to_snake_case(&relation.name)));
                    let other_ty = self.project.column_type(target, &relation.remote_column);
                    let path = Param::new(
                        format!("Path((id, {other}))"),
                        format!("Path<({}, {})>", self.key_type(), other_ty),
                    );
                    fns.push(self.collection(&names[0], &response, key_arg));
                    fns.push(
                        Fn::new(&names[1])
                            .private()
                            .async_()
                            .param(Self::state())
                            .param(path.clone())
                            .returns("AppResult<StatusCode>")
                            .body(format!(
                                "service::get(&state.db, {key_arg}).await?;\nrepo::{}(&state.db, id, {other}).await?;\nOk(StatusCode::NO_CONTENT)",
                                names[1]
                            )),
                    );
                    fns.push(
                        Fn::new(&names[2])
                            .private()
                            .async_()
                            .param(Self::state())
                            .param(path)
                            .returns("AppResult<StatusCode>")
                            .body(format!(
                                "if repo::{}(&state.db, id, {other}).await? {{\n    Ok(StatusCode::NO_CONTENT)\n}} else {{\n    Err(AppError::NotFound(\"{} link\".to_string()))\n}}",
                                names[2],
                                singularize(&relation.name).replace('_', " ")
                            )),
                    );
                }
            }
        }
        fns
    }

    /// Nested list handler; 404s when the parent row is missing.
    fn collection(&self, name: &str, response: &str, key_arg: &str) -> Fn {
        Fn::new(name)
            .private()
            .async_()
            .param(Self::state())
            .param(self.path_id())
            .returns(format!("AppResult<Json<Vec<{response}>>>"))
            .body(format!(
                "service::get(&state.db, {key_arg}).await?;\nlet rows = repo::{name}(&state.db, id).await?;\nOk(Json(rows.into_iter().map({response}::from).collect()))"
            ))
    }
}

impl GeneratedFile for HandlerRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src")
            .join("handlers")
            .join(format!("{}.rs", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let name = &self.entity.name;
        let stem = self.entity.file_stem();
        let mut file = RustFile::new();

        let mut free_fns = BTreeSet::new();
        let router = self.router(&mut free_fns);
        let relation_fns = self.relation_handlers(&mut file);

        {
            let imports = file.imports_mut();
            for symbol in ["Path", "Query", "State"] {
                imports.add("axum::extract", symbol);
            }
            imports.add("axum::http", "StatusCode");
            for f in &free_fns {
                imports.add("axum::routing", f);
            }
            imports.add("axum", "Json");
            imports.add("axum", "Router");
            if self.project.features().auth {
                imports.add("axum", "middleware");
                imports.add("crate::auth", "require_auth");
            }
            imports.add("super", "Pagination");
            imports.add("crate::error", "AppResult");
            let models = format!("crate::models::{}", stem);
            for symbol in [format!("Create{name}"), format!("{name}Response"), format!("Update{name}")] {
                imports.add(&models, &symbol);
            }
            if !relation_fns.is_empty() {
                imports.add_module(&format!("crate::repositories::{} as repo", stem));
            }
            imports.add_module(&format!("crate::services::{} as service", stem));
            imports.add("crate::state", "AppState");
        }

        let file = file.add(&router);
        self.crud()
            .iter()
            .chain(relation_fns.iter())
            .fold(file, |file, func| file.add(func))
            .render()
    }
}
