use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field};

use crate::{
    files::RepositoryGo,
    go_file::{GoFile, GoFunc, GoStruct},
    project::GoProject,
};

/// `internal/service/<entity>.go`: business rules, owned by the user once
/// written.
pub struct ServiceGo<'a> {
    project: GoProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> ServiceGo<'a> {
    pub fn new(project: GoProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn type_name(entity: &Entity) -> String {
        format!("{}Service", entity.name)
    }

    fn receiver(&self, signature: String) -> GoFunc {
        GoFunc::new(format!("(s *{}) {}", Self::type_name(self.entity), signature))
    }

    fn not_found(&self) -> String {
        format!(
            "apierr.NotFound(fmt.Sprintf(\"{} %v not found\", id))",
            self.entity.file_stem().replace('_', " ")
        )
    }

    /// Replaces the plain password in `in` with its hash.
    fn hash_input(&self) -> String {
        let Some(field) = self.project.hashed_field(self.entity) else {
            return String::new();
        };
        let name = self.project.field_name(field);
        format!(
            "if in.{name} != nil {{\n\thash, err := auth.HashPassword(*in.{name})\n\tif err != nil {{\n\t\treturn nil, err\n\t}}\n\tin.{name} = &hash\n}}\n"
        )
    }

    fn functions(&self) -> Vec<GoFunc> {
        let model = format!("models.{}", self.entity.name);
        let key_type = self.project.key_type(self.entity, &self.key.name);
        let var = self.project.var(self.entity);
        let hash = self.hash_input();
        let lookup = |call: &str| {
            format!(
                "{var}, err := {call}\nif err != nil {{\n\treturn nil, err\n}}\nif {var} == nil {{\n\treturn nil, {}\n}}\nreturn {var}, nil",
                self.not_found()
            )
        };

        vec![
            self.receiver(format!(
                "List(ctx context.Context, limit, offset int64) ([]{model}, error)"
            ))
            .body("return s.repo.List(ctx, limit, offset)"),
            self.receiver(format!("Get(ctx context.Context, id {key_type}) (*{model}, error)"))
                .body(lookup("s.repo.Get(ctx, id)")),
            self.receiver(format!(
                "Create(ctx context.Context, in models.Create{}) (*{model}, error)",
                self.entity.name
            ))
            .body(format!("{hash}return s.repo.Create(ctx, in)")),
            self.receiver(format!(
                "Update(ctx context.Context, id {key_type}, in models.Update{}) (*{model}, error)",
                self.entity.name
            ))
            .body(format!("{hash}{}", lookup("s.repo.Update(ctx, id, in)"))),
            self.receiver(format!("Delete(ctx context.Context, id {key_type}) error"))
                .body(format!(
                    "deleted, err := s.repo.Delete(ctx, id)\nif err != nil {{\n\treturn err\n}}\nif !deleted {{\n\treturn {}\n}}\nreturn nil",
                    self.not_found()
                )),
        ]
    }
}

impl GeneratedFile for ServiceGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal")
            .join("service")
            .join(format!("{}.go", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::stub("//")
    }

    fn render(&self) -> String {
        let name = Self::type_name(self.entity);
        let repo = RepositoryGo::type_name(self.entity);
        let mut file = GoFile::new("service")
            .doc(format!(
                "Package service holds business rules. Requests for {} reach the\nrepository through {}.",
                self.entity.plural.replace('_', " "),
                name
            ))
            .import("context")
            .import("fmt")
            .import(&self.project.internal("apierr"))
            .import(&self.project.internal("models"))
            .import(&self.project.internal("repository"));
        if self.project.hashed_field(self.entity).is_some() {
            file = file.import(&self.project.internal("auth"));
        }

        let file = file
            .add(&GoStruct::new(&name).field("repo", format!("*repository.{repo}")))
            .add(
                &GoFunc::new(format!("New{name}(repo *repository.{repo}) *{name}"))
                    .body(format!("return &{name}{{repo: repo}}")),
            );
        self.functions()
            .iter()
            .fold(file, |file, func| file.add(func))
            .render()
    }
}
