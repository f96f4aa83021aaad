use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field};

use crate::{files::RepositoryPy, project::PyProject, py_file::PyFile};

/// `app/services/<entity>.py`: business rules, owned by the user once
/// written.
pub struct ServicePy<'a> {
    project: PyProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> ServicePy<'a> {
    pub fn new(project: PyProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn type_name(entity: &Entity) -> String {
        format!("{}Service", entity.name)
    }

    fn not_found(&self) -> String {
        format!(
            "ApiError.not_found(f\"{} {{id}} not found\")",
            self.entity.file_stem().replace('_', " ")
        )
    }

    /// Statements hashing the password on create and update.
    fn hashing(&self) -> (String, String) {
        let Some(field) = self.project.hashed_field(self.entity) else {
            return (String::new(), String::new());
        };
        let attr = self.project.attr(field);
        (
            format!("        row.{attr} = hash_password(row.{attr})\n"),
            format!(
                "        if changes.get(\"{attr}\") is not None:\n            changes[\"{attr}\"] = hash_password(changes[\"{attr}\"])\n"
            ),
        )
    }
}

impl GeneratedFile for ServicePy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app")
            .join("services")
            .join(format!("{}.py", self.project.module(self.entity)))
    }

    fn rules(&self) -> FileRules {
        FileRules::stub("#")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let name = &entity.name;
        let module = self.project.module(entity);
        let repo = RepositoryPy::type_name(entity);
        let key_type = self.project.key_type(entity, &self.key.name);
        let not_found = self.not_found();
        let (hash_row, hash_changes) = self.hashing();

        let mut file = PyFile::new()
            .doc(format!(
                "Business rules for {}. Requests reach {repo} through {}.",
                entity.plural.replace('_', " "),
                Self::type_name(entity)
            ))
            .import("collections.abc", "Sequence")
            .import("typing", "Any")
            .import("app.errors", "ApiError")
            .import(&format!("app.models.{module}"), name)
            .import(&format!("app.repositories.{module}"), &repo);
        self.project
            .use_key_type(file.imports_mut(), entity, &self.key.name);
        if !hash_row.is_empty() {
            file = file.import("app.auth", "hash_password");
        }

        file.raw(format!(
            r#"class {service}:
    def __init__(self, repo: {repo}) -> None:
        self.repo = repo

    def page(self, limit: int, offset: int) -> Sequence[{name}]:
        return self.repo.page(limit, offset)

    def get(self, id: {key_type}) -> {name}:
        row = self.repo.get(id)
        if row is None:
            raise {not_found}
        return row

    def create(self, row: {name}) -> {name}:
{hash_row}        return self.repo.create(row)

    def update(self, id: {key_type}, changes: dict[str, Any]) -> {name}:
{hash_changes}        row = self.repo.update(id, changes)
        if row is None:
            raise {not_found}
        return row

    def delete(self, id: {key_type}) -> None:
        if not self.repo.delete(id):
            raise {not_found}"#,
            service = Self::type_name(entity),
        ))
        .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_core::Overwrite;
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_service_reports_missing_rows() {
        let ctx = compile_sql(BLOG_SQL, Target::PythonFastapi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let post = model.entity("Post").unwrap();
        let service = ServicePy::new(PyProject::new(&model, &computed), post, post.id_field().unwrap());
        assert_eq!(service.rules().overwrite, Overwrite::IfMissing);

        let out = service.render();
        assert!(out.contains("class PostService:\n    def __init__(self, repo: PostRepository) -> None:\n"));
        assert!(out.contains("            raise ApiError.not_found(f\"post {id} not found\")\n"));
        assert!(!out.contains("hash_password"));
    }

    #[test]
    fn test_user_service_hashes_passwords() {
        let ctx = compile_sql_with(BLOG_SQL, Target::PythonFastapi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let user = model.entity("User").unwrap();
        let out = ServicePy::new(PyProject::new(&model, &computed), user, user.id_field().unwrap())
            .render();

        assert!(out.contains("from app.auth import hash_password\n"));
        assert!(out.contains("        row.password_hash = hash_password(row.password_hash)\n"));
        assert!(out.contains(
            "            changes[\"password_hash\"] = hash_password(changes[\"password_hash\"])\n"
        ));
    }
}
