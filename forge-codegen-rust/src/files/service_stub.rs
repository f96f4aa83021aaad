use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field};

use crate::{
    ast::{Fn, Param},
    project::RustProject,
    render::RustFile,
};

/// `src/services/<entity>.rs`: business rules, owned by the user once written.
pub struct ServiceStub<'a> {
    project: RustProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> ServiceStub<'a> {
    pub fn new(project: RustProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    /// Password column hashed before it is stored, when auth is on.
    fn hashed_field(&self) -> Option<&'a Field> {
        if !self.project.features().auth {
            return None;
        }
        let auth = self.project.model.auth_entity()?;
        if auth.name != self.entity.name {
            return None;
        }
        self.entity.password_field()
    }

    fn not_found(&self) -> String {
        format!(
            "AppError::NotFound(format!(\"{} {{id}}\"))",
            self.entity.file_stem().replace('_', " ")
        )
    }

    fn key_param(&self) -> Param {
        Param::new("id", self.project.column_type(self.entity, &self.key.name))
    }

    fn functions(&self) -> Vec<Fn> {
        let name = &self.entity.name;
        let key_arg = self.project.key_arg(self.key);
        let hashed = self.hashed_field().map(|f| {
            let field = self.project.field_name(f);
            (field, f.required_on_create())
        });

        let mut create_body = String::new();
        let mut update_body = String::new();
        if let Some((field, required)) = &hashed {
            if *required {
                create_body.push_str(&format!(
                    "input.{field} = hash_password(&input.{field})?;\n"
                ));
            } else {
                create_body.push_str(&format!(
                    "if let Some(password) = input.{field}.take() {{\n    input.{field} = Some(hash_password(&password)?);\n}}\n"
                ));
            }
            update_body.push_str(&format!(
                "if let Some(password) = input.{field}.take() {{\n    input.{field} = Some(hash_password(&password)?);\n}}\n"
            ));
        }
        create_body.push_str("Ok(repo::create(db, &input).await?)");
        update_body.push_str(&format!(
            "repo::update(db, {key_arg}, &input)\n    .await?\n    .ok_or_else(|| {})",
            self.not_found()
        ));
        let input = if hashed.is_some() { "mut input" } else { "input" };

        let db = || Param::new("db", "&DbPool");
        vec![
            Fn::new("list")
                .async_()
                .param(db())
                .param(Param::new("limit", "i64"))
                .param(Param::new("offset", "i64"))
                .returns(format!("AppResult<Vec<{name}>>"))
                .body("Ok(repo::list(db, limit, offset).await?)"),
            Fn::new("get")
                .async_()
                .param(db())
                .param(self.key_param())
                .returns(format!("AppResult<{name}>"))
                .body(format!(
                    "repo::get(db, {key_arg})\n    .await?\n    .ok_or_else(|| {})",
                    self.not_found()
                )),
            Fn::new("create")
                .async_()
                .param(db())
                .param(Param::new(input, format!("Create{name}")))
                .returns(format!("AppResult<{name}>"))
                .body(create_body),
            Fn::new("update")
                .async_()
                .param(db())
                .param(self.key_param())
                .param(Param::new(input, format!("Update{name}")))
                .returns(format!("AppResult<{name}>"))
                .body(update_body),
            Fn::new("delete")
                .async_()
                .param(db())
                .param(self.key_param())
                .returns("AppResult<()>")
                .body(format!(
                    "if repo::delete(db, {key_arg}).await? {{\n    Ok(())\n}} else {{\n    Err({})\n}}",
                    self.not_found()
                )),
        ]
    }
}

impl GeneratedFile for ServiceStub<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src")
            .join("services")
            .join(format!("{}.rs", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::stub("//")
    }

    fn render(&self) -> String {
        let name = &self.entity.name;
        let stem = self.entity.file_stem();
        let mut file = RustFile::new()
            .module_doc(format!(
                "Business rules for {}. Requests reach the repository through here.",
                self.entity.plural.replace('_', " ")
            ))
            .import("crate::db", "DbPool")
            .import("crate::error", "AppError")
            .import("crate::error", "AppResult")
            .import_module(&format!("crate::repositories::{} as repo", stem));
        let models = format!("crate::models::{}", stem);
        for symbol in [format!("Create{name}"), name.clone(), format!("Update{name}")] {
            file = file.import(&models, &symbol);
        }
        if self.hashed_field().is_some() {
            file = file.import("crate::auth", "hash_password");
        }
        self.functions()
            .iter()
            .fold(file, |file, func| file.add(func))
            .render()
    }
}
