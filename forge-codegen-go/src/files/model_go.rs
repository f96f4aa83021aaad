use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field};

use crate::{
    go_file::{GoFile, GoFunc, GoStruct, quote},
    project::GoProject,
};

/// `internal/models/<entity>.go`: the row type, request bodies and the
/// response shape of one entity.
pub struct ModelGo<'a> {
    project: GoProject<'a>,
    entity: &'a Entity,
}

impl<'a> ModelGo<'a> {
    pub fn new(project: GoProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    pub fn create_type(entity: &Entity) -> String {
        format!("Create{}", entity.name)
    }

    pub fn update_type(entity: &Entity) -> String {
        format!("Update{}", entity.name)
    }

    pub fn response_type(entity: &Entity) -> String {
        format!("{}Response", entity.name)
    }

    fn row(&self) -> GoStruct {
        let mut row = GoStruct::new(&self.entity.name)
            .doc(format!("{} is a row of the {} table.", self.entity.name, self.entity.table));
        for field in &self.entity.fields {
            row = row.field(self.project.field_name(field), self.project.field_type(field));
        }
        row
    }

    fn input<'f>(&self, name: String, doc: String, fields: impl Iterator<Item = &'f Field>) -> GoStruct {
        let mut input = GoStruct::new(name).doc(doc);
        for field in fields {
            input = input.tagged(
                self.project.field_name(field),
                self.project.types.input_type(&field.ty),
                format!("json:\"{}\"", field.name),
            );
        }
        input
    }

    fn response(&self) -> GoStruct {
        let name = Self::response_type(self.entity);
        let mut response = GoStruct::new(&name).doc(format!(
            "{} is the JSON shape of a {}.",
            name,
            self.entity.kebab_name().replace('-', " ")
        ));
        for field in &self.entity.fields {
            if self.project.is_secret(self.entity, field) {
                continue;
            }
            response = response.tagged(
                self.project.field_name(field),
                self.project.field_type(field),
                format!("json:\"{}\"", field.name),
            );
        }
        response
    }

    /// Checks shared by create and update: declared lengths and enum values.
    fn constraints<'f>(&self, fields: impl Iterator<Item = &'f Field>, file: &mut GoFile) -> Vec<String> {
        let mut checks = Vec::new();
        for field in fields {
            let name = self.project.field_name(field);
            if let Some(max) = field.ty.max_length() {
                file.imports_mut().add_module("unicode/utf8");
                file.imports_mut().add_module("fmt");
                checks.push(format!(
                    "if in.{name} != nil && utf8.RuneCountInString(*in.{name}) > {max} {{\n\treturn fmt.Errorf(\"{} must be at most {max} characters\")\n}}",
                    field.name
                ));
            }
            if let ColumnType::Enum(values) = &field.ty {
                if values.is_empty() {
                    continue;
                }
                file.imports_mut().add_module("slices");
                file.imports_mut().add_module("fmt");
                let allowed: Vec<String> = values.iter().map(|v| quote(v)).collect();
                checks.push(format!(
                    "if in.{name} != nil && !slices.Contains([]string{{{}}}, *in.{name}) {{\n\treturn fmt.Errorf(\"{} must be one of {}\")\n}}",
                    allowed.join(", "),
                    field.name,
                    values.join(", ")
                ));
            }
        }
        checks
    }

    fn validate_create(&self, file: &mut GoFile) -> GoFunc {
        let required: Vec<&Field> = self
            .entity
            .insertable_fields()
            .filter(|f| f.required_on_create())
            .collect();
        let mut body = Vec::new();
        if !required.is_empty() {
            file.imports_mut().add_module("fmt");
            file.imports_mut().add_module("strings");
            let mut missing = String::from("var missing []string\n");
            for field in &required {
                missing.push_str(&format!(
                    "if in.{} == nil {{\n\tmissing = append(missing, \"{}\")\n}}\n",
                    self.project.field_name(field),
                    field.name
                ));
            }
            missing.push_str(
                "if len(missing) > 0 {\n\treturn fmt.Errorf(\"missing required fields: %s\", strings.Join(missing, \", \"))\n}",
            );
            body.push(missing);
        }
        body.extend(self.constraints(self.entity.insertable_fields(), file));
        body.push("return nil".into());

        GoFunc::new(format!(
            "(in {}) Validate() error",
            Self::create_type(self.entity)
        ))
        .doc("Validate checks required fields and declared column limits.")
        .body(body.join("\n"))
    }

    fn validate_update(&self, file: &mut GoFile) -> GoFunc {
        let mut body = self.constraints(self.entity.updatable_fields(), file);
        body.push("return nil".into());
        GoFunc::new(format!(
            "(in {}) Validate() error",
            Self::update_type(self.entity)
        ))
        .body(body.join("\n"))
    }

    fn import_types(&self, file: &mut GoFile) {
        for field in &self.entity.fields {
            if let Some(import) = self.project.types.import_for(&field.ty) {
                file.imports_mut().add_module(import);
            }
        }
    }
}

impl GeneratedFile for ModelGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal")
            .join("models")
            .join(format!("{}.go", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let route = entity.route();
        let mut file = GoFile::new("models");
        self.import_types(&mut file);

        let create = self.input(
            Self::create_type(entity),
            format!("{} is the body of POST /{}.", Self::create_type(entity), route),
            entity.insertable_fields(),
        );
        let update = self.input(
            Self::update_type(entity),
            format!(
                "{} is the body of PUT /{}/{{id}}. Absent fields keep their value.",
                Self::update_type(entity),
                route
            ),
            entity.updatable_fields(),
        );
        let validate_create = self.validate_create(&mut file);
        let validate_update = self.validate_update(&mut file);

        file.add(&self.row())
            .add(&create)
            .add(&validate_create)
            .add(&update)
            .add(&validate_update)
            .add(&self.response())
            .render()
    }
}

/// `internal/models/<entity>_mapper.go`: row to response conversion.
pub struct MapperGo<'a> {
    project: GoProject<'a>,
    entity: &'a Entity,
}

impl<'a> MapperGo<'a> {
    pub fn new(project: GoProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    /// Name of the function converting a slice of rows.
    pub fn many(entity: &Entity) -> String {
        format!("{}Responses", entity.name)
    }
}

impl GeneratedFile for MapperGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal")
            .join("models")
            .join(format!("{}_mapper.go", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let response = ModelGo::response_type(entity);
        let receiver = entity
            .name
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase().to_string())
            .unwrap_or_else(|| "m".into());

        let assignments: Vec<String> = entity
            .fields
            .iter()
            .filter(|f| !self.project.is_secret(entity, f))
            .map(|f| {
                let name = self.project.field_name(f);
                format!("\t{name}: {receiver}.{name},")
            })
            .collect();

        let one = GoFunc::new(format!("({receiver} {}) Response() {response}", entity.name))
            .doc(if entity.password_field().is_some() {
                "Response converts the row to its JSON shape, leaving out the password hash."
                    .to_string()
            } else {
                "Response converts the row to its JSON shape.".to_string()
            })
            .body(format!("return {response}{{\n{}\n}}", assignments.join("\n")));

        let many = GoFunc::new(format!(
            "{}(rows []{}) []{response}",
            Self::many(entity),
            entity.name
        ))
        .body(format!(
            "out := make([]{response}, 0, len(rows))\nfor _, row := range rows {{\n\tout = append(out, row.Response())\n}}\nreturn out"
        ));

        GoFile::new("models").add(&one).add(&many).render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;
    use crate::project::Flavor;

    #[test]
    fn test_post_model() {
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Gin);
        let post = model.entity("Post").unwrap();
        let out = ModelGo::new(project, post).render();

        assert!(out.starts_with("package models\n\nimport (\n\t\"fmt\"\n\t\"strings\"\n\t\"time\"\n"));
        assert!(out.contains("type Post struct {\n\tID        int64\n\tAuthorID  int64\n"));
        assert!(out.contains("\tTitle     *string `json:\"title\"`\n"));
        assert!(out.contains("missing = append(missing, \"author_id\")"));
        assert!(out.contains("utf8.RuneCountInString(*in.Title) > 200"));
        assert!(out.contains("type PostResponse struct {"));
    }

    #[test]
    fn test_user_response_hides_password() {
        let ctx = compile_sql(BLOG_SQL, Target::GoChi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Chi);
        let user = model.entity("User").unwrap();

        let mapper = MapperGo::new(project, user).render();
        assert!(mapper.contains("func (u User) Response() UserResponse {"));
        assert!(!mapper.contains("PasswordHash"));
        assert!(mapper.contains("func UserResponses(rows []User) []UserResponse {"));

        let out = ModelGo::new(project, user).render();
        let response = out.split("type UserResponse struct").nth(1).unwrap();
        assert!(!response.contains("password_hash"));
        assert!(response.contains("DisplayName *string"));
    }
}
