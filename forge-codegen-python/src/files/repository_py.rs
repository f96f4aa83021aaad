use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field, Relation, RelationKind};

use crate::{
    project::{PyProject, relation_methods},
    py_file::{PyFile, quote},
};

/// `app/repositories/<entity>.py`: queries over one table and its relations.
pub struct RepositoryPy<'a> {
    project: PyProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> RepositoryPy<'a> {
    pub fn new(project: PyProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn type_name(entity: &Entity) -> String {
        format!("{}Repository", entity.name)
    }

    fn column(&self, entity: &Entity, column: &str) -> String {
        format!("{}.{}", entity.name, self.project.attr_of(column))
    }

    fn key_column(&self) -> String {
        self.column(self.entity, &self.key.name)
    }

    fn crud(&self, key_type: &str) -> String {
        let name = &self.entity.name;
        let key = self.key_column();
        format!(
            r#"    def __init__(self, session: Session) -> None:
        self.session = session

    def page(self, limit: int, offset: int) -> Sequence[{name}]:
        query = select({name}).order_by({key}).limit(limit).offset(offset)
        return self.session.scalars(query).all()

    def get(self, id: {key_type}) -> {name} | None:
        return self.session.scalars(select({name}).where({key} == id)).first()

    def create(self, row: {name}) -> {name}:
        self.session.add(row)
        self.session.commit()
        self.session.refresh(row)
        return row

    def update(self, id: {key_type}, changes: dict[str, Any]) -> {name} | None:
        row = self.get(id)
        if row is None:
            return None
        for attr, value in changes.items():
            setattr(row, attr, value)
        self.session.commit()
        self.session.refresh(row)
        return row

    def delete(self, id: {key_type}) -> bool:
        result = self.session.execute(delete({name}).where({key} == id))
        self.session.commit()
        return result.rowcount > 0
"#
        )
    }

    /// Expression for this row's `column`, from `row` when it is not the key.
    fn own_value(&self, column: &str) -> Option<String> {
        if self.entity.field(column).map(|f| f.name.as_str()) == Some(self.key.name.as_str()) {
            None
        } else {
            Some(format!("row.{}", self.project.attr_of(column)))
        }
    }

    fn relation_queries(&self, file: &mut PyFile, key_type: &str) -> String {
        let mut out = String::new();
        for relation in &self.entity.relations {
            let Some(target) = self.project.navigable(relation) else {
                continue;
            };
            let Some(target_key) = target.id_field() else {
                continue;
            };
            let target_module = self.project.module(target);
            file.imports_mut()
                .add(&format!("app.models.{target_module}"), &target.name);
            let [lookup, add, remove] = relation_methods(relation);
            let remote = self.column(target, &relation.remote_column);
            let order = self.column(target, &target_key.name);
            let t = &target.name;

            // Reading a non-key column needs the row first.
            let (fetch, value) = match self.own_value(&relation.local_column) {
                Some(value) => (
                    "        row = self.get(id)\n        if row is None:\n            return None\n"
                        .to_string(),
                    value,
                ),
                None => (String::new(), "id".to_string()),
            };

            match relation.kind {
                RelationKind::ManyToOne => {
                    out.push_str(&format!(
                        "\n    def {lookup}(self, id: {key_type}) -> {t} | None:\n{fetch}        return self.session.scalars(select({t}).where({remote} == {value})).first()\n"
                    ));
                }
                RelationKind::OneToMany => {
                    let fetch = fetch.replace("return None", "return []");
                    out.push_str(&format!(
                        "\n    def {lookup}(self, id: {key_type}) -> Sequence[{t}]:\n{fetch}        query = select({t}).where({remote} == {value}).order_by({order})\n        return self.session.scalars(query).all()\n"
                    ));
                }
                RelationKind::ManyToMany => {
                    out.push_str(&self.many_to_many(file, relation, target, key_type, [lookup, add, remove]));
                }
            }
        }
        out
    }

    fn many_to_many(
        &self,
        file: &mut PyFile,
        relation: &Relation,
        target: &Entity,
        key_type: &str,
        [lookup, add, remove]: [String; 3],
    ) -> String {
        let Some(junction) = &relation.junction else {
            return String::new();
        };
        let table = self.project.junction_var(&junction.table);
        file.imports_mut().add("app.models.junctions", &table);
        file.imports_mut().add("sqlalchemy", "insert");

        let t = &target.name;
        let local = format!("{table}.c.{}", junction.local_column);
        let remote = format!("{table}.c.{}", junction.remote_column);
        let target_column = self.column(target, &relation.remote_column);
        let order = target
            .id_field()
            .map(|k| self.column(target, &k.name))
            .unwrap_or_else(|| target_column.clone());
        let other = self.project.related_param(relation);
        let other_type = self.project.key_type(target, &relation.remote_column);
        self.project
            .use_key_type(file.imports_mut(), target, &relation.remote_column);

        format!(
            r#"
    def {lookup}(self, id: {key_type}) -> Sequence[{t}]:
        query = (
            select({t})
            .join({table}, {remote} == {target_column})
            .where({local} == id)
            .order_by({order})
        )
        return self.session.scalars(query).all()

    def {add}(self, id: {key_type}, {other}: {other_type}) -> None:
        link = {{{local_name}: id, {remote_name}: {other}}}
        self.session.execute(insert({table}).values(link))
        self.session.commit()

    def {remove}(self, id: {key_type}, {other}: {other_type}) -> bool:
        query = delete({table}).where({local} == id, {remote} == {other})
        result = self.session.execute(query)
        self.session.commit()
        return result.rowcount > 0
"#,
            local_name = quote(&junction.local_column),
            remote_name = quote(&junction.remote_column),
        )
    }
}

impl GeneratedFile for RepositoryPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app")
            .join("repositories")
            .join(format!("{}.py", self.project.module(self.entity)))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let module = self.project.module(entity);
        let key_type = self.project.key_type(entity, &self.key.name);

        let mut file = PyFile::new()
            .doc(format!("Data access for {}.", entity.plural.replace('_', " ")))
            .import("collections.abc", "Sequence")
            .import("typing", "Any")
            .import_all("sqlalchemy", ["delete", "select"])
            .import("sqlalchemy.orm", "Session")
            .import(&format!("app.models.{module}"), &entity.name);
        self.project
            .use_key_type(file.imports_mut(), entity, &self.key.name);

        let relations = self.relation_queries(&mut file, &key_type);
        file.raw(format!(
            "class {}:\n{}{}",
            Self::type_name(entity),
            self.crud(&key_type),
            relations
        ))
        .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    fn post_repository() -> String {
        let ctx = compile_sql(BLOG_SQL, Target::PythonFastapi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let post = model.entity("Post").unwrap();
        RepositoryPy::new(PyProject::new(&model, &computed), post, post.id_field().unwrap())
            .render()
    }

    #[test]
    fn test_crud_methods() {
        let out = post_repository();
        assert!(out.contains("class PostRepository:\n    def __init__(self, session: Session) -> None:\n"));
        assert!(out.contains("        query = select(Post).order_by(Post.id).limit(limit).offset(offset)\n"));
        assert!(out.contains("    def update(self, id: int, changes: dict[str, Any]) -> Post | None:\n"));
        assert!(out.contains("        result = self.session.execute(delete(Post).where(Post.id == id))\n"));
    }

    #[test]
    fn test_relation_queries() {
        let out = post_repository();
        assert!(out.contains("    def author(self, id: int) -> User | None:\n        row = self.get(id)\n"));
        assert!(out.contains("select(User).where(User.id == row.author_id)"));
        assert!(out.contains(
            "        query = select(Comment).where(Comment.post_id == id).order_by(Comment.id)\n"
        ));
        assert!(out.contains("            .join(post_tags, post_tags.c.tag_id == Tag.id)\n"));
        assert!(out.contains("    def add_tag(self, id: int, tag_id: int) -> None:\n"));
        assert!(out.contains("        link = {\"post_id\": id, \"tag_id\": tag_id}\n"));
        assert!(out.contains("from app.models.junctions import post_tags\n"));
    }

    #[test]
    fn test_uuid_key() {
        let ctx = compile_sql(PRODUCT_SQL, Target::PythonFastapi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let product = model.entity("Product").unwrap();
        let out = RepositoryPy::new(
            PyProject::new(&model, &computed),
            product,
            product.id_field().unwrap(),
        )
        .render();
        assert!(out.contains("import uuid\n"));
        assert!(out.contains("    def get(self, id: uuid.UUID) -> Product | None:\n"));
    }
}
