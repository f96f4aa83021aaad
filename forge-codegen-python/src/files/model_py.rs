use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, DatabaseKind, Entity, Field, JunctionSide};

use crate::{
    project::PyProject,
    py_file::{PyFile, quote},
};

/// `app/models/<entity>.py`: the SQLAlchemy declarative model.
pub struct ModelPy<'a> {
    project: PyProject<'a>,
    entity: &'a Entity,
}

impl<'a> ModelPy<'a> {
    pub fn new(project: PyProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    /// Whether the key is an integer the database assigns.
    fn autoincrement(field: &Field) -> bool {
        field.primary_key && field.generated && field.ty.is_integer()
    }

    /// `mapped_column(...)` arguments for one field.
    fn column_args(&self, file: &mut PyFile, field: &Field) -> String {
        let imports = file.imports_mut();
        let attr = self.project.attr(field);
        let mut args = Vec::new();
        if attr != field.name {
            args.push(quote(&field.name));
        }

        let (ty, symbol) = self.project.types.column_type(&field.ty);
        imports.add("sqlalchemy", symbol);
        let sqlite = self.project.model.meta.database == DatabaseKind::Sqlite;
        if Self::autoincrement(field) && sqlite && field.ty != ColumnType::Integer {
            // only INTEGER PRIMARY KEY is a rowid alias in SQLite
            imports.add("sqlalchemy", "Integer");
            args.push(format!("{ty}().with_variant(Integer, \"sqlite\")"));
        } else {
            args.push(ty);
        }

        if let Some(reference) = &field.references {
            imports.add("sqlalchemy", "ForeignKey");
            args.push(format!(
                "ForeignKey({})",
                quote(&format!("{}.{}", reference.table, reference.column))
            ));
        }
        if field.primary_key {
            args.push("primary_key=True".into());
        }
        if field.unique && !field.primary_key {
            args.push("unique=True".into());
        }

        if field.primary_key && field.generated && field.ty == ColumnType::Uuid {
            imports.add_module("uuid");
            args.push("default=uuid.uuid4".into());
        } else if let Some(default) = field.default.as_ref().filter(|_| !Self::autoincrement(field)) {
            imports.add("sqlalchemy", "text");
            args.push(format!("server_default=text({})", quote(default)));
        }
        format!("mapped_column({})", args.join(", "))
    }
}

impl GeneratedFile for ModelPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app")
            .join("models")
            .join(format!("{}.py", self.project.module(self.entity)))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let mut file = PyFile::new()
            .doc(format!("ORM model for the {} table.", entity.table))
            .import_all("sqlalchemy.orm", ["Mapped", "mapped_column"])
            .import("app.database", "Base");

        let mut body = format!("class {}(Base):\n", entity.name);
        if let Some(description) = &entity.description {
            body.push_str(&format!("    \"\"\"{}\"\"\"\n\n", description.trim()));
        }
        body.push_str(&format!("    __tablename__ = {}\n\n", quote(&entity.table)));
        for field in &entity.fields {
            self.project.use_type(file.imports_mut(), &field.ty);
            let column = self.column_args(&mut file, field);
            body.push_str(&format!(
                "    {}: Mapped[{}] = {}\n",
                self.project.attr(field),
                self.project.annotation(field),
                column
            ));
        }
        file.raw(body).render()
    }
}

/// `app/models/junctions.py`: link tables behind many-to-many relations.
pub struct JunctionsPy<'a> {
    project: PyProject<'a>,
}

impl<'a> JunctionsPy<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
        Self { project }
    }

    fn column(&self, file: &mut PyFile, side: &JunctionSide) -> String {
        let (ty, symbol) = self.project.types.column_type(&side.column_type);
        file.imports_mut().add("sqlalchemy", symbol);
        format!(
            "    Column({}, {}, ForeignKey({}, ondelete=\"CASCADE\"), primary_key=True),\n",
            quote(&side.column),
            ty,
            quote(&format!("{}.{}", side.table, side.ref_column))
        )
    }
}

impl GeneratedFile for JunctionsPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app").join("models").join("junctions.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let mut file = PyFile::new()
            .doc("Link tables behind many-to-many relations.")
            .import_all("sqlalchemy", ["Column", "ForeignKey", "Table"])
            .import("app.database", "Base");
        let mut tables = Vec::new();
        for junction in &self.project.model.junctions {
            let left = self.column(&mut file, &junction.left);
            let right = self.column(&mut file, &junction.right);
            tables.push(format!(
                "{} = Table(\n    {},\n    Base.metadata,\n{left}{right})",
                self.project.junction_var(&junction.table),
                quote(&junction.table)
            ));
        }
        tables.into_iter().fold(file, |file, table| file.raw(table)).render()
    }
}
