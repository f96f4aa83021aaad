//! Naming and lookup helpers shared by the generated files.

use crudforge_codegen::{ComputedData, ImportCollector, PYTHON_NAMING, TypeMapper};
use crudforge_core::singularize;
use crudforge_ir::{ColumnType, DomainModel, Entity, Features, Field, Relation, RelationKind};

use crate::type_mapper::{PyImport, PythonTypeMapper};

/// Everything a file generator needs to know about the project.
#[derive(Debug, Clone, Copy)]
pub struct PyProject<'a> {
    pub model: &'a DomainModel,
    pub computed: &'a ComputedData,
    pub types: PythonTypeMapper,
}

impl<'a> PyProject<'a> {
    pub fn new(model: &'a DomainModel, computed: &'a ComputedData) -> Self {
        Self {
            model,
            computed,
            types: PythonTypeMapper,
        }
    }

    pub fn features(&self) -> Features {
        self.model.meta.features
    }

    /// Distribution name in pyproject.toml.
    pub fn distribution(&self) -> String {
        self.model.meta.kebab_name()
    }

    /// Entities that have a key to address rows by.
    pub fn entities(&self) -> impl Iterator<Item = (&'a Entity, &'a Field)> {
        self.model
            .entities
            .iter()
            .filter_map(|e| e.id_field().map(|key| (e, key)))
    }

    /// The related entity, when it has a repository of its own.
    pub fn target(&self, relation: &Relation) -> Option<&'a Entity> {
        self.model
            .entity(&relation.target)
            .filter(|e| e.id_field().is_some())
    }

    /// Target of a relation that gets a route. Many-to-many needs its junction.
    pub fn navigable(&self, relation: &Relation) -> Option<&'a Entity> {
        if relation.kind == RelationKind::ManyToMany && relation.junction.is_none() {
            return None;
        }
        self.target(relation)
    }

    /// Attribute name of a column on models and schemas.
    pub fn attr(&self, field: &Field) -> String {
        PYTHON_NAMING.field_name(&field.name)
    }

    /// Attribute name of a column given only its name.
    pub fn attr_of(&self, column: &str) -> String {
        PYTHON_NAMING.field_name(column)
    }

    /// Module name of an entity inside each layer package.
    pub fn module(&self, entity: &Entity) -> String {
        PYTHON_NAMING.safe_name(&entity.file_stem())
    }

    /// Local variable for one row of an entity.
    pub fn var(&self, entity: &Entity) -> String {
        PYTHON_NAMING.safe_name(&entity.file_stem())
    }

    /// Annotation of the column addressed by a route parameter.
    pub fn key_type(&self, entity: &Entity, column: &str) -> String {
        entity
            .field(column)
            .map(|f| self.types.map_type(&f.ty))
            .unwrap_or_else(|| "int".into())
    }

    /// Whether the column holds a password hash that must never be returned.
    pub fn is_secret(&self, entity: &Entity, field: &Field) -> bool {
        entity
            .password_field()
            .is_some_and(|p| p.name == field.name)
    }

    /// Password column the service hashes before storing, when auth is on.
    pub fn hashed_field(&self, entity: &'a Entity) -> Option<&'a Field> {
        if !self.features().auth {
            return None;
        }
        let auth = self.model.auth_entity()?;
        if auth.name != entity.name {
            return None;
        }
        entity.password_field()
    }

    /// Module-level name of a junction `Table` in `app.models.junctions`.
    pub fn junction_var(&self, table: &str) -> String {
        PYTHON_NAMING.field_name(table)
    }

    /// Path parameter naming the other side of a link (`tags` -> `tag_id`).
    pub fn related_param(&self, relation: &Relation) -> String {
        format!("{}_id", singularize(&relation.name))
    }

    /// Add the import a mapped annotation needs.
    pub fn use_type(&self, imports: &mut ImportCollector, ty: &ColumnType) {
        match self.types.import_for(ty) {
            Some(PyImport::Module(module)) => imports.add_module(module),
            Some(PyImport::From(module, symbol)) => imports.add(module, symbol),
            None => {}
        }
    }

    /// Add the import for the key annotation of an entity.
    pub fn use_key_type(&self, imports: &mut ImportCollector, entity: &Entity, column: &str) {
        if let Some(field) = entity.field(column) {
            self.use_type(imports, &field.ty);
        }
    }

    /// Annotation of a field as stored: optional when nullable.
    pub fn annotation(&self, field: &Field) -> String {
        self.types.map_field(field)
    }
}

/// Repository method names of a relation: lookup, link and unlink.
pub fn relation_methods(relation: &Relation) -> [String; 3] {
    let singular = singularize(&relation.name);
    [
        PYTHON_NAMING.safe_name(&relation.name),
        format!("add_{}", singular),
        format!("remove_{}", singular),
    ]
}
