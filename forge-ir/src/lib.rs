//! Intermediate representation types for crudforge.
//!
//! Two layers live here:
//!
//! ```text
//! schema.sql / openapi.yaml → ParsedSchema (SqlTable, SqlColumn)
//!                           → DomainModel (Entity, Field, Relation) → generators
//! ```
//!
//! The parse layer mirrors the database as written. The domain layer is what
//! generators consume: singular entity names, detected junction tables and
//! relations resolved in both directions.

mod model;
mod table;
mod types;

pub use model::{
    DomainModel, Entity, Features, Field, FieldReference, JunctionRef, JunctionSide,
    JunctionTable, ProjectMeta, Relation, RelationKind,
};
pub use table::{ForeignKey, ParsedSchema, ReferentialAction, SqlColumn, SqlTable, TableOrigin};
pub use types::{ColumnType, DatabaseKind, SchemaFormat};
