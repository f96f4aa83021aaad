//! Credential table used by generated authentication.

use crudforge_ir::{ColumnType, DomainModel, Entity};

/// Where generated login/register code reads and writes credentials.
///
/// Resolved from the model's auth entity when there is one; otherwise a
/// `users (id BIGINT, email, password_hash)` table is assumed.
#[derive(Debug, Clone)]
pub struct CredentialStore<'a> {
    /// The backing entity, when the schema declares one.
    pub entity: Option<&'a Entity>,
    pub table: String,
    pub id_column: String,
    pub id_type: ColumnType,
    pub email_column: String,
    pub password_column: String,
}

impl<'a> CredentialStore<'a> {
    pub fn resolve(model: &'a DomainModel) -> Self {
        let Some(entity) = model.auth_entity() else {
            return Self {
                entity: None,
                table: "users".to_string(),
                id_column: "id".to_string(),
                id_type: ColumnType::BigInt,
                email_column: "email".to_string(),
                password_column: "password_hash".to_string(),
            };
        };

        let (id_column, id_type) = entity
            .id_field()
            .map(|f| (f.name.clone(), f.ty.clone()))
            .unwrap_or_else(|| ("id".to_string(), ColumnType::BigInt));
        let email_column = entity
            .field("email")
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "email".to_string());
        let password_column = entity
            .password_field()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "password_hash".to_string());

        Self {
            entity: Some(entity),
            table: entity.table.clone(),
            id_column,
            id_type,
            email_column,
            password_column,
        }
    }

    /// Whether the table comes from the schema rather than being assumed.
    pub fn is_declared(&self) -> bool {
        self.entity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_schema::Target;

    use super::*;
    use crate::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};

    #[test]
    fn test_resolves_user_entity() {
        let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
        let store = CredentialStore::resolve(ctx.model.as_ref().unwrap());
        assert!(store.is_declared());
        assert_eq!(store.table, "users");
        assert_eq!(store.password_column, "password_hash");
        assert_eq!(store.id_type, ColumnType::BigInt);
    }

    #[test]
    fn test_falls_back_to_assumed_table() {
        let ctx = compile_sql(PRODUCT_SQL, Target::RustAxum).unwrap();
        let store = CredentialStore::resolve(ctx.model.as_ref().unwrap());
        assert!(!store.is_declared());
        assert_eq!(store.email_column, "email");
    }
}
