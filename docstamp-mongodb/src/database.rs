//! Database references for the MongoDB backend.
//!
//! A collection's parent database can be configured by name or handed
//! over as a live driver handle. Raw configuration values only carry
//! names; anything else is a type mismatch.

use bson::Bson;
use mongodb::{Client, Database};

use docstamp_core::error::{CollectionStoreError, CollectionStoreResult};

/// Reference to the database a backend operates on by default.
#[derive(Debug, Clone)]
pub enum DatabaseRef {
    /// Database addressed by name on the client.
    Named(String),
    /// A live database handle.
    Handle(Database),
}

impl DatabaseRef {
    /// Reads a database reference out of a raw configuration value.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionStoreError::TypeMismatch`] when the value is
    /// not a name string; a live handle can only be supplied
    /// programmatically.
    pub fn from_bson(value: &Bson) -> CollectionStoreResult<Self> {
        match value {
            Bson::String(name) => Ok(DatabaseRef::Named(name.clone())),
            other => Err(CollectionStoreError::TypeMismatch(format!(
                "database reference must be a name string or a database handle, got {:?}",
                other.element_type()
            ))),
        }
    }

    /// Resolves this reference into a live handle on the given client.
    pub(crate) fn resolve(&self, client: &Client) -> Database {
        match self {
            DatabaseRef::Named(name) => client.database(name),
            DatabaseRef::Handle(database) => database.clone(),
        }
    }
}

impl From<&str> for DatabaseRef {
    fn from(name: &str) -> Self {
        DatabaseRef::Named(name.to_string())
    }
}

impl From<String> for DatabaseRef {
    fn from(name: String) -> Self {
        DatabaseRef::Named(name)
    }
}

impl From<Database> for DatabaseRef {
    fn from(database: Database) -> Self {
        DatabaseRef::Handle(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bson_accepts_name_strings() {
        match DatabaseRef::from_bson(&Bson::String("accounts".to_string())).unwrap() {
            DatabaseRef::Named(name) => assert_eq!(name, "accounts"),
            other => panic!("expected a named reference, got {:?}", other),
        }
    }

    #[test]
    fn test_from_bson_rejects_other_types() {
        for value in [Bson::Int32(42), Bson::Boolean(true), Bson::Null] {
            assert!(matches!(
                DatabaseRef::from_bson(&value),
                Err(CollectionStoreError::TypeMismatch(_))
            ));
        }
    }
}
