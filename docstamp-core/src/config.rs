//! Per-collection configuration and the collection registry.
//!
//! Every facade operation is driven by a [`CollectionConfig`]: the
//! collection name, an optional parent-database override, and the
//! timestamp policy applied on writes. Configurations are either supplied
//! directly, returned by a [`Model`](crate::model::Model) implementation,
//! or resolved by logical name through a [`CollectionRegistry`].
//!
//! All types here are serde-derivable so an application can load its
//! collection layout from configuration files:
//!
//! ```ignore
//! let registry: CollectionRegistry = serde_json::from_str(r#"{
//!     "users": {
//!         "name": "users",
//!         "timestamps": { "enabled": true, "format": "ISODate" }
//!     }
//! }"#)?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    error::{CollectionStoreError, CollectionStoreResult},
    timestamp::TimestampPolicy,
};

/// Static, read-only configuration for one logical collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name on the backend.
    pub name: String,
    /// Parent database override; the backend's default database applies
    /// when absent.
    #[serde(default)]
    pub database: Option<String>,
    /// Timestamp policy applied to inserts and updates.
    #[serde(default)]
    pub timestamps: TimestampPolicy,
}

impl CollectionConfig {
    /// Creates a configuration for the named collection with timestamps
    /// disabled and the backend's default database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: None,
            timestamps: TimestampPolicy::disabled(),
        }
    }

    /// Overrides the parent database by name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Replaces the timestamp policy.
    pub fn with_timestamps(mut self, timestamps: TimestampPolicy) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Borrows the backend-facing address of this collection.
    pub fn collection_ref(&self) -> CollectionRef<'_> {
        CollectionRef {
            database: self.database.as_deref(),
            name: &self.name,
        }
    }
}

/// Addresses a collection on a backend: collection name plus an optional
/// database override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRef<'a> {
    /// Database override, or `None` for the backend default.
    pub database: Option<&'a str>,
    /// Collection name.
    pub name: &'a str,
}

/// The set of collection configurations known to a store, keyed by
/// logical collection name.
///
/// This is the configuration provider the facade resolves against when a
/// collection is requested by name; asking for an unregistered name fails
/// with [`CollectionStoreError::Configuration`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionRegistry {
    collections: HashMap<String, CollectionConfig>,
}

impl CollectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a configuration under its collection name, replacing any
    /// previous entry for that name.
    pub fn register(&mut self, config: CollectionConfig) {
        self.collections.insert(config.name.clone(), config);
    }

    /// Resolves the configuration for a logical collection name.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionStoreError::Configuration`] when no
    /// configuration was registered for `name`.
    pub fn get(&self, name: &str) -> CollectionStoreResult<&CollectionConfig> {
        self.collections
            .get(name)
            .ok_or_else(|| CollectionStoreError::Configuration(name.to_string()))
    }

    /// Returns the registered logical collection names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}
