//! Core traits for typed collection access.
//!
//! A [`Model`] ties a serde-serializable type to the configuration of the
//! collection it lives in. The configuration is returned by a single
//! required method and resolved once, when a typed collection is
//! constructed, not looked up per call.
//!
//! # Example
//!
//! ```ignore
//! use docstamp::model::Model;
//! use docstamp::config::CollectionConfig;
//! use docstamp::timestamp::{TimestampFormat, TimestampPolicy};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub name: String,
//!     pub email: String,
//! }
//!
//! impl Model for User {
//!     fn config() -> CollectionConfig {
//!         CollectionConfig::new("users")
//!             .with_timestamps(TimestampPolicy::new(TimestampFormat::Millis))
//!     }
//! }
//! ```

use bson::{Bson, Document, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::{
    config::CollectionConfig,
    error::{CollectionStoreError, CollectionStoreResult},
};

/// A type stored in a configured collection.
///
/// Implementers supply the per-collection configuration (collection name,
/// parent database, timestamp policy) through the one required method.
pub trait Model: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the configuration of the collection this model belongs to.
    fn config() -> CollectionConfig;
}

/// Extension trait providing serialization utilities for models.
///
/// Automatically implemented for every [`Model`]; converts models to and
/// from BSON documents and JSON values.
pub trait ModelExt: Model {
    /// Serializes this model into a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the model does not
    /// serialize to a document (e.g. a bare scalar).
    fn to_document(&self) -> CollectionStoreResult<Document>;

    /// Deserializes a model from a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    fn from_document(document: Document) -> CollectionStoreResult<Self>;

    /// Converts this model to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> CollectionStoreResult<Value>;

    /// Creates a model from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    fn from_json(value: Value) -> CollectionStoreResult<Self>;
}

impl<M: Model> ModelExt for M {
    fn to_document(&self) -> CollectionStoreResult<Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            other => Err(CollectionStoreError::Serialization(format!(
                "expected the model to serialize to a document, got {}",
                other
            ))),
        }
    }

    fn from_document(document: Document) -> CollectionStoreResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }

    fn to_json(&self) -> CollectionStoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> CollectionStoreResult<Self> {
        Ok(from_value(value)?)
    }
}
