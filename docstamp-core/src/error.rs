//! Error types and result types for collection store operations.
//!
//! This module provides error handling for configuration resolution, the
//! serialization boundary, and backend delegation. Use
//! [`CollectionStoreResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working through the
/// collection facade.
///
/// Failures originating in the underlying client (network, authentication,
/// write conflicts, validation) are carried through unchanged as
/// [`Backend`](CollectionStoreError::Backend); this layer adds no retry,
/// recovery, or translation logic.
#[derive(Error, Debug)]
pub enum CollectionStoreError {
    /// Serialization/deserialization error when converting between model and
    /// document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during backend construction or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// No configuration is registered for the requested logical collection.
    #[error("No configuration registered for collection {0}")]
    Configuration(String),
    /// A configuration value has the wrong type, e.g. a database reference
    /// that is neither a name string nor a recognized database handle.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    /// The backend does not implement the requested operation or operator.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// An error occurred in the underlying database client.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for collection store operations.
pub type CollectionStoreResult<T> = Result<T, CollectionStoreError>;

impl From<BsonError> for CollectionStoreError {
    fn from(err: BsonError) -> Self {
        CollectionStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for CollectionStoreError {
    fn from(err: SerdeJsonError) -> Self {
        CollectionStoreError::Serialization(err.to_string())
    }
}
