//! Main docstamp crate providing a timestamping collection facade over
//! document database drivers.
//!
//! This crate is the primary entry point for users of the docstamp
//! framework. It re-exports the core types and functionality from the
//! sub-crates and provides convenient access to the available client
//! backends.
//!
//! # Features
//!
//! - **Automatic timestamps** - `createdAt`/`updatedAt` injection on
//!   inserts and updates, in configurable formats and under configurable
//!   field names, never clobbering caller-supplied values
//! - **Pass-through CRUD** - filters, update expressions, and options are
//!   forwarded verbatim to the underlying client; results come back
//!   unchanged
//! - **Multiple backends** - in-memory for development and tests, MongoDB
//!   behind the `mongodb` feature, extensible via the backend traits
//! - **Typed or untyped access** - work with raw BSON documents or with
//!   your own serde types through the `Model` trait
//!
//! # Quick Start
//!
//! ```ignore
//! use docstamp::{prelude::*, memory::InMemoryClient};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut store = CollectionStore::new(InMemoryClient::new());
//!
//!     // Configure a collection with millisecond timestamps.
//!     store.register(
//!         CollectionConfig::new("users")
//!             .with_timestamps(TimestampPolicy::new(TimestampFormat::Millis)),
//!     );
//!
//!     let users = store.collection("users").unwrap();
//!
//!     // The stored document gains createdAt and updatedAt.
//!     users
//!         .insert_one(doc! { "name": "Alice" })
//!         .await
//!         .unwrap();
//!
//!     // The update expression gains $set.updatedAt.
//!     users
//!         .update_one(
//!             doc! { "name": "Alice" },
//!             doc! { "$set": { "name": "Bob" } },
//!             UpdateOptions::default(),
//!         )
//!         .await
//!         .unwrap();
//!
//!     store.shutdown().await.unwrap();
//! }
//! ```
//!
//! # Typed Collections
//!
//! ```ignore
//! use docstamp::{prelude::*, memory::InMemoryClient};
//! use serde::{Serialize, Deserialize};
//! use bson::doc;
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
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = CollectionStore::new(InMemoryClient::new());
//!     let users = store.typed_collection::<User>();
//!
//!     let user = User { name: "Alice".to_string(), email: "alice@example.com".to_string() };
//!     users.insert_one(&user).await.unwrap();
//!
//!     let found = users
//!         .find_one(doc! { "name": "Alice" })
//!         .await
//!         .unwrap();
//!     println!("found: {:?}", found);
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use docstamp_core::{
    backend, collection, config, error, model, options, results, store, timestamp,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory client backend implementations.
pub mod memory {
    pub use docstamp_memory::{InMemoryClient, InMemoryClientBuilder};
}

/// MongoDB client backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docstamp_mongodb::{DatabaseRef, MongoClientBackend, MongoClientBuilder};
}
