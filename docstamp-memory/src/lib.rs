//! In-memory client backend for the docstamp facade.
//!
//! This crate provides [`InMemoryClient`], a [`ClientBackend`] that keeps
//! documents in process memory. It exists for development and tests: the
//! facade behaves exactly as it does against a real driver, without a
//! database server.
//!
//! [`ClientBackend`]: docstamp_core::backend::ClientBackend
//!
//! # Example
//!
//! ```ignore
//! use docstamp_memory::InMemoryClient;
//! use docstamp_core::store::CollectionStore;
//! use docstamp_core::config::CollectionConfig;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = CollectionStore::new(InMemoryClient::new());
//!     store.register(CollectionConfig::new("users"));
//!
//!     let users = store.collection("users")?;
//!     users.insert_one(doc! { "name": "Alice" }).await?;
//!
//!     Ok(())
//! }
//! ```

mod matcher;
mod store;

pub use store::{InMemoryClient, InMemoryClientBuilder};
