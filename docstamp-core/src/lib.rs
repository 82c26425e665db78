//! A timestamping collection facade over document database drivers.
//!
//! This crate is the core of the docstamp project and provides:
//!
//! - **Timestamp policy** ([`timestamp`]) - Automatic creation/modification
//!   time injection on inserts and updates
//! - **Configuration** ([`config`]) - Per-collection configuration and the
//!   collection registry
//! - **Backend abstraction** ([`backend`]) - Traits for delegating to
//!   different client drivers
//! - **Collection facades** ([`collection`]) - Pass-through CRUD with
//!   timestamp stamping
//! - **Model traits** ([`model`]) - Typed collection access
//! - **Store entry point** ([`store`]) - Binding a backend to registered
//!   collections
//! - **Options and results** ([`options`], [`results`]) - Conventional
//!   driver options and neutral write acknowledgements
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docstamp::{config::CollectionConfig, store::CollectionStore};
//! use docstamp::timestamp::{TimestampFormat, TimestampPolicy};
//! use bson::doc;
//!
//! let mut store = CollectionStore::new(backend);
//! store.register(
//!     CollectionConfig::new("users")
//!         .with_timestamps(TimestampPolicy::new(TimestampFormat::Millis)),
//! );
//!
//! let users = store.collection("users")?;
//! users.insert_one(doc! { "name": "Alice" }).await?;
//! // The stored document now carries createdAt and updatedAt.
//! ```

#[allow(unused_extern_crates)]
extern crate self as docstamp_core;

pub mod backend;
pub mod collection;
pub mod config;
pub mod error;
pub mod model;
pub mod options;
pub mod results;
pub mod store;
pub mod timestamp;
