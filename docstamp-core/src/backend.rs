//! Client backend abstraction for the collection facade.
//!
//! This module defines the traits that abstract over document-database
//! client drivers, allowing the facade to delegate to different backends
//! (in-memory, MongoDB, others).
//!
//! # Overview
//!
//! The [`ClientBackend`] trait is the generic document-database client
//! interface: the conventional CRUD surface (`find_one`, `find`,
//! `insert_one`, `insert_many`, `update_one`, `update_many`, `delete_one`,
//! `delete_many`), each call addressed at a [`CollectionRef`]. Filters,
//! update expressions, and options are forwarded verbatim; results come
//! back as the neutral types in [`crate::results`]. Implementations are
//! required to be thread-safe (`Send + Sync`).
//!
//! # Traits
//!
//! - [`ClientBackend`]: the core trait for client backends
//! - [`DynClientBackend`]: a trait for dynamic dispatch over backends
//! - [`ClientBackendBuilder`]: factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use docstamp::backend::ClientBackend;
//! use docstamp::config::CollectionRef;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//! let target = CollectionRef { database: None, name: "users" };
//! let result = backend
//!     .insert_one(doc! { "name": "Alice" }, target)
//!     .await?;
//! println!("inserted {}", result.inserted_id);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Document;
use std::{any::Any, fmt::Debug};

use crate::{
    config::CollectionRef,
    error::CollectionStoreResult,
    options::{FindOptions, UpdateOptions},
    results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult},
};

/// Abstract interface over a document-database client driver.
///
/// Implementers delegate every operation to their driver (or storage
/// model) without interpreting the caller's documents: whatever filter or
/// update syntax the backing driver accepts travels through unchanged,
/// and driver failures surface as
/// [`CollectionStoreError::Backend`](crate::error::CollectionStoreError::Backend).
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access
/// from multiple async tasks. Connection pooling, request scheduling, and
/// retries belong to the underlying client, not to this trait.
#[async_trait]
pub trait ClientBackend: Send + Sync + Debug {
    /// Returns the first document matching `filter`, or `None`.
    ///
    /// # Arguments
    ///
    /// * `filter` - Driver-syntax filter document, forwarded verbatim
    /// * `target` - The collection to search
    async fn find_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Option<Document>>;

    /// Returns all documents matching `filter`, honoring `options`.
    ///
    /// # Arguments
    ///
    /// * `filter` - Driver-syntax filter document, forwarded verbatim
    /// * `options` - Limit, skip, and sort forwarded to the driver
    /// * `target` - The collection to search
    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Vec<Document>>;

    /// Inserts one document, returning the identifier it was stored under.
    ///
    /// Backends generate an identifier when the document carries none.
    async fn insert_one(
        &self,
        document: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertOneResult>;

    /// Inserts a sequence of documents, returning their identifiers in
    /// input order.
    async fn insert_many(
        &self,
        documents: Vec<Document>,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertManyResult>;

    /// Applies `update` to the first document matching `filter`.
    ///
    /// # Arguments
    ///
    /// * `filter` - Driver-syntax filter document, forwarded verbatim
    /// * `update` - Driver-syntax update expression (e.g. `$set`)
    /// * `options` - Upsert behavior
    /// * `target` - The collection to update
    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult>;

    /// Applies `update` to every document matching `filter`.
    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult>;

    /// Removes the first document matching `filter`.
    async fn delete_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult>;

    /// Removes every document matching `filter`.
    async fn delete_many(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult>;

    /// Cleanly shuts down the backend, releasing client resources.
    ///
    /// The default implementation is a no-op; backends holding external
    /// connections should override it.
    async fn shutdown(self) -> CollectionStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> ClientBackend for &B
where
    B: ClientBackend,
{
    async fn find_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Option<Document>> {
        (*self).find_one(filter, target).await
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Vec<Document>> {
        (*self)
            .find(filter, options, target)
            .await
    }

    async fn insert_one(
        &self,
        document: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertOneResult> {
        (*self).insert_one(document, target).await
    }

    async fn insert_many(
        &self,
        documents: Vec<Document>,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertManyResult> {
        (*self)
            .insert_many(documents, target)
            .await
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        (*self)
            .update_one(filter, update, options, target)
            .await
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        (*self)
            .update_many(filter, update, options, target)
            .await
    }

    async fn delete_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        (*self).delete_one(filter, target).await
    }

    async fn delete_many(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        (*self).delete_many(filter, target).await
    }
}

/// Object-safe twin of [`ClientBackend`] for dynamic dispatch.
#[async_trait]
pub trait DynClientBackend: Send + Sync + Debug {
    async fn find_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Option<Document>>;
    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Vec<Document>>;
    async fn insert_one(
        &self,
        document: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertOneResult>;
    async fn insert_many(
        &self,
        documents: Vec<Document>,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertManyResult>;
    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult>;
    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult>;
    async fn delete_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult>;
    async fn delete_many(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult>;
    async fn shutdown_boxed(self: Box<Self>) -> CollectionStoreResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

#[async_trait]
impl<B: ClientBackend + 'static> DynClientBackend for B {
    async fn find_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Option<Document>> {
        ClientBackend::find_one(self, filter, target).await
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Vec<Document>> {
        ClientBackend::find(self, filter, options, target).await
    }

    async fn insert_one(
        &self,
        document: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertOneResult> {
        ClientBackend::insert_one(self, document, target).await
    }

    async fn insert_many(
        &self,
        documents: Vec<Document>,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertManyResult> {
        ClientBackend::insert_many(self, documents, target).await
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        ClientBackend::update_one(self, filter, update, options, target).await
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        ClientBackend::update_many(self, filter, update, options, target).await
    }

    async fn delete_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        ClientBackend::delete_one(self, filter, target).await
    }

    async fn delete_many(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        ClientBackend::delete_many(self, filter, target).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> CollectionStoreResult<()> {
        (*self).shutdown().await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Factory trait for constructing backend instances.
#[async_trait]
pub trait ClientBackendBuilder {
    /// The backend type this builder produces.
    type Backend: ClientBackend;

    /// Builds the backend, establishing any client connections it needs.
    async fn build(self) -> CollectionStoreResult<Self::Backend>;
}
