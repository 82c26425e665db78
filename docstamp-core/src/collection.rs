//! Collection facades for pass-through CRUD operations.
//!
//! A collection facade binds a [`CollectionConfig`] to a backend
//! reference. Every operation resolves the target collection from the
//! configuration, applies the timestamp policy where relevant (inserts
//! and updates only), and forwards its arguments verbatim to the backend,
//! returning the backend's result or propagating its error unchanged.
//!
//! # Facade Types
//!
//! - [`Collection`] - Untyped facade with explicit BSON documents
//! - [`TypedCollection`] - Type-safe facade for a specific [`Model`]
//! - [`DynCollection`] - Dynamic dispatch version of the untyped facade
//! - [`DynTypedCollection`] - Dynamic dispatch version of the typed facade
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//!
//! # async fn example(store: &docstamp::store::CollectionStore<impl docstamp::backend::ClientBackend>) -> docstamp::error::CollectionStoreResult<()> {
//! let users = store.collection("users")?;
//! users.insert_one(doc! { "name": "Alice" }).await?;
//! let alice = users.find_one(doc! { "name": "Alice" }).await?;
//! # Ok(()) }
//! ```

use bson::Document;
use std::marker::PhantomData;

use crate::{
    backend::{ClientBackend, DynClientBackend},
    config::CollectionConfig,
    error::CollectionStoreResult,
    model::{Model, ModelExt},
    options::{FindOptions, UpdateOptions},
    results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult},
};

/// An untyped collection facade with a reference to a client backend.
///
/// All documents are explicit BSON values, providing maximum flexibility
/// but without compile-time type safety.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the backend reference
/// * `B` - The client backend type
#[derive(Debug)]
pub struct Collection<'a, B: ClientBackend> {
    config: CollectionConfig,
    backend: &'a B,
}

impl<'a, B: ClientBackend> Collection<'a, B> {
    /// Creates a new collection facade (internal use).
    pub(crate) fn new(config: CollectionConfig, backend: &'a B) -> Self {
        Self { config, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configuration driving this facade.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Returns the first document matching `filter`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn find_one(&self, filter: Document) -> CollectionStoreResult<Option<Document>> {
        self.backend
            .find_one(filter, self.config.collection_ref())
            .await
    }

    /// Returns all documents matching `filter`, honoring `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> CollectionStoreResult<Vec<Document>> {
        self.backend
            .find(filter, options, self.config.collection_ref())
            .await
    }

    /// Inserts a document, stamping creation and modification times per
    /// the configured timestamp policy.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn insert_one(&self, mut document: Document) -> CollectionStoreResult<InsertOneResult> {
        self.config.timestamps.stamp_insert(&mut document);

        self.backend
            .insert_one(document, self.config.collection_ref())
            .await
    }

    /// Inserts a sequence of documents, stamping each element
    /// independently.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn insert_many(
        &self,
        mut documents: Vec<Document>,
    ) -> CollectionStoreResult<InsertManyResult> {
        for document in &mut documents {
            self.config.timestamps.stamp_insert(document);
        }

        self.backend
            .insert_many(documents, self.config.collection_ref())
            .await
    }

    /// Applies `update` to the first document matching `filter`, folding
    /// the modification time into the `$set` clause per the timestamp
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn update_one(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_one(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Applies `update` to every document matching `filter`, folding the
    /// modification time into the `$set` clause per the timestamp policy.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn update_many(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_many(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Removes the first document matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn delete_one(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_one(filter, self.config.collection_ref())
            .await
    }

    /// Removes every document matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionStoreError`](crate::error::CollectionStoreError)
    /// if the backend operation fails.
    pub async fn delete_many(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_many(filter, self.config.collection_ref())
            .await
    }
}

/// A dynamic (type-erased) collection facade over a backend trait object.
///
/// Behaves exactly like [`Collection`] but uses dynamic dispatch, which
/// enables selecting the backend implementation at runtime.
#[derive(Debug)]
pub struct DynCollection<'a> {
    config: CollectionConfig,
    backend: &'a dyn DynClientBackend,
}

impl<'a> DynCollection<'a> {
    pub(crate) fn new(config: CollectionConfig, backend: &'a dyn DynClientBackend) -> Self {
        Self { config, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configuration driving this facade.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Returns the first document matching `filter`, or `None`.
    pub async fn find_one(&self, filter: Document) -> CollectionStoreResult<Option<Document>> {
        self.backend
            .find_one(filter, self.config.collection_ref())
            .await
    }

    /// Returns all documents matching `filter`, honoring `options`.
    pub async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> CollectionStoreResult<Vec<Document>> {
        self.backend
            .find(filter, options, self.config.collection_ref())
            .await
    }

    /// Inserts a document, stamping it per the timestamp policy.
    pub async fn insert_one(&self, mut document: Document) -> CollectionStoreResult<InsertOneResult> {
        self.config.timestamps.stamp_insert(&mut document);

        self.backend
            .insert_one(document, self.config.collection_ref())
            .await
    }

    /// Inserts a sequence of documents, stamping each element
    /// independently.
    pub async fn insert_many(
        &self,
        mut documents: Vec<Document>,
    ) -> CollectionStoreResult<InsertManyResult> {
        for document in &mut documents {
            self.config.timestamps.stamp_insert(document);
        }

        self.backend
            .insert_many(documents, self.config.collection_ref())
            .await
    }

    /// Applies `update` to the first document matching `filter`, stamping
    /// the `$set` clause per the timestamp policy.
    pub async fn update_one(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_one(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Applies `update` to every document matching `filter`, stamping the
    /// `$set` clause per the timestamp policy.
    pub async fn update_many(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_many(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Removes the first document matching `filter`.
    pub async fn delete_one(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_one(filter, self.config.collection_ref())
            .await
    }

    /// Removes every document matching `filter`.
    pub async fn delete_many(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_many(filter, self.config.collection_ref())
            .await
    }
}

/// A type-safe collection facade for a specific [`Model`].
///
/// Reads deserialize into the model type; writes serialize the model
/// before stamping and delegating. Update expressions stay raw driver
/// syntax; the facade applies the timestamp policy to them and nothing
/// else.
#[derive(Debug)]
pub struct TypedCollection<'a, B: ClientBackend, M: Model> {
    config: CollectionConfig,
    backend: &'a B,
    _marker: PhantomData<M>,
}

impl<'a, B: ClientBackend, M: Model> TypedCollection<'a, B, M> {
    pub(crate) fn new(config: CollectionConfig, backend: &'a B) -> Self {
        Self { config, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the first model matching `filter`, or `None`.
    pub async fn find_one(&self, filter: Document) -> CollectionStoreResult<Option<M>> {
        self.backend
            .find_one(filter, self.config.collection_ref())
            .await?
            .map(M::from_document)
            .transpose()
    }

    /// Returns all models matching `filter`, honoring `options`.
    pub async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> CollectionStoreResult<Vec<M>> {
        self.backend
            .find(filter, options, self.config.collection_ref())
            .await?
            .into_iter()
            .map(M::from_document)
            .collect()
    }

    /// Inserts a model, stamping it per the timestamp policy.
    pub async fn insert_one(&self, model: &M) -> CollectionStoreResult<InsertOneResult> {
        let mut document = model.to_document()?;
        self.config.timestamps.stamp_insert(&mut document);

        self.backend
            .insert_one(document, self.config.collection_ref())
            .await
    }

    /// Inserts a sequence of models, stamping each element independently.
    pub async fn insert_many(&self, models: Vec<M>) -> CollectionStoreResult<InsertManyResult> {
        let documents = models
            .iter()
            .map(|model| {
                model.to_document().map(|mut document| {
                    self.config.timestamps.stamp_insert(&mut document);
                    document
                })
            })
            .collect::<CollectionStoreResult<Vec<Document>>>()?;

        self.backend
            .insert_many(documents, self.config.collection_ref())
            .await
    }

    /// Applies a raw update expression to the first matching document,
    /// stamping the `$set` clause per the timestamp policy.
    pub async fn update_one(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_one(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Applies a raw update expression to every matching document,
    /// stamping the `$set` clause per the timestamp policy.
    pub async fn update_many(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_many(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Removes the first document matching `filter`.
    pub async fn delete_one(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_one(filter, self.config.collection_ref())
            .await
    }

    /// Removes every document matching `filter`.
    pub async fn delete_many(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_many(filter, self.config.collection_ref())
            .await
    }
}

/// Dynamic dispatch version of [`TypedCollection`].
#[derive(Debug)]
pub struct DynTypedCollection<'a, M: Model> {
    config: CollectionConfig,
    backend: &'a dyn DynClientBackend,
    _marker: PhantomData<M>,
}

impl<'a, M: Model> DynTypedCollection<'a, M> {
    pub(crate) fn new(config: CollectionConfig, backend: &'a dyn DynClientBackend) -> Self {
        Self { config, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the first model matching `filter`, or `None`.
    pub async fn find_one(&self, filter: Document) -> CollectionStoreResult<Option<M>> {
        self.backend
            .find_one(filter, self.config.collection_ref())
            .await?
            .map(M::from_document)
            .transpose()
    }

    /// Returns all models matching `filter`, honoring `options`.
    pub async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> CollectionStoreResult<Vec<M>> {
        self.backend
            .find(filter, options, self.config.collection_ref())
            .await?
            .into_iter()
            .map(M::from_document)
            .collect()
    }

    /// Inserts a model, stamping it per the timestamp policy.
    pub async fn insert_one(&self, model: &M) -> CollectionStoreResult<InsertOneResult> {
        let mut document = model.to_document()?;
        self.config.timestamps.stamp_insert(&mut document);

        self.backend
            .insert_one(document, self.config.collection_ref())
            .await
    }

    /// Inserts a sequence of models, stamping each element independently.
    pub async fn insert_many(&self, models: Vec<M>) -> CollectionStoreResult<InsertManyResult> {
        let documents = models
            .iter()
            .map(|model| {
                model.to_document().map(|mut document| {
                    self.config.timestamps.stamp_insert(&mut document);
                    document
                })
            })
            .collect::<CollectionStoreResult<Vec<Document>>>()?;

        self.backend
            .insert_many(documents, self.config.collection_ref())
            .await
    }

    /// Applies a raw update expression to the first matching document,
    /// stamping the `$set` clause per the timestamp policy.
    pub async fn update_one(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_one(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Applies a raw update expression to every matching document,
    /// stamping the `$set` clause per the timestamp policy.
    pub async fn update_many(
        &self,
        filter: Document,
        mut update: Document,
        options: UpdateOptions,
    ) -> CollectionStoreResult<UpdateResult> {
        self.config.timestamps.stamp_update(&mut update);

        self.backend
            .update_many(filter, update, options, self.config.collection_ref())
            .await
    }

    /// Removes the first document matching `filter`.
    pub async fn delete_one(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_one(filter, self.config.collection_ref())
            .await
    }

    /// Removes every document matching `filter`.
    pub async fn delete_many(&self, filter: Document) -> CollectionStoreResult<DeleteResult> {
        self.backend
            .delete_many(filter, self.config.collection_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CollectionRef,
        timestamp::{TimestampFormat, TimestampPolicy},
    };
    use async_trait::async_trait;
    use bson::{Bson, doc};
    use std::sync::Mutex;

    /// Records the last payload each operation forwarded to the backend.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        inserts: Mutex<Vec<Document>>,
        updates: Mutex<Vec<Document>>,
        targets: Mutex<Vec<(Option<String>, String)>>,
    }

    impl RecordingBackend {
        fn record_target(&self, target: CollectionRef<'_>) {
            self.targets
                .lock()
                .unwrap()
                .push((target.database.map(str::to_string), target.name.to_string()));
        }
    }

    #[async_trait]
    impl ClientBackend for RecordingBackend {
        async fn find_one(
            &self,
            _filter: Document,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<Option<Document>> {
            self.record_target(target);
            Ok(None)
        }

        async fn find(
            &self,
            _filter: Document,
            _options: FindOptions,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<Vec<Document>> {
            self.record_target(target);
            Ok(vec![])
        }

        async fn insert_one(
            &self,
            document: Document,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<InsertOneResult> {
            self.record_target(target);
            self.inserts.lock().unwrap().push(document);
            Ok(InsertOneResult { inserted_id: Bson::Int64(1) })
        }

        async fn insert_many(
            &self,
            documents: Vec<Document>,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<InsertManyResult> {
            self.record_target(target);
            let count = documents.len();
            self.inserts.lock().unwrap().extend(documents);
            Ok(InsertManyResult {
                inserted_ids: (0..count as i64).map(Bson::Int64).collect(),
            })
        }

        async fn update_one(
            &self,
            _filter: Document,
            update: Document,
            _options: UpdateOptions,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<UpdateResult> {
            self.record_target(target);
            self.updates.lock().unwrap().push(update);
            Ok(UpdateResult { matched_count: 1, modified_count: 1, upserted_id: None })
        }

        async fn update_many(
            &self,
            _filter: Document,
            update: Document,
            _options: UpdateOptions,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<UpdateResult> {
            self.record_target(target);
            self.updates.lock().unwrap().push(update);
            Ok(UpdateResult { matched_count: 2, modified_count: 2, upserted_id: None })
        }

        async fn delete_one(
            &self,
            _filter: Document,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<DeleteResult> {
            self.record_target(target);
            Ok(DeleteResult { deleted_count: 1 })
        }

        async fn delete_many(
            &self,
            _filter: Document,
            target: CollectionRef<'_>,
        ) -> CollectionStoreResult<DeleteResult> {
            self.record_target(target);
            Ok(DeleteResult { deleted_count: 2 })
        }
    }

    fn stamped_config() -> CollectionConfig {
        CollectionConfig::new("users")
            .with_timestamps(TimestampPolicy::new(TimestampFormat::Millis))
    }

    #[tokio::test]
    async fn test_insert_one_stamps_before_forwarding() {
        let backend = RecordingBackend::default();
        let collection = Collection::new(stamped_config(), &backend);

        collection
            .insert_one(doc! { "name": "Alice" })
            .await
            .unwrap();

        let inserts = backend.inserts.lock().unwrap();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].get_str("name").unwrap(), "Alice");
        assert!(inserts[0].contains_key("createdAt"));
        assert!(inserts[0].contains_key("updatedAt"));
    }

    #[tokio::test]
    async fn test_insert_many_stamps_every_element() {
        let backend = RecordingBackend::default();
        let collection = Collection::new(stamped_config(), &backend);

        collection
            .insert_many(vec![doc! { "n": 1 }, doc! { "n": 2 }])
            .await
            .unwrap();

        let inserts = backend.inserts.lock().unwrap();
        assert_eq!(inserts.len(), 2);
        assert!(inserts.iter().all(|d| d.contains_key("createdAt")));
    }

    #[tokio::test]
    async fn test_update_one_stamps_set_clause() {
        let backend = RecordingBackend::default();
        let collection = Collection::new(stamped_config(), &backend);

        collection
            .update_one(
                doc! { "name": "Alice" },
                doc! { "$set": { "name": "Bob" } },
                UpdateOptions::default(),
            )
            .await
            .unwrap();

        let updates = backend.updates.lock().unwrap();
        let set = updates[0].get_document("$set").unwrap();
        assert_eq!(set.get_str("name").unwrap(), "Bob");
        assert!(set.contains_key("updatedAt"));
    }

    #[tokio::test]
    async fn test_disabled_policy_forwards_verbatim() {
        let backend = RecordingBackend::default();
        let collection = Collection::new(CollectionConfig::new("users"), &backend);

        collection
            .insert_one(doc! { "name": "Alice" })
            .await
            .unwrap();
        collection
            .update_one(doc! {}, doc! { "$inc": { "n": 1 } }, UpdateOptions::default())
            .await
            .unwrap();

        assert_eq!(
            *backend.inserts.lock().unwrap(),
            vec![doc! { "name": "Alice" }]
        );
        assert_eq!(
            *backend.updates.lock().unwrap(),
            vec![doc! { "$inc": { "n": 1 } }]
        );
    }

    #[tokio::test]
    async fn test_target_carries_database_override() {
        let backend = RecordingBackend::default();
        let config = CollectionConfig::new("users").with_database("accounts");
        let collection = Collection::new(config, &backend);

        collection.delete_many(doc! {}).await.unwrap();

        assert_eq!(
            *backend.targets.lock().unwrap(),
            vec![(Some("accounts".to_string()), "users".to_string())]
        );
    }

    #[tokio::test]
    async fn test_results_pass_through_unchanged() {
        let backend = RecordingBackend::default();
        let collection = Collection::new(stamped_config(), &backend);

        let update = collection
            .update_many(doc! {}, doc! {}, UpdateOptions::default())
            .await
            .unwrap();
        assert_eq!(update.matched_count, 2);
        assert_eq!(update.modified_count, 2);

        let delete = collection.delete_one(doc! {}).await.unwrap();
        assert_eq!(delete.deleted_count, 1);
    }

    #[tokio::test]
    async fn test_dyn_collection_stamps_like_static() {
        let backend = RecordingBackend::default();
        let collection = DynCollection::new(stamped_config(), &backend);

        collection
            .insert_one(doc! { "name": "Alice" })
            .await
            .unwrap();

        let inserts = backend.inserts.lock().unwrap();
        assert!(inserts[0].contains_key("createdAt"));
    }
}
