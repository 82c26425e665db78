//! In-memory client backend for development and tests.
//!
//! Documents are stored as BSON values in nested maps (database name ->
//! collection name -> documents) behind an async-safe read-write lock.
//! Insertion order is preserved, which is what an unindexed driver scan
//! returns, so unsorted reads are deterministic in tests.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use mea::rwlock::RwLock;

use docstamp_core::{
    backend::{ClientBackend, ClientBackendBuilder},
    config::CollectionRef,
    error::CollectionStoreResult,
    options::{FindOptions, UpdateOptions},
    results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult},
};

use crate::matcher::{Comparable, FilterMatcher, UpdateApplier};

type CollectionVec = Vec<Document>;
type DatabaseMap = HashMap<String, CollectionVec>;
type StoreMap = HashMap<String, DatabaseMap>;

/// Default database name used when a collection carries no override.
const DEFAULT_DATABASE: &str = "test";

/// Thread-safe in-memory client backend.
///
/// This struct implements the [`ClientBackend`] trait against process
/// memory instead of a database server. It interprets the conventional
/// subset of driver filter/update syntax described in
/// [`crate::matcher`] and generates BSON ObjectIds for documents inserted
/// without an `_id`.
///
/// # Thread Safety
///
/// `InMemoryClient` is cloneable and uses an `Arc`-wrapped internal
/// state; clones share the same underlying data.
///
/// # Performance
///
/// Every read scans the whole collection. For the development and test
/// datasets this backend exists for, that is acceptable; production
/// workloads belong on a real driver backend.
#[derive(Clone, Debug)]
pub struct InMemoryClient {
    /// Default database applied when the target has no override.
    database: String,
    /// database name -> collection name -> documents
    store: Arc<RwLock<StoreMap>>,
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClient {
    /// Creates a new empty in-memory backend with the default database
    /// name (`test`).
    pub fn new() -> Self {
        Self::with_database(DEFAULT_DATABASE)
    }

    /// Creates a new empty in-memory backend with the given default
    /// database name.
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryClient`.
    pub fn builder() -> InMemoryClientBuilder {
        InMemoryClientBuilder::default()
    }

    fn database_name<'a>(&'a self, target: &CollectionRef<'a>) -> &'a str {
        target.database.unwrap_or(self.database.as_str())
    }

    /// Ensures an `_id`, generating an ObjectId like a driver would.
    fn identify(document: &mut Document) -> Bson {
        match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert("_id", id.clone());
                id
            }
        }
    }

    fn sort_documents(documents: &mut [Document], sort: &Document) {
        // Single-field sort; the first sort key wins like an unindexed scan.
        let Some((field, direction)) = sort.iter().next() else {
            return;
        };
        let descending = matches!(Comparable::from(direction), Comparable::Number(n) if n < 0.0);

        documents.sort_by(|a, b| {
            let left = a.get(field).map(Comparable::from).unwrap_or(Comparable::Null);
            let right = b.get(field).map(Comparable::from).unwrap_or(Comparable::Null);

            let ordering = left.partial_cmp(&right).unwrap_or(Ordering::Equal);
            if descending { ordering.reverse() } else { ordering }
        });
    }

    async fn update_documents(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
        many: bool,
    ) -> CollectionStoreResult<UpdateResult> {
        let mut store = self.store.write().await;
        let collection = store
            .entry(self.database_name(&target).to_string())
            .or_default()
            .entry(target.name.to_string())
            .or_default();

        let mut matched = 0;
        let mut modified = 0;

        for document in collection.iter_mut() {
            if !FilterMatcher::matches(document, &filter)? {
                continue;
            }

            matched += 1;
            if UpdateApplier::apply(document, &update)? {
                modified += 1;
            }

            if !many {
                break;
            }
        }

        if matched == 0 && options.upsert {
            let mut seeded = UpdateApplier::upsert_seed(&filter);
            UpdateApplier::apply(&mut seeded, &update)?;
            let id = Self::identify(&mut seeded);
            collection.push(seeded);

            return Ok(UpdateResult {
                matched_count: 0,
                modified_count: 0,
                upserted_id: Some(id),
            });
        }

        Ok(UpdateResult {
            matched_count: matched,
            modified_count: modified,
            upserted_id: None,
        })
    }

    async fn delete_documents(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
        many: bool,
    ) -> CollectionStoreResult<DeleteResult> {
        let mut store = self.store.write().await;
        let Some(collection) = store
            .get_mut(self.database_name(&target))
            .and_then(|database| database.get_mut(target.name))
        else {
            return Ok(DeleteResult { deleted_count: 0 });
        };

        let mut deleted = 0;
        let mut kept = Vec::with_capacity(collection.len());

        for document in collection.drain(..) {
            if (many || deleted == 0) && FilterMatcher::matches(&document, &filter)? {
                deleted += 1;
            } else {
                kept.push(document);
            }
        }

        *collection = kept;

        Ok(DeleteResult { deleted_count: deleted })
    }
}

#[async_trait]
impl ClientBackend for InMemoryClient {
    async fn find_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Option<Document>> {
        Ok(self
            .find(filter, FindOptions { limit: Some(1), ..FindOptions::default() }, target)
            .await?
            .into_iter()
            .next())
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection) = store
            .get(self.database_name(&target))
            .and_then(|database| database.get(target.name))
        else {
            return Ok(vec![]);
        };

        let mut matched = Vec::new();
        for document in collection {
            if FilterMatcher::matches(document, &filter)? {
                matched.push(document.clone());
            }
        }

        if let Some(sort) = &options.sort {
            Self::sort_documents(&mut matched, sort);
        }

        Ok(matched
            .into_iter()
            .skip(options.skip.unwrap_or(0) as usize)
            .take(options.limit.map(|limit| limit as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn insert_one(
        &self,
        mut document: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertOneResult> {
        let inserted_id = Self::identify(&mut document);

        self.store
            .write()
            .await
            .entry(self.database_name(&target).to_string())
            .or_default()
            .entry(target.name.to_string())
            .or_default()
            .push(document);

        Ok(InsertOneResult { inserted_id })
    }

    async fn insert_many(
        &self,
        documents: Vec<Document>,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertManyResult> {
        let mut store = self.store.write().await;
        let collection = store
            .entry(self.database_name(&target).to_string())
            .or_default()
            .entry(target.name.to_string())
            .or_default();

        let mut inserted_ids = Vec::with_capacity(documents.len());

        for mut document in documents {
            inserted_ids.push(Self::identify(&mut document));
            collection.push(document);
        }

        Ok(InsertManyResult { inserted_ids })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        self.update_documents(filter, update, options, target, false)
            .await
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        self.update_documents(filter, update, options, target, true)
            .await
    }

    async fn delete_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        self.delete_documents(filter, target, false).await
    }

    async fn delete_many(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        self.delete_documents(filter, target, true).await
    }
}

/// Builder for constructing [`InMemoryClient`] instances.
#[derive(Default)]
pub struct InMemoryClientBuilder {
    database: Option<String>,
}

impl InMemoryClientBuilder {
    /// Sets the default database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

#[async_trait]
impl ClientBackendBuilder for InMemoryClientBuilder {
    type Backend = InMemoryClient;

    async fn build(self) -> CollectionStoreResult<Self::Backend> {
        Ok(match self.database {
            Some(database) => InMemoryClient::with_database(database),
            None => InMemoryClient::new(),
        })
    }
}
