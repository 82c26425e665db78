use async_trait::async_trait;
use bson::Document;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions as MongoFindOptions},
};
use tracing::debug;

use docstamp_core::{
    backend::{ClientBackend, ClientBackendBuilder},
    config::CollectionRef,
    error::{CollectionStoreError, CollectionStoreResult},
    options::{FindOptions, UpdateOptions},
    results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult},
};

use crate::database::DatabaseRef;


#[derive(Debug)]
pub struct MongoClientBackend {
    client: Client,
    database: mongodb::Database,
}

impl MongoClientBackend {
    pub fn new(client: Client, database: impl Into<DatabaseRef>) -> Self {
        let database = database.into().resolve(&client);

        Self { client, database }
    }

    pub fn builder(dsn: &str, database: impl Into<DatabaseRef>) -> MongoClientBuilder {
        MongoClientBuilder::new(dsn, database)
    }

    fn collection(&self, target: CollectionRef<'_>) -> MongoCollection<Document> {
        match target.database {
            Some(name) => self.client.database(name).collection(target.name),
            None => self.database.collection(target.name),
        }
    }

    fn driver_options(options: FindOptions) -> MongoFindOptions {
        let mut driver_options = MongoFindOptions::default();
        driver_options.limit = options.limit;
        driver_options.skip = options.skip;
        driver_options.sort = options.sort;
        driver_options
    }

    async fn shutdown(self) -> CollectionStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl ClientBackend for MongoClientBackend {
    async fn find_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Option<Document>> {
        self.collection(target)
            .find_one(filter)
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<Vec<Document>> {
        self.collection(target)
            .find(filter)
            .with_options(Self::driver_options(options))
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))
    }

    async fn insert_one(
        &self,
        document: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertOneResult> {
        let result = self.collection(target)
            .insert_one(document)
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))?;

        Ok(InsertOneResult { inserted_id: result.inserted_id })
    }

    async fn insert_many(
        &self,
        documents: Vec<Document>,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<InsertManyResult> {
        let result = self.collection(target)
            .insert_many(documents)
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))?;

        // The driver hands back ids keyed by input index.
        let mut indexed = result.inserted_ids.into_iter().collect::<Vec<_>>();
        indexed.sort_by_key(|(index, _)| *index);

        Ok(InsertManyResult {
            inserted_ids: indexed.into_iter().map(|(_, id)| id).collect(),
        })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        let collection = self.collection(target);
        let mut action = collection.update_one(filter, update);
        if options.upsert {
            action = action.upsert(true);
        }

        let result = action
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<UpdateResult> {
        let collection = self.collection(target);
        let mut action = collection.update_many(filter, update);
        if options.upsert {
            action = action.upsert(true);
        }

        let result = action
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        let result = self.collection(target)
            .delete_one(filter)
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))?;

        Ok(DeleteResult { deleted_count: result.deleted_count })
    }

    async fn delete_many(
        &self,
        filter: Document,
        target: CollectionRef<'_>,
    ) -> CollectionStoreResult<DeleteResult> {
        let result = self.collection(target)
            .delete_many(filter)
            .await
            .map_err(|e| CollectionStoreError::Backend(e.to_string()))?;

        Ok(DeleteResult { deleted_count: result.deleted_count })
    }

    async fn shutdown(self) -> CollectionStoreResult<()> {
        self.shutdown().await
    }
}

pub struct MongoClientBuilder {
    dsn: Option<String>,
    client: Option<Client>,
    database: DatabaseRef,
}

impl MongoClientBuilder {
    pub fn new(dsn: &str, database: impl Into<DatabaseRef>) -> Self {
        Self {
            dsn: Some(dsn.to_string()),
            client: None,
            database: database.into(),
        }
    }

    /// Builds on an existing client handle instead of connecting anew.
    pub fn with_client(client: Client, database: impl Into<DatabaseRef>) -> Self {
        Self {
            dsn: None,
            client: Some(client),
            database: database.into(),
        }
    }
}

#[async_trait]
impl ClientBackendBuilder for MongoClientBuilder {
    type Backend = MongoClientBackend;

    async fn build(self) -> CollectionStoreResult<Self::Backend> {
        let client = match (self.client, self.dsn) {
            (Some(client), _) => client,
            (None, Some(dsn)) => Client::with_options(
                ClientOptions::parse(&dsn)
                    .await
                    .map_err(|e| CollectionStoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| CollectionStoreError::Initialization(e.to_string()))?,
            (None, None) => {
                return Err(CollectionStoreError::Initialization(
                    "neither a connection string nor a client was supplied".to_string(),
                ));
            }
        };

        let backend = MongoClientBackend::new(client, self.database);
        debug!(database = backend.database.name(), "mongodb backend initialized");

        Ok(backend)
    }
}
