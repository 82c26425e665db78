//! Store entry point binding a backend to registered collections.
//!
//! A store owns a client backend and a [`CollectionRegistry`]. Collections
//! are handed out three ways:
//!
//! - by logical name against the registry ([`CollectionStore::collection`])
//! - with an explicit configuration ([`CollectionStore::collection_with`])
//! - typed, with configuration from the model
//!   ([`CollectionStore::typed_collection`])
//!
//! # Example
//!
//! ```ignore
//! use docstamp::store::CollectionStore;
//! use docstamp::config::CollectionConfig;
//!
//! let mut store = CollectionStore::new(backend);
//! store.register(CollectionConfig::new("users"));
//! let users = store.collection("users")?;
//! ```

use crate::{
    backend::{ClientBackend, DynClientBackend},
    collection::{Collection, DynCollection, DynTypedCollection, TypedCollection},
    config::{CollectionConfig, CollectionRegistry},
    error::CollectionStoreResult,
    model::Model,
};

/// A strongly-typed store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct CollectionStore<B: ClientBackend> {
    backend: B,
    registry: CollectionRegistry,
}

impl<B: ClientBackend> CollectionStore<B> {
    /// Creates a store with the given backend and an empty registry.
    pub fn new(backend: B) -> Self {
        Self { backend, registry: CollectionRegistry::new() }
    }

    /// Creates a store with the given backend and a pre-populated
    /// registry (e.g. loaded from configuration files).
    pub fn with_registry(backend: B, registry: CollectionRegistry) -> Self {
        Self { backend, registry }
    }

    /// Registers a collection configuration under its collection name.
    pub fn register(&mut self, config: CollectionConfig) {
        self.registry.register(config);
    }

    /// Returns the registry backing name-based collection resolution.
    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Resolves a collection facade by logical name.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionStoreError::Configuration`](crate::error::CollectionStoreError::Configuration)
    /// when no configuration was registered for `name`.
    pub fn collection<'a>(&'a self, name: &str) -> CollectionStoreResult<Collection<'a, B>> {
        Ok(Collection::new(self.registry.get(name)?.clone(), &self.backend))
    }

    /// Creates a collection facade from an explicit configuration,
    /// bypassing the registry.
    pub fn collection_with<'a>(&'a self, config: CollectionConfig) -> Collection<'a, B> {
        Collection::new(config, &self.backend)
    }

    /// Creates a typed collection facade for a model, using the
    /// configuration the model supplies.
    pub fn typed_collection<'a, M: Model>(&'a self) -> TypedCollection<'a, B, M> {
        TypedCollection::new(M::config(), &self.backend)
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// This consumes the store and should be called when no longer needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown operation fails.
    pub async fn shutdown(self) -> CollectionStoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}

/// A store over a boxed backend trait object, for runtime backend
/// selection.
#[derive(Debug)]
pub struct DynCollectionStore {
    backend: Box<dyn DynClientBackend>,
    registry: CollectionRegistry,
}

impl DynCollectionStore {
    /// Creates a dynamic store with the given backend trait object.
    pub fn new(backend: Box<dyn DynClientBackend>) -> Self {
        Self { backend, registry: CollectionRegistry::new() }
    }

    /// Registers a collection configuration under its collection name.
    pub fn register(&mut self, config: CollectionConfig) {
        self.registry.register(config);
    }

    /// Resolves a collection facade by logical name.
    pub fn collection<'a>(&'a self, name: &str) -> CollectionStoreResult<DynCollection<'a>> {
        Ok(DynCollection::new(self.registry.get(name)?.clone(), &*self.backend))
    }

    /// Creates a collection facade from an explicit configuration.
    pub fn collection_with<'a>(&'a self, config: CollectionConfig) -> DynCollection<'a> {
        DynCollection::new(config, &*self.backend)
    }

    /// Creates a typed collection facade for a model.
    pub fn typed_collection<'a, M: Model>(&'a self) -> DynTypedCollection<'a, M> {
        DynTypedCollection::new(M::config(), &*self.backend)
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> CollectionStoreResult<()> {
        self.backend.shutdown_boxed().await
    }
}

/// Conversion trait for turning a store into a dynamic owned store.
pub trait IntoDynCollectionStore {
    /// Converts this store into a dynamic owned store, keeping its
    /// registered collections.
    fn into_dyn(self) -> DynCollectionStore;
}

impl<B: ClientBackend + 'static> IntoDynCollectionStore for CollectionStore<B> {
    fn into_dyn(self) -> DynCollectionStore {
        DynCollectionStore {
            backend: Box::new(self.backend),
            registry: self.registry,
        }
    }
}

impl IntoDynCollectionStore for DynCollectionStore {
    fn into_dyn(self) -> DynCollectionStore {
        self
    }
}

/// Conversion trait for recovering a concrete backend from a dynamic
/// store.
pub trait IntoStaticCollectionStore {
    /// Converts this store into a statically-typed store, or `None` when
    /// the backend is not a `B`.
    fn into_static<B>(self) -> Option<CollectionStore<B>>
    where
        B: ClientBackend + 'static;
}

impl IntoStaticCollectionStore for DynCollectionStore {
    fn into_static<B>(self) -> Option<CollectionStore<B>>
    where
        B: ClientBackend + 'static,
    {
        let registry = self.registry;

        self.backend
            .into_any()
            .downcast::<B>()
            .ok()
            .map(|backend| CollectionStore::with_registry(*backend, registry))
    }
}
