//! Convenient re-exports of commonly used types from docstamp.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docstamp::prelude::*;
//! ```

pub use docstamp_core::{
    backend::{ClientBackend, ClientBackendBuilder, DynClientBackend},
    collection::{Collection, DynCollection, DynTypedCollection, TypedCollection},
    config::{CollectionConfig, CollectionRef, CollectionRegistry},
    error::{CollectionStoreError, CollectionStoreResult},
    model::{Model, ModelExt},
    options::{FindOptions, SortDirection, UpdateOptions},
    results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult},
    store::{CollectionStore, DynCollectionStore, IntoDynCollectionStore, IntoStaticCollectionStore},
    timestamp::{TimestampFields, TimestampFormat, TimestampPolicy},
};
