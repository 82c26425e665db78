//! End-to-end tests of the collection facade against the in-memory
//! backend.

use bson::{Bson, doc};
use docstamp::{memory::InMemoryClient, prelude::*};
use serde::{Deserialize, Serialize};

fn stamped_store() -> CollectionStore<InMemoryClient> {
    let mut store = CollectionStore::new(InMemoryClient::new());
    store.register(
        CollectionConfig::new("users")
            .with_timestamps(TimestampPolicy::new(TimestampFormat::Millis)),
    );
    store
}

#[tokio::test]
async fn test_insert_stamps_created_and_updated() {
    let store = stamped_store();
    let users = store.collection("users").unwrap();

    users.insert_one(doc! { "name": "Alice" }).await.unwrap();

    let stored = users
        .find_one(doc! { "name": "Alice" })
        .await
        .unwrap()
        .unwrap();

    let created = stored.get_i64("createdAt").unwrap();
    let updated = stored.get_i64("updatedAt").unwrap();
    assert_eq!(created, updated);
    assert!(created > 0);
}

#[tokio::test]
async fn test_insert_preserves_caller_supplied_created() {
    let store = stamped_store();
    let users = store.collection("users").unwrap();

    users
        .insert_one(doc! { "name": "Alice", "createdAt": 99_i64 })
        .await
        .unwrap();

    let stored = users
        .find_one(doc! { "name": "Alice" })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stored.get_i64("createdAt").unwrap(), 99);
    assert!(stored.get_i64("updatedAt").unwrap() > 99);
}

#[tokio::test]
async fn test_update_stamps_set_clause() {
    let store = stamped_store();
    let users = store.collection("users").unwrap();

    users
        .insert_one(doc! { "name": "Alice", "createdAt": 99_i64, "updatedAt": 99_i64 })
        .await
        .unwrap();

    let result = users
        .update_one(
            doc! { "name": "Alice" },
            doc! { "$set": { "name": "Bob" } },
            UpdateOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);

    let stored = users
        .find_one(doc! { "name": "Bob" })
        .await
        .unwrap()
        .unwrap();

    // The modification time moved; the creation time did not.
    assert_eq!(stored.get_i64("createdAt").unwrap(), 99);
    assert!(stored.get_i64("updatedAt").unwrap() > 99);
}

#[tokio::test]
async fn test_update_respects_explicit_updated_value() {
    let store = stamped_store();
    let users = store.collection("users").unwrap();

    users.insert_one(doc! { "name": "Alice" }).await.unwrap();

    users
        .update_one(
            doc! { "name": "Alice" },
            doc! { "$set": { "updatedAt": 42 } },
            UpdateOptions::default(),
        )
        .await
        .unwrap();

    let stored = users
        .find_one(doc! { "name": "Alice" })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stored.get("updatedAt"), Some(&Bson::Int32(42)));
}

#[tokio::test]
async fn test_unregistered_collection_is_a_configuration_error() {
    let store = stamped_store();

    match store.collection("orders") {
        Err(CollectionStoreError::Configuration(name)) => assert_eq!(name, "orders"),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_isodate_format_stores_strings() {
    let store = {
        let mut store = CollectionStore::new(InMemoryClient::new());
        store.register(
            CollectionConfig::new("events")
                .with_timestamps(TimestampPolicy::new(TimestampFormat::IsoDate)),
        );
        store
    };
    let events = store.collection("events").unwrap();

    events.insert_one(doc! { "kind": "signup" }).await.unwrap();

    let stored = events.find_one(doc! {}).await.unwrap().unwrap();
    let created = stored.get_str("createdAt").unwrap();
    assert!(created.ends_with('Z'));
    assert_eq!(created.len(), "2022-12-05T04:14:52.000Z".len());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    email: String,
}

impl Model for User {
    fn config() -> CollectionConfig {
        CollectionConfig::new("users")
            .with_timestamps(TimestampPolicy::new(TimestampFormat::Millis))
    }
}

#[tokio::test]
async fn test_typed_collection_round_trip() {
    let store = CollectionStore::new(InMemoryClient::new());
    let users = store.typed_collection::<User>();

    let alice = User {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };
    users.insert_one(&alice).await.unwrap();

    let found = users
        .find_one(doc! { "name": "Alice" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, alice);

    // The stored document carries the stamps the model type ignores.
    let raw = store
        .collection_with(CollectionConfig::new("users"))
        .find_one(doc! { "name": "Alice" })
        .await
        .unwrap()
        .unwrap();
    assert!(raw.contains_key("createdAt"));
}

#[tokio::test]
async fn test_stores_can_share_one_backend_by_reference() {
    let backend = InMemoryClient::new();

    let mut writer = CollectionStore::new(&backend);
    writer.register(CollectionConfig::new("users"));
    let reader = CollectionStore::new(&backend);

    writer
        .collection("users")
        .unwrap()
        .insert_one(doc! { "name": "Alice" })
        .await
        .unwrap();

    let seen = reader
        .collection_with(CollectionConfig::new("users"))
        .find_one(doc! {})
        .await
        .unwrap();
    assert!(seen.is_some());
}

#[tokio::test]
async fn test_dyn_store_serves_collections() {
    let store = stamped_store().into_dyn();
    let users = store.collection("users").unwrap();

    users.insert_one(doc! { "name": "Alice" }).await.unwrap();

    let stored = users.find_one(doc! {}).await.unwrap().unwrap();
    assert!(stored.contains_key("updatedAt"));
}

#[tokio::test]
async fn test_dyn_typed_collection_round_trip() {
    let store = CollectionStore::new(InMemoryClient::new()).into_dyn();
    let users = store.typed_collection::<User>();

    let alice = User {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };
    users.insert_one(&alice).await.unwrap();

    let found = users
        .find_one(doc! { "email": "alice@example.com" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, alice);
}

#[tokio::test]
async fn test_into_static_recovers_backend_and_registry() {
    let store = stamped_store()
        .into_dyn()
        .into_static::<InMemoryClient>()
        .expect("backend should downcast");

    // Registered collections survive the round trip.
    assert!(store.collection("users").is_ok());
}
