mod common;

use common::{config, hashing, open, record_files, DIM};
use embedstore::domain::error::DomainError;
use embedstore::EmbedStore;
use std::collections::HashSet;

#[tokio::test]
async fn test_fresh_instance_sees_same_records() {
    let tmp = tempfile::tempdir().unwrap();
    let texts: Vec<String> = (0..6).map(|i| format!("persisted note {i}")).collect();
    let ids = {
        let store = open(tmp.path(), "durable").await;
        store.add_documents(&texts).await.unwrap()
    };

    let reopened = open(tmp.path(), "durable").await;
    let hits = reopened.search("persisted note", Some(0.0), Some(100)).await.unwrap();
    let found: HashSet<_> = hits.into_iter().map(|h| h.id).collect();
    assert_eq!(found, ids.into_iter().collect::<HashSet<_>>());
}

#[tokio::test]
async fn test_two_live_instances_converge_after_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let first = open(tmp.path(), "shared").await;
    let second = open(tmp.path(), "shared").await;

    first.add_document("written by the first instance", Some("one")).await.unwrap();
    second.add_document("written by the second instance", Some("two")).await.unwrap();

    let a = open(tmp.path(), "shared").await;
    let b = open(tmp.path(), "shared").await;
    let mut ids_a = a.list_ids().await;
    let mut ids_b = b.list_ids().await;
    ids_a.sort();
    ids_b.sort();
    assert_eq!(ids_a, vec!["one", "two"]);
    assert_eq!(ids_a, ids_b);
}

#[tokio::test]
async fn test_insertion_order_survives_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let order = ["zulu", "alpha", "mike", "bravo"];
    {
        let store = open(tmp.path(), "ordered").await;
        for id in order {
            store.add_document("same text everywhere", Some(id)).await.unwrap();
        }
        store.add_document("same text everywhere", Some("alpha")).await.unwrap();
    }

    let store = open(tmp.path(), "ordered").await;
    assert_eq!(store.list_ids().await, order);
    let hits = store.search("same text everywhere", Some(0.0), None).await.unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, order);
}

#[tokio::test]
async fn test_collections_are_isolated_by_name_and_root() {
    let tmp = tempfile::tempdir().unwrap();
    let other_root = tempfile::tempdir().unwrap();

    open(tmp.path(), "a").await.add_document("in a", None).await.unwrap();
    open(tmp.path(), "b").await.add_document("in b", None).await.unwrap();

    assert_eq!(open(tmp.path(), "a").await.len().await, 1);
    assert_eq!(open(tmp.path(), "b").await.len().await, 1);
    assert!(open(other_root.path(), "a").await.is_empty().await);
    assert_eq!(record_files(&tmp.path().join("a")).len(), 1);
}

#[tokio::test]
async fn test_record_file_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "layout").await;
    store.add_document("on disk", Some("doc-1")).await.unwrap();

    let raw = std::fs::read_to_string(tmp.path().join("layout").join("doc-1.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["id"], "doc-1");
    assert_eq!(value["text"], "on disk");
    assert_eq!(value["vector"].as_array().unwrap().len(), DIM);
    assert!(value["created_at"].is_string());
}

#[tokio::test]
async fn test_hand_written_record_is_loaded() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("manual");
    std::fs::create_dir_all(&dir).unwrap();
    let vector: Vec<f32> = (0..DIM).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect();
    let json = serde_json::json!({ "id": "m1", "text": "manual", "vector": vector });
    std::fs::write(dir.join("m1.json"), json.to_string()).unwrap();

    let store = open(tmp.path(), "manual").await;
    let hits = store.search_by_vector(&vector, Some(0.5), None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "manual");
}

#[tokio::test]
async fn test_stored_vector_of_wrong_length_fails_open() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let store = EmbedStore::open(config(tmp.path(), "mixed", 32), hashing(32)).await.unwrap();
        store.add_document("thirty-two wide", None).await.unwrap();
    }

    let err = EmbedStore::open(config(tmp.path(), "mixed", DIM), hashing(DIM))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DomainError::DimensionMismatch { expected: DIM, got: 32 }));
}

#[tokio::test]
async fn test_corrupt_record_file_is_a_storage_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("bad.json"), "{ truncated").unwrap();

    let err = EmbedStore::open(config(tmp.path(), "corrupt", DIM), hashing(DIM))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DomainError::Storage(_)));
}
