mod common;

use common::{open, record_files};
use embedstore::domain::error::DomainError;

#[tokio::test]
async fn test_add_returns_fresh_id_and_persists_record() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;

    let id = store.add_document("Rust ownership rules", None).await.unwrap();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let record = store.get_document(&id).await.unwrap();
    assert_eq!(record.text, "Rust ownership rules");
    assert_eq!(record.vector.len(), common::DIM);
    assert_eq!(record_files(&tmp.path().join("notes")), vec![format!("{id}.json")]);
}

#[tokio::test]
async fn test_supplied_id_is_used() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;

    let id = store.add_document("hello", Some("greeting")).await.unwrap();
    assert_eq!(id, "greeting");
    assert!(tmp.path().join("notes").join("greeting.json").is_file());
}

#[tokio::test]
async fn test_duplicate_id_overwrites_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;

    store.add_document("first", Some("a")).await.unwrap();
    store.add_document("middle", Some("b")).await.unwrap();
    let before = store.get_document("a").await.unwrap();
    store.add_document("replacement text", Some("a")).await.unwrap();

    assert_eq!(store.len().await, 2);
    assert_eq!(store.list_ids().await, vec!["a", "b"]);
    let after = store.get_document("a").await.unwrap();
    assert_eq!(after.text, "replacement text");
    assert_ne!(after.vector, before.vector);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(record_files(&tmp.path().join("notes")).len(), 2);

    let raw = std::fs::read_to_string(tmp.path().join("notes").join("a.json")).unwrap();
    assert!(raw.contains("replacement text"));
    assert!(!raw.contains("\"first\""));
}

#[tokio::test]
async fn test_batch_returns_ids_in_input_order() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;

    let texts: Vec<String> = (0..5).map(|i| format!("document number {i}")).collect();
    let ids = store.add_documents(&texts).await.unwrap();

    assert_eq!(ids.len(), 5);
    assert_eq!(store.list_ids().await, ids);
    for (id, text) in ids.iter().zip(&texts) {
        assert_eq!(&store.get_document(id).await.unwrap().text, text);
    }
}

#[tokio::test]
async fn test_batch_with_repeated_id_keeps_last_text() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;

    let ids = store
        .add_documents_with_ids(vec![
            ("one".into(), Some("x".into())),
            ("two".into(), None),
            ("three".into(), Some("x".into())),
        ])
        .await
        .unwrap();

    assert_eq!(ids[0], "x");
    assert_eq!(ids[2], "x");
    assert_eq!(store.len().await, 2);
    assert_eq!(store.get_document("x").await.unwrap().text, "three");
    assert_eq!(store.list_ids().await[0], "x");
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;
    assert!(store.add_documents(&[]).await.unwrap().is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_path_like_ids_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;

    for bad in ["", "../escape", "a/b", ".."] {
        let err = store.add_document("text", Some(bad)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)), "{bad:?} gave {err}");
    }
    assert!(store.is_empty().await);
    assert!(!tmp.path().join("escape.json").exists());
}

#[tokio::test]
async fn test_get_and_delete_unknown_id_are_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;

    assert!(matches!(store.get_document("nope").await, Err(DomainError::NotFound(_))));
    assert!(matches!(store.delete_document("nope").await, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_removes_file_and_index_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), "notes").await;
    store.add_document("keep", Some("keep")).await.unwrap();
    store.add_document("drop", Some("drop")).await.unwrap();

    store.delete_document("drop").await.unwrap();

    assert_eq!(store.list_ids().await, vec!["keep"]);
    assert_eq!(record_files(&tmp.path().join("notes")), vec!["keep.json"]);
    let hits = store.search("drop", Some(0.0), Some(10)).await.unwrap();
    assert!(hits.iter().all(|h| h.id != "drop"));
}
