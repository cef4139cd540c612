// Rust guideline compliant 2026-02-06

//! Integration tests for the JSONL-backed reference ports.

mod common;

use common::{entity, uid};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tabula_core::{
    Catalog, Criteria, DataManager, MemoryCatalog, MemoryDataManager, MemoryStore, Query,
    SortDirection, Value,
};
use tempfile::TempDir;

#[test]
fn test_load_from_missing_file_is_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = MemoryStore::load(&temp_dir.path().join("missing.jsonl")).expect("load");
    assert!(store.is_empty());
}

#[test]
fn test_load_skips_invalid_records() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("entities.jsonl");
    let good = serde_json::to_string(&entity(1, "Water", "received", json!({}))).unwrap();
    let bad_uid = json!({"uid": "nope", "id": "x", "entity_type": "Sample", "path": "/x"});
    let relative = json!({"uid": uid(2), "id": "y", "entity_type": "Sample", "path": "y"});
    let content = format!("{good}\n{bad_uid}\n\n{relative}\n{{broken\n");
    fs::write(&path, content).expect("Failed to write entities");

    let store = MemoryStore::load(&path).expect("load");
    assert_eq!(store.len(), 1);
    assert!(store.get(&uid(1)).is_some());
}

#[test]
fn test_save_and_reload_keeps_changes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("entities.jsonl");
    let store = Arc::new(
        MemoryStore::new(vec![entity(1, "Water", "received", json!({
            "metadata": {"Client": "ACME"}
        }))])
        .expect("store"),
    );

    let catalog = MemoryCatalog::new(Arc::clone(&store));
    let manager = MemoryDataManager::new(Arc::clone(&store));
    let object = catalog.object_by_uid(&uid(1)).unwrap().expect("object");
    let changed = manager
        .set_field(object.as_ref(), "Client", &Value::from("Globex"))
        .expect("set field");
    assert_eq!(changed, vec![uid(1)]);

    store.save(&path).expect("save");
    assert!(!temp_dir.path().join("entities.jsonl.tmp").exists());

    let reloaded = MemoryStore::load(&path).expect("reload");
    let record = reloaded.get(&uid(1)).expect("record");
    assert_eq!(record.metadata.get("Client"), Some(&Value::from("Globex")));
}

#[test]
fn test_catalog_filters_and_sorts() {
    let store = Arc::new(
        MemoryStore::new(vec![
            entity(1, "Beta", "received", json!({})),
            entity(2, "Alpha", "published", json!({})),
            entity(3, "Gamma", "received", json!({})),
        ])
        .expect("store"),
    );
    let catalog = MemoryCatalog::new(store).with_sort_indexes(["title"]);

    let mut query = Query::default();
    query.filter.insert(
        "review_state".to_string(),
        Criteria::AnyOf(vec![Value::from("received")]),
    );
    query.sort_on = Some("title".to_string());
    query.sort_order = Some(SortDirection::Ascending);

    let titles: Vec<String> = catalog
        .search(&query)
        .expect("search")
        .into_iter()
        .map(|record| record.title)
        .collect();
    assert_eq!(titles, vec!["Beta", "Gamma"]);
}

#[test]
fn test_catalog_rejects_unsortable_index() {
    let store = Arc::new(MemoryStore::new(vec![entity(1, "Beta", "received", json!({}))]).unwrap());
    let catalog = MemoryCatalog::new(store);
    let query = Query {
        sort_on: Some("Client".to_string()),
        ..Query::default()
    };
    assert!(catalog.search(&query).is_err());
}

#[test]
fn test_text_index_wildcard() {
    let store = Arc::new(
        MemoryStore::new(vec![
            entity(1, "Water Sample", "received", json!({})),
            entity(2, "Soil", "received", json!({})),
        ])
        .unwrap(),
    );
    let catalog = MemoryCatalog::new(store).with_text_index(true);
    assert!(catalog.has_text_index());

    let query = Query {
        searchable_text: Some("*wat*".to_string()),
        ..Query::default()
    };
    let uids: Vec<String> = catalog
        .search(&query)
        .unwrap()
        .into_iter()
        .map(|record| record.uid)
        .collect();
    assert_eq!(uids, vec![uid(1)]);
}
