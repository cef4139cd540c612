// Rust guideline compliant 2026-02-06

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use tabula_core::{
    ColumnSet, ColumnSpec, EngineConfig, EntityRecord, ListingDefinition, MemoryCatalog,
    MemoryStore, MemoryWorkflow,
};

/// Builds a valid 32-character uid from a number.
pub fn uid(n: u32) -> String {
    format!("{n:032x}")
}

/// Builds an entity record from loose JSON fields.
pub fn entity(n: u32, title: &str, state: &str, extra: serde_json::Value) -> EntityRecord {
    let mut value = serde_json::json!({
        "uid": uid(n),
        "id": format!("s{n}"),
        "title": title,
        "entity_type": "Sample",
        "path": format!("/clients/c1/s{n}"),
        "review_state": state,
    });
    if let (Some(target), Some(fields)) = (value.as_object_mut(), extra.as_object()) {
        for (key, field) in fields {
            target.insert(key.clone(), field.clone());
        }
    }
    serde_json::from_value(value).expect("fixture entity must deserialize")
}

/// Catalog, workflow and config over a set of records.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub catalog: MemoryCatalog,
    pub workflow: MemoryWorkflow,
    pub config: EngineConfig,
}

impl Fixture {
    pub fn new(records: Vec<EntityRecord>) -> Self {
        let store = Arc::new(
            MemoryStore::new(records)
                .expect("fixture records must be valid")
                .with_state_titles([("received", "Received"), ("published", "Published")]),
        );
        Self {
            catalog: MemoryCatalog::new(Arc::clone(&store)),
            workflow: MemoryWorkflow::new(Arc::clone(&store)),
            store,
            config: EngineConfig::default(),
        }
    }

    pub fn with_catalog(mut self, change: impl FnOnce(MemoryCatalog) -> MemoryCatalog) -> Self {
        self.catalog = change(self.catalog);
        self
    }
}

/// A sample listing with an index-backed title column and a plain client column.
pub fn samples_listing() -> ListingDefinition {
    let columns = ColumnSet::new(vec![
        ColumnSpec::new("Title", "Title").with_index("title"),
        ColumnSpec::new("Client", "Client"),
        ColumnSpec::new("Priority", "Priority"),
    ])
    .expect("fixture columns must be valid");
    ListingDefinition::new("samples", columns)
}
