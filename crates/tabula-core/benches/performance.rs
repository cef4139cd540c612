// Rust guideline compliant 2026-02-06

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tabula_core::{
    ColumnSet, ColumnSpec, EngineConfig, EntityRecord, FilterState, ListingDefinition,
    ManualSort, MemoryCatalog, MemoryStore, MemoryWorkflow, Query, QueryBuilder, RequestContext,
    ReviewState, SearchExecutor, SortDirection, TransitionResolver, Catalog,
};

const TRANSITIONS: &[&str] = &["submit", "verify", "retract", "invalidate", "assign"];

fn build_records(count: usize) -> Vec<EntityRecord> {
    (0..count)
        .map(|i| {
            let transitions: Vec<serde_json::Value> = TRANSITIONS
                .iter()
                .skip(i % 2)
                .map(|id| serde_json::json!({"id": id, "title": id}))
                .collect();
            serde_json::from_value(serde_json::json!({
                "uid": format!("{:032x}", i + 1),
                "id": format!("s{i}"),
                "title": format!("Sample {i}"),
                "entity_type": "Sample",
                "path": format!("/clients/c{}/s{i}", i % 10),
                "review_state": if i % 7 == 0 { "published" } else { "received" },
                "metadata": {
                    "Client": format!("Client {}", i % 10),
                    "Priority": (i * 7919) % 101,
                    "State": "received",
                },
                "transitions": transitions,
            }))
            .expect("Failed to build benchmark record")
        })
        .collect()
}

fn setup(count: usize) -> (MemoryCatalog, MemoryWorkflow) {
    let store = Arc::new(MemoryStore::new(build_records(count)).expect("Failed to build store"));
    (
        MemoryCatalog::new(Arc::clone(&store)),
        MemoryWorkflow::new(store),
    )
}

fn bench_manual_sort(c: &mut Criterion) {
    let (catalog, _workflow) = setup(1000);
    let records = catalog.search(&Query::default()).expect("Failed to search");
    c.bench_function("manual_sort_1000", |b| {
        b.iter(|| {
            black_box(ManualSort::new(&catalog, true).sort(
                records.clone(),
                "Priority",
                SortDirection::Descending,
            ))
        })
    });
}

fn bench_metadata_search(c: &mut Criterion) {
    let (catalog, workflow) = setup(1000);
    let config = EngineConfig::default();
    let columns = ColumnSet::new(vec![ColumnSpec::new("Client", "Client")]).expect("Failed to build columns");
    let listing = ListingDefinition::new("samples", columns);
    let built = QueryBuilder::new(&catalog, SortDirection::Descending).build(
        &FilterState::default(),
        &listing,
        &ReviewState::new("default", "All"),
    );
    let executor = SearchExecutor::new(&catalog, &workflow, &config);
    c.bench_function("metadata_search_1000", |b| {
        b.iter(|| black_box(executor.search(&built, "client 3", &RequestContext::new())))
    });
}

fn bench_transition_resolution(c: &mut Criterion) {
    let (catalog, workflow) = setup(1000);
    let config = EngineConfig::default();
    let selection: Vec<String> = (1..=1000).map(|i| format!("{:032x}", i)).collect();
    let review_state = ReviewState::new("default", "All");
    c.bench_function("resolve_transitions_1000", |b| {
        b.iter(|| {
            let resolver = TransitionResolver::new(&catalog, &workflow, &config);
            black_box(resolver.resolve(&selection, &review_state))
        })
    });
}

criterion_group!(
    benches,
    bench_manual_sort,
    bench_metadata_search,
    bench_transition_resolution
);
criterion_main!(benches);
