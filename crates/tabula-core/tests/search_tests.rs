// Rust guideline compliant 2026-02-06

//! Tests for query construction, search strategies and manual sorting.

mod common;

use common::{entity, samples_listing, uid, Fixture};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use tabula_core::{
    Criteria, Error, FilterState, QueryBuilder, RequestContext, ReviewState, SearchExecutor,
    SortDirection, Value,
};

fn wat_fixture() -> Fixture {
    Fixture::new(vec![
        entity(1, "Water Sample", "received", json!({
            "metadata": {"Title": "Water Sample", "State": "received"}
        })),
        entity(2, "Soil", "received", json!({
            "metadata": {"Title": "Soil", "State": "received"}
        })),
    ])
}

fn search_uids(fixture: &Fixture, state: &FilterState, review_state: &ReviewState) -> Vec<String> {
    let listing = samples_listing();
    let built = QueryBuilder::new(&fixture.catalog, SortDirection::Descending)
        .build(state, &listing, review_state);
    SearchExecutor::new(&fixture.catalog, &fixture.workflow, &fixture.config)
        .search(&built, &state.search_term, &RequestContext::new())
        .expect("search should succeed")
        .records
        .into_iter()
        .map(|record| record.uid)
        .collect()
}

#[test]
fn test_metadata_scan_matches_case_insensitively() {
    let fixture = wat_fixture();
    let state = FilterState {
        search_term: "wat".to_string(),
        ..FilterState::default()
    };

    let found = search_uids(&fixture, &state, &ReviewState::new("default", "All"));
    assert_eq!(found, vec![uid(1)]);
}

#[test]
fn test_metadata_scan_matches_translated_state_title() {
    let fixture = wat_fixture();
    let state = FilterState {
        search_term: "RECEIVED".to_string(),
        ..FilterState::default()
    };
    let found = search_uids(&fixture, &state, &ReviewState::new("default", "All"));
    assert_eq!(found.len(), 2);
}

#[test]
fn test_text_index_path_sets_expand_flag() {
    let fixture = wat_fixture().with_catalog(|catalog| catalog.with_text_index(true));
    let listing = samples_listing();
    let state = FilterState::default();
    let built = QueryBuilder::new(&fixture.catalog, SortDirection::Descending).build(
        &state,
        &listing,
        &ReviewState::new("default", "All"),
    );

    let outcome = SearchExecutor::new(&fixture.catalog, &fixture.workflow, &fixture.config)
        .search(&built, " *soil* ", &RequestContext::new())
        .unwrap();
    assert!(outcome.expand_all_categories);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].uid, uid(2));
}

#[test]
fn test_no_term_runs_query_without_expanding() {
    let fixture = wat_fixture();
    let listing = samples_listing();
    let built = QueryBuilder::new(&fixture.catalog, SortDirection::Descending).build(
        &FilterState::default(),
        &listing,
        &ReviewState::new("default", "All"),
    );
    let outcome = SearchExecutor::new(&fixture.catalog, &fixture.workflow, &fixture.config)
        .search(&built, "   ", &RequestContext::new())
        .unwrap();
    assert!(!outcome.expand_all_categories);
    assert_eq!(outcome.records.len(), 2);
}

#[test]
fn test_uid_query_bypasses_review_state_filter() {
    let fixture = wat_fixture();
    let mut review_state = ReviewState::new("published", "Published");
    review_state.extra_filter.insert(
        "review_state".to_string(),
        Criteria::Exact(Value::from("published")),
    );

    let mut base_filter = BTreeMap::new();
    base_filter.insert("UID".to_string(), Criteria::uids([uid(2)]));
    let state = FilterState {
        base_filter,
        ..FilterState::default()
    };

    assert_eq!(search_uids(&fixture, &state, &review_state), vec![uid(2)]);
}

#[test]
fn test_review_state_filter_applies_on_top_of_base_filter() {
    let fixture = Fixture::new(vec![
        entity(1, "A", "received", json!({})),
        entity(2, "B", "published", json!({})),
    ]);
    let mut review_state = ReviewState::new("published", "Published");
    review_state.extra_filter.insert(
        "review_state".to_string(),
        Criteria::Exact(Value::from("published")),
    );
    assert_eq!(
        search_uids(&fixture, &FilterState::default(), &review_state),
        vec![uid(2)]
    );
}

#[test]
fn test_index_sort_used_when_catalog_supports_it() {
    let fixture = wat_fixture().with_catalog(|catalog| catalog.with_sort_indexes(["title"]));
    let listing = samples_listing();
    let state = FilterState {
        sort_key: Some("Title".to_string()),
        sort_direction: Some(SortDirection::Ascending),
        ..FilterState::default()
    };
    let built = QueryBuilder::new(&fixture.catalog, SortDirection::Descending).build(
        &state,
        &listing,
        &ReviewState::new("default", "All"),
    );
    assert_eq!(built.query.sort_on.as_deref(), Some("title"));
    assert_eq!(built.manual_sort_on, None);
    assert_eq!(search_uids(&fixture, &state, &ReviewState::new("default", "All")), vec![uid(2), uid(1)]);
}

#[test]
fn test_unknown_sort_key_degrades_to_manual_sort() {
    let fixture = Fixture::new(vec![
        entity(1, "A", "received", json!({"metadata": {"Priority": 3}})),
        entity(2, "B", "received", json!({"metadata": {"Priority": 1}})),
        entity(3, "C", "received", json!({"metadata": {"Priority": 2}})),
    ]);
    let state = FilterState {
        sort_key: Some("Priority".to_string()),
        sort_direction: Some(SortDirection::Ascending),
        ..FilterState::default()
    };
    let listing = samples_listing();
    let built = QueryBuilder::new(&fixture.catalog, SortDirection::Descending).build(
        &state,
        &listing,
        &ReviewState::new("default", "All"),
    );
    assert_eq!(built.query.sort_on, None);
    assert_eq!(built.manual_sort_on.as_deref(), Some("Priority"));

    let found = search_uids(&fixture, &state, &ReviewState::new("default", "All"));
    assert_eq!(found, vec![uid(2), uid(3), uid(1)]);
}

#[test]
fn test_manual_descending_keeps_ties_in_catalog_order() {
    let fixture = Fixture::new(vec![
        entity(1, "A", "received", json!({"metadata": {"Priority": 1}})),
        entity(2, "B", "received", json!({"metadata": {"Priority": 2}})),
        entity(3, "C", "received", json!({"metadata": {"Priority": 1}})),
    ]);
    let state = FilterState {
        sort_key: Some("Priority".to_string()),
        sort_direction: Some(SortDirection::Descending),
        ..FilterState::default()
    };
    let found = search_uids(&fixture, &state, &ReviewState::new("default", "All"));
    assert_eq!(found, vec![uid(2), uid(1), uid(3)]);
}

#[test]
fn test_manual_sort_wakes_objects_for_attributes() {
    let fixture = Fixture::new(vec![
        entity(1, "A", "received", json!({"attributes": {"Volume": 30}})),
        entity(2, "B", "received", json!({"attributes": {"Volume": 10}})),
    ]);
    let state = FilterState {
        sort_key: Some("Volume".to_string()),
        sort_direction: Some(SortDirection::Ascending),
        ..FilterState::default()
    };
    let found = search_uids(&fixture, &state, &ReviewState::new("default", "All"));
    assert_eq!(found, vec![uid(2), uid(1)]);
}

#[test]
fn test_manual_sort_without_fallback_leaves_order() {
    let mut fixture = Fixture::new(vec![
        entity(1, "A", "received", json!({"attributes": {"Volume": 30}})),
        entity(2, "B", "received", json!({"attributes": {"Volume": 10}})),
    ]);
    fixture.config.instance_fallback = false;
    let state = FilterState {
        sort_key: Some("Volume".to_string()),
        sort_direction: Some(SortDirection::Ascending),
        ..FilterState::default()
    };
    let found = search_uids(&fixture, &state, &ReviewState::new("default", "All"));
    assert_eq!(found, vec![uid(1), uid(2)]);
}

#[test]
fn test_expired_deadline_fails_search() {
    let fixture = wat_fixture();
    let listing = samples_listing();
    let built = QueryBuilder::new(&fixture.catalog, SortDirection::Descending).build(
        &FilterState::default(),
        &listing,
        &ReviewState::new("default", "All"),
    );
    let context = RequestContext::with_timeout(Some(Duration::ZERO));
    let result = SearchExecutor::new(&fixture.catalog, &fixture.workflow, &fixture.config)
        .search(&built, "", &context);
    assert!(matches!(result, Err(Error::DeadlineExceeded(_))));
}

#[test]
fn test_searchable_text_conversion() {
    let fixture = wat_fixture();
    let executor = SearchExecutor::new(&fixture.catalog, &fixture.workflow, &fixture.config);

    assert_eq!(executor.searchable_text("Sample", "Flag", &Value::Bool(true)), "");
    assert_eq!(executor.searchable_text("Sample", "Client", &Value::from(uid(9))), "");
    assert_eq!(
        executor.searchable_text(
            "Sample",
            "Tags",
            &Value::List(vec![Value::from("first"), Value::from("second")])
        ),
        "first"
    );
    assert_eq!(
        executor.searchable_text("Sample", "review_state", &Value::from("received")),
        "Received"
    );
    let date: Value = serde_json::from_str("\"2024-03-01T14:30:00Z\"").unwrap();
    assert_eq!(
        executor.searchable_text("Sample", "DateReceived", &date),
        "2024-03-01 02:30 PM"
    );
}
