// Rust guideline compliant 2026-02-09

//! Request and response payloads of the listing operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabula_core::{ColumnSet, Criteria, ReviewState, Row, SortDirection, Transition, Value};

/// Input of `fetch_rows`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FetchRowsRequest {
    /// Requested review state.
    pub review_state: Option<String>,
    /// Free-text search term.
    pub search_term: String,
    /// Requested sort key.
    pub sort_on: Option<String>,
    /// Requested sort direction; invalid values are ignored.
    pub sort_order: Option<String>,
    /// Offset of the first row.
    pub offset: usize,
    /// Maximum number of rows; zero or absent uses the listing default.
    pub page_size: Option<usize>,
    /// Criteria merged over the listing's base filter.
    pub filter: BTreeMap<String, Criteria>,
    /// Uids selected in the client.
    pub selected_uids: Vec<String>,
}

impl FetchRowsRequest {
    /// Returns the requested sort direction if it is valid.
    #[must_use]
    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.sort_order.as_deref().and_then(SortDirection::parse)
    }
}

/// Output of `fetch_rows`.
#[derive(Debug, Clone, Serialize)]
pub struct RowsPayload {
    /// Rendered rows.
    pub rows: Vec<Row>,
    /// Number of rendered rows.
    pub count: usize,
    /// Result count before windowing.
    pub total: usize,
    /// Offset of the first row.
    pub offset: usize,
    /// Whether more rows are available.
    pub show_more: bool,
    /// Column configuration.
    pub columns: ColumnSet,
    /// Review states in button order.
    pub review_states: Vec<ReviewState>,
    /// Resolved review state id.
    pub review_state: String,
    /// Selected uids, including rows preselected by hooks.
    pub selected_uids: Vec<String>,
    /// Transitions available for the selection.
    pub transitions: Vec<Transition>,
    /// Effective sort key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_on: Option<String>,
    /// Sort key applied in memory, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_sort_on: Option<String>,
    /// Effective sort direction.
    pub sort_order: SortDirection,
    /// Effective page size.
    pub page_size: usize,
    /// Ids of sortable columns.
    pub sortable_columns: Vec<String>,
    /// Render hint set while a search is active.
    pub expand_all_categories: bool,
    /// Whether transitions are submitted asynchronously.
    pub ajax_transitions: bool,
    /// Server time spent on the request.
    pub runtime_ms: u64,
}

/// Input of `fetch_transitions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FetchTransitionsRequest {
    /// Uids selected in the client.
    pub selected_uids: Vec<String>,
    /// Review state whose restrictions apply.
    pub review_state: Option<String>,
}

/// Output of `fetch_transitions`.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionsPayload {
    /// Transitions available for the selection.
    pub transitions: Vec<Transition>,
}

/// Input of `fetch_children`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchChildrenRequest {
    /// Uid of the parent row.
    pub parent_uid: String,
    /// Explicit child uids; direct descendants when empty.
    #[serde(default)]
    pub child_uids: Vec<String>,
}

/// Output of `fetch_children`.
#[derive(Debug, Clone, Serialize)]
pub struct ChildrenPayload {
    /// Child rows, each tagged with the parent uid.
    pub children: Vec<Row>,
}

/// Input of `query_rows`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryRowsRequest {
    /// Catalog query keyed by index name.
    pub query: BTreeMap<String, Criteria>,
}

/// Output of `query_rows` and of the row part of `set_fields`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRowsPayload {
    /// Number of rendered rows.
    pub count: usize,
    /// Rendered rows.
    pub rows: Vec<Row>,
}

/// Field values to write, keyed by uid and field name.
pub type SaveQueue = BTreeMap<String, BTreeMap<String, Value>>;

/// Input of `set_fields`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetFieldsRequest {
    /// Pending writes.
    #[serde(default)]
    pub save_queue: Option<SaveQueue>,
}

/// Output of `set_fields`.
#[derive(Debug, Clone, Serialize)]
pub struct SetFieldsPayload {
    /// Number of refreshed rows.
    pub count: usize,
    /// Uids changed by the writes.
    pub uids: Vec<String>,
    /// Refreshed rows of the changed entities.
    pub rows: Vec<Row>,
}

/// Input of `execute_transition`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteTransitionRequest {
    /// Entities to transition.
    pub uids: Vec<String>,
    /// Transition id.
    pub transition: String,
}

/// Output of `execute_transition`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    /// Uids transitioned successfully.
    pub succeeded: Vec<String>,
    /// Whether a user-visible failure occurred.
    pub failed: bool,
    /// Message describing the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_rows_defaults() {
        let request: FetchRowsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.offset, 0);
        assert!(request.page_size.is_none());
        assert!(request.selected_uids.is_empty());
    }

    #[test]
    fn test_invalid_sort_order_ignored() {
        let request: FetchRowsRequest =
            serde_json::from_str(r#"{"sort_order": "sideways"}"#).unwrap();
        assert_eq!(request.sort_direction(), None);
    }

    #[test]
    fn test_set_fields_queue_optional() {
        let request: SetFieldsRequest = serde_json::from_str("{}").unwrap();
        assert!(request.save_queue.is_none());
    }
}
