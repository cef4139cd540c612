// Rust guideline compliant 2026-02-06

//! Catalog query construction.
//!
//! The builder merges the base content filter with the active review state's
//! filter and decides whether the requested sort can be delegated to a
//! catalog index or must be done manually after the search.

use crate::definition::ListingDefinition;
use crate::models::{Criteria, FilterState, ReviewState, SortDirection, UID_INDEX};
use crate::ports::Catalog;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// A structured catalog query.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Query {
    /// Filter criteria keyed by index name.
    pub filter: BTreeMap<String, Criteria>,
    /// Index used for ordered lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_on: Option<String>,
    /// Direction of the ordered lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortDirection>,
    /// Wildcard term for the full-text index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_text: Option<String>,
}

impl Query {
    /// Creates an unsorted query from filter criteria.
    #[must_use]
    pub fn from_filter(filter: BTreeMap<String, Criteria>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Returns true if the query names explicit identifiers.
    #[must_use]
    pub fn has_explicit_uids(&self) -> bool {
        self.filter.contains_key(UID_INDEX)
    }
}

/// Result of query construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuiltQuery {
    /// Query to run against the catalog.
    pub query: Query,
    /// Sort key to apply manually after the search, if the catalog cannot.
    pub manual_sort_on: Option<String>,
    /// Effective sort direction.
    pub sort_order: SortDirection,
}

/// Turns request filter state into a catalog query.
pub struct QueryBuilder<'a> {
    catalog: &'a dyn Catalog,
    fallback_order: SortDirection,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder for a catalog.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog used to validate sort indexes
    /// * `fallback_order` - Direction used when nothing else supplies one
    pub fn new(catalog: &'a dyn Catalog, fallback_order: SortDirection) -> Self {
        Self {
            catalog,
            fallback_order,
        }
    }

    /// Builds the catalog query for a request.
    ///
    /// Explicit-identifier filters are returned unchanged so that fetches of
    /// known rows bypass review-state filtering and sorting entirely.
    ///
    /// # Arguments
    ///
    /// * `state` - Request filter state
    /// * `definition` - Listing definition (columns, defaults)
    /// * `review_state` - Resolved review state
    ///
    /// # Returns
    ///
    /// The query plus the manual-sort flag and effective sort direction.
    pub fn build(
        &self,
        state: &FilterState,
        definition: &ListingDefinition,
        review_state: &ReviewState,
    ) -> BuiltQuery {
        let mut query = Query::from_filter(state.base_filter.clone());
        let sort_order = state
            .sort_direction
            .or(definition.default_sort_order)
            .unwrap_or(self.fallback_order);

        if query.has_explicit_uids() {
            return BuiltQuery {
                query,
                manual_sort_on: None,
                sort_order,
            };
        }

        for (key, criteria) in &review_state.extra_filter {
            query.filter.insert(key.clone(), criteria.clone());
        }

        let sort_key = state
            .sort_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .or(definition.default_sort_on.as_deref());

        let mut manual_sort_on = None;
        if let Some(key) = sort_key {
            match self.sort_index_for(key, definition) {
                Some(index) => query.sort_on = Some(index),
                None => manual_sort_on = Some(key.to_string()),
            }
        }
        query.sort_order = Some(sort_order);

        info!(
            listing = %definition.name,
            query = ?query,
            manual_sort_on = ?manual_sort_on,
            "built catalog query"
        );

        BuiltQuery {
            query,
            manual_sort_on,
            sort_order,
        }
    }

    /// Returns the index able to sort on `key`, if any.
    ///
    /// The key must address a column (by id or index name) backed by an index
    /// the catalog knows and can order by.
    fn sort_index_for(&self, key: &str, definition: &ListingDefinition) -> Option<String> {
        let column = definition.columns.for_sort_key(key)?;
        let index = column.index_name.as_deref()?;
        let known = self.catalog.indexes().iter().any(|name| name == index);
        if known && self.catalog.supports_sorting(index) {
            Some(index.to_string())
        } else {
            None
        }
    }
}
