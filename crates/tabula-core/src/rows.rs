// Rust guideline compliant 2026-02-06

//! Row construction pipeline.
//!
//! Each index record in the page window is checked against the listing's
//! allow predicate, turned into a base row, filled column by column, passed
//! through the per-listing hook and finally through the registered adapters
//! in priority order. Any stage may veto the row.

use crate::config::EngineConfig;
use crate::definition::{ColumnSet, ListingDefinition};
use crate::models::{ColumnSpec, Link, Row, Value};
use crate::ports::{resolve_path, Catalog, Entity, IndexRecord, Workflow};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default adapter priority; lower values run first.
pub const DEFAULT_PRIORITY_ORDER: f64 = 1000.0;

/// Per-listing hooks for allow checks and row customization.
pub trait ListingHooks: Send + Sync {
    /// Decides whether a record may appear at all. Runs before any column
    /// is resolved.
    fn is_item_allowed(&self, _record: &IndexRecord) -> bool {
        true
    }

    /// Customizes a row. Returning false drops it.
    ///
    /// # Arguments
    ///
    /// * `record` - Source record
    /// * `row` - Row under construction
    /// * `index` - Ordinal the row will get if it survives
    fn folder_item(&self, _record: &IndexRecord, _row: &mut Row, _index: usize) -> bool {
        true
    }
}

/// Hooks that allow everything and change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ListingHooks for NoHooks {}

/// Third-party listing extension.
pub trait ListingAdapter: Send + Sync {
    /// Adapter name used in logs.
    fn name(&self) -> &str;

    /// Position in the adapter chain; lower runs earlier.
    fn priority_order(&self) -> f64 {
        DEFAULT_PRIORITY_ORDER
    }

    /// Adjusts the request-local listing definition before rows are built.
    fn before_render(&self, _definition: &mut ListingDefinition) {}

    /// Mutates a row. Returning false vetoes it.
    fn folder_item(&self, _record: &IndexRecord, _row: &mut Row, _index: usize) -> bool {
        true
    }
}

/// Adapters ordered by ascending priority, ties in registration order.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn ListingAdapter>>,
}

impl AdapterRegistry {
    /// Creates a registry, ordering the adapters once.
    #[must_use]
    pub fn new(mut adapters: Vec<Arc<dyn ListingAdapter>>) -> Self {
        adapters.sort_by(|a, b| a.priority_order().total_cmp(&b.priority_order()));
        Self { adapters }
    }

    /// Registers an adapter behind every adapter of lower or equal priority.
    pub fn register(&mut self, adapter: Arc<dyn ListingAdapter>) {
        let priority = adapter.priority_order();
        let position = self
            .adapters
            .partition_point(|existing| existing.priority_order() <= priority);
        self.adapters.insert(position, adapter);
    }

    /// Returns the adapters in invocation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ListingAdapter>> {
        self.adapters.iter()
    }

    /// Returns the number of adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Runs every adapter's `before_render` in order.
    pub fn before_render(&self, definition: &mut ListingDefinition) {
        for adapter in &self.adapters {
            debug!(adapter = %adapter.name(), "before_render");
            adapter.before_render(definition);
        }
    }

    /// Runs every adapter's `folder_item` in order, stopping at the first veto.
    ///
    /// # Returns
    ///
    /// False if an adapter vetoed the row.
    pub fn folder_item(&self, record: &IndexRecord, row: &mut Row, index: usize) -> bool {
        for adapter in &self.adapters {
            debug!(adapter = %adapter.name(), uid = %record.uid, index, "folder_item");
            if !adapter.folder_item(record, row, index) {
                debug!(adapter = %adapter.name(), uid = %record.uid, "row vetoed");
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.adapters.iter().map(|adapter| adapter.name()).collect();
        f.debug_struct("AdapterRegistry").field("adapters", &names).finish()
    }
}

/// Column value function registered for a column id.
pub type ColumnResolver = Arc<dyn Fn(&IndexRecord, &Row) -> Option<Value> + Send + Sync>;

/// Registered column resolvers keyed by column id.
#[derive(Clone, Default)]
pub struct ColumnResolvers {
    resolvers: HashMap<String, ColumnResolver>,
}

impl ColumnResolvers {
    /// Creates an empty resolver set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolver for a column, replacing any previous one.
    pub fn register<F>(&mut self, column_id: impl Into<String>, resolver: F)
    where
        F: Fn(&IndexRecord, &Row) -> Option<Value> + Send + Sync + 'static,
    {
        self.resolvers.insert(column_id.into(), Arc::new(resolver));
    }

    /// Returns the resolver for a column.
    #[must_use]
    pub fn get(&self, column_id: &str) -> Option<&ColumnResolver> {
        self.resolvers.get(column_id)
    }
}

impl fmt::Debug for ColumnResolvers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.resolvers.keys().collect();
        ids.sort();
        f.debug_struct("ColumnResolvers").field("columns", &ids).finish()
    }
}

/// Converts an absolute URL, a physical path or a relative path into an
/// absolute URL under `portal_url`.
///
/// # Arguments
///
/// * `portal_url` - Absolute URL of the site root
/// * `url_or_path` - Value to normalize
#[must_use]
pub fn url_or_path_to_url(portal_url: &str, url_or_path: &str) -> String {
    let portal_url = portal_url.trim_end_matches('/');
    let portal_path = portal_path_of(portal_url);

    let mut rest = url_or_path.strip_prefix(portal_url).unwrap_or(url_or_path);
    if !portal_path.is_empty() {
        rest = rest.strip_prefix(portal_path).unwrap_or(rest);
    }
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    format!("{portal_url}/{rest}")
}

fn portal_path_of(portal_url: &str) -> &str {
    let without_scheme = portal_url
        .split_once("://")
        .map_or(portal_url, |(_, rest)| rest);
    without_scheme
        .find('/')
        .map_or("", |start| &without_scheme[start..])
}

/// Rows produced for one page.
#[derive(Debug, Clone, Default)]
pub struct RowBatch {
    /// Surviving rows; each row's ordinal is its position here.
    pub rows: Vec<Row>,
    /// True if emission stopped at the page size with records left over.
    pub show_more: bool,
}

/// Entity behind a record, materialized on first use.
struct LazyEntity<'r> {
    record: &'r IndexRecord,
    entity: Option<Option<Arc<dyn Entity>>>,
}

impl<'r> LazyEntity<'r> {
    fn new(record: &'r IndexRecord) -> Self {
        Self {
            record,
            entity: None,
        }
    }

    fn get(&mut self, catalog: &dyn Catalog) -> Option<&Arc<dyn Entity>> {
        let record = self.record;
        self.entity
            .get_or_insert_with(|| match catalog.wake(record) {
                Ok(entity) => entity,
                Err(err) => {
                    warn!(uid = %record.uid, error = %err, "failed to wake object");
                    None
                }
            })
            .as_ref()
    }
}

/// Builds rows from index records.
pub struct RowPipeline<'a> {
    catalog: &'a dyn Catalog,
    workflow: &'a dyn Workflow,
    config: &'a EngineConfig,
    hooks: &'a dyn ListingHooks,
    adapters: &'a AdapterRegistry,
    resolvers: &'a ColumnResolvers,
}

impl<'a> RowPipeline<'a> {
    /// Creates a pipeline.
    pub fn new(
        catalog: &'a dyn Catalog,
        workflow: &'a dyn Workflow,
        config: &'a EngineConfig,
        hooks: &'a dyn ListingHooks,
        adapters: &'a AdapterRegistry,
        resolvers: &'a ColumnResolvers,
    ) -> Self {
        Self {
            catalog,
            workflow,
            config,
            hooks,
            adapters,
            resolvers,
        }
    }

    /// Renders records into rows.
    ///
    /// Rows rejected by the allow predicate, the listing hook or an adapter
    /// do not consume an ordinal. Emission stops once `page_size` rows
    /// exist.
    ///
    /// # Arguments
    ///
    /// * `records` - Candidate records in display order
    /// * `columns` - Columns to resolve
    /// * `page_size` - Maximum number of rows
    ///
    /// # Returns
    ///
    /// The surviving rows and whether emission was cut short.
    pub fn render(&self, records: &[IndexRecord], columns: &ColumnSet, page_size: usize) -> RowBatch {
        let mut rows = Vec::new();
        let mut show_more = false;

        for record in records {
            if rows.len() >= page_size {
                show_more = true;
                break;
            }
            if !self.hooks.is_item_allowed(record) {
                continue;
            }

            let index = rows.len();
            let mut row = self.build_row(record, columns);
            if !self.hooks.folder_item(record, &mut row, index) {
                debug!(uid = %record.uid, "row dropped by listing hook");
                continue;
            }
            if !self.adapters.folder_item(record, &mut row, index) {
                continue;
            }
            rows.push(row);
        }

        RowBatch { rows, show_more }
    }

    /// Builds the row of one record: identity, state and column values.
    #[must_use]
    pub fn build_row(&self, record: &IndexRecord, columns: &ColumnSet) -> Row {
        let mut row = self.base_row(record);
        let mut entity = LazyEntity::new(record);

        for column in columns.iter() {
            let value = self.resolve_value(column, record, &row, &mut entity);
            if let Some(link) = self.resolve_link(column, record, &value, &mut entity) {
                row.links.insert(column.id.clone(), link);
            }
            row.columns.insert(column.id.clone(), value);
        }
        row
    }

    fn base_row(&self, record: &IndexRecord) -> Row {
        let state_id = record.review_state.clone().unwrap_or_default();
        let state_title = if state_id.is_empty() {
            String::new()
        } else {
            self.workflow
                .state_title(&state_id, &record.entity_type)
                .unwrap_or_else(|err| {
                    warn!(state = %state_id, error = %err, "state title lookup failed");
                    state_id.clone()
                })
        };
        let state_class = if state_id.is_empty() {
            String::new()
        } else {
            format!("state-{state_id}")
        };

        Row {
            uid: record.uid.clone(),
            url: url_or_path_to_url(&self.config.portal_url, &record.path),
            id: record.id.clone(),
            title: record.title.clone(),
            entity_type: record.entity_type.clone(),
            state_id,
            state_title,
            state_class,
            ..Row::default()
        }
    }

    fn resolve_value(
        &self,
        column: &ColumnSpec,
        record: &IndexRecord,
        row: &Row,
        entity: &mut LazyEntity<'_>,
    ) -> Value {
        if let Some(value) = row.field(&column.id).filter(|value| !value.is_blank()) {
            return value;
        }
        if let Some(resolver) = self.resolvers.get(&column.id) {
            if let Some(value) = resolver(record, row) {
                return value;
            }
        }
        if let Some(path) = column.accessor_path.as_deref().filter(|path| !path.is_empty()) {
            return self.lookup(path, record, entity).unwrap_or_default();
        }
        self.lookup(&column.id, record, entity).unwrap_or_default()
    }

    fn resolve_link(
        &self,
        column: &ColumnSpec,
        record: &IndexRecord,
        value: &Value,
        entity: &mut LazyEntity<'_>,
    ) -> Option<Link> {
        let path = column
            .link_template_path
            .as_deref()
            .filter(|path| !path.is_empty())?;
        let target = self.lookup(path, record, entity).filter(|target| !target.is_blank())?;
        let target = target.to_string();
        let label = if value.is_blank() {
            target.clone()
        } else {
            value.to_string()
        };
        Some(Link {
            label,
            url: url_or_path_to_url(&self.config.portal_url, &target),
        })
    }

    /// Evaluates a dotted path against the record, then the entity.
    fn lookup(&self, path: &str, record: &IndexRecord, entity: &mut LazyEntity<'_>) -> Option<Value> {
        if let Some(value) = record_path(record, path) {
            return Some(value);
        }
        entity
            .get(self.catalog)
            .and_then(|entity| resolve_path(entity.as_ref(), path))
    }
}

fn record_path(record: &IndexRecord, path: &str) -> Option<Value> {
    let mut segments = path.split('.').filter(|segment| !segment.is_empty());
    let mut value = record.attribute(segments.next()?)?;
    for segment in segments {
        value = value.get(segment)?.clone();
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_from_relative_path() {
        assert_eq!(
            url_or_path_to_url("http://lims.example/site", "clients/c1"),
            "http://lims.example/site/clients/c1"
        );
    }

    #[test]
    fn test_url_from_physical_path() {
        assert_eq!(
            url_or_path_to_url("http://lims.example/site", "/site/clients/c1"),
            "http://lims.example/site/clients/c1"
        );
        assert_eq!(
            url_or_path_to_url("http://localhost", "/clients/c1"),
            "http://localhost/clients/c1"
        );
    }

    #[test]
    fn test_url_from_absolute_url() {
        assert_eq!(
            url_or_path_to_url("http://lims.example/site", "http://lims.example/site/c1"),
            "http://lims.example/site/c1"
        );
    }

    struct Named(&'static str, f64);

    impl ListingAdapter for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn priority_order(&self) -> f64 {
            self.1
        }
    }

    #[test]
    fn test_registry_orders_by_priority_then_registration() {
        let mut registry = AdapterRegistry::new(vec![
            Arc::new(Named("late", 2000.0)),
            Arc::new(Named("default-a", DEFAULT_PRIORITY_ORDER)),
            Arc::new(Named("early", 10.0)),
        ]);
        registry.register(Arc::new(Named("default-b", DEFAULT_PRIORITY_ORDER)));

        let names: Vec<&str> = registry.iter().map(|adapter| adapter.name()).collect();
        assert_eq!(names, vec!["early", "default-a", "default-b", "late"]);
    }
}
