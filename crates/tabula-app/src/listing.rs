// Rust guideline compliant 2026-02-09

//! Listing façade: the JSON operations over one listing type.

use crate::error::{AppError, Result};
use crate::requests::{
    ChildrenPayload, ExecuteTransitionRequest, FetchChildrenRequest, FetchRowsRequest,
    FetchTransitionsRequest, QueryRowsPayload, QueryRowsRequest, RowsPayload, SetFieldsPayload,
    SetFieldsRequest, TransitionOutcome, TransitionsPayload,
};
use crate::workflow_action;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tabula_core::models::{PATH_INDEX, UID_INDEX};
use tabula_core::{
    valid_uids, window, AdapterRegistry, Catalog, ColumnResolvers, Criteria, DataManager, EngineConfig,
    FilterState, IndexRecord, ListingAdapter, ListingDefinition, ListingHooks, NoHooks,
    PathCriteria, QueryBuilder, RequestContext, ReviewState, Row, RowBatch, RowPipeline,
    SearchExecutor, SharedListing, SortDirection, Transition, TransitionExecutor, TransitionResolver,
    Value, Workflow,
};
use tracing::{debug, info, warn};

/// Rows of one rendered query.
struct Rendered {
    rows: Vec<Row>,
    total: usize,
    show_more: bool,
    expand_all_categories: bool,
    sort_on: Option<String>,
    manual_sort_on: Option<String>,
    sort_order: SortDirection,
}

/// Serves the listing operations of one listing type.
///
/// Every call works on a request-local copy of the shared definition, so
/// adapters may reshape columns or review states for that request only.
pub struct ListingService {
    catalog: Arc<dyn Catalog>,
    workflow: Arc<dyn Workflow>,
    data_manager: Option<Arc<dyn DataManager>>,
    executor: Option<Arc<dyn TransitionExecutor>>,
    listing: Arc<SharedListing>,
    hooks: Arc<dyn ListingHooks>,
    adapters: AdapterRegistry,
    resolvers: ColumnResolvers,
    config: EngineConfig,
}

impl ListingService {
    /// Creates a service without hooks, adapters or write capabilities.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog port
    /// * `workflow` - Workflow port
    /// * `listing` - Shared listing definition
    /// * `config` - Engine configuration
    #[must_use]
    pub fn new(
        catalog: Arc<dyn Catalog>,
        workflow: Arc<dyn Workflow>,
        listing: Arc<SharedListing>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            workflow,
            data_manager: None,
            executor: None,
            listing,
            hooks: Arc::new(NoHooks),
            adapters: AdapterRegistry::default(),
            resolvers: ColumnResolvers::new(),
            config,
        }
    }

    /// Sets the data manager used by `set_fields`.
    #[must_use]
    pub fn with_data_manager(mut self, data_manager: Arc<dyn DataManager>) -> Self {
        self.data_manager = Some(data_manager);
        self
    }

    /// Sets the collaborator used by `execute_transition`.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn TransitionExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the per-listing hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn ListingHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Registers a listing-view adapter.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ListingAdapter>) -> Self {
        self.adapters.register(adapter);
        self
    }

    /// Registers a column resolver.
    #[must_use]
    pub fn with_resolver<F>(mut self, column_id: impl Into<String>, resolver: F) -> Self
    where
        F: Fn(&IndexRecord, &Row) -> Option<Value> + Send + Sync + 'static,
    {
        self.resolvers.register(column_id, resolver);
        self
    }

    /// Returns the shared listing definition.
    #[must_use]
    pub fn listing(&self) -> &Arc<SharedListing> {
        &self.listing
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetches one page of rows with the transitions of the selection.
    ///
    /// Row rendering and transition resolution for the requested selection
    /// run concurrently. If rendered rows preselect further uids, the
    /// transitions are resolved again for the merged selection.
    ///
    /// # Arguments
    ///
    /// * `request` - Review state, search, sort, window and selection
    ///
    /// # Returns
    ///
    /// The rows payload with listing configuration fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fails or the deadline expires.
    pub fn fetch_rows(&self, request: &FetchRowsRequest) -> Result<RowsPayload> {
        let context = RequestContext::with_timeout(self.config.deadline());
        let definition = self.prepare();
        let review_state = definition.review_state(request.review_state.as_deref());
        let page_size = self.page_size(&definition, request.page_size);

        let mut base_filter = definition.base_filter.clone();
        base_filter.extend(request.filter.clone());
        let state = FilterState {
            review_state_id: Some(review_state.id.clone()),
            base_filter,
            search_term: request.search_term.clone(),
            sort_key: request.sort_on.clone(),
            sort_direction: request.sort_direction(),
            offset: request.offset,
            page_size,
        };

        let requested = valid_uids(&request.selected_uids);
        let (rendered, transitions) = rayon::join(
            || self.render(&state, &definition, &review_state, &context),
            || self.resolve(&requested, &review_state),
        );
        let rendered = rendered?;

        let preselected = rendered.rows.iter().filter(|row| row.selected).map(|row| &row.uid);
        let selected_uids = valid_uids(requested.iter().chain(preselected));
        let transitions = if selected_uids.len() == requested.len() {
            transitions
        } else {
            debug!(selected = selected_uids.len(), "rows preselected uids, resolving again");
            self.resolve(&selected_uids, &review_state)
        };

        let payload = RowsPayload {
            count: rendered.rows.len(),
            rows: rendered.rows,
            total: rendered.total,
            offset: request.offset,
            show_more: rendered.show_more,
            sortable_columns: definition.sortable_columns(),
            review_state: review_state.id.clone(),
            selected_uids,
            transitions,
            sort_on: rendered.sort_on,
            manual_sort_on: rendered.manual_sort_on,
            sort_order: rendered.sort_order,
            page_size,
            expand_all_categories: rendered.expand_all_categories,
            ajax_transitions: self
                .transitions_via_ajax(&definition.name, definition.context_type.as_deref()),
            runtime_ms: elapsed_ms(&context),
            columns: definition.columns,
            review_states: definition.review_states,
        };

        info!(
            listing = %definition.name,
            count = payload.count,
            total = payload.total,
            runtime_ms = payload.runtime_ms,
            "rows fetched"
        );
        Ok(payload)
    }

    /// Resolves the transitions of a selection.
    ///
    /// # Arguments
    ///
    /// * `request` - Selected uids and review state
    #[must_use]
    pub fn fetch_transitions(&self, request: &FetchTransitionsRequest) -> TransitionsPayload {
        let definition = self.prepare();
        let review_state = definition.review_state(request.review_state.as_deref());
        TransitionsPayload {
            transitions: self.resolve(&request.selected_uids, &review_state),
        }
    }

    /// Fetches the child rows of a parent row.
    ///
    /// Explicit child uids are fetched as given; otherwise the direct
    /// descendants of the parent's path are listed. The child query
    /// replaces the listing's base filter and is not paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fails, or if no child uids are given
    /// and the parent does not exist.
    pub fn fetch_children(&self, request: &FetchChildrenRequest) -> Result<ChildrenPayload> {
        let context = RequestContext::with_timeout(self.config.deadline());
        let mut filter = BTreeMap::new();
        if request.child_uids.is_empty() {
            let parent = self
                .catalog
                .object_by_uid(&request.parent_uid)?
                .ok_or_else(|| AppError::NotFound(request.parent_uid.clone()))?;
            filter.insert(
                PATH_INDEX.to_string(),
                Criteria::Path(PathCriteria {
                    query: parent.path().to_string(),
                    depth: Some(1),
                }),
            );
        } else {
            filter.insert(
                UID_INDEX.to_string(),
                Criteria::uids(valid_uids(&request.child_uids)),
            );
        }

        let definition = self.prepare();
        let review_state = definition.review_state(None);
        let state = FilterState {
            base_filter: filter,
            page_size: usize::MAX,
            ..FilterState::default()
        };
        let mut children = self.render(&state, &definition, &review_state, &context)?.rows;
        for child in &mut children {
            child.parent = Some(request.parent_uid.clone());
        }
        Ok(ChildrenPayload { children })
    }

    /// Fetches rows for a raw catalog query.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a key is not a catalog index, or an error if
    /// the catalog fails.
    pub fn query_rows(&self, request: &QueryRowsRequest) -> Result<QueryRowsPayload> {
        let indexes: BTreeSet<String> = self.catalog.indexes().into_iter().collect();
        if let Some(key) = request.query.keys().find(|key| !indexes.contains(*key)) {
            return Err(AppError::InvalidInput(format!(
                "{key} is not a valid catalog index"
            )));
        }

        let context = RequestContext::with_timeout(self.config.deadline());
        let definition = self.prepare();
        let review_state = definition.review_state(None);
        let state = FilterState {
            base_filter: request.query.clone(),
            page_size: self.page_size(&definition, None),
            ..FilterState::default()
        };
        let rows = self.render(&state, &definition, &review_state, &context)?.rows;
        Ok(QueryRowsPayload {
            count: rows.len(),
            rows,
        })
    }

    /// Writes the fields of a save queue and returns the refreshed rows.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidInput` if the save queue is missing
    /// - `UpdateFailed` if no entity changed
    ///
    /// Unknown uids and failed field writes are logged and skipped.
    pub fn set_fields(&self, request: &SetFieldsRequest) -> Result<SetFieldsPayload> {
        let queue = request
            .save_queue
            .as_ref()
            .ok_or_else(|| AppError::missing_keys(&["save_queue"]))?;
        let data_manager = self
            .data_manager
            .as_ref()
            .ok_or_else(|| AppError::UnknownOperation("set_fields".to_string()))?;

        let mut updated: Vec<String> = Vec::new();
        for (uid, fields) in queue {
            let entity = match self.catalog.object_by_uid(uid) {
                Ok(Some(entity)) => entity,
                Ok(None) => {
                    warn!(uid = %uid, "save queue names an unknown object");
                    continue;
                }
                Err(err) => {
                    warn!(uid = %uid, error = %err, "failed to look up save queue object");
                    continue;
                }
            };
            for (name, value) in fields {
                match data_manager.set_field(entity.as_ref(), name, value) {
                    Ok(changed) => {
                        for changed in changed {
                            if !updated.contains(&changed) {
                                updated.push(changed);
                            }
                        }
                    }
                    Err(err) => {
                        warn!(uid = %uid, field = %name, error = %err, "failed to set field");
                    }
                }
            }
        }

        if updated.is_empty() {
            let queue = serde_json::to_string(queue).map_err(tabula_core::Error::from)?;
            return Err(AppError::UpdateFailed(format!(
                "Failed to set field of save queue '{queue}'"
            )));
        }
        info!(uids = ?updated, "fields updated");

        let context = RequestContext::with_timeout(self.config.deadline());
        let definition = self.prepare();
        let review_state = definition.review_state(None);
        let mut base_filter = definition.base_filter.clone();
        base_filter.insert(
            UID_INDEX.to_string(),
            Criteria::uids(updated.iter().cloned()),
        );
        let state = FilterState {
            base_filter,
            page_size: self.page_size(&definition, None).max(updated.len()),
            ..FilterState::default()
        };
        let rows = self.render(&state, &definition, &review_state, &context)?.rows;
        Ok(SetFieldsPayload {
            count: rows.len(),
            uids: updated,
            rows,
        })
    }

    /// Executes a transition over a selection through the collaborator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty transition id, or an error if no
    /// executor is configured or the catalog fails.
    pub fn execute_transition(&self, request: &ExecuteTransitionRequest) -> Result<TransitionOutcome> {
        if request.transition.trim().is_empty() {
            return Err(AppError::InvalidInput("No transition given".to_string()));
        }
        let executor = self
            .executor
            .as_ref()
            .ok_or_else(|| AppError::UnknownOperation("execute_transition".to_string()))?;
        Ok(workflow_action::execute(
            self.catalog.as_ref(),
            executor.as_ref(),
            &request.uids,
            &request.transition,
        )?)
    }

    /// Checks whether transitions of a view may be submitted asynchronously.
    ///
    /// # Arguments
    ///
    /// * `view_name` - Name of the listing view
    /// * `portal_type` - Entity type of the listing context
    ///
    /// # Returns
    ///
    /// False when disabled globally or when the type or view is blacklisted.
    #[must_use]
    pub fn transitions_via_ajax(&self, view_name: &str, portal_type: Option<&str>) -> bool {
        if !self.config.enable_ajax_transitions {
            return false;
        }
        let blacklist = &self.config.ajax_transitions_blacklist;
        if portal_type.is_some_and(|portal_type| blacklist.iter().any(|name| name == portal_type)) {
            return false;
        }
        !blacklist.iter().any(|name| name == view_name)
    }

    /// Copies the shared definition and lets the adapters reshape it.
    fn prepare(&self) -> ListingDefinition {
        let mut definition = (*self.listing.snapshot()).clone();
        self.adapters.before_render(&mut definition);
        definition
    }

    fn page_size(&self, definition: &ListingDefinition, requested: Option<usize>) -> usize {
        requested
            .filter(|size| *size > 0)
            .or(definition.page_size)
            .unwrap_or(self.config.default_page_size)
    }

    fn resolve(&self, uids: &[String], review_state: &ReviewState) -> Vec<Transition> {
        TransitionResolver::new(self.catalog.as_ref(), self.workflow.as_ref(), &self.config)
            .resolve(uids, review_state)
    }

    /// Builds, runs, windows and renders one query.
    fn render(
        &self,
        state: &FilterState,
        definition: &ListingDefinition,
        review_state: &ReviewState,
        context: &RequestContext,
    ) -> Result<Rendered> {
        let built = QueryBuilder::new(self.catalog.as_ref(), self.config.default_sort_order)
            .build(state, definition, review_state);
        let outcome = SearchExecutor::new(self.catalog.as_ref(), self.workflow.as_ref(), &self.config)
            .search(&built, &state.search_term, context)?;

        let page = window(outcome.records, state.offset, state.page_size);
        let pipeline = RowPipeline::new(
            self.catalog.as_ref(),
            self.workflow.as_ref(),
            &self.config,
            self.hooks.as_ref(),
            &self.adapters,
            &self.resolvers,
        );
        let RowBatch { rows, show_more } =
            pipeline.render(&page.records, &definition.columns, state.page_size);

        Ok(Rendered {
            rows,
            total: page.total,
            show_more: page.show_more || show_more,
            expand_all_categories: outcome.expand_all_categories,
            sort_on: built.query.sort_on.or_else(|| built.manual_sort_on.clone()),
            manual_sort_on: built.manual_sort_on,
            sort_order: built.sort_order,
        })
    }
}

fn elapsed_ms(context: &RequestContext) -> u64 {
    u64::try_from(context.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl std::fmt::Debug for ListingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingService")
            .field("listing", &self.listing.snapshot().name)
            .field("adapters", &self.adapters)
            .field("resolvers", &self.resolvers)
            .finish_non_exhaustive()
    }
}
