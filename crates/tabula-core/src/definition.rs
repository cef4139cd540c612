// Rust guideline compliant 2026-02-06

//! Listing definitions: columns, review states and their runtime mutation.
//!
//! A definition is read-only at request time. Runtime changes go through
//! [`SharedListing::update`], which clones the current definition, applies the
//! change and swaps the new snapshot in. Readers holding an older snapshot are
//! unaffected.

use crate::models::{ColumnSpec, Criteria, ReviewState, SortDirection};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Insert position relative to an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Position {
    /// Insert before the entry with this id.
    Before(String),
    /// Insert after the entry with this id.
    After(String),
    /// Append at the end.
    #[default]
    End,
}

impl Position {
    fn anchor(&self) -> Option<&str> {
        match self {
            Position::Before(id) | Position::After(id) => Some(id.as_str()),
            Position::End => None,
        }
    }

    /// Computes the insert index within `ids`, or `None` if the anchor is absent.
    fn index_in<'a, I>(&self, ids: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: Vec<&str> = ids.into_iter().collect();
        match self {
            Position::Before(anchor) => ids.iter().position(|id| id == anchor),
            Position::After(anchor) => ids.iter().position(|id| id == anchor).map(|i| i + 1),
            Position::End => Some(ids.len()),
        }
    }
}

/// Ordered, id-unique sequence of columns. Iteration order is render order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSet {
    columns: Vec<ColumnSpec>,
}

impl ColumnSet {
    /// Builds a column set, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns an error if a column id is empty or two columns share an id.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self> {
        let set = Self { columns };
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.id.trim().is_empty() {
                return Err(Error::InvalidDefinition("Column id must not be empty".to_string()));
            }
            if !seen.insert(column.id.as_str()) {
                return Err(Error::InvalidDefinition(format!(
                    "Duplicate column id '{}'",
                    column.id
                )));
            }
        }
        Ok(())
    }

    /// Looks up a column by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// Checks whether a column exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates columns in render order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter()
    }

    /// Returns the column ids in render order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.id.clone()).collect()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Finds the column addressed by a sort key, either by id or by index name.
    #[must_use]
    pub fn for_sort_key(&self, key: &str) -> Option<&ColumnSpec> {
        self.get(key).or_else(|| {
            self.columns
                .iter()
                .find(|column| column.index_name.as_deref() == Some(key))
        })
    }

    /// Inserts a column at a position, or replaces an existing column in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the position anchor does not exist.
    pub fn insert(&mut self, column: ColumnSpec, position: &Position) -> Result<()> {
        if let Some(existing) = self.columns.iter_mut().find(|c| c.id == column.id) {
            *existing = column;
            return Ok(());
        }
        let index = position
            .index_in(self.columns.iter().map(|c| c.id.as_str()))
            .ok_or_else(|| missing_anchor("Column", position))?;
        self.columns.insert(index, column);
        Ok(())
    }

    /// Removes a column by id.
    ///
    /// # Returns
    ///
    /// The removed column, if it existed.
    pub fn remove(&mut self, id: &str) -> Option<ColumnSpec> {
        let index = self.columns.iter().position(|column| column.id == id)?;
        Some(self.columns.remove(index))
    }
}

fn missing_anchor(kind: &str, position: &Position) -> Error {
    Error::InvalidDefinition(format!(
        "{} '{}' does not exist",
        kind,
        position.anchor().unwrap_or_default()
    ))
}

/// Static configuration of one listing type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDefinition {
    /// Listing name, also used as view name.
    pub name: String,
    /// Form id distinguishing several listings on one page.
    #[serde(default = "default_form_id")]
    pub form_id: String,
    /// Entity type tag of the listing context.
    #[serde(default)]
    pub context_type: Option<String>,
    /// Base content filter applied to every query.
    #[serde(default)]
    pub base_filter: BTreeMap<String, Criteria>,
    /// Columns in render order.
    #[serde(default)]
    pub columns: ColumnSet,
    /// Review states in button order.
    #[serde(default = "default_review_states")]
    pub review_states: Vec<ReviewState>,
    /// Review state used for unknown or missing ids.
    #[serde(default = "default_review_state_id")]
    pub default_review_state: String,
    /// Page size override.
    #[serde(default)]
    pub page_size: Option<usize>,
    /// Sort key used when the request has none.
    #[serde(default)]
    pub default_sort_on: Option<String>,
    /// Sort direction used when the request has none.
    #[serde(default)]
    pub default_sort_order: Option<SortDirection>,
}

fn default_form_id() -> String {
    "list".to_string()
}

fn default_review_state_id() -> String {
    "default".to_string()
}

fn default_review_states() -> Vec<ReviewState> {
    vec![ReviewState::new("default", "All")]
}

impl ListingDefinition {
    /// Creates a definition with the single unrestricted `default` review state.
    pub fn new(name: impl Into<String>, columns: ColumnSet) -> Self {
        Self {
            name: name.into(),
            form_id: default_form_id(),
            context_type: None,
            base_filter: BTreeMap::new(),
            columns,
            review_states: default_review_states(),
            default_review_state: default_review_state_id(),
            page_size: None,
            default_sort_on: None,
            default_sort_order: None,
        }
    }

    /// Parses and validates a definition from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the definition is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let definition: ListingDefinition = toml::from_str(content)
            .map_err(|e| Error::InvalidDefinition(format!("Invalid listing file: {}", e)))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Loads and validates a definition from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validates the invariants of the definition.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Column ids or review-state ids are not unique
    /// - The default review state does not exist
    /// - A review state lists a column that does not exist
    pub fn validate(&self) -> Result<()> {
        self.columns.validate()?;

        let mut seen = HashSet::new();
        for state in &self.review_states {
            if !seen.insert(state.id.as_str()) {
                return Err(Error::InvalidDefinition(format!(
                    "Duplicate review state id '{}'",
                    state.id
                )));
            }
            if let Some(column) = state
                .visible_column_ids
                .iter()
                .find(|id| !self.columns.contains(id))
            {
                return Err(Error::InvalidDefinition(format!(
                    "Review state '{}' references unknown column '{}'",
                    state.id, column
                )));
            }
        }

        if !seen.contains(self.default_review_state.as_str()) {
            return Err(Error::InvalidDefinition(format!(
                "Default review state '{}' does not exist",
                self.default_review_state
            )));
        }

        Ok(())
    }

    /// Resolves the review state for a request.
    ///
    /// Missing or empty ids resolve to the default state. Unknown ids are
    /// logged and also resolve to the default state.
    #[must_use]
    pub fn review_state(&self, requested: Option<&str>) -> ReviewState {
        let state_id = requested
            .filter(|id| !id.is_empty())
            .unwrap_or(self.default_review_state.as_str());
        if let Some(state) = self.review_states.iter().find(|s| s.id == state_id) {
            return state.clone();
        }
        warn!(
            listing = %self.name,
            review_state = %state_id,
            "review_states does not contain the requested id"
        );
        self.review_states
            .iter()
            .find(|s| s.id == self.default_review_state)
            .or_else(|| self.review_states.first())
            .cloned()
            .unwrap_or_else(|| ReviewState::new(default_review_state_id(), "All"))
    }

    /// Returns the ids of sortable columns in render order.
    #[must_use]
    pub fn sortable_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.sortable)
            .map(|column| column.id.clone())
            .collect()
    }

    /// Adds a column, or updates it in place if the id already exists.
    ///
    /// When `review_states` are given, the column also becomes visible in
    /// those states at the same relative position.
    ///
    /// # Arguments
    ///
    /// * `column` - Column to add
    /// * `position` - Insert position among the columns
    /// * `review_states` - Review states that should show the column
    ///
    /// # Errors
    ///
    /// Returns an error if the position anchor does not exist.
    pub fn add_column(
        &mut self,
        column: ColumnSpec,
        position: &Position,
        review_states: &[String],
    ) -> Result<()> {
        let column_id = column.id.clone();
        let existed = self.columns.contains(&column_id);
        self.columns.insert(column, position)?;
        if existed {
            return Ok(());
        }

        for state in self
            .review_states
            .iter_mut()
            .filter(|state| review_states.contains(&state.id))
        {
            if state.visible_column_ids.contains(&column_id) {
                continue;
            }
            let visible = &state.visible_column_ids;
            let index = position
                .index_in(visible.iter().map(String::as_str))
                .unwrap_or(visible.len());
            state.visible_column_ids.insert(index, column_id.clone());
        }
        Ok(())
    }

    /// Removes a column and every visible-column reference to it.
    ///
    /// # Returns
    ///
    /// True if the column existed.
    pub fn remove_column(&mut self, column_id: &str) -> bool {
        if self.columns.remove(column_id).is_none() {
            return false;
        }
        for state in &mut self.review_states {
            state.visible_column_ids.retain(|id| id != column_id);
        }
        true
    }

    /// Adds a review state.
    ///
    /// # Returns
    ///
    /// False if a review state with this id already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the position anchor does not exist.
    pub fn add_review_state(&mut self, state: ReviewState, position: &Position) -> Result<bool> {
        if self.review_states.iter().any(|s| s.id == state.id) {
            return Ok(false);
        }
        let index = position
            .index_in(self.review_states.iter().map(|s| s.id.as_str()))
            .ok_or_else(|| missing_anchor("Review state", position))?;
        self.review_states.insert(index, state);
        Ok(true)
    }
}

/// A listing definition shared by all requests for one listing type.
#[derive(Debug)]
pub struct SharedListing {
    current: RwLock<Arc<ListingDefinition>>,
}

impl SharedListing {
    /// Wraps a validated definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is invalid.
    pub fn new(definition: ListingDefinition) -> Result<Self> {
        definition.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(definition)),
        })
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ListingDefinition> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Applies a change to a copy of the definition and swaps it in.
    ///
    /// The change is discarded if it fails or leaves the definition invalid.
    ///
    /// # Errors
    ///
    /// Returns the error of the change or of the validation.
    pub fn update<F, T>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut ListingDefinition) -> Result<T>,
    {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = ListingDefinition::clone(&guard);
        let outcome = change(&mut next)?;
        next.validate()?;
        *guard = Arc::new(next);
        Ok(outcome)
    }
}
