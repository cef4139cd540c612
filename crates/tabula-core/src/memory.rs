// Rust guideline compliant 2026-02-06

//! In-memory port implementations backed by a JSONL entity file.
//!
//! Each line of the file describes one entity: its identity, workflow
//! state, catalog metadata, extra attributes and the transitions currently
//! legal for it. Malformed lines are skipped with a warning.
//!
//! [`MemoryCatalog`], [`MemoryWorkflow`] and [`MemoryDataManager`] share one
//! [`MemoryStore`], so field writes and executed transitions are visible to
//! later searches.

use crate::identity::is_uid;
use crate::models::{Criteria, SortDirection, Transition, Value, PATH_INDEX, SEARCHABLE_TEXT_INDEX, UID_INDEX};
use crate::ports::{Catalog, DataManager, Entity, IndexRecord, TransitionExecutor, TransitionFailure, Workflow};
use crate::query::Query;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// A transition legal for an entity, with the state it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    /// The transition as reported to listings.
    #[serde(flatten)]
    pub transition: Transition,
    /// State entered when the transition is executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// One entity line of the JSONL file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity identifier.
    pub uid: String,
    /// Short id within the parent container.
    pub id: String,
    /// Entity title.
    #[serde(default)]
    pub title: String,
    /// Entity type tag.
    #[serde(alias = "portal_type")]
    pub entity_type: String,
    /// Physical path.
    pub path: String,
    /// Current workflow state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_state: Option<String>,
    /// Catalog metadata columns.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Attributes only available on the materialized entity.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    /// Transitions currently legal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionRule>,
    /// Text indexed for wildcard search; derived from the metadata if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_text: Option<String>,
}

impl EntityRecord {
    /// Checks the record for structural errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the uid is not a valid identifier or the path
    /// is not absolute.
    pub fn validate(&self) -> Result<()> {
        if !is_uid(&self.uid) {
            return Err(Error::Catalog(format!("Invalid uid: {}", self.uid)));
        }
        if !self.path.starts_with('/') {
            return Err(Error::Catalog(format!(
                "Path of {} must be absolute: {}",
                self.uid, self.path
            )));
        }
        Ok(())
    }

    /// Returns the catalog summary of this entity.
    #[must_use]
    pub fn index_record(&self) -> IndexRecord {
        IndexRecord {
            uid: self.uid.clone(),
            id: self.id.clone(),
            title: self.title.clone(),
            entity_type: self.entity_type.clone(),
            review_state: self.review_state.clone(),
            path: self.path.clone(),
            metadata: self.metadata.clone(),
        }
    }

    fn index_value(&self, index: &str) -> Option<Value> {
        match index {
            UID_INDEX => Some(Value::from(self.uid.as_str())),
            PATH_INDEX => Some(Value::from(self.path.as_str())),
            "review_state" => self.review_state.as_deref().map(Value::from),
            "portal_type" | "entity_type" => Some(Value::from(self.entity_type.as_str())),
            "id" | "getId" => Some(Value::from(self.id.as_str())),
            "title" | "Title" | "sortable_title" => Some(Value::from(self.title.as_str())),
            other => self
                .metadata
                .get(other)
                .or_else(|| self.attributes.get(other))
                .cloned(),
        }
    }

    fn text(&self) -> String {
        if let Some(text) = &self.searchable_text {
            return text.to_lowercase();
        }
        let mut parts = vec![self.id.clone(), self.title.clone()];
        parts.extend(
            self.metadata
                .values()
                .filter(|value| !value.is_blank())
                .map(ToString::to_string),
        );
        parts.join(" ").to_lowercase()
    }
}

/// A materialized entity snapshot.
#[derive(Debug, Clone)]
pub struct MemoryEntity {
    record: EntityRecord,
}

impl MemoryEntity {
    /// Returns the underlying record.
    #[must_use]
    pub fn record(&self) -> &EntityRecord {
        &self.record
    }
}

impl Entity for MemoryEntity {
    fn uid(&self) -> &str {
        &self.record.uid
    }

    fn path(&self) -> &str {
        &self.record.path
    }

    fn entity_type(&self) -> &str {
        &self.record.entity_type
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.record.attributes.get(name) {
            return Some(value.clone());
        }
        self.record.index_record().attribute(name)
    }
}

/// Shared entity data behind the memory ports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<EntityRecord>>,
    state_titles: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates a store from records.
    ///
    /// # Errors
    ///
    /// Returns an error if a record fails validation.
    pub fn new(records: Vec<EntityRecord>) -> Result<Self> {
        for record in &records {
            record.validate()?;
        }
        Ok(Self {
            records: RwLock::new(records),
            state_titles: BTreeMap::new(),
        })
    }

    /// Loads records from a JSONL file.
    ///
    /// A missing file yields an empty store. Blank lines are ignored;
    /// malformed or invalid lines are skipped with a warning.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSONL file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Self::new(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = match serde_json::from_str::<EntityRecord>(&line) {
                Ok(record) => record,
                Err(err) => {
                    warn!(line = number + 1, error = %err, "skipping malformed entity line");
                    continue;
                }
            };
            if let Err(err) = record.validate() {
                warn!(line = number + 1, error = %err, "skipping invalid entity line");
                continue;
            }
            records.push(record);
        }

        info!(path = %path.display(), count = records.len(), "loaded entities");
        Self::new(records)
    }

    /// Writes all records back as JSONL, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let temp_path = path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&temp_path)?;
            for record in self.records().iter() {
                let json = serde_json::to_string(record)?;
                file.write_all(json.as_bytes())?;
                file.write_all(b"\n")?;
            }
            file.sync_all()?;
        }
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Sets translated state titles keyed by state id.
    #[must_use]
    pub fn with_state_titles<I, K, V>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.state_titles = titles
            .into_iter()
            .map(|(state, title)| (state.into(), title.into()))
            .collect();
        self
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Returns true if the store holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Returns a copy of the record with the given uid.
    #[must_use]
    pub fn get(&self, uid: &str) -> Option<EntityRecord> {
        self.records().iter().find(|record| record.uid == uid).cloned()
    }

    fn records(&self) -> std::sync::RwLockReadGuard<'_, Vec<EntityRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<F, T>(&self, uid: &str, change: F) -> Option<T>
    where
        F: FnOnce(&mut EntityRecord) -> T,
    {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.iter_mut().find(|record| record.uid == uid).map(change)
    }
}

/// Catalog over a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    store: Arc<MemoryStore>,
    sort_indexes: BTreeSet<String>,
    text_index: bool,
    metadata_columns: Option<Vec<String>>,
}

impl MemoryCatalog {
    /// Creates a catalog without sortable indexes or text index.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            sort_indexes: BTreeSet::new(),
            text_index: false,
            metadata_columns: None,
        }
    }

    /// Declares indexes that support ordered lookups.
    #[must_use]
    pub fn with_sort_indexes<I, S>(mut self, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_indexes = indexes.into_iter().map(Into::into).collect();
        self
    }

    /// Enables the wildcard full-text index.
    #[must_use]
    pub fn with_text_index(mut self, enabled: bool) -> Self {
        self.text_index = enabled;
        self
    }

    /// Declares the metadata columns explicitly instead of deriving them.
    #[must_use]
    pub fn with_metadata_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    fn matches(record: &EntityRecord, query: &Query) -> bool {
        let filters_match = query.filter.iter().all(|(index, criteria)| {
            match record.index_value(index) {
                Some(value) => criteria.matches(&value),
                None => matches!(criteria, Criteria::Exact(Value::Null)),
            }
        });
        if !filters_match {
            return false;
        }
        match query.searchable_text.as_deref() {
            Some(pattern) => {
                let needle = pattern.trim_matches('*').to_lowercase();
                needle.is_empty() || record.text().contains(&needle)
            }
            None => true,
        }
    }
}

impl Catalog for MemoryCatalog {
    fn search(&self, query: &Query) -> Result<Vec<IndexRecord>> {
        if let Some(index) = query.sort_on.as_deref() {
            if !self.supports_sorting(index) {
                return Err(Error::Catalog(format!("Index {index} does not support sorting")));
            }
        }
        if query.searchable_text.is_some() && !self.text_index {
            return Err(Error::Catalog(format!(
                "Catalog has no {SEARCHABLE_TEXT_INDEX} index"
            )));
        }

        let records = self.store.records();
        let mut matched: Vec<&EntityRecord> = records
            .iter()
            .filter(|record| Self::matches(record, query))
            .collect();

        if let Some(index) = query.sort_on.as_deref() {
            let key = |record: &&EntityRecord| record.index_value(index).unwrap_or_default();
            match query.sort_order.unwrap_or_default() {
                SortDirection::Ascending => matched.sort_by(|a, b| key(a).compare(&key(b))),
                SortDirection::Descending => matched.sort_by(|a, b| key(b).compare(&key(a))),
            }
        }

        Ok(matched.into_iter().map(EntityRecord::index_record).collect())
    }

    fn indexes(&self) -> Vec<String> {
        let mut indexes: BTreeSet<String> = [UID_INDEX, PATH_INDEX, "review_state", "portal_type", "id", "title"]
            .into_iter()
            .map(String::from)
            .collect();
        indexes.extend(self.sort_indexes.iter().cloned());
        indexes.extend(self.metadata_columns());
        if self.text_index {
            indexes.insert(SEARCHABLE_TEXT_INDEX.to_string());
        }
        indexes.into_iter().collect()
    }

    fn supports_sorting(&self, index: &str) -> bool {
        self.sort_indexes.contains(index)
    }

    fn metadata_columns(&self) -> Vec<String> {
        if let Some(columns) = &self.metadata_columns {
            return columns.clone();
        }
        let columns: BTreeSet<String> = self
            .store
            .records()
            .iter()
            .flat_map(|record| record.metadata.keys().cloned())
            .collect();
        columns.into_iter().collect()
    }

    fn object_by_uid(&self, uid: &str) -> Result<Option<Arc<dyn Entity>>> {
        Ok(self
            .store
            .get(uid)
            .map(|record| Arc::new(MemoryEntity { record }) as Arc<dyn Entity>))
    }
}

/// Workflow over a [`MemoryStore`]; also executes transitions.
#[derive(Debug, Clone)]
pub struct MemoryWorkflow {
    store: Arc<MemoryStore>,
}

impl MemoryWorkflow {
    /// Creates a workflow over a store.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl Workflow for MemoryWorkflow {
    fn transitions_for(&self, entity: &dyn Entity) -> Result<Vec<Transition>> {
        let record = self
            .store
            .get(entity.uid())
            .ok_or_else(|| Error::Workflow(format!("Unknown object {}", entity.uid())))?;
        Ok(record
            .transitions
            .into_iter()
            .map(|rule| rule.transition)
            .collect())
    }

    fn review_state_of(&self, entity: &dyn Entity) -> Option<String> {
        self.store
            .get(entity.uid())
            .and_then(|record| record.review_state)
    }

    fn state_title(&self, state: &str, _entity_type: &str) -> Result<String> {
        Ok(self
            .store
            .state_titles
            .get(state)
            .cloned()
            .unwrap_or_else(|| state.to_string()))
    }
}

impl TransitionExecutor for MemoryWorkflow {
    fn do_transition(
        &self,
        entity: &dyn Entity,
        transition: &str,
    ) -> std::result::Result<(), TransitionFailure> {
        let outcome = self.store.update(entity.uid(), |record| {
            let rule = record
                .transitions
                .iter()
                .find(|rule| rule.transition.id == transition)
                .cloned();
            match rule {
                Some(rule) => {
                    if let Some(target) = rule.target {
                        record.review_state = Some(target);
                    }
                    Ok(())
                }
                None => Err(TransitionFailure::Rejected(format!(
                    "'{transition}' is not allowed for {}",
                    record.uid
                ))),
            }
        });
        outcome.unwrap_or_else(|| {
            Err(TransitionFailure::Unexpected(format!(
                "object {} vanished",
                entity.uid()
            )))
        })
    }
}

/// Field writer over a [`MemoryStore`].
///
/// Only fields already present in an entity's metadata or attributes are
/// writable; other names change nothing.
#[derive(Debug, Clone)]
pub struct MemoryDataManager {
    store: Arc<MemoryStore>,
}

impl MemoryDataManager {
    /// Creates a data manager over a store.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl DataManager for MemoryDataManager {
    fn set_field(&self, entity: &dyn Entity, name: &str, value: &Value) -> Result<Vec<String>> {
        let changed = self
            .store
            .update(entity.uid(), |record| {
                let mut changed = false;
                if let Some(slot) = record.metadata.get_mut(name) {
                    *slot = value.clone();
                    changed = true;
                }
                if let Some(slot) = record.attributes.get_mut(name) {
                    *slot = value.clone();
                    changed = true;
                }
                changed
            })
            .ok_or_else(|| Error::NotFound(entity.uid().to_string()))?;

        Ok(if changed {
            vec![entity.uid().to_string()]
        } else {
            Vec::new()
        })
    }
}
