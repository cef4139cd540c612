// Rust guideline compliant 2026-02-06

//! Interfaces to the collaborators the engine consumes.
//!
//! The catalog, the workflow engine, the data manager and the transition
//! executor are owned outside this crate. Calls through these traits are
//! treated as blocking and are never held across requests.

use crate::models::{Transition, Value};
use crate::query::Query;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Lightweight catalog summary of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Entity identifier.
    pub uid: String,
    /// Short id within the parent container.
    pub id: String,
    /// Entity title.
    #[serde(default)]
    pub title: String,
    /// Entity type tag.
    pub entity_type: String,
    /// Workflow state at indexing time.
    #[serde(default)]
    pub review_state: Option<String>,
    /// Physical path.
    pub path: String,
    /// Precomputed metadata columns.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl IndexRecord {
    /// Reads a metadata column, falling back to the identity fields.
    ///
    /// # Arguments
    ///
    /// * `name` - Metadata column or identity field name
    ///
    /// # Returns
    ///
    /// The value if the record carries it.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.metadata.get(name) {
            return Some(value.clone());
        }
        match name {
            "uid" | "UID" => Some(Value::from(self.uid.as_str())),
            "id" | "getId" => Some(Value::from(self.id.as_str())),
            "title" | "Title" => Some(Value::from(self.title.as_str())),
            "entity_type" | "portal_type" => Some(Value::from(self.entity_type.as_str())),
            "review_state" => self.review_state.as_deref().map(Value::from),
            "path" => Some(Value::from(self.path.as_str())),
            _ => None,
        }
    }
}

/// A fully materialized entity.
pub trait Entity: Send + Sync + fmt::Debug {
    /// Returns the entity UID.
    fn uid(&self) -> &str;

    /// Returns the physical path of the entity.
    fn path(&self) -> &str;

    /// Returns the entity type tag.
    fn entity_type(&self) -> &str;

    /// Reads an attribute or evaluates a computed accessor by name.
    fn attribute(&self, name: &str) -> Option<Value>;
}

/// Evaluates a dotted accessor path against an entity.
///
/// The first segment is read from the entity; later segments index into
/// nested mappings. Unresolvable paths yield `None`.
#[must_use]
pub fn resolve_path(entity: &dyn Entity, path: &str) -> Option<Value> {
    let mut segments = path.split('.').filter(|segment| !segment.is_empty());
    let first = segments.next()?;
    let mut value = entity.attribute(first)?;
    for segment in segments {
        value = value.get(segment)?.clone();
    }
    Some(value)
}

/// The entity store, consumed as an opaque query to result-set function.
pub trait Catalog: Send + Sync {
    /// Executes a query and returns matching records in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot answer the query.
    fn search(&self, query: &Query) -> Result<Vec<IndexRecord>>;

    /// Returns the names of all registered indexes.
    fn indexes(&self) -> Vec<String>;

    /// Checks whether an index supports ordered lookups.
    fn supports_sorting(&self, index: &str) -> bool;

    /// Returns the declared metadata column names.
    fn metadata_columns(&self) -> Vec<String>;

    /// Checks whether the full-text wildcard index exists.
    fn has_text_index(&self) -> bool {
        self.indexes()
            .iter()
            .any(|index| index == crate::models::SEARCHABLE_TEXT_INDEX)
    }

    /// Looks up an entity by UID.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails. A missing entity is
    /// `Ok(None)`.
    fn object_by_uid(&self, uid: &str) -> Result<Option<Arc<dyn Entity>>>;

    /// Materializes the entity behind a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn wake(&self, record: &IndexRecord) -> Result<Option<Arc<dyn Entity>>> {
        self.object_by_uid(&record.uid)
    }
}

/// The workflow engine that decides per-entity legality.
pub trait Workflow: Send + Sync {
    /// Returns the transitions currently legal for the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the workflow engine fails for this entity.
    fn transitions_for(&self, entity: &dyn Entity) -> Result<Vec<Transition>>;

    /// Returns the current workflow state of the entity.
    fn review_state_of(&self, entity: &dyn Entity) -> Option<String>;

    /// Returns the translated title of a state for an entity type.
    ///
    /// # Errors
    ///
    /// Returns an error if the title lookup fails.
    fn state_title(&self, state: &str, entity_type: &str) -> Result<String>;
}

/// Field writer used by bulk edits.
pub trait DataManager: Send + Sync {
    /// Writes a field value.
    ///
    /// # Returns
    ///
    /// UIDs of all entities changed by the write (dependents included). An
    /// entity without a data manager yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_field(&self, entity: &dyn Entity, name: &str, value: &Value) -> Result<Vec<String>>;
}

/// Failure reported by the collaborator executing a transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionFailure {
    /// The workflow refused the transition for a business reason.
    #[error("Transition rejected: {0}")]
    Rejected(String),
    /// Optimistic-concurrency conflict in the underlying store.
    #[error("Database conflict")]
    Conflict,
    /// Anything else.
    #[error("{0}")]
    Unexpected(String),
}

/// Collaborator executing workflow transitions.
pub trait TransitionExecutor: Send + Sync {
    /// Executes one transition on one entity.
    ///
    /// # Errors
    ///
    /// Returns the classified failure.
    fn do_transition(
        &self,
        entity: &dyn Entity,
        transition: &str,
    ) -> std::result::Result<(), TransitionFailure>;
}
