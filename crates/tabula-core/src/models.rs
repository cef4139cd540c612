// Rust guideline compliant 2026-02-06

//! Core data models for Tabula listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of the catalog index holding entity identifiers.
pub const UID_INDEX: &str = "UID";

/// Name of the catalog index holding physical paths.
pub const PATH_INDEX: &str = "path";

/// Name of the optional full-text index used for wildcard searches.
pub const SEARCHABLE_TEXT_INDEX: &str = "listing_searchable_text";

/// A point in time that keeps the text it was read from.
///
/// Serializes back to exactly that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    instant: DateTime<Utc>,
    text: String,
}

impl Timestamp {
    /// Returns the parsed instant in UTC.
    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Returns the original text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TryFrom<String> for Timestamp {
    type Error = chrono::ParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let instant = DateTime::parse_from_rfc3339(&text)?.with_timezone(&Utc);
        Ok(Self { instant, text })
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.text
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            text: instant.to_rfc3339(),
        }
    }
}

/// A metadata or attribute value carried by index records and rows.
///
/// Strings that parse as RFC 3339 timestamps deserialize as [`Value::Date`]
/// and keep their original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Missing or null value.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Point in time.
    Date(Timestamp),
    /// Text value.
    Text(String),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Mapping of names to values.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns true for values that carry no information: null, false, zero,
    /// empty text and empty collections.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(flag) => !flag,
            Value::Int(number) => *number == 0,
            Value::Float(number) => *number == 0.0,
            Value::Date(_) => false,
            Value::Text(text) => text.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
        }
    }

    /// Returns the text content if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Looks up a nested value by key if this is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Date(_) => 3,
            Value::Text(_) => 4,
            Value::List(_) => 5,
            Value::Map(_) => 6,
        }
    }

    /// Total ordering used by manual sorting.
    ///
    /// Values of the same kind compare naturally; numbers compare across
    /// integer and float; different kinds order by a fixed kind rank.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Date(a), Value::Date(b)) => a
                .instant()
                .cmp(&b.instant())
                .then_with(|| a.as_str().cmp(b.as_str())),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    let ordering = left.compare(right);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => {
                for ((left_key, left), (right_key, right)) in a.iter().zip(b.iter()) {
                    let ordering = left_key.cmp(right_key).then_with(|| left.compare(right));
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Int(number) => write!(f, "{number}"),
            Value::Float(number) => write!(f, "{number}"),
            Value::Date(date) => f.write_str(date.as_str()),
            Value::Text(text) => f.write_str(text),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(", "))
            }
            Value::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(Timestamp::from(value))
    }
}

/// Path criteria restricting results to a subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathCriteria {
    /// Physical path of the subtree root.
    pub query: String,
    /// Depth below the root; `None` matches the whole subtree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

/// A single filter criterion of a catalog query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Criteria {
    /// Subtree restriction.
    Path(PathCriteria),
    /// Matches when the indexed value equals any of the listed values.
    AnyOf(Vec<Value>),
    /// Matches when the indexed value equals this value.
    Exact(Value),
}

impl Criteria {
    /// Builds an any-of criterion from identifiers.
    #[must_use]
    pub fn uids<I, S>(uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criteria::AnyOf(uids.into_iter().map(|uid| Value::Text(uid.into())).collect())
    }

    /// Checks whether a value satisfies this criterion.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Criteria::Path(path) => value
                .as_str()
                .is_some_and(|candidate| path_matches(candidate, path)),
            Criteria::AnyOf(options) => options.iter().any(|option| option == value),
            Criteria::Exact(expected) => match value {
                Value::List(items) => items.iter().any(|item| item == expected),
                other => other == expected,
            },
        }
    }
}

fn path_matches(candidate: &str, criteria: &PathCriteria) -> bool {
    let root = criteria.query.trim_end_matches('/');
    let Some(rest) = candidate.strip_prefix(root) else {
        return false;
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        return false;
    }
    let depth = rest.split('/').filter(|segment| !segment.is_empty()).count();
    match criteria.depth {
        Some(expected) => depth == expected,
        None => true,
    }
}

/// Sort direction for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest values first.
    Ascending,
    /// Largest values first.
    #[default]
    Descending,
}

impl SortDirection {
    /// Parses a direction, accepting only `ascending` and `descending`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ascending" => Some(SortDirection::Ascending),
            "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// A candidate state-change action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Unique transition identifier.
    pub id: String,
    /// Human-readable button label.
    #[serde(alias = "title", default)]
    pub label: String,
    /// Explicit ordering weight, lower sorts first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl Transition {
    /// Creates a transition without an explicit weight.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            weight: None,
        }
    }

    /// Sets an explicit weight.
    #[must_use]
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// A hyperlink replacing a plain column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Visible label.
    pub label: String,
    /// Absolute target URL.
    pub url: String,
}

/// Column configuration of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Unique column identifier.
    pub id: String,
    /// Column header title.
    #[serde(default)]
    pub title: String,
    /// Catalog index able to sort this column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Dotted attribute path evaluated against the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessor_path: Option<String>,
    /// Whether the column may be sorted on.
    #[serde(default = "default_sortable")]
    pub sortable: bool,
    /// Dotted attribute path resolving to a link target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_template_path: Option<String>,
}

fn default_sortable() -> bool {
    true
}

impl ColumnSpec {
    /// Creates a sortable column without index or accessor.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            index_name: None,
            accessor_path: None,
            sortable: true,
            link_template_path: None,
        }
    }

    /// Sets the sort index.
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index_name = Some(index.into());
        self
    }

    /// Sets the accessor path.
    #[must_use]
    pub fn with_accessor(mut self, path: impl Into<String>) -> Self {
        self.accessor_path = Some(path.into());
        self
    }

    /// Sets the link target path.
    #[must_use]
    pub fn with_link(mut self, path: impl Into<String>) -> Self {
        self.link_template_path = Some(path.into());
        self
    }
}

/// A named view preset with its own filter and transition restrictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Unique review-state identifier.
    pub id: String,
    /// Button title.
    #[serde(default)]
    pub title: String,
    /// Filter merged on top of the base filter.
    #[serde(default)]
    pub extra_filter: BTreeMap<String, Criteria>,
    /// Transitions allowed in this view; empty means unrestricted.
    #[serde(default)]
    pub allowed_transition_ids: BTreeSet<String>,
    /// Transitions always offered in this view.
    #[serde(default)]
    pub custom_transitions: Vec<Transition>,
    /// Visible columns, in render order.
    #[serde(default)]
    pub visible_column_ids: Vec<String>,
}

impl ReviewState {
    /// Creates an unrestricted review state.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra_filter: BTreeMap::new(),
            allowed_transition_ids: BTreeSet::new(),
            custom_transitions: Vec::new(),
            visible_column_ids: Vec::new(),
        }
    }
}

/// Request-scoped listing filter state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    /// Requested review-state id.
    pub review_state_id: Option<String>,
    /// Base content filter.
    pub base_filter: BTreeMap<String, Criteria>,
    /// Raw user search term.
    pub search_term: String,
    /// Requested sort key (column id or index name).
    pub sort_key: Option<String>,
    /// Requested sort direction.
    pub sort_direction: Option<SortDirection>,
    /// Offset of the first row.
    pub offset: usize,
    /// Maximum number of rows to return.
    pub page_size: usize,
}

/// A rendered listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Row {
    /// Entity identifier.
    pub uid: String,
    /// Absolute entity URL.
    pub url: String,
    /// Short entity id.
    pub id: String,
    /// Entity title.
    pub title: String,
    /// Entity type tag.
    pub entity_type: String,
    /// Workflow state id.
    pub state_id: String,
    /// Translated workflow state title.
    pub state_title: String,
    /// CSS-ready state class.
    pub state_class: String,
    /// Resolved column values keyed by column id.
    #[serde(default)]
    pub columns: BTreeMap<String, Value>,
    /// Link replacements keyed by column id.
    #[serde(default)]
    pub links: BTreeMap<String, Link>,
    /// Names of fields editable on this row.
    #[serde(default)]
    pub editable_fields: BTreeSet<String>,
    /// Whether the row is preselected.
    #[serde(default)]
    pub selected: bool,
    /// Parent uid for child rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Additional fields set by hooks and adapters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Row {
    /// Reads a field directly present on the row.
    ///
    /// Identity fields come first, then resolved columns, then extra fields.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<Value> {
        let identity = match key {
            "uid" => Some(&self.uid),
            "url" => Some(&self.url),
            "id" => Some(&self.id),
            "title" => Some(&self.title),
            "entity_type" | "portal_type" => Some(&self.entity_type),
            "state_id" | "review_state" => Some(&self.state_id),
            "state_title" => Some(&self.state_title),
            "state_class" => Some(&self.state_class),
            _ => None,
        };
        if let Some(text) = identity {
            return Some(Value::Text(text.clone()));
        }
        self.columns
            .get(key)
            .or_else(|| self.extra.get(key))
            .cloned()
    }
}
