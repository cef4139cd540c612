// Rust guideline compliant 2026-02-06

//! Catalog search with full-text and metadata-scan strategies.
//!
//! A search term is either delegated to the catalog's wildcard text index
//! or, when the catalog has none, matched in process against the textual
//! form of every metadata column of every result.

use crate::config::EngineConfig;
use crate::context::RequestContext;
use crate::identity::is_uid;
use crate::models::Value;
use crate::ports::{Catalog, IndexRecord, Workflow};
use crate::query::{BuiltQuery, Query};
use crate::sort::ManualSort;
use crate::Result;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Characters stripped from both ends of a search term.
pub const UNSAFE_TERM_CHARS: &[char] = &[
    '*', '.', '!', '$', '%', '&', '/', '(', ')', '=', '-', '+', ':', '\'', '`', '´', '^',
];

/// Result count above which metadata matching runs in parallel.
pub const PARALLEL_THRESHOLD: usize = 1000;

/// Trims whitespace and catalog-unsafe characters from a search term.
#[must_use]
pub fn sanitize_term(raw: &str) -> String {
    raw.trim().trim_matches(UNSAFE_TERM_CHARS).to_string()
}

/// Builds the wildcard expression for the full-text index.
///
/// Double quotes are removed, the term is wrapped in `*`.
#[must_use]
pub fn wildcard_term(term: &str) -> String {
    let unquoted: String = term.chars().filter(|c| *c != '"').collect();
    format!("*{unquoted}*")
}

/// Compiles a case-insensitive matcher for a term.
///
/// Terms that are not valid regular expressions are matched literally.
#[must_use]
pub fn term_regex(term: &str) -> Option<Regex> {
    match RegexBuilder::new(term).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(term = %term, error = %err, "invalid search pattern, matching literally");
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .ok()
        }
    }
}

/// Output of a search.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Matching records in final order.
    pub records: Vec<IndexRecord>,
    /// Render hint: expand all categories because a search is active.
    pub expand_all_categories: bool,
    /// Wall time spent in the search.
    pub elapsed: Duration,
}

/// Executes built queries against the catalog.
pub struct SearchExecutor<'a> {
    catalog: &'a dyn Catalog,
    workflow: &'a dyn Workflow,
    config: &'a EngineConfig,
}

impl<'a> SearchExecutor<'a> {
    /// Creates an executor.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog to search
    /// * `workflow` - Workflow used to translate state values
    /// * `config` - Engine configuration (date format, instance fallback)
    pub fn new(
        catalog: &'a dyn Catalog,
        workflow: &'a dyn Workflow,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            catalog,
            workflow,
            config,
        }
    }

    /// Runs a query with an optional search term.
    ///
    /// # Arguments
    ///
    /// * `built` - Query and sort flags from the query builder
    /// * `raw_term` - User search term, sanitized before use
    /// * `context` - Request context carrying the deadline
    ///
    /// # Returns
    ///
    /// The matching records, manually sorted when the query requires it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fails or the deadline expires.
    pub fn search(
        &self,
        built: &BuiltQuery,
        raw_term: &str,
        context: &RequestContext,
    ) -> Result<SearchOutcome> {
        let started = Instant::now();
        let term = sanitize_term(raw_term);
        let mut expand_all_categories = false;

        let mut records = if term.is_empty() {
            self.run(&built.query, context)?
        } else if self.catalog.has_text_index() {
            expand_all_categories = true;
            let mut query = built.query.clone();
            query.searchable_text = Some(wildcard_term(&term));
            self.run(&query, context)?
        } else {
            expand_all_categories = true;
            let candidates = self.run(&built.query, context)?;
            self.metadata_search(candidates, &term)
        };

        if let Some(key) = built.manual_sort_on.as_deref() {
            records = ManualSort::new(self.catalog, self.config.instance_fallback).sort(
                records,
                key,
                built.sort_order,
            );
        }

        let elapsed = started.elapsed();
        info!(
            term = %term,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            matches = records.len(),
            "search executed"
        );

        Ok(SearchOutcome {
            records,
            expand_all_categories,
            elapsed,
        })
    }

    fn run(&self, query: &Query, context: &RequestContext) -> Result<Vec<IndexRecord>> {
        context.check()?;
        let records = self.catalog.search(query)?;
        context.check()?;
        Ok(records)
    }

    /// Keeps records whose metadata text matches the term.
    fn metadata_search(&self, records: Vec<IndexRecord>, term: &str) -> Vec<IndexRecord> {
        let Some(regex) = term_regex(term) else {
            return Vec::new();
        };

        if records.len() >= PARALLEL_THRESHOLD {
            records
                .into_par_iter()
                .filter(|record| self.record_matches(record, &regex))
                .collect()
        } else {
            records
                .into_iter()
                .filter(|record| self.record_matches(record, &regex))
                .collect()
        }
    }

    fn record_matches(&self, record: &IndexRecord, regex: &Regex) -> bool {
        record.metadata.iter().any(|(key, value)| {
            let text = self.searchable_text(&record.entity_type, key, value);
            !text.is_empty() && regex.is_match(&text)
        })
    }

    /// Converts a metadata value to the text matched by searches.
    ///
    /// Blank values, booleans and identifiers yield an empty string.
    /// Sequences and mappings contribute their first element. Dates use the
    /// long date format. Keys naming a state are translated to the state
    /// title.
    ///
    /// # Arguments
    ///
    /// * `entity_type` - Type of the record, used for state titles
    /// * `key` - Metadata column name
    /// * `value` - Raw metadata value
    #[must_use]
    pub fn searchable_text(&self, entity_type: &str, key: &str, value: &Value) -> String {
        if value.is_blank() {
            return String::new();
        }
        match value {
            Value::Bool(_) => String::new(),
            Value::Text(text) if is_uid(text) => String::new(),
            Value::List(items) => items
                .first()
                .map(|item| self.searchable_text(entity_type, key, item))
                .unwrap_or_default(),
            Value::Map(entries) => entries
                .iter()
                .next()
                .map(|(inner_key, item)| self.searchable_text(entity_type, inner_key, item))
                .unwrap_or_default(),
            Value::Date(date) => {
                let mut text = String::new();
                let formatted = date.instant().format(&self.config.date_format_long);
                if write!(text, "{formatted}").is_err() {
                    return date.as_str().to_string();
                }
                text
            }
            other if key.to_lowercase().contains("state") => {
                let state = other.to_string();
                match self.workflow.state_title(&state, entity_type) {
                    Ok(title) => title,
                    Err(err) => {
                        warn!(state = %state, error = %err, "state title lookup failed");
                        state
                    }
                }
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_unsafe_edges() {
        assert_eq!(sanitize_term("  *wat!  "), "wat");
        assert_eq!(sanitize_term("H2-O"), "H2-O");
        assert_eq!(sanitize_term("()"), "");
    }

    #[test]
    fn test_wildcard_removes_double_quotes_only() {
        assert_eq!(wildcard_term("\"water\""), "*water*");
        assert_eq!(wildcard_term("o'brien"), "*o'brien*");
    }

    #[test]
    fn test_invalid_pattern_matches_literally() {
        let regex = term_regex("a[b").unwrap();
        assert!(regex.is_match("xA[Bx"));
    }
}
