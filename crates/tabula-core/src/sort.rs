// Rust guideline compliant 2026-02-06

//! Manual sorting of catalog results.
//!
//! Used when the requested sort key is not backed by an ordered catalog
//! index. Keys missing from the catalog metadata can only be read from the
//! materialized entities, which is expensive; prefer index-backed sorts.

use crate::models::{SortDirection, Value};
use crate::ports::{Catalog, IndexRecord};
use tracing::warn;

/// Sorts records in memory by a metadata column or entity attribute.
pub struct ManualSort<'a> {
    catalog: &'a dyn Catalog,
    instance_fallback: bool,
}

impl<'a> ManualSort<'a> {
    /// Creates a manual sorter.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog providing metadata columns and entity wakeup
    /// * `instance_fallback` - Whether entities may be materialized for keys
    ///   missing from the metadata
    pub fn new(catalog: &'a dyn Catalog, instance_fallback: bool) -> Self {
        Self {
            catalog,
            instance_fallback,
        }
    }

    /// Sorts records by `key`.
    ///
    /// Ties keep their catalog order in both directions. Without instance
    /// fallback, a key missing from the metadata leaves the input unsorted.
    ///
    /// # Arguments
    ///
    /// * `records` - Records in catalog order
    /// * `key` - Metadata column or attribute name
    /// * `direction` - Sort direction
    ///
    /// # Returns
    ///
    /// The sorted records.
    pub fn sort(
        &self,
        records: Vec<IndexRecord>,
        key: &str,
        direction: SortDirection,
    ) -> Vec<IndexRecord> {
        let wakeup = !self
            .catalog
            .metadata_columns()
            .iter()
            .any(|column| column == key);

        if wakeup {
            warn!(sort_on = %key, "sort key not in metadata columns");
            if !self.instance_fallback {
                return records;
            }
            warn!(count = records.len(), "waking up objects for manual sort");
        }
        warn!(
            sort_on = %key,
            "manual sorting; consider adding a catalog index for this key"
        );

        let keys: Vec<Value> = records
            .iter()
            .map(|record| self.sort_value(record, key, wakeup))
            .collect();

        let mut order: Vec<usize> = (0..records.len()).collect();
        match direction {
            SortDirection::Ascending => {
                order.sort_by(|a, b| keys[*a].compare(&keys[*b]));
            }
            SortDirection::Descending => {
                // Reverse, stable-sort, reverse: descending with ties in input order.
                order.reverse();
                order.sort_by(|a, b| keys[*a].compare(&keys[*b]));
                order.reverse();
            }
        }

        let mut slots: Vec<Option<IndexRecord>> = records.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect()
    }

    fn sort_value(&self, record: &IndexRecord, key: &str, wakeup: bool) -> Value {
        let value = if wakeup {
            match self.catalog.wake(record) {
                Ok(Some(entity)) => entity.attribute(key),
                Ok(None) => None,
                Err(err) => {
                    warn!(uid = %record.uid, error = %err, "failed to wake object for sorting");
                    None
                }
            }
        } else {
            record.attribute(key)
        };
        value.unwrap_or_else(|| Value::Text(String::new()))
    }
}
