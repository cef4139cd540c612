// Rust guideline compliant 2026-02-06

//! Result windowing.

/// One page of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window<T> {
    /// Records inside the window.
    pub records: Vec<T>,
    /// Result count before windowing.
    pub total: usize,
    /// Whether results exist past the window.
    pub show_more: bool,
}

/// Cuts `[offset, offset + page_size)` out of a result set.
///
/// # Arguments
///
/// * `records` - Full filtered and sorted results
/// * `offset` - Index of the first record
/// * `page_size` - Maximum records in the window
///
/// # Returns
///
/// The clipped window, the total count and the show-more flag.
#[must_use]
pub fn window<T>(records: Vec<T>, offset: usize, page_size: usize) -> Window<T> {
    let total = records.len();
    let end = offset.saturating_add(page_size);
    let show_more = total > end;
    let records = if offset >= total {
        Vec::new()
    } else {
        records
            .into_iter()
            .skip(offset)
            .take(page_size)
            .collect()
    };

    Window {
        records,
        total,
        show_more,
    }
}
