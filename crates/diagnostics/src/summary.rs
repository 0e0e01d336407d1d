//! Session summary produced from the retained log.

use crate::LogCategory;

/// Maximum number of error lines surfaced by a summary.
pub const RECENT_ERROR_LIMIT: usize = 5;

/// Per-category counts plus the most recent runtime errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
	/// Number of retained entries.
	pub total: usize,
	/// `(tag, count)` sorted by descending count, ties by tag.
	pub per_category: Vec<(String, usize)>,
	/// Up to [`RECENT_ERROR_LIMIT`] RuntimeError lines, oldest first.
	pub recent_errors: Vec<String>,
}

impl SessionSummary {
	/// Count for one category, zero when absent.
	pub fn count(&self, category: LogCategory) -> usize {
		let tag: &'static str = category.into();
		self.per_category.iter().find(|(t, _)| t == tag).map_or(0, |(_, n)| *n)
	}
}
