//! Thread-safe bounded session log.
//!
//! Entries are stored pre-formatted as `[HH:MM:SS.mmm] [Category] message`.
//! Order is append order as observed under the lock, not timestamp order:
//! two threads racing to append may land with out-of-order timestamps.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::LogCategory;
use crate::summary::{RECENT_ERROR_LIMIT, SessionSummary};

/// Maximum number of entries retained by default.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Number of oldest entries dropped at once when the log overflows.
pub const DEFAULT_EVICTION_BATCH: usize = 200;

/// Capacity and batch size for overflow eviction.
///
/// Eviction drops a whole batch at once rather than one entry per append so
/// a log running at capacity does not pay a front-removal on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
	pub capacity: usize,
	pub batch: usize,
}

impl EvictionPolicy {
	/// Builds a policy with `1 <= batch <= capacity`.
	///
	/// A batch larger than the capacity would evict the entry that caused the
	/// overflow, so it is clamped down.
	pub fn new(capacity: usize, batch: usize) -> Self {
		let capacity = capacity.max(1);
		Self {
			capacity,
			batch: batch.clamp(1, capacity),
		}
	}
}

impl Default for EvictionPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY, DEFAULT_EVICTION_BATCH)
	}
}

/// One structured log record, before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLogEntry {
	pub timestamp: DateTime<Local>,
	pub category: LogCategory,
	pub message: String,
}

impl SessionLogEntry {
	pub fn now(category: LogCategory, message: impl Into<String>) -> Self {
		Self {
			timestamp: Local::now(),
			category,
			message: message.into(),
		}
	}

	/// Renders the entry; the category is always the second bracketed token.
	pub fn format(&self) -> String {
		format!("[{}] [{}] {}", self.timestamp.format("%H:%M:%S%.3f"), self.category, self.message)
	}
}

/// Returns the bracketed category tag of a formatted entry.
///
/// Parsing is purely lexical: the first bracketed token is the timestamp and
/// the second is the category. Lines that do not follow the layout yield
/// `None`.
pub fn category_tag(line: &str) -> Option<&str> {
	bracketed_tokens(line).nth(1)
}

fn bracketed_tokens(line: &str) -> impl Iterator<Item = &str> {
	let mut rest = line;
	std::iter::from_fn(move || {
		let open = rest.find('[')?;
		let close = open + 1 + rest[open + 1..].find(']')?;
		let token = &rest[open + 1..close];
		rest = &rest[close + 1..];
		Some(token)
	})
}

#[derive(Debug, Default)]
struct LogState {
	entries: VecDeque<String>,
	appended_total: u64,
	evicted_total: u64,
}

/// Bounded, append-only (except for eviction) diagnostic history.
#[derive(Debug)]
pub struct SessionLog {
	policy: EvictionPolicy,
	state: RwLock<LogState>,
}

impl SessionLog {
	pub fn new(policy: EvictionPolicy) -> Self {
		Self {
			policy,
			state: RwLock::new(LogState {
				entries: VecDeque::with_capacity(policy.capacity + 1),
				..LogState::default()
			}),
		}
	}

	pub fn policy(&self) -> EvictionPolicy {
		self.policy
	}

	/// Formats and appends an entry timestamped now.
	pub fn append(&self, category: LogCategory, message: impl Into<String>) {
		self.push(SessionLogEntry::now(category, message).format());
	}

	/// Appends an already formatted line, evicting a batch on overflow.
	///
	/// Append and eviction happen under one write lock, so readers never
	/// observe more than `capacity` entries.
	pub fn push(&self, line: String) {
		let mut state = self.state.write();
		state.entries.push_back(line);
		state.appended_total += 1;
		let len = state.entries.len();
		if len > self.policy.capacity {
			let evict = self.policy.batch.min(self.policy.capacity).max(len - self.policy.capacity);
			state.entries.drain(..evict);
			state.evicted_total += evict as u64;
		}
	}

	/// Snapshot of all retained entries, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.state.read().entries.iter().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.state.read().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.read().entries.is_empty()
	}

	/// Total entries ever appended, including evicted ones.
	pub fn appended_total(&self) -> u64 {
		self.state.read().appended_total
	}

	/// Total entries dropped by eviction.
	pub fn evicted_total(&self) -> u64 {
		self.state.read().evicted_total
	}

	pub fn clear(&self) {
		*self.state.write() = LogState::default();
	}

	/// Groups retained entries by category tag and collects recent errors.
	pub fn summarize(&self) -> SessionSummary {
		let state = self.state.read();
		let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
		let runtime_error: &'static str = LogCategory::RuntimeError.into();
		let mut errors: VecDeque<&str> = VecDeque::with_capacity(RECENT_ERROR_LIMIT + 1);

		for line in &state.entries {
			let tag = category_tag(line).unwrap_or("Unknown");
			*counts.entry(tag).or_default() += 1;
			if tag == runtime_error {
				errors.push_back(line);
				if errors.len() > RECENT_ERROR_LIMIT {
					errors.pop_front();
				}
			}
		}

		let mut per_category: Vec<(String, usize)> = counts.into_iter().map(|(tag, n)| (tag.to_string(), n)).collect();
		per_category.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

		SessionSummary {
			total: state.entries.len(),
			per_category,
			recent_errors: errors.into_iter().map(str::to_string).collect(),
		}
	}
}

impl Default for SessionLog {
	fn default() -> Self {
		Self::new(EvictionPolicy::default())
	}
}
