//! Leveled output channel supplied by the host.

use parking_lot::Mutex;

/// Severity understood by the host logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	/// Very chatty detail, usually filtered out.
	Verbose,
	Debug,
	/// Informational notice shown in the main log.
	Notification,
	Warning,
	Error,
}

impl From<Severity> for tracing::Level {
	fn from(severity: Severity) -> Self {
		match severity {
			Severity::Verbose => tracing::Level::TRACE,
			Severity::Debug => tracing::Level::DEBUG,
			Severity::Notification => tracing::Level::INFO,
			Severity::Warning => tracing::Level::WARN,
			Severity::Error => tracing::Level::ERROR,
		}
	}
}

/// Host logging sink. Every diagnostic write ends up here.
pub trait LogSink: Send + Sync {
	fn log(&self, severity: Severity, message: &str);
}

/// Sink that forwards to `tracing` under the `hookwatch` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
	fn log(&self, severity: Severity, message: &str) {
		match severity {
			Severity::Verbose => tracing::trace!(target: "hookwatch", "{message}"),
			Severity::Debug => tracing::debug!(target: "hookwatch", "{message}"),
			Severity::Notification => tracing::info!(target: "hookwatch", "{message}"),
			Severity::Warning => tracing::warn!(target: "hookwatch", "{message}"),
			Severity::Error => tracing::error!(target: "hookwatch", "{message}"),
		}
	}
}

/// Sink that keeps everything it receives, for tests and host-side capture.
#[derive(Debug, Default)]
pub struct MemorySink {
	records: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	/// All records in arrival order.
	pub fn records(&self) -> Vec<(Severity, String)> {
		self.records.lock().clone()
	}

	/// Messages logged at exactly `severity`.
	pub fn messages_at(&self, severity: Severity) -> Vec<String> {
		self.records.lock().iter().filter(|(s, _)| *s == severity).map(|(_, m)| m.clone()).collect()
	}

	/// Whether any message contains `needle`.
	pub fn contains(&self, needle: &str) -> bool {
		self.records.lock().iter().any(|(_, m)| m.contains(needle))
	}

	pub fn clear(&self) {
		self.records.lock().clear();
	}
}

impl LogSink for MemorySink {
	fn log(&self, severity: Severity, message: &str) {
		self.records.lock().push((severity, message.to_string()));
	}
}
