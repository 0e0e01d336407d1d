//! Diagnostic channel shared by every hookwatch component.
//!
//! [`Diagnostics`] is the process-scoped handle: it owns the bounded
//! [`SessionLog`], holds the host-supplied [`LogSink`] once initialized, and
//! provides [`Diagnostics::protect`], the fail-safe wrapper every hook body
//! and reflective read runs under.
//!
//! # Lifecycle
//!
//! A fresh handle is inert. Until [`Diagnostics::initialize`] installs a sink,
//! every logging call is a no-op and [`Diagnostics::protect`] still runs and
//! guards its operation but records nothing. [`Diagnostics::shutdown`] drops
//! the sink and clears the session.
//!
//! # Failure discipline
//!
//! Nothing here returns an error to the caller. Failures inside a protected
//! operation become one `RuntimeError` entry each; failures while logging
//! (a panicking sink, for instance) are discarded silently.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod category;
pub mod guard;
pub mod session;
pub mod sink;
pub mod summary;

use std::fmt;
use std::sync::Arc;

pub use category::LogCategory;
pub use guard::{Fault, Guarded, in_guard, run_guarded, run_silently};
use parking_lot::RwLock;
pub use session::{DEFAULT_CAPACITY, DEFAULT_EVICTION_BATCH, EvictionPolicy, SessionLog, SessionLogEntry, category_tag};
pub use sink::{LogSink, MemorySink, Severity, TracingSink};
pub use summary::{RECENT_ERROR_LIMIT, SessionSummary};

/// Prefix used when no tag is configured.
pub const DEFAULT_TAG: &str = "[BlessedClasses]";

/// Process-scoped diagnostic state.
pub struct Diagnostics {
	tag: String,
	sink: RwLock<Option<Arc<dyn LogSink>>>,
	session: SessionLog,
}

impl fmt::Debug for Diagnostics {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Diagnostics")
			.field("tag", &self.tag)
			.field("initialized", &self.is_initialized())
			.field("entries", &self.session.len())
			.finish()
	}
}

impl Diagnostics {
	/// Creates an uninitialized handle.
	pub fn new(tag: impl Into<String>, policy: EvictionPolicy) -> Self {
		Self {
			tag: tag.into(),
			sink: RwLock::new(None),
			session: SessionLog::new(policy),
		}
	}

	/// Installs the host sink and opens the session.
	///
	/// Returns `false` (and changes nothing) if already initialized.
	pub fn initialize(&self, sink: Arc<dyn LogSink>) -> bool {
		{
			let mut slot = self.sink.write();
			if slot.is_some() {
				return false;
			}
			*slot = Some(sink);
		}
		self.notify("Diagnostic logging system initialized");
		self.record(LogCategory::ModCompatibility, "Session started");
		true
	}

	pub fn is_initialized(&self) -> bool {
		self.sink.read().is_some()
	}

	/// Drops the sink and clears the session log.
	pub fn shutdown(&self) {
		self.sink.write().take();
		self.session.clear();
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub fn session(&self) -> &SessionLog {
		&self.session
	}

	fn current_sink(&self) -> Option<Arc<dyn LogSink>> {
		self.sink.read().clone()
	}

	/// Writes one tagged line to the host sink.
	pub fn emit(&self, severity: Severity, message: impl fmt::Display) {
		let Some(sink) = self.current_sink() else {
			return;
		};
		run_silently(|| sink.log(severity, &format!("{} {message}", self.tag)));
	}

	pub fn verbose(&self, message: impl fmt::Display) {
		self.emit(Severity::Verbose, message);
	}

	pub fn debug(&self, message: impl fmt::Display) {
		self.emit(Severity::Debug, message);
	}

	pub fn notify(&self, message: impl fmt::Display) {
		self.emit(Severity::Notification, message);
	}

	pub fn warn(&self, message: impl fmt::Display) {
		self.emit(Severity::Warning, message);
	}

	pub fn error(&self, message: impl fmt::Display) {
		self.emit(Severity::Error, message);
	}

	/// Appends a session entry without writing to the sink.
	pub fn record(&self, category: LogCategory, message: impl Into<String>) {
		if !self.is_initialized() {
			return;
		}
		let message = message.into();
		run_silently(|| self.session.append(category, message));
	}

	/// Debug line plus a session entry.
	pub fn log(&self, category: LogCategory, message: impl fmt::Display) {
		let message = message.to_string();
		self.debug(format_args!("[{category}] {message}"));
		self.record(category, message);
	}

	/// Warning line plus a `WARNING:` session entry.
	pub fn log_warning(&self, category: LogCategory, message: impl fmt::Display) {
		let message = message.to_string();
		self.warn(format_args!("[{category}] {message}"));
		self.record(category, format!("WARNING: {message}"));
	}

	/// Error line plus an `ERROR:` session entry carrying the cause text.
	pub fn log_error(&self, category: LogCategory, message: impl fmt::Display, cause: Option<&dyn fmt::Display>) {
		let message = message.to_string();
		self.error(format_args!("[{category}] {message}"));
		match cause {
			Some(cause) => {
				self.error(format_args!("Cause: {cause}"));
				self.record(category, format!("ERROR: {message} | {cause}"));
			}
			None => self.record(category, format!("ERROR: {message}")),
		}
	}

	/// Runs `op` under the fail-safe guard.
	///
	/// A failure is reported once as a `RuntimeError` entry naming `context`
	/// and then discarded.
	pub fn protect<T, E, F>(&self, context: &str, op: F) -> Guarded<T>
	where
		E: fmt::Display,
		F: FnOnce() -> Result<T, E>,
	{
		match run_guarded(op) {
			Ok(value) => Guarded::Completed(value),
			Err(fault) => {
				self.record_fault(context, &fault);
				Guarded::Swallowed(fault)
			}
		}
	}

	/// Reports a swallowed failure.
	///
	/// The sink and the session log are the host-visible channels; the
	/// `guard.swallowed` event only reaches in-process `tracing` subscribers.
	pub fn record_fault(&self, context: &str, fault: &Fault) {
		tracing::debug!(context, %fault, "guard.swallowed");
		self.error(format_args!("{context}: {fault}"));
		self.record(LogCategory::RuntimeError, format!("{context}: {fault}"));
	}

	pub fn log_class_migration(&self, subject: &str, from: &str, to: &str) {
		self.notify(format_args!("Migrated '{subject}' from legacy class '{from}' to '{to}'"));
		self.record(LogCategory::CharacterSystem, format!("MIGRATION: {subject} | {from} -> {to}"));
	}

	/// Audit trail for manual class changes issued through the host's command surface.
	pub fn log_class_change_attempt(&self, class: &str, subject: &str) {
		self.notify(format_args!("class change attempt by '{subject}' for class '{class}'"));
		self.record(LogCategory::CharacterSystem, format!("{subject} attempting class change to {class}"));
	}

	pub fn log_class_change_success(&self, class: &str, subject: &str) {
		self.notify(format_args!("class change SUCCESS for '{subject}' -> '{class}'"));
		self.record(LogCategory::CharacterSystem, format!("SUCCESS: {subject} changed to {class}"));
	}

	pub fn log_class_change_failure(&self, class: &str, subject: &str, reason: &str) {
		self.error(format_args!("class change FAILED for '{subject}' -> '{class}'"));
		self.error(format_args!("  Reason: {reason}"));
		self.record(LogCategory::RuntimeError, format!("FAILED: {subject} -> {class} | Reason: {reason}"));
	}

	/// Summary of the current session; empty before initialization.
	pub fn session_summary(&self) -> SessionSummary {
		if !self.is_initialized() {
			return SessionSummary::default();
		}
		self.session.summarize()
	}

	/// Writes the session summary through the sink and returns it.
	pub fn report_session(&self) -> Option<SessionSummary> {
		if !self.is_initialized() {
			return None;
		}
		let summary = self.session.summarize();
		self.notify("=== Session Diagnostic Summary ===");
		self.notify(format_args!("Session log entries: {}", summary.total));
		for (tag, count) in &summary.per_category {
			self.debug(format_args!("  {tag}: {count} entries"));
		}
		if !summary.recent_errors.is_empty() {
			self.warn("Recent errors detected:");
			for line in &summary.recent_errors {
				self.warn(format_args!("  {line}"));
			}
		}
		Some(summary)
	}
}

impl Default for Diagnostics {
	fn default() -> Self {
		Self::new(DEFAULT_TAG, EvictionPolicy::default())
	}
}
