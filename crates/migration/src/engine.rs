//! Subject-join trigger that rewrites legacy class identifiers.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use hookwatch_diagnostics::{Diagnostics, LogCategory};
use hookwatch_host::MigrationSubject;

use crate::{ClassMigrationTable, MigrationError};

/// One applied migration. Logged and handed back to the caller, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEvent {
	pub subject_id: String,
	pub from: String,
	pub to: String,
	pub timestamp: DateTime<Local>,
}

impl MigrationEvent {
	fn now(subject_id: String, from: String, to: &str) -> Self {
		Self {
			subject_id,
			from,
			to: to.to_string(),
			timestamp: Local::now(),
		}
	}

	/// Text sent to the migrated subject.
	pub fn notification(&self, tag: &str) -> String {
		format!("{tag} Your character class has been migrated from '{}' to '{}'.", self.from, self.to)
	}
}

impl fmt::Display for MigrationEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {} -> {}", self.subject_id, self.from, self.to)
	}
}

/// Applies [`ClassMigrationTable`] to joining subjects.
pub struct MigrationEngine {
	table: Arc<ClassMigrationTable>,
	diagnostics: Arc<Diagnostics>,
}

impl MigrationEngine {
	pub fn new(table: Arc<ClassMigrationTable>, diagnostics: Arc<Diagnostics>) -> Self {
		Self { table, diagnostics }
	}

	pub fn table(&self) -> &ClassMigrationTable {
		&self.table
	}

	/// Runs the migration for a joining subject.
	///
	/// Returns the applied migration, or `None` when there was nothing to do
	/// or the attempt failed. Failures are recorded as runtime errors and
	/// never reach the caller, so the join itself always proceeds.
	pub fn on_trigger(&self, subject: &mut dyn MigrationSubject) -> Option<MigrationEvent> {
		if !self.diagnostics.is_initialized() {
			return None;
		}
		let context = format!("class migration for '{}'", subject.subject_id());
		self.diagnostics.protect(&context, || self.migrate(subject)).ok().flatten()
	}

	fn migrate(&self, subject: &mut dyn MigrationSubject) -> Result<Option<MigrationEvent>, MigrationError> {
		let subject_id = subject.subject_id().to_string();
		let current = subject.identifier().map_err(|source| MigrationError::Read {
			subject: subject_id.clone(),
			source,
		})?;
		let Some(from) = current.filter(|id| !id.is_empty()) else {
			return Ok(None);
		};
		let Some(to) = self.table.get(&from) else {
			return Ok(None);
		};

		let written = subject.compare_and_set(&from, to).map_err(|source| MigrationError::Write {
			subject: subject_id.clone(),
			source,
		})?;
		if !written {
			self.diagnostics.log_warning(
				LogCategory::CharacterSystem,
				format_args!("class of '{subject_id}' changed while migrating from '{from}'; left untouched"),
			);
			return Ok(None);
		}

		let event = MigrationEvent::now(subject_id, from, to);
		tracing::info!(subject = %event.subject_id, from = %event.from, to = %event.to, "migration.applied");
		self.announce(subject, &event);
		Ok(Some(event))
	}

	/// Follow-up once the identifier is written. Each step fails on its own;
	/// the write itself stands either way.
	fn announce(&self, subject: &mut dyn MigrationSubject, event: &MigrationEvent) {
		let _ = self.diagnostics.protect(&format!("sync after migrating '{}'", event.subject_id), || subject.mark_for_sync());
		self.diagnostics.log_class_migration(&event.subject_id, &event.from, &event.to);
		let message = event.notification(self.diagnostics.tag());
		let _ = self.diagnostics.protect(&format!("notify '{}' of migration", event.subject_id), || subject.notify(&message));
	}
}
