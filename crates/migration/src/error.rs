use hookwatch_host::HostError;
use thiserror::Error;

/// Errors from building a migration table or running one migration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
	#[error("empty class identifier in migration table")]
	EmptyIdentifier,

	#[error("duplicate legacy identifier '{legacy}' (maps to '{first}' and '{second}')")]
	DuplicateLegacy { legacy: String, first: String, second: String },

	/// A replacement is itself a legacy key, so a second trigger would migrate again.
	#[error("'{legacy}' -> '{current}' chains into another migration")]
	Chained { legacy: String, current: String },

	#[error("reading identifier of '{subject}': {source}")]
	Read { subject: String, source: HostError },

	#[error("writing identifier of '{subject}': {source}")]
	Write { subject: String, source: HostError },
}
