//! Subject handed to the migration trigger.

use crate::{HostError, HostValue};

/// A joining subject and read/write access to its externally-owned identifier.
///
/// The host calls the migration trigger synchronously from its join event,
/// so implementations should not block.
pub trait MigrationSubject {
	/// Stable identifier of the subject (player name, entity id).
	fn subject_id(&self) -> &str;

	/// Current identifier value, `None` when the field is unset.
	fn identifier(&self) -> Result<Option<String>, HostError>;

	/// Writes `replacement` only if the field still holds `expected`.
	///
	/// Returns `Ok(false)` when the field changed underneath the caller. This
	/// is the only write hookwatch ever performs on host-owned state.
	fn compare_and_set(&mut self, expected: &str, replacement: &str) -> Result<bool, HostError>;

	/// Marks the identifier field for synchronization to remote peers.
	fn mark_for_sync(&mut self) -> Result<(), HostError>;

	/// Sends a plain-text notification to the subject.
	fn notify(&mut self, message: &str) -> Result<(), HostError>;

	/// The subject's in-world entity, when it has one.
	fn entity(&self) -> Option<HostValue> {
		None
	}
}
