//! Errors reported by host capability implementations.

use thiserror::Error;

/// Failure surfaced by the host through one of the capability traits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
	/// A reflective property read failed inside the host.
	#[error("failed to read property '{property}' on {type_name}: {reason}")]
	PropertyRead {
		type_name: String,
		property: String,
		reason: String,
	},

	/// The property exists but cannot be written.
	#[error("property '{property}' on {type_name} is read-only")]
	ReadOnly { type_name: String, property: String },

	/// The patch primitive refused to instrument a member.
	#[error("patch rejected for {member}: {reason}")]
	PatchRejected { member: String, reason: String },

	/// A patch id was not known to the host.
	#[error("unknown patch {0}")]
	UnknownPatch(u64),

	/// The subject is gone or no longer accepts writes (disconnected, unloaded).
	#[error("subject unavailable: {0}")]
	SubjectUnavailable(String),

	/// Catch-all for host-specific failures.
	#[error("{0}")]
	Other(String),
}
