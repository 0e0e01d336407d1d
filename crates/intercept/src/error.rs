//! Errors raised by hook bodies and reported by group installation.

use hookwatch_host::HostError;
use thiserror::Error;

/// Failure inside a hook callback.
///
/// Never reaches the host: the manager's guard records and discards it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
	#[error(transparent)]
	Host(#[from] HostError),

	#[error("missing argument #{0}")]
	MissingArgument(usize),

	#[error("expected {expected}, found {found}")]
	UnexpectedValue { expected: &'static str, found: String },

	#[error("{0}")]
	Failed(String),
}

/// Why one spec of a group was not installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
	/// The target type or member does not exist in this host build.
	#[error("{target} not found")]
	Unresolved { target: String },

	/// The host's patch primitive refused the resolved member.
	#[error("patching {target} failed: {reason}")]
	Rejected { target: String, reason: String },
}

impl InstallError {
	pub fn target(&self) -> &str {
		match self {
			Self::Unresolved { target } | Self::Rejected { target, .. } => target,
		}
	}
}
