//! Patch-application primitive: before and after callbacks around a member.

use std::fmt;
use std::sync::Arc;

use crate::{HostError, HostValue, MemberHandle};

/// Identifier the host assigns to an applied patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchId(pub u64);

impl fmt::Display for PatchId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "patch#{}", self.0)
	}
}

/// Invocation state visible to a before-callback.
#[derive(Debug)]
pub struct BeforeCall<'a> {
	/// Receiver, `None` for static members.
	pub instance: Option<&'a HostValue>,
	/// Call arguments in declaration order.
	pub args: &'a [HostValue],
	replacement: Option<HostValue>,
}

impl<'a> BeforeCall<'a> {
	pub fn new(instance: Option<&'a HostValue>, args: &'a [HostValue]) -> Self {
		Self {
			instance,
			args,
			replacement: None,
		}
	}

	/// Argument at `index`, if present.
	pub fn arg(&self, index: usize) -> Option<&'a HostValue> {
		self.args.get(index)
	}

	/// Supplies the result and asks the host to skip the original body.
	pub fn skip_original(&mut self, result: HostValue) {
		self.replacement = Some(result);
	}

	/// Whether a replacement result was supplied.
	pub fn skips_original(&self) -> bool {
		self.replacement.is_some()
	}

	/// Takes the replacement result, if any.
	pub fn take_replacement(&mut self) -> Option<HostValue> {
		self.replacement.take()
	}
}

/// Invocation state visible to an after-callback.
///
/// The produced result is read-only; a callback that wants a different
/// result stages it with [`AfterCall::replace_result`].
#[derive(Debug)]
pub struct AfterCall<'a> {
	pub instance: Option<&'a HostValue>,
	pub args: &'a [HostValue],
	/// Result produced by the original body (or by a skipping before-callback).
	pub result: &'a HostValue,
	replacement: Option<HostValue>,
}

impl<'a> AfterCall<'a> {
	pub fn new(instance: Option<&'a HostValue>, args: &'a [HostValue], result: &'a HostValue) -> Self {
		Self {
			instance,
			args,
			result,
			replacement: None,
		}
	}

	pub fn arg(&self, index: usize) -> Option<&'a HostValue> {
		self.args.get(index)
	}

	/// Stages `result` as the value returned to the caller.
	pub fn replace_result(&mut self, result: HostValue) {
		self.replacement = Some(result);
	}

	/// Takes the staged result, if any.
	pub fn take_replacement(&mut self) -> Option<HostValue> {
		self.replacement.take()
	}
}

/// Callback run before the original member body.
pub type BeforeHook = Arc<dyn Fn(&mut BeforeCall<'_>) + Send + Sync>;

/// Callback run after the original member body.
pub type AfterHook = Arc<dyn Fn(&mut AfterCall<'_>) + Send + Sync>;

/// A pair of callbacks to attach to one member.
///
/// Callbacks handed to the host are infallible: failure handling happens
/// before they cross the seam.
#[derive(Clone, Default)]
pub struct Patch {
	pub before: Option<BeforeHook>,
	pub after: Option<AfterHook>,
}

impl fmt::Debug for Patch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Patch")
			.field("before", &self.before.is_some())
			.field("after", &self.after.is_some())
			.finish()
	}
}

/// Host patch-application capability.
///
/// The host guarantees each attached callback runs exactly once per
/// invocation of the patched member.
pub trait PatchHost: Send + Sync {
	/// Attaches `patch` to `member` on behalf of `owner`.
	fn apply(&self, owner: &str, member: &MemberHandle, patch: Patch) -> Result<PatchId, HostError>;

	/// Detaches a previously applied patch.
	fn remove(&self, owner: &str, id: PatchId) -> Result<(), HostError>;
}
