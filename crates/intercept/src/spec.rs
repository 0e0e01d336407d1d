//! Hook specifications: what to patch and what to run around it.

use std::fmt;
use std::sync::Arc;

use hookwatch_host::{AfterCall, BeforeCall, Visibility};

use crate::HookError;

/// Before-callback. May call [`BeforeCall::skip_original`] to substitute the result.
pub type BeforeFn = Arc<dyn Fn(&mut BeforeCall<'_>) -> Result<(), HookError> + Send + Sync>;

/// After-callback. May stage a new result with [`AfterCall::replace_result`].
pub type AfterFn = Arc<dyn Fn(&mut AfterCall<'_>) -> Result<(), HookError> + Send + Sync>;

/// When a hook runs relative to the original member body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
	Before,
	After,
	Both,
}

/// Whether the target is a method or a property getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetKind {
	#[default]
	Method,
	Getter,
}

/// Name-based description of the member to patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberTarget {
	/// Fully qualified declaring type name.
	pub type_name: String,
	/// Restricts the type search to one module.
	pub module: Option<String>,
	pub member: String,
	pub kind: TargetKind,
	pub visibility: Visibility,
	/// Exact parameter type names, to pick one overload.
	pub signature: Option<Vec<String>>,
}

impl MemberTarget {
	/// Targets a method of any visibility.
	pub fn method(type_name: &str, member: &str) -> Self {
		Self {
			type_name: type_name.to_string(),
			module: None,
			member: member.to_string(),
			kind: TargetKind::Method,
			visibility: Visibility::ANY,
			signature: None,
		}
	}

	/// Targets a property getter of any visibility.
	pub fn getter(type_name: &str, property: &str) -> Self {
		Self {
			kind: TargetKind::Getter,
			..Self::method(type_name, property)
		}
	}

	#[must_use]
	pub fn in_module(mut self, module: &str) -> Self {
		self.module = Some(module.to_string());
		self
	}

	#[must_use]
	pub fn visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	#[must_use]
	pub fn signature<I, S>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.signature = Some(params.into_iter().map(Into::into).collect());
		self
	}
}

impl fmt::Display for MemberTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.type_name, self.member)?;
		if let Some(sig) = &self.signature {
			write!(f, "({})", sig.join(", "))?;
		}
		Ok(())
	}
}

#[derive(Clone)]
enum Callbacks {
	Before(BeforeFn),
	After(AfterFn),
	Both(BeforeFn, AfterFn),
}

/// One hook: a target plus at least one callback.
#[derive(Clone)]
pub struct HookSpec {
	pub target: MemberTarget,
	callbacks: Callbacks,
}

impl HookSpec {
	pub fn before<F>(target: MemberTarget, f: F) -> Self
	where
		F: Fn(&mut BeforeCall<'_>) -> Result<(), HookError> + Send + Sync + 'static,
	{
		Self {
			target,
			callbacks: Callbacks::Before(Arc::new(f)),
		}
	}

	pub fn after<F>(target: MemberTarget, f: F) -> Self
	where
		F: Fn(&mut AfterCall<'_>) -> Result<(), HookError> + Send + Sync + 'static,
	{
		Self {
			target,
			callbacks: Callbacks::After(Arc::new(f)),
		}
	}

	pub fn both<B, A>(target: MemberTarget, before: B, after: A) -> Self
	where
		B: Fn(&mut BeforeCall<'_>) -> Result<(), HookError> + Send + Sync + 'static,
		A: Fn(&mut AfterCall<'_>) -> Result<(), HookError> + Send + Sync + 'static,
	{
		Self {
			target,
			callbacks: Callbacks::Both(Arc::new(before), Arc::new(after)),
		}
	}

	pub fn phase(&self) -> Phase {
		match self.callbacks {
			Callbacks::Before(_) => Phase::Before,
			Callbacks::After(_) => Phase::After,
			Callbacks::Both(..) => Phase::Both,
		}
	}

	/// Splits the spec into its target and callbacks.
	pub(crate) fn into_parts(self) -> (MemberTarget, Option<BeforeFn>, Option<AfterFn>) {
		match self.callbacks {
			Callbacks::Before(before) => (self.target, Some(before), None),
			Callbacks::After(after) => (self.target, None, Some(after)),
			Callbacks::Both(before, after) => (self.target, Some(before), Some(after)),
		}
	}
}

impl fmt::Debug for HookSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookSpec")
			.field("target", &self.target)
			.field("phase", &self.phase())
			.finish()
	}
}
