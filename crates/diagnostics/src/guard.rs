//! Fail-safe execution of diagnostic code.
//!
//! Everything hookwatch runs on a host thread goes through [`run_guarded`]
//! (usually via [`Diagnostics::protect`](crate::Diagnostics::protect)). Both
//! `Err` returns and panics are turned into a [`Fault`]; nothing unwinds
//! into host frames.
//!
//! A contained panic is reported through the session sink only. The first
//! guarded call installs a panic hook that stays silent while the panicking
//! thread is inside a guard and defers to the previous hook otherwise.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, catch_unwind};
use std::sync::Once;

use thiserror::Error;

/// Why a guarded operation was swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
	/// The operation returned an error.
	#[error("{0}")]
	Failed(String),
	/// The operation panicked.
	#[error("panicked: {0}")]
	Panicked(String),
}

/// Outcome of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Guarded<T> {
	Completed(T),
	/// Failure was recorded and discarded; the caller proceeds as if the
	/// operation had no effect.
	Swallowed(Fault),
}

impl<T> Guarded<T> {
	pub fn is_swallowed(&self) -> bool {
		matches!(self, Self::Swallowed(_))
	}

	/// The completed value, if any.
	pub fn ok(self) -> Option<T> {
		match self {
			Self::Completed(v) => Some(v),
			Self::Swallowed(_) => None,
		}
	}

	pub fn fault(&self) -> Option<&Fault> {
		match self {
			Self::Completed(_) => None,
			Self::Swallowed(fault) => Some(fault),
		}
	}
}

thread_local! {
	static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

static QUIET_HOOK: Once = Once::new();

fn install_quiet_hook() {
	QUIET_HOOK.call_once(|| {
		let previous = panic::take_hook();
		panic::set_hook(Box::new(move |info| {
			if !in_guard() {
				previous(info);
			}
		}));
	});
}

/// Whether the current thread is running guarded code.
pub fn in_guard() -> bool {
	GUARD_DEPTH.with(Cell::get) > 0
}

/// Marks the current thread as guarded until dropped.
struct Depth;

impl Depth {
	fn enter() -> Self {
		GUARD_DEPTH.with(|d| d.set(d.get() + 1));
		Self
	}
}

impl Drop for Depth {
	fn drop(&mut self) {
		GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
	}
}

fn catch_quietly<R>(op: impl FnOnce() -> R) -> std::thread::Result<R> {
	install_quiet_hook();
	let _depth = Depth::enter();
	catch_unwind(AssertUnwindSafe(op))
}

/// Runs `op`, converting errors and panics into a [`Fault`].
pub fn run_guarded<T, E, F>(op: F) -> Result<T, Fault>
where
	E: fmt::Display,
	F: FnOnce() -> Result<T, E>,
{
	match catch_quietly(op) {
		Ok(Ok(value)) => Ok(value),
		Ok(Err(err)) => Err(Fault::Failed(err.to_string())),
		Err(payload) => Err(Fault::Panicked(panic_message(payload.as_ref()))),
	}
}

/// Runs `op` and discards any failure without recording it.
///
/// Used only around the recording path itself, where reporting a failure
/// could fail again.
pub fn run_silently<F: FnOnce()>(op: F) {
	let _ = catch_quietly(op);
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&'static str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
