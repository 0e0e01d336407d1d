//! Hook installation against a host whose shape is only known at runtime.
//!
//! - [`SymbolResolver`] finds types and members by name through the host's
//!   introspection capability.
//! - [`HookSpec`] pairs a [`MemberTarget`] with fallible before and/or after
//!   callbacks.
//! - [`InterceptionManager`] installs named groups of specs, at most once per
//!   group, wrapping every callback in the diagnostics guard so a failing
//!   hook can never disturb the host call it observes.
//! - [`Sampler`] throttles expensive work in hooks on hot paths.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod error;
pub mod manager;
pub mod resolver;
pub mod sampler;
pub mod spec;

pub use error::{HookError, InstallError};
pub use manager::{InstallReport, InterceptionManager};
pub use resolver::{ResolvedMember, SymbolResolver};
pub use sampler::Sampler;
pub use spec::{AfterFn, BeforeFn, HookSpec, MemberTarget, Phase, TargetKind};
