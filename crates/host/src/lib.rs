//! Capability seams between hookwatch and the host application it observes.
//!
//! Nothing in this crate refers to a concrete host type. The host hands in
//! trait objects at initialization and hookwatch only ever talks to it
//! through them:
//!
//! - [`HostIntrospect`]: loaded-module enumeration plus type and member lookup
//!   by name (the reflection surface).
//! - [`PatchHost`]: the patch-application primitive that runs before and after
//!   callbacks around an original member.
//! - [`ModCatalog`]: the list of co-loaded mods, for compatibility probes.
//! - [`MigrationSubject`]: a joining subject and its externally-owned
//!   identifier field.
//!
//! Values crossing the seam are [`HostValue`]s; objects expose properties
//! through [`Reflect`].

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod catalog;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod introspect;
pub mod patch;
pub mod subject;
pub mod value;

pub use catalog::{ModCatalog, ModInfo};
pub use error::HostError;
pub use introspect::{BlockPos, HostIntrospect, HostSide, LightLevels, MemberHandle, MemberInfo, MemberKind, ModuleInfo, TypeHandle, Visibility};
pub use patch::{AfterCall, AfterHook, BeforeCall, BeforeHook, Patch, PatchHost, PatchId};
pub use subject::MigrationSubject;
pub use value::{HostValue, Reflect};
