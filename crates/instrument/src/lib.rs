//! Runtime diagnostics for the BlessedClasses integration.
//!
//! [`Instrumentation`] ties the hookwatch crates together for one host
//! process:
//!
//! 1. [`Instrumentation::initialize`] builds the process-scoped
//!    [`Diagnostics`](hookwatch_diagnostics::Diagnostics), installs the
//!    enabled [`BundledGroup`]s and probes the co-loaded mods.
//! 2. [`Instrumentation::after_assets_loaded`] logs the recipe hook targets
//!    and takes a census of the loaded character classes.
//! 3. [`Instrumentation::on_subject_join`] logs the player's surroundings and
//!    migrates legacy class identifiers.
//! 4. [`Instrumentation::shutdown`] removes every hook and reports the session.
//!
//! Behavior is driven by [`InstrumentConfig`], loaded from TOML.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod classes;
pub mod config;
pub mod groups;
pub mod lifecycle;
pub mod probes;
pub mod reflect;

pub use config::{
	ConfigError, DurabilityConfig, GroupsConfig, InstrumentConfig, MigrationConfig, ProbesConfig, SamplingConfig, SessionLogConfig,
};
pub use groups::BundledGroup;
pub use lifecycle::{HostCapabilities, Instrumentation};
pub use probes::{ClassCensus, EnvironmentReading, ThirdPartyReport};
