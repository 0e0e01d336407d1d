//! Hook groups shipped with the integration.
//!
//! Each group is a named list of [`HookSpec`]s handed to the interception
//! manager. The business rules (which classes count as marked, how large the
//! durability bonus is) come from [`InstrumentConfig`].

mod crafting;
mod trait_system;

use std::sync::Arc;

use hookwatch_diagnostics::Diagnostics;
use hookwatch_intercept::HookSpec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub use self::crafting::{CARVED_CROCK_CLASS, COLLECTIBLE_TYPE, CROCK_TYPE};
use crate::InstrumentConfig;
use crate::classes::ClassDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BundledGroup {
	/// Observes the class system to explain "traits not visible" reports.
	TraitDiagnostics,
	/// Lets plain crocks match carved-crock conversion recipes.
	CraftingCompat,
	/// Durability bonus for items crafted by classes with the configured trait.
	DurabilityBonus,
}

impl BundledGroup {
	pub fn name(self) -> &'static str {
		self.into()
	}

	/// Groups whose targets only exist on server builds.
	pub fn server_only(self) -> bool {
		matches!(self, Self::TraitDiagnostics)
	}
}

/// Shared state the bundled hooks close over.
#[derive(Clone)]
pub struct GroupEnv {
	pub config: Arc<InstrumentConfig>,
	pub diagnostics: Arc<Diagnostics>,
	pub classes: ClassDirectory,
}

/// Builds the specs for `group`.
pub fn specs(group: BundledGroup, env: &GroupEnv) -> Vec<HookSpec> {
	match group {
		BundledGroup::TraitDiagnostics => trait_system::specs(env),
		BundledGroup::CraftingCompat => crafting::crock_specs(),
		BundledGroup::DurabilityBonus => crafting::durability_specs(env),
	}
}
