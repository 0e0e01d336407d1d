//! Session log categories.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Category tag carried by every session log entry.
///
/// The rendered name is what appears between brackets in a formatted entry
/// and what [`SessionLog::summarize`](crate::SessionLog::summarize) groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum LogCategory {
	RecipeLoading,
	TraitSystem,
	ModCompatibility,
	RuntimeError,
	EnvironmentDetection,
	CharacterSystem,
}
