//! Co-loaded mod enumeration.

/// A mod loaded alongside this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
	pub id: String,
	pub version: String,
	/// Host-defined mod kind (code, content, theme...).
	pub kind: String,
}

impl ModInfo {
	pub fn new(id: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			version: version.into(),
			kind: kind.into(),
		}
	}
}

/// Host capability listing loaded mods in load order.
pub trait ModCatalog: Send + Sync {
	fn mods(&self) -> Vec<ModInfo>;
}
