//! TOML configuration. Every field has a default; an absent file means defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hookwatch_diagnostics::{DEFAULT_CAPACITY, DEFAULT_EVICTION_BATCH, DEFAULT_TAG, EvictionPolicy};
use hookwatch_migration::{ClassMigrationTable, MigrationError, VANILLA_CLASSES};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::groups::BundledGroup;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("invalid migration table: {0}")]
	Migration(#[from] MigrationError),

	#[error("session log capacity must be at least 1")]
	ZeroCapacity,

	#[error("eviction batch {batch} exceeds session log capacity {capacity}")]
	EvictionBatch { batch: usize, capacity: usize },

	#[error("durability multiplier must be finite and positive, got {0}")]
	Multiplier(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
	/// Host-unique identity that owns every patch and scopes the installed flags.
	pub owner_id: String,
	/// Prefix for sink lines and subject notifications.
	pub tag: String,
	pub session_log: SessionLogConfig,
	pub sampling: SamplingConfig,
	pub groups: GroupsConfig,
	pub migration: MigrationConfig,
	pub durability: DurabilityConfig,
	pub probes: ProbesConfig,
}

impl Default for InstrumentConfig {
	fn default() -> Self {
		Self {
			owner_id: "hookwatch".to_string(),
			tag: DEFAULT_TAG.to_string(),
			session_log: SessionLogConfig::default(),
			sampling: SamplingConfig::default(),
			groups: GroupsConfig::default(),
			migration: MigrationConfig::default(),
			durability: DurabilityConfig::default(),
			probes: ProbesConfig::default(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLogConfig {
	pub capacity: usize,
	/// Minimum number of oldest entries dropped once capacity is exceeded.
	pub eviction_batch: usize,
}

impl Default for SessionLogConfig {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CAPACITY,
			eviction_batch: DEFAULT_EVICTION_BATCH,
		}
	}
}

impl SessionLogConfig {
	pub fn policy(&self) -> EvictionPolicy {
		EvictionPolicy::new(self.capacity, self.eviction_batch)
	}
}

/// Throttle for hooks on hot paths: the first `warmup` hits, then every `every`th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
	pub warmup: u64,
	pub every: u64,
}

impl Default for SamplingConfig {
	fn default() -> Self {
		Self { warmup: 3, every: 10 }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsConfig {
	pub enabled: Vec<BundledGroup>,
}

impl Default for GroupsConfig {
	fn default() -> Self {
		Self {
			enabled: BundledGroup::iter().collect(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
	/// Legacy identifier to current identifier.
	pub table: BTreeMap<String, String>,
}

impl Default for MigrationConfig {
	fn default() -> Self {
		Self {
			table: VANILLA_CLASSES.iter().map(|(l, c)| (l.to_string(), c.to_string())).collect(),
		}
	}
}

impl MigrationConfig {
	pub fn build_table(&self) -> std::result::Result<ClassMigrationTable, MigrationError> {
		ClassMigrationTable::new(self.table.iter().map(|(l, c)| (l.as_str(), c.as_str())))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurabilityConfig {
	/// Class trait that earns the bonus.
	#[serde(rename = "trait")]
	pub trait_code: String,
	pub multiplier: f64,
	/// Item attribute the multiplier is stored under.
	pub attribute: String,
}

impl Default for DurabilityConfig {
	fn default() -> Self {
		Self {
			trait_code: "smith".to_string(),
			multiplier: 1.5,
			attribute: "blessedclasses:smithCrafted".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbesConfig {
	/// Mod ids reported prominently when present.
	pub watched_mods: Vec<String>,
	/// Case-insensitive substring identifying this mod's own classes.
	pub class_marker: String,
}

impl Default for ProbesConfig {
	fn default() -> Self {
		Self {
			watched_mods: vec!["racialequality".to_string(), "blessedraces".to_string()],
			class_marker: "blessed".to_string(),
		}
	}
}

impl InstrumentConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let config: Self = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads `path`, falling back to defaults when the file does not exist.
	pub fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			tracing::debug!(path = %path.display(), "config.missing");
			return Ok(Self::default());
		}
		let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&content)
	}

	fn validate(&self) -> Result<()> {
		let SessionLogConfig { capacity, eviction_batch } = self.session_log;
		if capacity == 0 {
			return Err(ConfigError::ZeroCapacity);
		}
		if eviction_batch > capacity {
			return Err(ConfigError::EvictionBatch { batch: eviction_batch, capacity });
		}
		let multiplier = self.durability.multiplier;
		if !multiplier.is_finite() || multiplier <= 0.0 {
			return Err(ConfigError::Multiplier(multiplier));
		}
		self.migration.build_table()?;
		Ok(())
	}

	pub fn is_enabled(&self, group: BundledGroup) -> bool {
		self.groups.enabled.contains(&group)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[test]
	fn empty_document_is_default() {
		assert_eq!(InstrumentConfig::from_toml_str("").unwrap(), InstrumentConfig::default());
	}

	#[test]
	fn defaults_match_shipped_behavior() {
		let config = InstrumentConfig::default();
		assert_eq!(config.session_log.policy(), EvictionPolicy::new(1000, 200));
		assert_eq!(config.migration.build_table().unwrap(), ClassMigrationTable::vanilla());
		assert!(BundledGroup::iter().all(|g| config.is_enabled(g)));
		assert_eq!(config.durability.multiplier, 1.5);
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = InstrumentConfig::from_toml_str(
			r#"
owner_id = "blessedclasses"

[sampling]
every = 50

[groups]
enabled = ["crafting-compat"]

[durability]
trait = "armorer"

[migration.table]
peasant = "lordofthefields"
"#,
		)
		.unwrap();
		assert_eq!(config.owner_id, "blessedclasses");
		assert_eq!(config.tag, DEFAULT_TAG);
		assert_eq!(config.sampling, SamplingConfig { warmup: 3, every: 50 });
		assert_eq!(config.groups.enabled, vec![BundledGroup::CraftingCompat]);
		assert!(!config.is_enabled(BundledGroup::TraitDiagnostics));
		assert_eq!(config.durability.trait_code, "armorer");
		assert_eq!(config.durability.attribute, "blessedclasses:smithCrafted");
		assert_eq!(config.migration.build_table().unwrap().get("peasant"), Some("lordofthefields"));
		assert_eq!(config.migration.build_table().unwrap().get("commoner"), None);
	}

	#[test]
	fn rejects_bad_documents() {
		assert!(matches!(InstrumentConfig::from_toml_str("[groups]\nenabled = [\"nope\"]"), Err(ConfigError::Parse(_))));
		assert!(matches!(InstrumentConfig::from_toml_str("[session_log]\ncapacity = 0"), Err(ConfigError::ZeroCapacity)));
		assert!(matches!(
			InstrumentConfig::from_toml_str("[session_log]\ncapacity = 10\neviction_batch = 50"),
			Err(ConfigError::EvictionBatch { batch: 50, capacity: 10 })
		));
		assert!(matches!(
			InstrumentConfig::from_toml_str("[migration.table]\na = \"b\"\nb = \"c\""),
			Err(ConfigError::Migration(MigrationError::Chained { .. }))
		));
	}

	#[rstest]
	#[case::negative("-2.0")]
	#[case::zero("0.0")]
	#[case::nan("nan")]
	#[case::infinite("inf")]
	fn rejects_unusable_multipliers(#[case] value: &str) {
		let doc = format!("[durability]\nmultiplier = {value}");
		assert!(matches!(InstrumentConfig::from_toml_str(&doc), Err(ConfigError::Multiplier(_))));
	}

	#[test]
	fn missing_file_yields_defaults() {
		let dir = tempfile::tempdir().expect("create tempdir");
		let path = dir.path().join("hookwatch.toml");
		assert_eq!(InstrumentConfig::load(&path).unwrap(), InstrumentConfig::default());
	}

	#[test]
	fn loads_from_disk() {
		let dir = tempfile::tempdir().expect("create tempdir");
		let path = dir.path().join("hookwatch.toml");
		std::fs::write(&path, "tag = \"[Test]\"\n").unwrap();
		assert_eq!(InstrumentConfig::load(&path).unwrap().tag, "[Test]");
	}
}
