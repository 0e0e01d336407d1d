//! Fixed legacy-to-current class identifier mapping.

use rustc_hash::FxHashMap;

use crate::MigrationError;

/// Vanilla class codes and the classes that replace them.
pub const VANILLA_CLASSES: [(&str, &str); 6] = [
	("commoner", "lordofthewilds"),
	("hunter", "lordofthehunt"),
	("malefactor", "lordoftheruins"),
	("clockmaker", "lordofinvention"),
	("blackguard", "lordofdeath"),
	("tailor", "lordofthecloth"),
];

/// Immutable mapping from legacy identifier to current identifier.
///
/// Lookups are exact and case-sensitive. No replacement may itself be a
/// legacy key, which keeps a second trigger on a migrated subject a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMigrationTable {
	map: FxHashMap<String, String>,
}

impl ClassMigrationTable {
	/// Builds a table, rejecting empty, duplicate and chained entries.
	pub fn new<I, K, V>(entries: I) -> Result<Self, MigrationError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut map: FxHashMap<String, String> = FxHashMap::default();
		for (legacy, current) in entries {
			let (legacy, current): (String, String) = (legacy.into(), current.into());
			if legacy.is_empty() || current.is_empty() {
				return Err(MigrationError::EmptyIdentifier);
			}
			if let Some(first) = map.get(&legacy) {
				return Err(MigrationError::DuplicateLegacy {
					first: first.clone(),
					second: current,
					legacy,
				});
			}
			map.insert(legacy, current);
		}

		if let Some((legacy, current)) = map.iter().find(|(_, current)| map.contains_key(*current)) {
			return Err(MigrationError::Chained {
				legacy: legacy.clone(),
				current: current.clone(),
			});
		}
		Ok(Self { map })
	}

	/// The six vanilla class mappings.
	pub fn vanilla() -> Self {
		Self {
			map: VANILLA_CLASSES.iter().map(|(l, c)| (l.to_string(), c.to_string())).collect(),
		}
	}

	pub fn get(&self, legacy: &str) -> Option<&str> {
		self.map.get(legacy).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	/// Entries sorted by legacy identifier.
	pub fn entries(&self) -> Vec<(&str, &str)> {
		let mut entries: Vec<_> = self.map.iter().map(|(l, c)| (l.as_str(), c.as_str())).collect();
		entries.sort_unstable();
		entries
	}
}

impl Default for ClassMigrationTable {
	fn default() -> Self {
		Self::vanilla()
	}
}
