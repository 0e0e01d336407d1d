//! One-shot environment probes run at startup and after assets load.

use hookwatch_diagnostics::{Diagnostics, LogCategory};
use hookwatch_host::{BlockPos, HostError, HostIntrospect, HostValue, LightLevels, ModCatalog, ModInfo};
use hookwatch_intercept::{MemberTarget, SymbolResolver};

use crate::ProbesConfig;
use crate::classes::{ClassDirectory, ClassLookup};
use crate::groups::{COLLECTIBLE_TYPE, CROCK_TYPE};
use crate::reflect::contains_ignore_case;

/// Prefixes of the classes the base game ships.
pub const VANILLA_CLASS_PREFIXES: [&str; 7] = ["commoner", "malefactor", "hunter", "tailor", "smith", "blackguard", "clockmaker"];

/// Id fragments that suggest a mod touches the class system.
const RELATED_MOD_HINTS: [&str; 3] = ["class", "race", "character"];

/// Logs every loaded mod in load order. Returns the mod count.
pub fn mod_load_order(d: &Diagnostics, catalog: &dyn ModCatalog) -> usize {
	let mods = catalog.mods();
	d.notify("=== Mod Load Order Analysis ===");
	let listing: String = mods.iter().map(|m| format!("\n  - {} v{} (type: {})", m.id, m.version, m.kind)).collect();
	d.debug(format_args!("Loaded mods:{listing}"));
	d.record(LogCategory::ModCompatibility, format!("Total mods loaded: {}", mods.len()));
	mods.len()
}

/// Mods worth knowing about when debugging class compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThirdPartyReport {
	/// Present mods from the watch list.
	pub watched: Vec<ModInfo>,
	/// Mods whose id hints at class, race or character handling.
	pub related: Vec<ModInfo>,
}

pub fn third_party(d: &Diagnostics, catalog: &dyn ModCatalog, probes: &ProbesConfig) -> ThirdPartyReport {
	let mods = catalog.mods();
	d.notify("=== Third-Party Mod Detection ===");
	let mut report = ThirdPartyReport::default();

	for id in &probes.watched_mods {
		match mods.iter().find(|m| m.id.eq_ignore_ascii_case(id)) {
			Some(m) => {
				d.notify(format_args!("{} detected: v{}", m.id, m.version));
				d.notify("  Extra logging enabled for compatibility debugging");
				d.record(LogCategory::ModCompatibility, format!("{} v{} detected", m.id, m.version));
				report.watched.push(m.clone());
			}
			None => d.debug(format_args!("{id} not detected")),
		}
	}

	report.related = mods.into_iter().filter(|m| RELATED_MOD_HINTS.iter().any(|hint| contains_ignore_case(&m.id, hint))).collect();
	if !report.related.is_empty() {
		d.debug("Other character/class mods detected:");
		for m in &report.related {
			d.debug(format_args!("  - {} v{}", m.id, m.version));
			d.record(LogCategory::ModCompatibility, format!("Detected: {} v{}", m.id, m.version));
		}
	}
	report
}

/// Where a player stands and how bright it is there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentReading {
	pub pos: BlockPos,
	/// `None` when the host could not measure light at `pos`.
	pub light: Option<LightLevels>,
}

/// Logs the position and light level of a player entity.
///
/// `Ok(None)` when the entity carries no readable position.
pub fn player_environment(d: &Diagnostics, host: &dyn HostIntrospect, entity: &HostValue, context: &str) -> Result<Option<EnvironmentReading>, HostError> {
	let Some(pos) = entity.property("Pos")? else {
		return Ok(None);
	};
	let coord = |name: &str| -> Result<Option<i64>, HostError> { Ok(pos.property(name)?.and_then(|v| v.as_float()).map(|v| v.floor() as i64)) };
	let (Some(x), Some(y), Some(z)) = (coord("X")?, coord("Y")?, coord("Z")?) else {
		return Ok(None);
	};
	let dimension = pos.property("Dimension")?.and_then(|v| v.as_int()).unwrap_or(0);
	let reading = EnvironmentReading {
		pos: BlockPos { x, y, z, dimension },
		light: host.light_at(&BlockPos { x, y, z, dimension }),
	};

	d.debug(format_args!("Player environment ({context}):"));
	d.debug(format_args!("  Position: {x}, {y}, {z}"));
	d.debug(format_args!("  Dimension: {dimension}"));
	let sun = match reading.light {
		Some(light) => {
			d.debug(format_args!("  Sunlight: {}, Total light: {}", light.sun, light.total));
			light.sun.to_string()
		}
		None => "unknown".to_string(),
	};
	d.record(LogCategory::EnvironmentDetection, format!("{context}: pos=({x},{y},{z}), sun={sun}"));
	Ok(Some(reading))
}

/// Members the crafting hook groups patch.
fn recipe_targets() -> [MemberTarget; 3] {
	[
		MemberTarget::method(CROCK_TYPE, "MatchesForCrafting"),
		MemberTarget::method(COLLECTIBLE_TYPE, "OnCreatedByCrafting"),
		MemberTarget::method(COLLECTIBLE_TYPE, "GetMaxDurability"),
	]
}

/// Logs which recipe handling members the host exposes. Returns how many resolved.
pub fn recipe_loading_state(d: &Diagnostics, resolver: &SymbolResolver) -> usize {
	d.notify("=== Recipe Loading State ===");
	let targets = recipe_targets();
	let mut resolved = 0;
	for target in &targets {
		if resolver.resolve(target).is_some() {
			resolved += 1;
			d.debug(format_args!("  {target}: available"));
		} else {
			d.debug(format_args!("  {target}: missing"));
		}
	}
	d.record(LogCategory::RecipeLoading, format!("Recipe hook targets: {resolved}/{} resolved", targets.len()));
	resolved
}

/// Loaded classes split by origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCensus {
	pub vanilla: Vec<String>,
	pub marked: Vec<String>,
	pub other: Vec<String>,
}

impl ClassCensus {
	pub fn classify<'a>(codes: impl IntoIterator<Item = &'a str>, marker: &str) -> Self {
		let mut census = Self::default();
		for code in codes {
			let bucket = if VANILLA_CLASS_PREFIXES.iter().any(|p| code.starts_with(p)) {
				&mut census.vanilla
			} else if contains_ignore_case(code, marker) {
				&mut census.marked
			} else {
				&mut census.other
			};
			bucket.push(code.to_string());
		}
		census
	}

	pub fn total(&self) -> usize {
		self.vanilla.len() + self.marked.len() + self.other.len()
	}
}

/// Reads the loaded classes through the host and records what was found.
///
/// `Ok(None)` when the class system is unavailable (client builds, or
/// called before the host created it).
pub fn class_census(d: &Diagnostics, classes: &ClassDirectory, marker: &str) -> Result<Option<ClassCensus>, HostError> {
	d.notify("=== Detecting Available Character Classes ===");
	let classes = match classes.lookup()? {
		ClassLookup::Classes(classes) => classes,
		ClassLookup::NoSystem => {
			d.verbose("CharacterSystem type not found (client-only or not loaded yet)");
			return Ok(None);
		}
		ClassLookup::NoInstance => {
			d.warn("CharacterSystem instance not found!");
			d.record(LogCategory::CharacterSystem, "CharacterSystem is NULL");
			return Ok(None);
		}
		ClassLookup::NoList => {
			d.warn("characterClasses array is NULL!");
			d.record(LogCategory::CharacterSystem, "characterClasses array is NULL");
			return Ok(None);
		}
	};

	d.notify(format_args!("Total character classes detected: {}", classes.len()));
	for class in classes.iter().filter(|c| c.code_marked(marker)) {
		let traits = if class.traits.is_empty() { "none".to_string() } else { class.traits.join(", ") };
		d.debug(format_args!("  Class: {}  Traits: {traits}", class.code()));
		d.record(LogCategory::CharacterSystem, format!("Class {}: {} traits", class.code(), class.traits.len()));
	}

	let census = ClassCensus::classify(classes.iter().filter_map(|c| c.code.as_deref()), marker);
	let buckets = [("Vanilla classes", &census.vanilla), ("Marked classes", &census.marked), ("Other mod classes", &census.other)];
	for (label, codes) in buckets.into_iter().filter(|(_, codes)| !codes.is_empty()) {
		d.notify(format_args!("{label}: {}", codes.len()));
		for code in codes {
			d.debug(format_args!("  - {code}"));
		}
	}
	d.record(
		LogCategory::CharacterSystem,
		format!("Classes detected: {} vanilla, {} marked, {} other", census.vanilla.len(), census.marked.len(), census.other.len()),
	);
	Ok(Some(census))
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use hookwatch_diagnostics::MemorySink;
	use hookwatch_host::fake::{FakeHost, FakeObject};
	use hookwatch_host::{MemberKind, Visibility};
	use hookwatch_intercept::SymbolResolver;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::classes::{CHARACTER_SYSTEM_MODULE, CHARACTER_SYSTEM_TYPE, CLASSES_PROPERTY};

	fn diagnostics() -> (Diagnostics, Arc<MemorySink>) {
		let d = Diagnostics::default();
		let sink = Arc::new(MemorySink::new());
		d.initialize(sink.clone());
		(d, sink)
	}

	fn entries_with(d: &Diagnostics, needle: &str) -> usize {
		d.session().entries().iter().filter(|e| e.contains(needle)).count()
	}

	#[test]
	fn load_order_lists_every_mod() {
		let (d, sink) = diagnostics();
		let host = FakeHost::new();
		host.add_mod(ModInfo::new("game", "1.21.0", "Code"));
		host.add_mod(ModInfo::new("blessedclasses", "0.3.0", "Code"));
		assert_eq!(mod_load_order(&d, &host), 2);
		assert!(sink.contains("\n  - blessedclasses v0.3.0 (type: Code)"));
		assert_eq!(entries_with(&d, "[ModCompatibility] Total mods loaded: 2"), 1);
	}

	#[test]
	fn third_party_detection() {
		let (d, _sink) = diagnostics();
		let host = FakeHost::new();
		host.add_mod(ModInfo::new("RacialEquality", "1.4.2", "Code"));
		host.add_mod(ModInfo::new("moreclasses", "2.0.0", "Content"));
		host.add_mod(ModInfo::new("carryon", "1.8.0", "Code"));

		let report = third_party(&d, &host, &ProbesConfig::default());
		assert_eq!(report.watched.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["RacialEquality"]);
		assert_eq!(report.related.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["moreclasses"]);
		assert_eq!(entries_with(&d, "RacialEquality v1.4.2 detected"), 1);
		assert_eq!(entries_with(&d, "[ModCompatibility] Detected: moreclasses v2.0.0"), 1);
		assert_eq!(d.session_summary().count(LogCategory::EnvironmentDetection), 0);
		assert_eq!(entries_with(&d, "carryon"), 0);
	}

	fn player(x: f64, y: f64, z: f64) -> HostValue {
		let pos = FakeObject::new("EntityPos").with("X", x).with("Y", y).with("Z", z).with("Dimension", 0i64);
		FakeObject::new("EntityPlayer").with("Pos", pos.into_value()).into_value()
	}

	#[test]
	fn player_environment_floors_position_and_reads_light() {
		let (d, sink) = diagnostics();
		let host = FakeHost::new();
		let pos = BlockPos { x: 12, y: 110, z: -4, dimension: 0 };
		host.set_light(pos, LightLevels { sun: 15, total: 18 });

		let reading = player_environment(&d, &host, &player(12.7, 110.0, -3.2), "join").unwrap().unwrap();
		assert_eq!(reading.pos, pos);
		assert_eq!(reading.light, Some(LightLevels { sun: 15, total: 18 }));
		assert!(sink.contains("  Sunlight: 15, Total light: 18"));
		assert_eq!(entries_with(&d, "[EnvironmentDetection] join: pos=(12,110,-4), sun=15"), 1);
	}

	#[test]
	fn player_environment_without_light_or_position() {
		let (d, _sink) = diagnostics();
		let host = FakeHost::new();
		let reading = player_environment(&d, &host, &player(1.0, 2.0, 3.0), "join").unwrap().unwrap();
		assert_eq!(reading.light, None);
		assert_eq!(entries_with(&d, "join: pos=(1,2,3), sun=unknown"), 1);

		let bare = FakeObject::new("EntityPlayer").into_value();
		assert_eq!(player_environment(&d, &host, &bare, "join").unwrap(), None);
		assert_eq!(d.session_summary().count(LogCategory::EnvironmentDetection), 1);
	}

	#[test]
	fn recipe_state_counts_resolved_targets() {
		let (d, sink) = diagnostics();
		let host = Arc::new(FakeHost::new());
		let module = host.add_module("VintagestoryAPI");
		let collectible = host.add_type(&module, COLLECTIBLE_TYPE);
		host.add_member(&collectible, "GetMaxDurability", MemberKind::Method, Visibility::PUBLIC, &["ItemStack"]);

		assert_eq!(recipe_loading_state(&d, &SymbolResolver::new(host)), 1);
		assert!(sink.contains("=== Recipe Loading State ==="));
		assert_eq!(entries_with(&d, "[RecipeLoading] Recipe hook targets: 1/3 resolved"), 1);
	}

	#[test]
	fn classification_by_prefix_then_marker() {
		let census = ClassCensus::classify(["commoner", "smithy", "BlessedSmith", "alchemist", "lordofthewilds"], "blessed");
		assert_eq!(census.vanilla, vec!["commoner", "smithy"]);
		assert_eq!(census.marked, vec!["BlessedSmith"]);
		assert_eq!(census.other, vec!["alchemist", "lordofthewilds"]);
		assert_eq!(census.total(), 5);
	}

	#[test]
	fn census_reads_the_live_class_list() {
		let (d, _sink) = diagnostics();
		let host = Arc::new(FakeHost::new());
		let directory = ClassDirectory::new(SymbolResolver::new(host.clone()));
		assert_eq!(class_census(&d, &directory, "blessed").unwrap(), None);

		let module = host.add_module(CHARACTER_SYSTEM_MODULE);
		let ty = host.add_type(&module, CHARACTER_SYSTEM_TYPE);
		host.add_member(&ty, CLASSES_PROPERTY, MemberKind::Getter, Visibility::PUBLIC, &[]);
		assert_eq!(class_census(&d, &directory, "blessed").unwrap(), None);
		assert_eq!(entries_with(&d, "CharacterSystem is NULL"), 1);

		let class = |code: &str| FakeObject::new("CharacterClass").with("Code", code).with("Traits", HostValue::List(vec!["smith".into()])).into_value();
		let list = HostValue::List(vec![class("commoner"), class("blessedsmith"), class("alchemist")]);
		host.set_instance(&ty, FakeObject::new(CHARACTER_SYSTEM_TYPE).with(CLASSES_PROPERTY, list).into_value());

		let census = class_census(&d, &directory, "blessed").unwrap().unwrap();
		assert_eq!(census.total(), 3);
		assert_eq!(entries_with(&d, "[CharacterSystem] Classes detected: 1 vanilla, 1 marked, 1 other"), 1);
		assert_eq!(entries_with(&d, "Class blessedsmith: 1 traits"), 1);
	}

	#[test]
	fn census_propagates_throwing_getters() {
		let (d, _sink) = diagnostics();
		let host = Arc::new(FakeHost::new());
		let module = host.add_module(CHARACTER_SYSTEM_MODULE);
		let ty = host.add_type(&module, CHARACTER_SYSTEM_TYPE);
		host.set_instance(&ty, FakeObject::new(CHARACTER_SYSTEM_TYPE).throwing_on(CLASSES_PROPERTY).into_value());
		let directory = ClassDirectory::new(SymbolResolver::new(host));
		assert!(class_census(&d, &directory, "blessed").is_err());
	}
}
