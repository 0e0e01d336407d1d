#![allow(unused_crate_dependencies)]

use std::sync::Arc;

use hookwatch_diagnostics::{LogCategory, MemorySink, Severity};
use hookwatch_host::fake::{FakeHost, FakeObject, FakeSubject};
use hookwatch_host::{BlockPos, HostValue, LightLevels, MemberHandle, MemberKind, ModInfo, TypeHandle, Visibility};
use hookwatch_instrument::classes::{CHARACTER_SYSTEM_MODULE, CHARACTER_SYSTEM_TYPE, CLASSES_PROPERTY};
use hookwatch_instrument::groups::{COLLECTIBLE_TYPE, CROCK_TYPE};
use hookwatch_instrument::{BundledGroup, HostCapabilities, InstrumentConfig, Instrumentation};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

struct Game {
	host: Arc<FakeHost>,
	system: TypeHandle,
	getter: MemberHandle,
}

impl Game {
	fn new(host: FakeHost) -> Self {
		let host = Arc::new(host);
		let game = host.add_module("VintagestoryAPI");
		let survival = host.add_module(CHARACTER_SYSTEM_MODULE);

		let system = host.add_type(&survival, CHARACTER_SYSTEM_TYPE);
		let getter = host.add_member(&system, CLASSES_PROPERTY, MemberKind::Getter, Visibility::PUBLIC, &[]);
		host.add_member(&system, "LoadCharacterClasses", MemberKind::Method, Visibility::NON_PUBLIC, &[]);
		host.add_member(&system, "GetClass", MemberKind::Method, Visibility::PUBLIC, &["System.String"]);

		let crock = host.add_type(&survival, CROCK_TYPE);
		host.add_member(&crock, "MatchesForCrafting", MemberKind::Method, Visibility::PUBLIC, &["ItemStack", "GridRecipe", "CraftingRecipeIngredient"]);
		let collectible = host.add_type(&game, COLLECTIBLE_TYPE);
		host.add_member(&collectible, "OnCreatedByCrafting", MemberKind::Method, Visibility::PUBLIC, &["ItemSlot[]", "ItemSlot", "GridRecipe"]);
		host.add_member(&collectible, "GetMaxDurability", MemberKind::Method, Visibility::PUBLIC, &["ItemStack"]);

		host.add_mod(ModInfo::new("game", "1.21.0", "Code"));
		host.add_mod(ModInfo::new("blessedclasses", "0.3.0", "Code"));
		host.add_mod(ModInfo::new("RacialEquality", "1.4.2", "Code"));
		Self { host, system, getter }
	}

	fn load_classes(&self, codes: &[&str]) {
		let classes = codes
			.iter()
			.map(|code| FakeObject::new("Vintagestory.GameContent.CharacterClass").with("Code", *code).with("Traits", HostValue::List(vec![])).into_value())
			.collect();
		let system = FakeObject::new(CHARACTER_SYSTEM_TYPE).with(CLASSES_PROPERTY, HostValue::List(classes));
		self.host.set_instance(&self.system, system.into_value());
	}

	fn start(&self, config: InstrumentConfig) -> (Instrumentation, Arc<MemorySink>) {
		let sink = Arc::new(MemorySink::new());
		let instrumentation = Instrumentation::initialize(sink.clone(), config, HostCapabilities::from_host(self.host.clone()));
		(instrumentation, sink)
	}
}

#[test]
fn server_startup_installs_every_group_and_probes_mods() {
	init_tracing();
	let game = Game::new(FakeHost::new());
	let (inst, sink) = game.start(InstrumentConfig::default());

	let groups: Vec<_> = inst.install_reports().iter().map(|r| r.group.as_str()).collect();
	assert_eq!(groups, vec!["trait-diagnostics", "crafting-compat", "durability-bonus"]);
	assert!(inst.install_reports().iter().all(|r| r.failures.is_empty()));
	assert!(game.host.owner_patch_count("hookwatch") > 0);
	assert_eq!(game.host.patch_count(game.getter), 1);

	assert!(sink.contains(&format!("hookwatch v{}", env!("CARGO_PKG_VERSION"))));
	assert!(sink.contains("RacialEquality detected: v1.4.2"));
	let summary = inst.diagnostics().session_summary();
	assert_eq!(summary.count(LogCategory::ModCompatibility), 4);
	assert_eq!(summary.count(LogCategory::EnvironmentDetection), 0);
	assert_eq!(summary.count(LogCategory::RuntimeError), 0);
}

#[test]
fn client_startup_skips_server_only_groups() {
	init_tracing();
	let game = Game::new(FakeHost::client());
	let (inst, sink) = game.start(InstrumentConfig::default());

	let manager = inst.manager().unwrap();
	assert!(!manager.is_installed(BundledGroup::TraitDiagnostics.name()));
	assert!(manager.is_installed(BundledGroup::CraftingCompat.name()));
	assert_eq!(game.host.patch_count(game.getter), 0);
	assert!(sink.contains("trait-diagnostics hooks skipped (client side)"));
}

#[rstest]
#[case::all(&[BundledGroup::TraitDiagnostics, BundledGroup::CraftingCompat, BundledGroup::DurabilityBonus], 3)]
#[case::crafting_only(&[BundledGroup::CraftingCompat], 1)]
#[case::none(&[], 0)]
fn only_enabled_groups_are_installed(#[case] enabled: &[BundledGroup], #[case] expected: usize) {
	let game = Game::new(FakeHost::new());
	let mut config = InstrumentConfig::default();
	config.groups.enabled = enabled.to_vec();
	let (inst, _sink) = game.start(config);
	assert_eq!(inst.install_reports().len(), expected);
	assert_eq!(inst.manager().unwrap().installed_groups().len(), expected);
}

#[test]
fn joining_subjects_are_migrated_once() {
	let game = Game::new(FakeHost::new());
	let (inst, sink) = game.start(InstrumentConfig::default());

	let mut subject = FakeSubject::new("player-1", Some("commoner"));
	let event = inst.on_subject_join(&mut subject).unwrap();
	assert_eq!((event.from.as_str(), event.to.as_str()), ("commoner", "lordofthewilds"));
	assert_eq!(subject.identifier.as_deref(), Some("lordofthewilds"));
	assert!(subject.synced);
	assert_eq!(subject.notifications.len(), 1);

	assert!(inst.on_subject_join(&mut subject).is_none());
	assert_eq!(subject.writes, 1);
	assert_eq!(inst.diagnostics().session().entries().iter().filter(|e| e.contains("MIGRATION: player-1 | commoner -> lordofthewilds")).count(), 1);
	assert!(sink.messages_at(Severity::Error).is_empty());
}

#[test]
fn joining_players_have_their_surroundings_logged() {
	let game = Game::new(FakeHost::new());
	game.host.set_light(BlockPos { x: 510, y: 3, z: 7, dimension: 0 }, LightLevels { sun: 0, total: 4 });
	let (inst, sink) = game.start(InstrumentConfig::default());

	let pos = FakeObject::new("Vintagestory.API.Common.Entities.EntityPos").with("X", 510.5).with("Y", 3.0).with("Z", 7.9).with("Dimension", 0i64);
	let mut subject = FakeSubject::new("player-1", Some("hunter"));
	subject.entity = Some(FakeObject::new("Vintagestory.API.Common.EntityPlayer").with("Pos", pos.into_value()).into_value());

	assert!(inst.on_subject_join(&mut subject).is_some());
	assert!(sink.contains("Player environment (join):"));
	let entries = inst.diagnostics().session().entries();
	assert_eq!(entries.iter().filter(|e| e.contains("[EnvironmentDetection] join: pos=(510,3,7), sun=0")).count(), 1);
}

#[test]
fn invalid_migration_table_falls_back_to_vanilla() {
	let game = Game::new(FakeHost::new());
	let mut config = InstrumentConfig::default();
	config.migration.table.insert("lordofthewilds".to_string(), "commoner".to_string());
	let (inst, _sink) = game.start(config);

	assert_eq!(inst.diagnostics().session_summary().count(LogCategory::RuntimeError), 1);
	let mut subject = FakeSubject::new("player-1", Some("hunter"));
	assert_eq!(inst.on_subject_join(&mut subject).map(|e| e.to), Some("lordofthehunt".to_string()));
}

#[test]
fn census_runs_after_assets_load() {
	let game = Game::new(FakeHost::new());
	let (inst, _sink) = game.start(InstrumentConfig::default());
	assert_eq!(inst.after_assets_loaded(), None);

	game.load_classes(&["commoner", "blessedsmith", "alchemist"]);
	let census = inst.after_assets_loaded().unwrap();
	assert_eq!(census.vanilla, vec!["commoner"]);
	assert_eq!(census.marked, vec!["blessedsmith"]);
	assert_eq!(census.other, vec!["alchemist"]);
	let entries = inst.diagnostics().session().entries();
	assert_eq!(entries.iter().filter(|e| e.contains("[RecipeLoading] Recipe hook targets: 3/3 resolved")).count(), 2);
}

#[test]
fn shutdown_unpatches_and_reports_once() {
	init_tracing();
	let game = Game::new(FakeHost::new());
	let (inst, sink) = game.start(InstrumentConfig::default());
	let mut subject = FakeSubject::new("player-1", Some("tailor"));
	inst.on_subject_join(&mut subject);

	let summary = inst.shutdown().unwrap();
	assert_eq!(summary.count(LogCategory::CharacterSystem), 1);
	assert!(summary.recent_errors.is_empty());
	assert_eq!(game.host.owner_patch_count("hookwatch"), 0);
	assert!(inst.manager().is_none(), "hooks must not be reinstallable after shutdown");
	assert!(sink.contains("=== Session Diagnostic Summary ==="));

	assert!(!inst.diagnostics().is_initialized());
	assert!(inst.shutdown().is_none());
	assert!(inst.after_assets_loaded().is_none());
	assert!(inst.on_subject_join(&mut FakeSubject::new("player-2", Some("hunter"))).is_none());
}
