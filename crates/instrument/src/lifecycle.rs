//! Host-facing entry points: initialize, asset hook, join trigger, shutdown.

use std::convert::Infallible;
use std::sync::Arc;

use hookwatch_diagnostics::{Diagnostics, LogCategory, LogSink, SessionSummary};
use hookwatch_host::{HostIntrospect, HostSide, MigrationSubject, ModCatalog, PatchHost};
use hookwatch_intercept::{InstallReport, InterceptionManager, SymbolResolver};
use hookwatch_migration::{ClassMigrationTable, MigrationEngine, MigrationEvent};
use strum::IntoEnumIterator;

use crate::InstrumentConfig;
use crate::classes::ClassDirectory;
use crate::groups::{self, BundledGroup, GroupEnv};
use crate::probes::{self, ClassCensus};

/// Capabilities the host hands over at initialization.
#[derive(Clone)]
pub struct HostCapabilities {
	pub introspect: Arc<dyn HostIntrospect>,
	pub patcher: Arc<dyn PatchHost>,
	pub catalog: Arc<dyn ModCatalog>,
}

impl HostCapabilities {
	/// All three capabilities from one host object.
	pub fn from_host<H>(host: Arc<H>) -> Self
	where
		H: HostIntrospect + PatchHost + ModCatalog + 'static,
	{
		Self {
			introspect: host.clone(),
			patcher: host.clone(),
			catalog: host,
		}
	}
}

/// Everything hookwatch keeps for one process run.
///
/// Constructed once by [`Instrumentation::initialize`] and passed by
/// reference to the host's event handlers. Nothing is reachable through
/// statics.
pub struct Instrumentation {
	config: Arc<InstrumentConfig>,
	diagnostics: Arc<Diagnostics>,
	manager: InterceptionManager,
	migration: MigrationEngine,
	classes: ClassDirectory,
	catalog: Arc<dyn ModCatalog>,
	side: HostSide,
	install_reports: Vec<InstallReport>,
}

impl Instrumentation {
	/// Starts diagnostics, installs the enabled hook groups and runs the mod probes.
	///
	/// Never fails: an unusable migration table from `config` falls back to
	/// the vanilla mappings and is reported as a runtime error.
	pub fn initialize(sink: Arc<dyn LogSink>, config: InstrumentConfig, host: HostCapabilities) -> Self {
		let config = Arc::new(config);
		let diagnostics = Arc::new(Diagnostics::new(config.tag.clone(), config.session_log.policy()));
		diagnostics.initialize(sink);
		diagnostics.notify(format_args!("hookwatch v{}", env!("CARGO_PKG_VERSION")));
		tracing::info!(owner = %config.owner_id, "instrumentation.init");

		let table = config.migration.build_table().unwrap_or_else(|err| {
			diagnostics.log_error(LogCategory::RuntimeError, "migration table rejected; using vanilla mappings", Some(&err));
			ClassMigrationTable::vanilla()
		});
		let resolver = SymbolResolver::new(host.introspect.clone());
		let mut this = Self {
			manager: InterceptionManager::new(config.owner_id.clone(), resolver.clone(), host.patcher, diagnostics.clone()),
			migration: MigrationEngine::new(Arc::new(table), diagnostics.clone()),
			classes: ClassDirectory::new(resolver),
			catalog: host.catalog,
			side: host.introspect.side(),
			install_reports: Vec::new(),
			config,
			diagnostics,
		};
		this.install_reports = this.install_groups();
		this.run_mod_probes();
		this
	}

	fn install_groups(&self) -> Vec<InstallReport> {
		let env = GroupEnv {
			config: self.config.clone(),
			diagnostics: self.diagnostics.clone(),
			classes: self.classes.clone(),
		};
		let mut reports = Vec::new();
		for group in BundledGroup::iter().filter(|g| self.config.is_enabled(*g)) {
			if group.server_only() && self.side == HostSide::Client {
				self.diagnostics.verbose(format_args!("{group} hooks skipped (client side)"));
				continue;
			}
			reports.push(self.manager.install_group(group.name(), groups::specs(group, &env)));
		}
		self.diagnostics.verbose("Diagnostic patches applied");
		reports
	}

	fn run_mod_probes(&self) {
		let d = &self.diagnostics;
		let _ = d.protect("mod load order", || Ok::<_, Infallible>(probes::mod_load_order(d, self.catalog.as_ref())));
		let _ = d.protect("third-party mod detection", || Ok::<_, Infallible>(probes::third_party(d, self.catalog.as_ref(), &self.config.probes)));
	}

	/// Logs the recipe hook targets and runs the class census once the host
	/// has loaded its assets.
	pub fn after_assets_loaded(&self) -> Option<ClassCensus> {
		if !self.diagnostics.is_initialized() {
			return None;
		}
		let _ = self
			.diagnostics
			.protect("recipe loading state", || Ok::<_, Infallible>(probes::recipe_loading_state(&self.diagnostics, self.classes.resolver())));
		self.diagnostics
			.protect("character class census", || probes::class_census(&self.diagnostics, &self.classes, &self.config.probes.class_marker))
			.ok()
			.flatten()
	}

	/// Subject-join trigger: logs where the subject spawned, then migrates a
	/// legacy class identifier at most once.
	pub fn on_subject_join(&self, subject: &mut dyn MigrationSubject) -> Option<MigrationEvent> {
		if let Some(entity) = subject.entity().filter(|_| self.diagnostics.is_initialized()) {
			let host = self.classes.resolver().host().as_ref();
			let _ = self.diagnostics.protect("player environment", || probes::player_environment(&self.diagnostics, host, &entity, "join"));
		}
		self.migration.on_trigger(subject)
	}

	/// Uninstalls every hook group, reports the session and resets diagnostics.
	///
	/// Returns the final summary; later calls are no-ops returning `None`.
	pub fn shutdown(&self) -> Option<SessionSummary> {
		if !self.diagnostics.is_initialized() {
			return None;
		}
		let removed = self.manager.uninstall_all();
		self.diagnostics.verbose(format_args!("Unpatched {removed} hooks"));
		let summary = self.diagnostics.report_session();
		self.diagnostics.shutdown();
		tracing::info!(removed, "instrumentation.shutdown");
		summary
	}

	pub fn config(&self) -> &InstrumentConfig {
		&self.config
	}

	/// Shared diagnostics handle, also used by the host's class-change commands.
	pub fn diagnostics(&self) -> &Arc<Diagnostics> {
		&self.diagnostics
	}

	/// Hook manager, `None` once [`Instrumentation::shutdown`] has run.
	pub fn manager(&self) -> Option<&InterceptionManager> {
		self.diagnostics.is_initialized().then_some(&self.manager)
	}

	/// Reports from the startup group installation, in install order.
	pub fn install_reports(&self) -> &[InstallReport] {
		&self.install_reports
	}
}
