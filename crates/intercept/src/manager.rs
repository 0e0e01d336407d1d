//! Grouped, idempotent hook installation.
//!
//! A group moves `Uninstalled -> Installed -> Uninstalled` only through
//! [`InterceptionManager::install_group`] and
//! [`InterceptionManager::uninstall_group`]. Installation is per spec: specs
//! whose target is missing or rejected are skipped and reported, the rest
//! are installed.

use std::sync::Arc;

use hookwatch_diagnostics::{Diagnostics, Guarded, LogCategory, run_guarded};
use hookwatch_host::{AfterCall, AfterHook, BeforeCall, BeforeHook, Patch, PatchHost, PatchId};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{AfterFn, BeforeFn, HookSpec, InstallError, SymbolResolver};

/// Result of one [`InterceptionManager::install_group`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
	pub group: String,
	/// The group was already installed; nothing was done.
	pub already_installed: bool,
	/// Targets patched by this call.
	pub installed: Vec<String>,
	/// Specs that were skipped, with the reason.
	pub failures: Vec<InstallError>,
}

impl InstallReport {
	fn noop(group: &str) -> Self {
		Self {
			group: group.to_string(),
			already_installed: true,
			..Self::default()
		}
	}
}

#[derive(Debug)]
struct InstalledHook {
	target: String,
	patch: PatchId,
}

/// Owns every hook group installed on behalf of one owner identity.
pub struct InterceptionManager {
	owner: String,
	resolver: SymbolResolver,
	patcher: Arc<dyn PatchHost>,
	diagnostics: Arc<Diagnostics>,
	/// Installed groups by name. Presence is the "already patched" flag; the
	/// lock is held for a whole install so racing installs serialize.
	groups: Mutex<FxHashMap<String, Vec<InstalledHook>>>,
}

impl InterceptionManager {
	/// `owner` is the host-unique identity patches are applied under.
	pub fn new(owner: impl Into<String>, resolver: SymbolResolver, patcher: Arc<dyn PatchHost>, diagnostics: Arc<Diagnostics>) -> Self {
		Self {
			owner: owner.into(),
			resolver,
			patcher,
			diagnostics,
			groups: Mutex::new(FxHashMap::default()),
		}
	}

	pub fn owner(&self) -> &str {
		&self.owner
	}

	pub fn resolver(&self) -> &SymbolResolver {
		&self.resolver
	}

	pub fn is_installed(&self, group: &str) -> bool {
		self.groups.lock().contains_key(group)
	}

	/// Names of installed groups, sorted.
	pub fn installed_groups(&self) -> Vec<String> {
		let mut names: Vec<String> = self.groups.lock().keys().cloned().collect();
		names.sort();
		names
	}

	/// Number of live patches in `group`.
	pub fn hook_count(&self, group: &str) -> usize {
		self.groups.lock().get(group).map_or(0, Vec::len)
	}

	/// Installs every resolvable spec of `group`.
	///
	/// A second call for an installed group is a no-op. An empty spec list
	/// still marks the group installed.
	pub fn install_group(&self, group: &str, specs: Vec<HookSpec>) -> InstallReport {
		let mut groups = self.groups.lock();
		if groups.contains_key(group) {
			self.diagnostics.verbose(format_args!("hook group '{group}' already installed; skipping"));
			return InstallReport::noop(group);
		}

		self.diagnostics.verbose(format_args!("installing hook group '{group}' ({} hooks)", specs.len()));
		let mut report = InstallReport {
			group: group.to_string(),
			..InstallReport::default()
		};
		let mut hooks = Vec::with_capacity(specs.len());

		for spec in specs {
			match self.install_spec(group, spec) {
				Ok(hook) => {
					self.diagnostics.verbose(format_args!("  ✓ Patched {}", hook.target));
					report.installed.push(hook.target.clone());
					hooks.push(hook);
				}
				Err(err) => {
					match &err {
						InstallError::Unresolved { target } => {
							self.diagnostics.verbose(format_args!("  {target} not found (expected on builds without it); skipped"));
						}
						InstallError::Rejected { .. } => {
							self.diagnostics.log_error(LogCategory::RuntimeError, format_args!("hook group '{group}' failed to install a hook"), Some(&err));
						}
					}
					report.failures.push(err);
				}
			}
		}

		tracing::debug!(group, owner = %self.owner, installed = report.installed.len(), failed = report.failures.len(), "hooks.group.installed");
		groups.insert(group.to_string(), hooks);
		report
	}

	fn install_spec(&self, group: &str, spec: HookSpec) -> Result<InstalledHook, InstallError> {
		let (member, before, after) = spec.into_parts();
		let target = member.to_string();
		let resolved = self.resolver.resolve(&member).ok_or_else(|| InstallError::Unresolved { target: target.clone() })?;

		let context = format!("{group}:{target}");
		let patch = Patch {
			before: before.map(|f| guard_before(self.diagnostics.clone(), format!("{context}:before"), f)),
			after: after.map(|f| guard_after(self.diagnostics.clone(), format!("{context}:after"), f)),
		};

		match run_guarded(|| self.patcher.apply(&self.owner, &resolved.handle, patch)) {
			Ok(patch) => Ok(InstalledHook { target, patch }),
			Err(fault) => Err(InstallError::Rejected {
				target,
				reason: fault.to_string(),
			}),
		}
	}

	/// Removes every hook of `group` and clears its installed flag.
	///
	/// Returns how many patches were detached. Unknown groups are a no-op.
	pub fn uninstall_group(&self, group: &str) -> usize {
		let Some(hooks) = self.groups.lock().remove(group) else {
			return 0;
		};
		let removed = self.detach(group, hooks);
		self.diagnostics.verbose(format_args!("hook group '{group}' uninstalled ({removed} hooks)"));
		removed
	}

	/// Uninstalls every group; used at shutdown.
	pub fn uninstall_all(&self) -> usize {
		let drained: Vec<(String, Vec<InstalledHook>)> = self.groups.lock().drain().collect();
		drained.into_iter().map(|(group, hooks)| self.detach(&group, hooks)).sum()
	}

	fn detach(&self, group: &str, hooks: Vec<InstalledHook>) -> usize {
		let mut removed = 0;
		for hook in hooks {
			match run_guarded(|| self.patcher.remove(&self.owner, hook.patch)) {
				Ok(()) => removed += 1,
				Err(fault) => {
					self.diagnostics.warn(format_args!("failed to remove {} from group '{group}': {fault}", hook.target));
				}
			}
		}
		removed
	}
}

/// Wraps a before-callback so failures are swallowed.
///
/// The callback works on a scratch call; a replacement result is only
/// forwarded to the host if the callback completed.
fn guard_before(diagnostics: Arc<Diagnostics>, context: String, f: BeforeFn) -> BeforeHook {
	Arc::new(move |call: &mut BeforeCall<'_>| {
		let mut scratch = BeforeCall::new(call.instance, call.args);
		if let Guarded::Completed(()) = diagnostics.protect(&context, || f(&mut scratch))
			&& let Some(result) = scratch.take_replacement()
		{
			call.skip_original(result);
		}
	})
}

/// Wraps an after-callback so failures are swallowed.
///
/// The callback reads the host result in place; a replacement it stages is
/// only committed if the callback completed.
fn guard_after(diagnostics: Arc<Diagnostics>, context: String, f: AfterFn) -> AfterHook {
	Arc::new(move |call: &mut AfterCall<'_>| {
		let mut scratch = AfterCall::new(call.instance, call.args, call.result);
		if let Guarded::Completed(()) = diagnostics.protect(&context, || f(&mut scratch))
			&& let Some(result) = scratch.take_replacement()
		{
			call.replace_result(result);
		}
	})
}
