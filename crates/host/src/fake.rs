//! In-memory host used by tests across the workspace.
//!
//! [`FakeHost`] models just enough of a reflective, patchable host: modules
//! declare types, types declare members, and [`FakeHost::invoke`] runs a
//! member the way a real patch primitive would (before-callbacks, original,
//! after-callbacks).

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::Mutex;

use crate::{
	AfterCall, BeforeCall, BlockPos, HostError, HostIntrospect, HostSide, HostValue, LightLevels, MemberHandle, MemberInfo, MemberKind, MigrationSubject,
	ModCatalog, ModInfo, ModuleInfo, Patch, PatchHost, PatchId, Reflect, TypeHandle, Visibility,
};

struct FakeType {
	handle: TypeHandle,
	members: Vec<MemberInfo>,
	instance: Option<HostValue>,
}

struct AppliedPatch {
	id: PatchId,
	owner: String,
	member: MemberHandle,
	patch: Patch,
}

#[derive(Default)]
struct FakeState {
	modules: Vec<ModuleInfo>,
	types: Vec<FakeType>,
	patches: Vec<AppliedPatch>,
	rejected: HashSet<MemberHandle>,
	mods: Vec<ModInfo>,
	light: HashMap<BlockPos, LightLevels>,
	next_id: u64,
}

impl FakeState {
	fn next_id(&mut self) -> u64 {
		self.next_id += 1;
		self.next_id
	}
}

/// Reflective, patchable host kept entirely in memory.
#[derive(Default)]
pub struct FakeHost {
	side: HostSide,
	state: Mutex<FakeState>,
}

impl FakeHost {
	/// Server-side host with nothing loaded.
	pub fn new() -> Self {
		Self::default()
	}

	/// Client-side host with nothing loaded.
	pub fn client() -> Self {
		Self {
			side: HostSide::Client,
			state: Mutex::default(),
		}
	}

	pub fn add_module(&self, name: &str) -> ModuleInfo {
		let mut state = self.state.lock();
		let module = ModuleInfo {
			name: name.to_string(),
			id: state.next_id(),
		};
		state.modules.push(module.clone());
		module
	}

	pub fn add_type(&self, module: &ModuleInfo, full_name: &str) -> TypeHandle {
		let mut state = self.state.lock();
		let handle = TypeHandle {
			full_name: full_name.to_string(),
			module: module.name.clone(),
			id: state.next_id(),
		};
		state.types.push(FakeType {
			handle: handle.clone(),
			members: Vec::new(),
			instance: None,
		});
		handle
	}

	pub fn add_member(&self, ty: &TypeHandle, name: &str, kind: MemberKind, visibility: Visibility, params: &[&str]) -> MemberHandle {
		let mut state = self.state.lock();
		let handle = MemberHandle(state.next_id());
		if let Some(fake) = state.types.iter_mut().find(|t| t.handle == *ty) {
			fake.members.push(MemberInfo {
				name: name.to_string(),
				kind,
				visibility,
				params: params.iter().map(|p| p.to_string()).collect(),
				handle,
			});
		}
		handle
	}

	/// Registers the singleton instance returned by [`HostIntrospect::instance_of`].
	pub fn set_instance(&self, ty: &TypeHandle, instance: HostValue) {
		let mut state = self.state.lock();
		if let Some(fake) = state.types.iter_mut().find(|t| t.handle == *ty) {
			fake.instance = Some(instance);
		}
	}

	pub fn add_mod(&self, info: ModInfo) {
		self.state.lock().mods.push(info);
	}

	/// Makes [`PatchHost::apply`] fail for `member`.
	pub fn reject_patches_for(&self, member: MemberHandle) {
		self.state.lock().rejected.insert(member);
	}

	/// Number of patches currently attached to `member`.
	pub fn patch_count(&self, member: MemberHandle) -> usize {
		self.state.lock().patches.iter().filter(|p| p.member == member).count()
	}

	pub fn set_light(&self, pos: BlockPos, light: LightLevels) {
		self.state.lock().light.insert(pos, light);
	}

	/// Number of patches currently attached on behalf of `owner`.
	pub fn owner_patch_count(&self, owner: &str) -> usize {
		self.state.lock().patches.iter().filter(|p| p.owner == owner).count()
	}

	/// Invokes `member` through its attached patches.
	///
	/// Before-callbacks run in attach order until one supplies a replacement,
	/// which skips the remaining before-callbacks and `original`. All
	/// after-callbacks run in attach order; each sees the result staged by
	/// the previous one.
	pub fn invoke(&self, member: MemberHandle, instance: Option<&HostValue>, args: &[HostValue], original: impl FnOnce(&[HostValue]) -> HostValue) -> HostValue {
		let patches: Vec<Patch> = self
			.state
			.lock()
			.patches
			.iter()
			.filter(|p| p.member == member)
			.map(|p| p.patch.clone())
			.collect();

		let mut replacement = None;
		for before in patches.iter().filter_map(|p| p.before.as_ref()) {
			let mut call = BeforeCall::new(instance, args);
			before(&mut call);
			if let Some(value) = call.take_replacement() {
				replacement = Some(value);
				break;
			}
		}

		let mut result = match replacement {
			Some(value) => value,
			None => original(args),
		};

		for after in patches.iter().filter_map(|p| p.after.as_ref()) {
			let mut call = AfterCall::new(instance, args, &result);
			after(&mut call);
			if let Some(value) = call.take_replacement() {
				result = value;
			}
		}
		result
	}
}

impl HostIntrospect for FakeHost {
	fn side(&self) -> HostSide {
		self.side
	}

	fn modules(&self) -> Vec<ModuleInfo> {
		self.state.lock().modules.clone()
	}

	fn find_type(&self, module: &ModuleInfo, full_name: &str) -> Option<TypeHandle> {
		self.state
			.lock()
			.types
			.iter()
			.find(|t| t.handle.module == module.name && t.handle.full_name == full_name)
			.map(|t| t.handle.clone())
	}

	fn members(&self, ty: &TypeHandle) -> Vec<MemberInfo> {
		self.state
			.lock()
			.types
			.iter()
			.find(|t| t.handle == *ty)
			.map(|t| t.members.clone())
			.unwrap_or_default()
	}

	fn instance_of(&self, ty: &TypeHandle) -> Option<HostValue> {
		self.state.lock().types.iter().find(|t| t.handle == *ty).and_then(|t| t.instance.clone())
	}

	fn light_at(&self, pos: &BlockPos) -> Option<LightLevels> {
		self.state.lock().light.get(pos).copied()
	}
}

impl PatchHost for FakeHost {
	fn apply(&self, owner: &str, member: &MemberHandle, patch: Patch) -> Result<PatchId, HostError> {
		let mut state = self.state.lock();
		if state.rejected.contains(member) {
			return Err(HostError::PatchRejected {
				member: format!("member#{}", member.0),
				reason: "member body cannot be instrumented".to_string(),
			});
		}
		let id = PatchId(state.next_id());
		state.patches.push(AppliedPatch {
			id,
			owner: owner.to_string(),
			member: *member,
			patch,
		});
		Ok(id)
	}

	fn remove(&self, owner: &str, id: PatchId) -> Result<(), HostError> {
		let mut state = self.state.lock();
		let before = state.patches.len();
		state.patches.retain(|p| !(p.id == id && p.owner == owner));
		if state.patches.len() == before {
			return Err(HostError::UnknownPatch(id.0));
		}
		Ok(())
	}
}

impl ModCatalog for FakeHost {
	fn mods(&self) -> Vec<ModInfo> {
		self.state.lock().mods.clone()
	}
}

/// Property-bag object.
#[derive(Debug)]
pub struct FakeObject {
	type_name: String,
	props: Mutex<BTreeMap<String, HostValue>>,
	throwing: HashSet<String>,
}

impl FakeObject {
	pub fn new(type_name: &str) -> Self {
		Self {
			type_name: type_name.to_string(),
			props: Mutex::default(),
			throwing: HashSet::new(),
		}
	}

	#[must_use]
	pub fn with(self, property: &str, value: impl Into<HostValue>) -> Self {
		self.props.lock().insert(property.to_string(), value.into());
		self
	}

	/// Makes reads of `property` fail.
	#[must_use]
	pub fn throwing_on(mut self, property: &str) -> Self {
		self.throwing.insert(property.to_string());
		self
	}

	pub fn into_value(self) -> HostValue {
		HostValue::object(self)
	}
}

impl Reflect for FakeObject {
	fn type_name(&self) -> &str {
		&self.type_name
	}

	fn get(&self, property: &str) -> Result<Option<HostValue>, HostError> {
		if self.throwing.contains(property) {
			return Err(HostError::PropertyRead {
				type_name: self.type_name.clone(),
				property: property.to_string(),
				reason: "getter threw".to_string(),
			});
		}
		Ok(self.props.lock().get(property).cloned())
	}

	fn set(&self, property: &str, value: HostValue) -> Result<(), HostError> {
		self.props.lock().insert(property.to_string(), value);
		Ok(())
	}
}

/// Joining subject with an in-memory identifier field.
#[derive(Debug, Default)]
pub struct FakeSubject {
	pub id: String,
	pub identifier: Option<String>,
	pub synced: bool,
	pub notifications: Vec<String>,
	pub writes: usize,
	/// In-world entity returned by [`MigrationSubject::entity`].
	pub entity: Option<HostValue>,
	pub fail_read: bool,
	pub fail_sync: bool,
	pub fail_notify: bool,
}

impl FakeSubject {
	pub fn new(id: &str, identifier: Option<&str>) -> Self {
		Self {
			id: id.to_string(),
			identifier: identifier.map(str::to_string),
			..Self::default()
		}
	}
}

impl MigrationSubject for FakeSubject {
	fn subject_id(&self) -> &str {
		&self.id
	}

	fn identifier(&self) -> Result<Option<String>, HostError> {
		if self.fail_read {
			return Err(HostError::SubjectUnavailable(self.id.clone()));
		}
		Ok(self.identifier.clone())
	}

	fn compare_and_set(&mut self, expected: &str, replacement: &str) -> Result<bool, HostError> {
		if self.identifier.as_deref() != Some(expected) {
			return Ok(false);
		}
		self.identifier = Some(replacement.to_string());
		self.writes += 1;
		Ok(true)
	}

	fn mark_for_sync(&mut self) -> Result<(), HostError> {
		if self.fail_sync {
			return Err(HostError::SubjectUnavailable(self.id.clone()));
		}
		self.synced = true;
		Ok(())
	}

	fn notify(&mut self, message: &str) -> Result<(), HostError> {
		if self.fail_notify {
			return Err(HostError::SubjectUnavailable(self.id.clone()));
		}
		self.notifications.push(message.to_string());
		Ok(())
	}

	fn entity(&self) -> Option<HostValue> {
		self.entity.clone()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;

	#[test]
	fn invoke_without_patches_runs_original() {
		let host = FakeHost::new();
		let module = host.add_module("Game");
		let ty = host.add_type(&module, "Game.Thing");
		let m = host.add_member(&ty, "Run", MemberKind::Method, Visibility::PUBLIC, &[]);
		let out = host.invoke(m, None, &[HostValue::Int(2)], |args| HostValue::Int(args[0].as_int().unwrap() * 10));
		assert_eq!(out, HostValue::Int(20));
	}

	#[test]
	fn replacement_skips_original_but_not_after_hooks() {
		let host = FakeHost::new();
		let module = host.add_module("Game");
		let ty = host.add_type(&module, "Game.Thing");
		let m = host.add_member(&ty, "Run", MemberKind::Method, Visibility::PUBLIC, &[]);
		let patch = Patch {
			before: Some(Arc::new(|call: &mut BeforeCall<'_>| call.skip_original(HostValue::Int(1)))),
			after: Some(Arc::new(|call: &mut AfterCall<'_>| {
				if let Some(v) = call.result.as_int() {
					call.replace_result(HostValue::Int(v + 1));
				}
			})),
		};
		host.apply("owner", &m, patch).unwrap();
		let out = host.invoke(m, None, &[], |_| panic!("original must be skipped"));
		assert_eq!(out, HostValue::Int(2));
	}

	#[test]
	fn remove_checks_owner() {
		let host = FakeHost::new();
		let id = host.apply("a", &MemberHandle(1), Patch::default()).unwrap();
		assert_eq!(host.remove("b", id), Err(HostError::UnknownPatch(id.0)));
		assert_eq!(host.remove("a", id), Ok(()));
		assert_eq!(host.owner_patch_count("a"), 0);
	}

	#[test]
	fn subject_compare_and_set_guards_on_current_value() {
		let mut subject = FakeSubject::new("ana", Some("hunter"));
		assert_eq!(subject.compare_and_set("commoner", "x"), Ok(false));
		assert_eq!(subject.compare_and_set("hunter", "lordofthehunt"), Ok(true));
		assert_eq!(subject.identifier.as_deref(), Some("lordofthehunt"));
		assert_eq!(subject.writes, 1);
	}
}
