//! Runtime lookup of host types and members by name.
//!
//! Lookups never fail loudly. A missing symbol is normal (client builds do
//! not load server modules, host updates move things around) and comes back
//! as `None`; callers skip whatever depended on it.

use std::sync::Arc;

use hookwatch_host::{HostIntrospect, MemberHandle, MemberInfo, MemberKind, TypeHandle, Visibility};

use crate::{MemberTarget, TargetKind};

/// A member located by the resolver, ready for patching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
	pub declaring_type: String,
	pub member_name: String,
	pub signature: Option<Vec<String>>,
	pub kind: MemberKind,
	pub handle: MemberHandle,
}

impl ResolvedMember {
	fn from_info(ty: &TypeHandle, info: MemberInfo) -> Self {
		Self {
			declaring_type: ty.full_name.clone(),
			member_name: info.name,
			signature: Some(info.params),
			kind: info.kind,
			handle: info.handle,
		}
	}
}

/// Name-based symbol lookup over the host's introspection capability.
#[derive(Clone)]
pub struct SymbolResolver {
	host: Arc<dyn HostIntrospect>,
}

impl SymbolResolver {
	pub fn new(host: Arc<dyn HostIntrospect>) -> Self {
		Self { host }
	}

	pub fn host(&self) -> &Arc<dyn HostIntrospect> {
		&self.host
	}

	/// Finds a type by exact full name across all loaded modules.
	///
	/// When several modules declare the same name the first one in host
	/// enumeration order wins.
	pub fn resolve_type(&self, full_name: &str) -> Option<TypeHandle> {
		let found = self.host.modules().iter().find_map(|module| self.host.find_type(module, full_name));
		if found.is_none() {
			tracing::trace!(type_name = full_name, "resolve.type.miss");
		}
		found
	}

	/// Finds a type declared in the module called `module_name`.
	pub fn resolve_type_in(&self, module_name: &str, full_name: &str) -> Option<TypeHandle> {
		let modules = self.host.modules();
		let Some(module) = modules.iter().find(|m| m.name == module_name) else {
			tracing::trace!(module = module_name, "resolve.module.miss");
			return None;
		};
		self.host.find_type(module, full_name)
	}

	/// Finds a method (or getter) by name, visibility and optional exact signature.
	///
	/// Without a signature the first member in declaration order that matches
	/// name and visibility is returned. Setters are never matched here.
	pub fn resolve_member(&self, ty: &TypeHandle, name: &str, visibility: Visibility, signature: Option<&[String]>) -> Option<ResolvedMember> {
		self.find_member(ty, name, visibility, signature, |kind| kind != MemberKind::Setter)
	}

	/// Finds the getter of a property.
	pub fn resolve_getter(&self, ty: &TypeHandle, property: &str, visibility: Visibility) -> Option<ResolvedMember> {
		self.find_member(ty, property, visibility, None, |kind| kind == MemberKind::Getter)
	}

	/// Resolves a full [`MemberTarget`].
	pub fn resolve(&self, target: &MemberTarget) -> Option<ResolvedMember> {
		let ty = match &target.module {
			Some(module) => self.resolve_type_in(module, &target.type_name),
			None => self.resolve_type(&target.type_name),
		}?;
		match target.kind {
			TargetKind::Method => self.find_member(&ty, &target.member, target.visibility, target.signature.as_deref(), |kind| kind == MemberKind::Method),
			TargetKind::Getter => self.resolve_getter(&ty, &target.member, target.visibility),
		}
	}

	fn find_member(&self, ty: &TypeHandle, name: &str, visibility: Visibility, signature: Option<&[String]>, kind_ok: impl Fn(MemberKind) -> bool) -> Option<ResolvedMember> {
		let found = self
			.host
			.members(ty)
			.into_iter()
			.filter(|m| m.name == name && kind_ok(m.kind) && visibility.intersects(m.visibility))
			.find(|m| signature.is_none_or(|sig| m.params.as_slice() == sig))
			.map(|info| ResolvedMember::from_info(ty, info));
		if found.is_none() {
			tracing::trace!(type_name = %ty.full_name, member = name, "resolve.member.miss");
		}
		found
	}
}
