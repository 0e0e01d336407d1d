//! Reflection surface: modules, types and members looked up by name.

use crate::HostValue;

/// Which half of a split client/server host is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostSide {
	Client,
	#[default]
	Server,
}

/// A loaded module (assembly, shared object, plugin image).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleInfo {
	/// Module name as reported by the host.
	pub name: String,
	/// Host-assigned identifier, stable for the process lifetime.
	pub id: u64,
}

/// Opaque handle to a resolved host type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
	/// Declared fully qualified name.
	pub full_name: String,
	/// Name of the module that declared it.
	pub module: String,
	/// Host-assigned identifier.
	pub id: u64,
}

/// Opaque handle to a resolved host member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberHandle(pub u64);

/// Kind of member exposed by a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
	Method,
	/// Property getter; named after the property.
	Getter,
	/// Property setter; named after the property.
	Setter,
}

bitflags::bitflags! {
	/// Visibility filter for member lookup.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Visibility: u8 {
		const PUBLIC = 1 << 0;
		const NON_PUBLIC = 1 << 1;
	}
}

impl Visibility {
	/// Public and non-public members alike.
	pub const ANY: Self = Self::PUBLIC.union(Self::NON_PUBLIC);
}

/// Integer block coordinates within one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
	pub x: i64,
	pub y: i64,
	pub z: i64,
	pub dimension: i64,
}

/// Light levels measured at one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightLevels {
	/// Sunlight only.
	pub sun: u8,
	/// Brightest of sun and block light.
	pub total: u8,
}

/// One member as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
	pub name: String,
	pub kind: MemberKind,
	/// Exactly one of the two visibility bits.
	pub visibility: Visibility,
	/// Parameter type names in declaration order.
	pub params: Vec<String>,
	pub handle: MemberHandle,
}

/// Host reflection capability.
///
/// All lookups are best-effort: hosts that lack a module or type simply
/// return nothing.
pub trait HostIntrospect: Send + Sync {
	/// Side of the host this process runs.
	fn side(&self) -> HostSide {
		HostSide::Server
	}

	/// Currently loaded modules, in the host's enumeration order.
	fn modules(&self) -> Vec<ModuleInfo>;

	/// Looks up a type declared in `module` by exact full name.
	fn find_type(&self, module: &ModuleInfo, full_name: &str) -> Option<TypeHandle>;

	/// Members declared on `ty`, in declaration order.
	fn members(&self, ty: &TypeHandle) -> Vec<MemberInfo>;

	/// The live singleton instance of `ty`, for host subsystems that have one.
	fn instance_of(&self, _ty: &TypeHandle) -> Option<HostValue> {
		None
	}

	/// Light at `pos`, for hosts that expose a world. Client builds and
	/// unloaded chunks return `None`.
	fn light_at(&self, _pos: &BlockPos) -> Option<LightLevels> {
		None
	}
}
