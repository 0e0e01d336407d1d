//! Reflective access to the host's character class system.

use hookwatch_host::{HostError, HostValue};
use hookwatch_intercept::SymbolResolver;

use crate::reflect::contains_ignore_case;

/// Declaring type of the class system. Server builds only.
pub const CHARACTER_SYSTEM_TYPE: &str = "Vintagestory.ServerMods.CharacterSystem";
/// Module the class system lives in.
pub const CHARACTER_SYSTEM_MODULE: &str = "VSSurvivalMod";
/// Property holding the loaded classes.
pub const CLASSES_PROPERTY: &str = "characterClasses";

/// Code and traits read off one host class object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassView {
	pub code: Option<String>,
	pub traits: Vec<String>,
}

impl ClassView {
	/// Reads a class object; `None` for null and non-object values.
	pub fn read(value: &HostValue) -> Result<Option<Self>, HostError> {
		if value.as_object().is_none() {
			return Ok(None);
		}
		Ok(Some(Self {
			code: value.string_property("Code")?,
			traits: value.string_list("Traits")?.unwrap_or_default(),
		}))
	}

	pub fn code(&self) -> &str {
		self.code.as_deref().unwrap_or("")
	}

	/// Whether the code carries `marker`, case-insensitively.
	pub fn code_marked(&self, marker: &str) -> bool {
		self.code.as_deref().is_some_and(|code| contains_ignore_case(code, marker))
	}

	/// Whether the code or any trait carries `marker`.
	pub fn is_marked(&self, marker: &str) -> bool {
		self.code_marked(marker) || self.traits.iter().any(|t| contains_ignore_case(t, marker))
	}

	pub fn has_trait(&self, code: &str) -> bool {
		self.traits.iter().any(|t| t == code)
	}
}

/// Reads a class list, skipping null items. `None` when `list` is not a list.
pub fn read_classes(list: &HostValue) -> Result<Option<Vec<ClassView>>, HostError> {
	let Some(items) = list.as_list() else {
		return Ok(None);
	};
	let mut classes = Vec::with_capacity(items.len());
	for item in items {
		if let Some(class) = ClassView::read(item)? {
			classes.push(class);
		}
	}
	Ok(Some(classes))
}

/// Outcome of looking the class list up through the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassLookup {
	/// The class system type is not loaded (client builds).
	NoSystem,
	/// The type exists but the host has no live instance.
	NoInstance,
	/// The instance exposes no class list yet.
	NoList,
	Classes(Vec<ClassView>),
}

impl ClassLookup {
	pub fn into_classes(self) -> Option<Vec<ClassView>> {
		match self {
			Self::Classes(classes) => Some(classes),
			_ => None,
		}
	}
}

/// Finds the class system instance by name and reads its classes.
#[derive(Clone)]
pub struct ClassDirectory {
	resolver: SymbolResolver,
}

impl ClassDirectory {
	pub fn new(resolver: SymbolResolver) -> Self {
		Self { resolver }
	}

	pub fn resolver(&self) -> &SymbolResolver {
		&self.resolver
	}

	pub fn lookup(&self) -> Result<ClassLookup, HostError> {
		let Some(ty) = self.resolver.resolve_type_in(CHARACTER_SYSTEM_MODULE, CHARACTER_SYSTEM_TYPE) else {
			return Ok(ClassLookup::NoSystem);
		};
		let Some(system) = self.resolver.host().instance_of(&ty) else {
			return Ok(ClassLookup::NoInstance);
		};
		let list = system.property(CLASSES_PROPERTY)?.unwrap_or_default();
		Ok(read_classes(&list)?.map_or(ClassLookup::NoList, ClassLookup::Classes))
	}

	/// The class with exactly `code`, if the list is available and has one.
	pub fn find(&self, code: &str) -> Result<Option<ClassView>, HostError> {
		let classes = self.lookup()?.into_classes().unwrap_or_default();
		Ok(classes.into_iter().find(|c| c.code.as_deref() == Some(code)))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use hookwatch_host::fake::{FakeHost, FakeObject};
	use pretty_assertions::assert_eq;

	use super::*;

	fn class(code: &str, traits: &[&str]) -> HostValue {
		let traits = traits.iter().map(|t| HostValue::from(*t)).collect();
		FakeObject::new("Vintagestory.GameContent.CharacterClass")
			.with("Code", code)
			.with("Traits", HostValue::List(traits))
			.into_value()
	}

	fn directory(host: Arc<FakeHost>) -> ClassDirectory {
		ClassDirectory::new(SymbolResolver::new(host))
	}

	#[test]
	fn lookup_degrades_step_by_step() {
		let host = Arc::new(FakeHost::new());
		assert_eq!(directory(host.clone()).lookup().unwrap(), ClassLookup::NoSystem);

		let module = host.add_module(CHARACTER_SYSTEM_MODULE);
		let ty = host.add_type(&module, CHARACTER_SYSTEM_TYPE);
		assert_eq!(directory(host.clone()).lookup().unwrap(), ClassLookup::NoInstance);

		host.set_instance(&ty, FakeObject::new(CHARACTER_SYSTEM_TYPE).into_value());
		assert_eq!(directory(host.clone()).lookup().unwrap(), ClassLookup::NoList);

		let list = HostValue::List(vec![class("commoner", &["weak"]), HostValue::Null, class("blessedsmith", &["smith"])]);
		host.set_instance(&ty, FakeObject::new(CHARACTER_SYSTEM_TYPE).with(CLASSES_PROPERTY, list).into_value());
		let classes = directory(host.clone()).lookup().unwrap().into_classes().unwrap();
		assert_eq!(classes.len(), 2);
		assert_eq!(directory(host).find("blessedsmith").unwrap().map(|c| c.traits), Some(vec!["smith".to_string()]));
	}

	#[test]
	fn markers_match_code_or_traits() {
		let by_code = ClassView::read(&class("BlessedHunter", &[])).unwrap().unwrap();
		let by_trait = ClassView::read(&class("wanderer", &["blessed-foot"])).unwrap().unwrap();
		let plain = ClassView::read(&class("tailor", &["sewing"])).unwrap().unwrap();
		assert!(by_code.is_marked("blessed") && by_code.code_marked("blessed"));
		assert!(by_trait.is_marked("blessed") && !by_trait.code_marked("blessed"));
		assert!(!plain.is_marked("blessed"));
		assert!(plain.has_trait("sewing"));
		assert_eq!(ClassView::read(&HostValue::Null).unwrap(), None);
	}
}
