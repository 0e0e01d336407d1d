//! Small helpers for walking host object graphs.

use hookwatch_host::{HostError, HostValue};
use hookwatch_intercept::HookError;

/// Follows a chain of property reads, stopping at the first null or missing link.
pub fn walk(value: &HostValue, path: &[&str]) -> Result<Option<HostValue>, HostError> {
	let mut current = value.clone();
	for name in path {
		match current.property(name)? {
			Some(next) => current = next,
			None => return Ok(None),
		}
	}
	Ok(Some(current))
}

/// Writes a property on an object value.
pub fn set_property(target: &HostValue, name: &str, value: HostValue) -> Result<(), HookError> {
	let Some(obj) = target.as_object() else {
		return Err(HookError::UnexpectedValue {
			expected: "object",
			found: kind(target).to_string(),
		});
	};
	obj.set(name, value)?;
	Ok(())
}

/// Short name of a value's variant, for error messages.
pub fn kind(value: &HostValue) -> &'static str {
	match value {
		HostValue::Null => "null",
		HostValue::Bool(_) => "bool",
		HostValue::Int(_) => "int",
		HostValue::Float(_) => "float",
		HostValue::Str(_) => "string",
		HostValue::List(_) => "list",
		HostValue::Object(_) => "object",
	}
}

/// Unqualified part of a dotted type name.
pub fn short_type_name(full_name: &str) -> &str {
	full_name.rsplit('.').next().unwrap_or(full_name)
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
	use hookwatch_host::fake::FakeObject;

	use super::*;

	#[test]
	fn walk_stops_at_null_links() {
		let leaf = FakeObject::new("Leaf").with("canSealCrock", true).into_value();
		let root = FakeObject::new("Root").with("Stack", FakeObject::new("Stack").with("ItemAttributes", leaf).into_value()).into_value();

		assert_eq!(walk(&root, &["Stack", "ItemAttributes", "canSealCrock"]).unwrap(), Some(HostValue::Bool(true)));
		assert_eq!(walk(&root, &["Stack", "Missing", "canSealCrock"]).unwrap(), None);
		assert_eq!(walk(&HostValue::Null, &["Stack"]).unwrap(), None);
		assert_eq!(walk(&root, &[]).unwrap(), Some(root.clone()));
	}

	#[test]
	fn walk_surfaces_throwing_getters() {
		let root = FakeObject::new("Root").throwing_on("Stack").into_value();
		assert!(walk(&root, &["Stack", "Anything"]).is_err());
	}

	#[test]
	fn set_property_requires_an_object() {
		let attrs = FakeObject::new("Attributes").into_value();
		set_property(&attrs, "bonus", HostValue::Float(1.5)).unwrap();
		assert_eq!(attrs.property("bonus").unwrap(), Some(HostValue::Float(1.5)));
		assert_eq!(
			set_property(&HostValue::Int(3), "bonus", HostValue::Null),
			Err(HookError::UnexpectedValue {
				expected: "object",
				found: "int".to_string()
			})
		);
	}

	#[test]
	fn names_and_markers() {
		assert_eq!(short_type_name("BlessedClasses.src.Blocks.BlockCarvedCrock"), "BlockCarvedCrock");
		assert_eq!(short_type_name("Bare"), "Bare");
		assert!(contains_ignore_case("BlessedClasses-LordOfTheWilds", "blessed"));
		assert!(!contains_ignore_case("commoner", "blessed"));
	}
}
