//! Dynamically typed values passed across the host seam.

use std::fmt;
use std::sync::Arc;

use crate::HostError;

/// Reflective view of a host object.
///
/// Implementations map property names onto whatever the host stores. A
/// property that does not exist on the object yields `Ok(None)`; a property
/// whose read throws inside the host yields `Err`.
pub trait Reflect: Send + Sync + fmt::Debug {
	/// Fully qualified type name of the underlying object.
	fn type_name(&self) -> &str;

	/// Reads a property (or field) by name.
	fn get(&self, property: &str) -> Result<Option<HostValue>, HostError>;

	/// Writes a property by name.
	fn set(&self, property: &str, _value: HostValue) -> Result<(), HostError> {
		Err(HostError::ReadOnly {
			type_name: self.type_name().to_string(),
			property: property.to_string(),
		})
	}
}

/// A value produced or consumed by a host member.
#[derive(Debug, Clone, Default)]
pub enum HostValue {
	/// Null reference, or a default value for non-nullable returns.
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	List(Vec<HostValue>),
	Object(Arc<dyn Reflect>),
}

impl HostValue {
	/// Wraps a reflective object.
	pub fn object(obj: impl Reflect + 'static) -> Self {
		Self::Object(Arc::new(obj))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}

	/// Numeric view; integers widen to floats.
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(f) => Some(*f),
			Self::Int(i) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[HostValue]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&Arc<dyn Reflect>> {
		match self {
			Self::Object(obj) => Some(obj),
			_ => None,
		}
	}

	/// Reads a property off an object value.
	///
	/// Non-objects, missing properties and null properties all collapse to
	/// `Ok(None)` so callers can chain lookups the way nullable member access
	/// works in the host.
	pub fn property(&self, name: &str) -> Result<Option<HostValue>, HostError> {
		let Some(obj) = self.as_object() else {
			return Ok(None);
		};
		Ok(obj.get(name)?.filter(|v| !v.is_null()))
	}

	/// Reads a string property off an object value.
	pub fn string_property(&self, name: &str) -> Result<Option<String>, HostError> {
		Ok(self.property(name)?.and_then(|v| v.as_str().map(str::to_string)))
	}

	/// Reads a list-of-strings property, skipping non-string items.
	pub fn string_list(&self, name: &str) -> Result<Option<Vec<String>>, HostError> {
		Ok(self.property(name)?.and_then(|v| {
			v.as_list()
				.map(|items| items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect())
		}))
	}
}

impl PartialEq for HostValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl From<bool> for HostValue {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i64> for HostValue {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<f64> for HostValue {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<&str> for HostValue {
	fn from(v: &str) -> Self {
		Self::Str(v.to_string())
	}
}

impl From<String> for HostValue {
	fn from(v: String) -> Self {
		Self::Str(v)
	}
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
	fn from(v: Vec<T>) -> Self {
		Self::List(v.into_iter().map(Into::into).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug)]
	struct Throwing;

	impl Reflect for Throwing {
		fn type_name(&self) -> &str {
			"Test.Throwing"
		}

		fn get(&self, property: &str) -> Result<Option<HostValue>, HostError> {
			Err(HostError::PropertyRead {
				type_name: self.type_name().to_string(),
				property: property.to_string(),
				reason: "boom".to_string(),
			})
		}
	}

	#[test]
	fn property_on_non_object_is_none() {
		assert_eq!(HostValue::Int(3).property("Code"), Ok(None));
		assert_eq!(HostValue::Null.string_list("Traits"), Ok(None));
	}

	#[test]
	fn property_read_failure_propagates() {
		let value = HostValue::object(Throwing);
		let err = value.property("Code").unwrap_err();
		assert!(err.to_string().contains("boom"));
	}

	#[test]
	fn default_set_is_read_only() {
		let err = Throwing.set("Code", HostValue::Null).unwrap_err();
		assert!(matches!(err, HostError::ReadOnly { .. }));
	}

	#[test]
	fn objects_compare_by_identity() {
		let a = HostValue::object(Throwing);
		let b = a.clone();
		assert_eq!(a, b);
		assert_ne!(a, HostValue::object(Throwing));
		assert_eq!(HostValue::from(vec!["a", "b"]), HostValue::List(vec!["a".into(), "b".into()]));
	}

	#[test]
	fn ints_widen_to_floats() {
		assert_eq!(HostValue::Int(2).as_float(), Some(2.0));
		assert_eq!(HostValue::Str("2".into()).as_float(), None);
	}
}
