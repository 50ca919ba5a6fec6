// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helper for passing properties to the client.

use serde_json::{Map, Value};

/// Properties handed to [`AmplitudeClient::new_event`] and friends.
///
/// Names are not normalized here; that happens when the properties are
/// applied to an [`Event`](loom_amplitude_core::Event). Well-known names such
/// as `revenue_type` or `deviceId` land on their field, everything else in
/// `event_properties`.
///
/// [`AmplitudeClient::new_event`]: crate::AmplitudeClient::new_event
///
/// # Example
///
/// ```
/// use loom_amplitude::Properties;
///
/// let props = Properties::new()
///     .insert("productId", "sku-42")
///     .insert("price", 19.99)
///     .insert("Referral Source", "newsletter");
/// assert_eq!(props.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
	inner: Map<String, Value>,
}

impl Properties {
	/// Creates a new empty Properties builder.
	pub fn new() -> Self {
		Self { inner: Map::new() }
	}

	/// Inserts a property, replacing any earlier value under the same name.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Returns true if no properties have been added.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Returns the number of properties.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Returns the value stored under `key`, if any.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}
}

/// Yields properties in insertion order.
impl IntoIterator for Properties {
	type Item = (String, Value);
	type IntoIter = serde_json::map::IntoIter;

	fn into_iter(self) -> Self::IntoIter {
		self.inner.into_iter()
	}
}

impl From<Map<String, Value>> for Properties {
	fn from(map: Map<String, Value>) -> Self {
		Self { inner: map }
	}
}

/// Non-object values yield no properties.
impl From<Value> for Properties {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(map) => Self { inner: map },
			_ => Self::new(),
		}
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			inner: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use loom_amplitude_core::Event;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_insert_replaces_existing_key() {
		let props = Properties::new().insert("plan", "free").insert("plan", "pro");
		assert_eq!(props.len(), 1);
		assert_eq!(props.get("plan"), Some(&json!("pro")));
	}

	#[test]
	fn test_from_object_value() {
		let props = Properties::from(json!({"a": 1, "b": "two"}));
		assert_eq!(props.len(), 2);
	}

	#[test]
	fn test_from_non_object_value_is_empty() {
		assert!(Properties::from(json!("nope")).is_empty());
	}

	#[test]
	fn test_collects_from_pairs() {
		let props: Properties = [("quantity", json!(2)), ("color", json!("red"))]
			.into_iter()
			.collect();
		assert_eq!(props.get("color"), Some(&json!("red")));
	}

	#[test]
	fn test_applied_to_event_with_normalization() {
		let props = Properties::new()
			.insert("revenue_type", "refund")
			.insert("Gift Note", "hi");
		let event = Event::new("purchase").with_properties(props);

		assert_eq!(event.to_wire()["revenueType"], "refund");
		assert_eq!(event.event_properties().unwrap()["Gift Note"], "hi");
	}

	#[test]
	fn test_iterates_in_insertion_order() {
		let props = Properties::new()
			.insert("zeta", 1)
			.insert("alpha", 2)
			.insert("mid", 3);
		let keys: Vec<String> = props.into_iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
	}

	#[test]
	fn test_later_alias_wins_on_event() {
		let props = Properties::new()
			.insert("revenueType", "income")
			.insert("revenue_type", "refund");
		let event = Event::new("purchase").with_properties(props);
		assert_eq!(event.get("revenueType"), Some(&json!("refund")));
	}

	proptest! {
		#[test]
		fn len_matches_unique_keys(keys in proptest::collection::vec("[a-z]{1,10}", 0..20)) {
			let unique: std::collections::HashSet<_> = keys.iter().cloned().collect();
			let props = keys.iter().fold(Properties::new(), |p, k| p.insert(k.clone(), 1));
			prop_assert_eq!(props.len(), unique.len());
		}
	}
}
