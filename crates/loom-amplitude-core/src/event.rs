// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The analytics event model.
//!
//! An [`Event`] holds a set of well-known fields plus two open property bags:
//! `event_properties` for caller-defined names and `user_properties` for the
//! user profile. Property names are resolved through [`PropertyKey`], so
//! `productId` and `product_id` address the same field while any other name is
//! kept verbatim in `event_properties`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::field::{Field, PropertyKey};

/// A single analytics record.
///
/// # Example
///
/// ```
/// use loom_amplitude_core::Event;
///
/// let mut event = Event::new("checkout");
/// event
///     .set("product_id", "sku-1")
///     .set("quantity", "2")
///     .set("coupon code", "SPRING");
///
/// let wire = event.to_wire();
/// assert_eq!(wire["productId"], "sku-1");
/// assert_eq!(wire["quantity"], 2);
/// assert_eq!(wire["event_properties"]["coupon code"], "SPRING");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
	fields: BTreeMap<Field, Value>,
}

impl Event {
	/// Creates an event of the given type with no other fields set.
	pub fn new(event_type: impl Into<String>) -> Self {
		let mut event = Self::default();
		event.set_event_type(event_type);
		event
	}

	/// Creates an event from an initial mapping of property names to values.
	pub fn from_properties<I, K, V>(properties: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<Value>,
	{
		let mut event = Self::default();
		event.set_all(properties);
		event
	}

	/// Sets a property by name.
	///
	/// Well-known fields are matched in either name form and coerced to their
	/// declared type. Any other name is stored exactly as given in
	/// `event_properties`.
	pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
		match PropertyKey::resolve(name) {
			PropertyKey::Field(field) => self.set_field(field, value.into()),
			PropertyKey::Custom(name) => {
				self.insert_into_bag(Field::EventProperties, name.to_string(), value.into());
				self
			}
		}
	}

	/// Sets every entry of a mapping, in iteration order.
	pub fn set_all<I, K, V>(&mut self, properties: I) -> &mut Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<Value>,
	{
		for (name, value) in properties {
			self.set(name.as_ref(), value);
		}
		self
	}

	/// Sets a well-known field directly.
	///
	/// The property bags are replaced only by JSON objects; any other value
	/// leaves them untouched.
	pub fn set_field(&mut self, field: Field, value: Value) -> &mut Self {
		match field {
			Field::EventProperties | Field::UserProperties => {
				if value.is_object() {
					self.fields.insert(field, value);
				}
			}
			_ => {
				self.fields.insert(field, field.kind().coerce(value));
			}
		}
		self
	}

	/// Reads a property by name.
	///
	/// Custom properties are only found under the exact name they were set
	/// with.
	pub fn get(&self, name: &str) -> Option<&Value> {
		match PropertyKey::resolve(name) {
			PropertyKey::Field(field) => self.field(field),
			PropertyKey::Custom(name) => self.bag(Field::EventProperties)?.get(name),
		}
	}

	/// Reads a well-known field.
	pub fn field(&self, field: Field) -> Option<&Value> {
		self.fields.get(&field)
	}

	/// Removes a property by name. Does nothing if it is not set.
	pub fn unset_property(&mut self, name: &str) -> &mut Self {
		match PropertyKey::resolve(name) {
			PropertyKey::Field(field) => {
				self.fields.remove(&field);
			}
			PropertyKey::Custom(name) => {
				if let Some(Value::Object(bag)) = self.fields.get_mut(&Field::EventProperties) {
					bag.remove(name);
				}
			}
		}
		self
	}

	/// Merges properties into `user_properties`, keeping keys not present in
	/// `properties`.
	pub fn set_user_properties<I, K, V>(&mut self, properties: I) -> &mut Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		for (key, value) in properties {
			self.insert_into_bag(Field::UserProperties, key.into(), value.into());
		}
		self
	}

	/// Returns the event type, if set and non-empty.
	pub fn event_type(&self) -> Option<&str> {
		self.text(Field::EventType)
	}

	/// Sets the event type.
	pub fn set_event_type(&mut self, event_type: impl Into<String>) -> &mut Self {
		self.set_field(Field::EventType, Value::String(event_type.into()))
	}

	/// Returns the user ID, if set and non-empty.
	pub fn user_id(&self) -> Option<&str> {
		self.text(Field::UserId)
	}

	/// Sets the user ID.
	pub fn set_user_id(&mut self, user_id: impl Into<String>) -> &mut Self {
		self.set_field(Field::UserId, Value::String(user_id.into()))
	}

	/// Returns the device ID, if set and non-empty.
	pub fn device_id(&self) -> Option<&str> {
		self.text(Field::DeviceId)
	}

	/// Sets the device ID.
	pub fn set_device_id(&mut self, device_id: impl Into<String>) -> &mut Self {
		self.set_field(Field::DeviceId, Value::String(device_id.into()))
	}

	/// Caller-defined properties, if any have been set.
	pub fn event_properties(&self) -> Option<&Map<String, Value>> {
		self.bag(Field::EventProperties)
	}

	/// User profile properties, if any have been set.
	pub fn user_properties(&self) -> Option<&Map<String, Value>> {
		self.bag(Field::UserProperties)
	}

	/// Sets properties (builder pattern).
	pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<Value>,
	{
		self.set_all(properties);
		self
	}

	/// Sets the user ID (builder pattern).
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.set_user_id(user_id);
		self
	}

	/// Sets the device ID (builder pattern).
	pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
		self.set_device_id(device_id);
		self
	}

	/// Sets `time` to the timestamp in epoch milliseconds (builder pattern).
	pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
		self.set_field(Field::Time, Value::from(timestamp.timestamp_millis()));
		self
	}

	/// Renders the event under its wire keys.
	///
	/// Unset fields, empty strings and empty property bags are left out.
	pub fn to_wire(&self) -> Map<String, Value> {
		self
			.fields
			.iter()
			.filter(|(_, value)| !is_blank(value))
			.map(|(field, value)| (field.wire_key().to_string(), value.clone()))
			.collect()
	}

	/// Renders the wire form as JSON text.
	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}

	fn text(&self, field: Field) -> Option<&str> {
		self
			.fields
			.get(&field)
			.and_then(Value::as_str)
			.filter(|s| !s.is_empty())
	}

	fn bag(&self, field: Field) -> Option<&Map<String, Value>> {
		self.fields.get(&field).and_then(Value::as_object)
	}

	fn insert_into_bag(&mut self, bag: Field, key: String, value: Value) {
		match self.fields.get_mut(&bag) {
			Some(Value::Object(map)) => {
				map.insert(key, value);
			}
			_ => {
				let mut map = Map::new();
				map.insert(key, value);
				self.fields.insert(bag, Value::Object(map));
			}
		}
	}
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		Value::Object(map) => map.is_empty(),
		_ => false,
	}
}

impl Serialize for Event {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_wire().serialize(serializer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::inflector::{to_compact, to_word_separated};
	use proptest::prelude::*;
	use serde_json::json;

	fn wire(event: &Event) -> Value {
		Value::Object(event.to_wire())
	}

	#[test]
	fn test_set_normalizes_well_known_names() {
		let cases = [
			("user_id", json!({"event_type": "test", "user_id": "v"})),
			("userId", json!({"event_type": "test", "user_id": "v"})),
			("productId", json!({"event_type": "test", "productId": "v"})),
			("product_id", json!({"event_type": "test", "productId": "v"})),
			("revenue_type", json!({"event_type": "test", "revenueType": "v"})),
			(
				"customProp",
				json!({"event_type": "test", "event_properties": {"customProp": "v"}}),
			),
			(
				"Custom With Space",
				json!({"event_type": "test", "event_properties": {"Custom With Space": "v"}}),
			),
		];

		for (name, expected) in cases {
			let mut event = Event::new("test");
			event.set(name, "v");
			assert_eq!(wire(&event), expected, "setting {name}");
		}
	}

	#[test]
	fn test_set_all_applies_each_entry() {
		let mut event = Event::new("test");
		event.set_all([
			("deviceId", "device"),
			("user_id", "user"),
			("product_id", "product"),
			("some property", "some value"),
		]);

		assert_eq!(
			wire(&event),
			json!({
				"event_type": "test",
				"device_id": "device",
				"user_id": "user",
				"productId": "product",
				"event_properties": {"some property": "some value"},
			})
		);
	}

	#[test]
	fn test_set_all_later_entries_win() {
		let mut event = Event::new("test");
		event.set_all([("product_id", "first"), ("productId", "second")]);
		assert_eq!(event.get("product_id"), Some(&json!("second")));
	}

	#[test]
	fn test_set_coerces_numeric_fields() {
		let mut event = Event::new("test");
		event.set("quantity", "10.5").set("price", "1234.350");

		let wire = event.to_wire();
		assert_eq!(wire["quantity"], json!(10));
		assert!(wire["quantity"].is_i64());
		assert_eq!(wire["price"], json!(1234.35));
		assert!(wire["price"].is_f64());
	}

	#[test]
	fn test_get_custom_property_requires_exact_name() {
		let mut event = Event::new("test");
		event.set("foo bar", 1);

		assert_eq!(event.get("foo bar"), Some(&json!(1)));
		assert_eq!(event.get("fooBar"), None);
		assert_eq!(event.get("foo_bar"), None);
		assert_eq!(event.get("Foo Bar"), None);
	}

	#[test]
	fn test_get_missing_is_absent() {
		let event = Event::new("test");
		assert_eq!(event.get("quantity"), None);
		assert_eq!(event.get("anything"), None);
	}

	#[test]
	fn test_unset_property_removes_fields_and_custom_properties() {
		let mut event = Event::new("test");
		event
			.set("custom prop", "value")
			.set("userId", "user")
			.set("quantity", 50)
			.set_user_properties([("prop", "value")]);

		assert_eq!(
			wire(&event),
			json!({
				"event_type": "test",
				"event_properties": {"custom prop": "value"},
				"user_id": "user",
				"quantity": 50,
				"user_properties": {"prop": "value"},
			})
		);

		event.unset_property("invalid");
		event.unset_property("custom prop");
		assert_eq!(event.get("custom prop"), None);

		event.unset_property("user_id");
		assert_eq!(event.user_id(), None);
		assert_eq!(
			wire(&event),
			json!({
				"event_type": "test",
				"quantity": 50,
				"user_properties": {"prop": "value"},
			})
		);
	}

	#[test]
	fn test_set_user_properties_merges() {
		let mut event = Event::new("test");
		event.set_user_properties([("dob", "tomorrow"), ("gender", "f")]);
		assert_eq!(
			wire(&event),
			json!({"event_type": "test", "user_properties": {"dob": "tomorrow", "gender": "f"}})
		);

		event.set_user_properties([("dob", "yesterday"), ("name", "Baby")]);
		assert_eq!(
			event.user_properties(),
			json!({"dob": "yesterday", "gender": "f", "name": "Baby"}).as_object()
		);
	}

	#[test]
	fn test_bag_fields_only_accept_objects() {
		let mut event = Event::new("test");
		event.set("event_properties", json!({"a": 1}));
		event.set("eventProperties", "not a map");
		assert_eq!(event.get("a"), Some(&json!(1)));
	}

	#[test]
	fn test_blank_values_are_omitted_from_wire() {
		let mut event = Event::new("test");
		event
			.set_user_id("")
			.set_field(Field::EventProperties, json!({}));
		assert_eq!(wire(&event), json!({"event_type": "test"}));
		assert_eq!(event.user_id(), None);
	}

	#[test]
	fn test_from_properties_builds_event() {
		let event = Event::from_properties([("eventType", "signup"), ("device_id", "d1")]);
		assert_eq!(event.event_type(), Some("signup"));
		assert_eq!(event.device_id(), Some("d1"));
	}

	#[test]
	fn test_with_timestamp_sets_time_in_millis() {
		let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
		let event = Event::new("test").with_timestamp(ts);
		assert_eq!(event.get("time"), Some(&json!(1_700_000_000_000i64)));
	}

	#[test]
	fn test_serializes_wire_form() {
		let event = Event::new("test").with_user_id("u1");
		let json = event.to_json().unwrap();
		let parsed: Value = serde_json::from_str(&json).unwrap();
		assert_eq!(parsed, json!({"event_type": "test", "user_id": "u1"}));
	}

	proptest! {
		#[test]
		fn both_name_forms_produce_same_event(i in 0..Field::ALL.len(), value in "[a-z0-9]{1,12}") {
			let field = Field::ALL[i];
			prop_assume!(!matches!(field, Field::EventProperties | Field::UserProperties));

			let mut compact = Event::new("test");
			compact.set(&to_compact(field.snake_name()), value.clone());
			let mut separated = Event::new("test");
			separated.set(&to_word_separated(field.camel_name()), value.clone());

			prop_assert_eq!(&compact, &separated);
			prop_assert_eq!(compact.get(field.snake_name()), compact.get(field.camel_name()));
		}

		#[test]
		fn custom_names_round_trip_verbatim(name in "custom [a-zA-Z ]{1,16}", value in any::<i32>()) {
			let mut event = Event::new("test");
			event.set(&name, value);
			prop_assert_eq!(event.get(&name), Some(&json!(value)));
			prop_assert_eq!(event.get(&name.to_uppercase()), None);
		}
	}
}
