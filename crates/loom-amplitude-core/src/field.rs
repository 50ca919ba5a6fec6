// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Well-known event fields and property name resolution.
//!
//! Every well-known field can be addressed by its `snake_case` or its
//! `camelCase` name. Both forms resolve to the same [`Field`], which owns the
//! key used on the wire and the type values are coerced to when set.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::inflector::to_word_separated;

/// Declared type of a well-known field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
	String,
	Integer,
	Decimal,
	Map,
}

impl FieldType {
	/// Coerces a value to this type.
	///
	/// Strings assigned to numeric fields are read from their leading numeric
	/// prefix, so `"10.5"` becomes `10` for an integer field and `"1234.350"`
	/// becomes `1234.35` for a decimal field. Text with no numeric prefix
	/// becomes zero. [`FieldType::Map`] values are returned unchanged.
	pub fn coerce(self, value: Value) -> Value {
		match self {
			FieldType::String => Value::String(coerce_string(value)),
			FieldType::Integer => coerce_integer(value),
			FieldType::Decimal => Value::from(coerce_decimal(&value)),
			FieldType::Map => value,
		}
	}
}

fn coerce_string(value: Value) -> String {
	match value {
		Value::String(s) => s,
		Value::Number(n) => n.to_string(),
		Value::Bool(true) => "1".to_string(),
		Value::Bool(false) | Value::Null => String::new(),
		other => other.to_string(),
	}
}

fn coerce_integer(value: Value) -> Value {
	match value {
		Value::Number(n) => {
			if n.is_i64() || n.is_u64() {
				Value::Number(n)
			} else {
				Value::from(n.as_f64().unwrap_or_default().trunc() as i64)
			}
		}
		Value::String(s) => {
			let prefix = numeric_prefix(&s);
			let parsed = prefix
				.parse::<i64>()
				.or_else(|_| prefix.parse::<f64>().map(|f| f.trunc() as i64))
				.unwrap_or(0);
			Value::from(parsed)
		}
		Value::Bool(b) => Value::from(i64::from(b)),
		_ => Value::from(0),
	}
}

fn coerce_decimal(value: &Value) -> f64 {
	match value {
		Value::Number(n) => n.as_f64().unwrap_or_default(),
		Value::String(s) => numeric_prefix(s).parse().unwrap_or(0.0),
		Value::Bool(true) => 1.0,
		_ => 0.0,
	}
}

/// Returns the longest prefix of `s` (after leading whitespace) that reads as
/// a decimal number, or an empty string when there is none.
fn numeric_prefix(s: &str) -> &str {
	let s = s.trim_start();
	let bytes = s.as_bytes();
	let mut end = 0;

	if matches!(bytes.first(), Some(b'+' | b'-')) {
		end = 1;
	}

	let int_start = end;
	while end < bytes.len() && bytes[end].is_ascii_digit() {
		end += 1;
	}
	let mut has_digits = end > int_start;

	if end < bytes.len() && bytes[end] == b'.' {
		let mut frac = end + 1;
		while frac < bytes.len() && bytes[frac].is_ascii_digit() {
			frac += 1;
		}
		has_digits |= frac > end + 1;
		if has_digits {
			end = frac;
		}
	}

	if !has_digits {
		return "";
	}

	if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
		let mut exp = end + 1;
		if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
			exp += 1;
		}
		let exp_start = exp;
		while exp < bytes.len() && bytes[exp].is_ascii_digit() {
			exp += 1;
		}
		if exp > exp_start {
			end = exp;
		}
	}

	&s[..end]
}

/// A well-known event field.
///
/// Variant order matches the rows of the field table and [`Field::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
	UserId,
	DeviceId,
	EventType,
	Time,
	EventProperties,
	UserProperties,
	AppVersion,
	Platform,
	OsName,
	OsVersion,
	DeviceBrand,
	DeviceManufacturer,
	DeviceModel,
	DeviceType,
	Carrier,
	Country,
	Region,
	City,
	Dma,
	Language,
	Price,
	Quantity,
	Revenue,
	ProductId,
	RevenueType,
	LocationLat,
	LocationLng,
	Ip,
	Idfa,
	Adid,
	InsertId,
	SessionId,
}

struct FieldSpec {
	field: Field,
	snake: &'static str,
	camel: &'static str,
	wire: &'static str,
	kind: FieldType,
}

const fn spec(
	field: Field,
	snake: &'static str,
	camel: &'static str,
	wire: &'static str,
	kind: FieldType,
) -> FieldSpec {
	FieldSpec {
		field,
		snake,
		camel,
		wire,
		kind,
	}
}

use FieldType::{Decimal, Integer, Map, String as Text};

static SPECS: [FieldSpec; 32] = [
	spec(Field::UserId, "user_id", "userId", "user_id", Text),
	spec(Field::DeviceId, "device_id", "deviceId", "device_id", Text),
	spec(Field::EventType, "event_type", "eventType", "event_type", Text),
	spec(Field::Time, "time", "time", "time", Integer),
	spec(
		Field::EventProperties,
		"event_properties",
		"eventProperties",
		"event_properties",
		Map,
	),
	spec(
		Field::UserProperties,
		"user_properties",
		"userProperties",
		"user_properties",
		Map,
	),
	spec(Field::AppVersion, "app_version", "appVersion", "app_version", Text),
	spec(Field::Platform, "platform", "platform", "platform", Text),
	spec(Field::OsName, "os_name", "osName", "os_name", Text),
	spec(Field::OsVersion, "os_version", "osVersion", "os_version", Text),
	spec(Field::DeviceBrand, "device_brand", "deviceBrand", "device_brand", Text),
	spec(
		Field::DeviceManufacturer,
		"device_manufacturer",
		"deviceManufacturer",
		"device_manufacturer",
		Text,
	),
	spec(Field::DeviceModel, "device_model", "deviceModel", "device_model", Text),
	spec(Field::DeviceType, "device_type", "deviceType", "device_type", Text),
	spec(Field::Carrier, "carrier", "carrier", "carrier", Text),
	spec(Field::Country, "country", "country", "country", Text),
	spec(Field::Region, "region", "region", "region", Text),
	spec(Field::City, "city", "city", "city", Text),
	spec(Field::Dma, "dma", "dma", "dma", Text),
	spec(Field::Language, "language", "language", "language", Text),
	spec(Field::Price, "price", "price", "price", Decimal),
	spec(Field::Quantity, "quantity", "quantity", "quantity", Integer),
	spec(Field::Revenue, "revenue", "revenue", "revenue", Decimal),
	spec(Field::ProductId, "product_id", "productId", "productId", Text),
	spec(Field::RevenueType, "revenue_type", "revenueType", "revenueType", Text),
	spec(Field::LocationLat, "location_lat", "locationLat", "location_lat", Decimal),
	spec(Field::LocationLng, "location_lng", "locationLng", "location_lng", Decimal),
	spec(Field::Ip, "ip", "ip", "ip", Text),
	spec(Field::Idfa, "idfa", "idfa", "idfa", Text),
	spec(Field::Adid, "adid", "adid", "adid", Text),
	spec(Field::InsertId, "insert_id", "insertId", "insert_id", Text),
	spec(Field::SessionId, "session_id", "sessionId", "session_id", Integer),
];

fn index() -> &'static HashMap<&'static str, Field> {
	static INDEX: OnceLock<HashMap<&'static str, Field>> = OnceLock::new();
	INDEX.get_or_init(|| SPECS.iter().map(|s| (s.snake, s.field)).collect())
}

impl Field {
	/// Every well-known field, in declaration order.
	pub const ALL: [Field; 32] = [
		Field::UserId,
		Field::DeviceId,
		Field::EventType,
		Field::Time,
		Field::EventProperties,
		Field::UserProperties,
		Field::AppVersion,
		Field::Platform,
		Field::OsName,
		Field::OsVersion,
		Field::DeviceBrand,
		Field::DeviceManufacturer,
		Field::DeviceModel,
		Field::DeviceType,
		Field::Carrier,
		Field::Country,
		Field::Region,
		Field::City,
		Field::Dma,
		Field::Language,
		Field::Price,
		Field::Quantity,
		Field::Revenue,
		Field::ProductId,
		Field::RevenueType,
		Field::LocationLat,
		Field::LocationLng,
		Field::Ip,
		Field::Idfa,
		Field::Adid,
		Field::InsertId,
		Field::SessionId,
	];

	/// Resolves a property name in either form to a well-known field.
	///
	/// Returns `None` when the name is not a well-known field; such names are
	/// custom properties and must be used verbatim.
	pub fn resolve(name: &str) -> Option<Field> {
		index().get(to_word_separated(name).as_str()).copied()
	}

	fn spec(self) -> &'static FieldSpec {
		&SPECS[self as usize]
	}

	/// The `snake_case` name of this field.
	pub fn snake_name(self) -> &'static str {
		self.spec().snake
	}

	/// The `camelCase` name of this field.
	pub fn camel_name(self) -> &'static str {
		self.spec().camel
	}

	/// The key this field is sent under.
	pub fn wire_key(self) -> &'static str {
		self.spec().wire
	}

	/// The declared type of this field.
	pub fn kind(self) -> FieldType {
		self.spec().kind
	}
}

impl std::fmt::Display for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.wire_key())
	}
}

/// A property name resolved against the well-known field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKey<'a> {
	/// A well-known field, whichever name form was used.
	Field(Field),
	/// A custom property, kept exactly as given.
	Custom(&'a str),
}

impl<'a> PropertyKey<'a> {
	/// Resolves `name` against the well-known field table.
	pub fn resolve(name: &'a str) -> Self {
		match Field::resolve(name) {
			Some(field) => PropertyKey::Field(field),
			None => PropertyKey::Custom(name),
		}
	}
}
