// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conversion between `snake_case` and `camelCase` property names.

/// Converts a word-separated name to its compact, camel-cased form.
///
/// The first character of the first word is lower-cased and the first
/// character of every later word is upper-cased. All other characters are
/// left untouched, so already-compact input comes back unchanged.
///
/// ```
/// use loom_amplitude_core::inflector::to_compact;
///
/// assert_eq!(to_compact("double_under_scored"), "doubleUnderScored");
/// assert_eq!(to_compact("doubleCamelCased"), "doubleCamelCased");
/// ```
pub fn to_compact(name: &str) -> String {
	let mut out = String::with_capacity(name.len());

	for (index, word) in name.split('_').filter(|w| !w.is_empty()).enumerate() {
		let mut chars = word.chars();
		if let Some(first) = chars.next() {
			if index == 0 {
				out.extend(first.to_lowercase());
			} else {
				out.extend(first.to_uppercase());
			}
			out.push_str(chars.as_str());
		}
	}

	out
}

/// Converts a compact, camel-cased name to its word-separated form.
///
/// An underscore is inserted before every upper-case letter that follows an
/// alphanumeric character, then the whole name is lower-cased.
///
/// ```
/// use loom_amplitude_core::inflector::to_word_separated;
///
/// assert_eq!(to_word_separated("doubleCamelCased"), "double_camel_cased");
/// assert_eq!(to_word_separated("under_scored"), "under_scored");
/// ```
pub fn to_word_separated(name: &str) -> String {
	let mut out = String::with_capacity(name.len() + 4);
	let mut prev: Option<char> = None;

	for c in name.chars() {
		if c.is_uppercase() && prev.is_some_and(|p| p.is_alphanumeric()) {
			out.push('_');
		}
		out.extend(c.to_lowercase());
		prev = Some(c);
	}

	out
}
