// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core event model for the Loom Amplitude SDK.
//!
//! This crate normalizes free-form property names onto the fixed wire schema
//! of the Amplitude HTTP API. It is pure: no I/O, no logging. The client in
//! `loom-amplitude` builds on it to queue and send events.
//!
//! # Name forms
//!
//! Well-known fields accept both `snake_case` and `camelCase` names. Names
//! that are not well-known are custom properties and are kept exactly as
//! given.
//!
//! ```
//! use loom_amplitude_core::{Event, Field};
//!
//! let mut event = Event::new("purchase");
//! event.set("revenueType", "income").set("Gift Wrap", true);
//!
//! assert_eq!(event.get("revenue_type"), event.field(Field::RevenueType));
//! assert!(event.get("gift wrap").is_none());
//! ```

pub mod event;
pub mod field;
pub mod inflector;

pub use event::Event;
pub use field::{Field, FieldType, PropertyKey};
pub use inflector::{to_compact, to_word_separated};
