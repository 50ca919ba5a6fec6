// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK for the Amplitude HTTP API.
//!
//! This crate logs analytics events and user property updates to Amplitude.
//! Events can be recorded before the SDK is configured: they wait in a local
//! queue until an API key and a user or device ID are known.
//!
//! # Quick Start
//!
//! ```ignore
//! use loom_amplitude::{AmplitudeClient, Properties};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = AmplitudeClient::builder().build()?;
//!
//!     // Queued: no API key or user yet
//!     client.queue_event("app_opened", Properties::new()).await?;
//!
//!     client.init("api-key", Some("user@example.com"));
//!     client.drain_queue().await?;
//!
//!     // Well-known names are accepted in either form
//!     client.log_event("purchase", Properties::new()
//!         .insert("productId", "sku-42")
//!         .insert("revenue_type", "income")
//!         .insert("price", "19.99")
//!     ).await?;
//!
//!     // Update user properties without an event
//!     client.set_user_properties([("plan", "pro")]);
//!     client.identify().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Sending
//!
//! Each event is posted in its own request, and only once. Nothing is retried:
//! a transport failure or an error status is returned to the caller. Every
//! response is logged at `info` level through `tracing`.
//!
//! # Named instances
//!
//! [`ClientRegistry`] hands out one shared client per name, for applications
//! that log from several places against the same queue and identity.
//!
//! # Opting out
//!
//! With [`AmplitudeClient::set_opt_out`] set, logging, queueing, draining and
//! identify all succeed without touching the network. Events queued before
//! opting out stay queued.

pub mod client;
pub mod error;
pub mod properties;
pub mod registry;
pub mod transport;

pub use client::{
	AmplitudeClient, AmplitudeClientBuilder, ClientConfig, DEFAULT_EVENT_URL, DEFAULT_IDENTIFY_URL,
};
pub use error::{AnalyticsError, Result};
pub use properties::Properties;
pub use registry::{ClientRegistry, SharedClient, DEFAULT_INSTANCE};
pub use transport::{Endpoint, HttpTransport, PostFields, Transport, TransportResponse};

// Re-export types from loom-amplitude-core that users may need
pub use loom_amplitude_core::{Event, Field, FieldType, PropertyKey};
