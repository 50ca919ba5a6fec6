// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Named client instances.
//!
//! A [`ClientRegistry`] hands out one shared [`AmplitudeClient`] per name, so
//! separate parts of an application can log against the same API key,
//! identity and queue. Registries are ordinary values: create one at startup
//! and pass it around. Two registries never share instances.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::client::{AmplitudeClient, ClientConfig};
use crate::error::Result;
use crate::transport::{HttpTransport, Transport};

/// Name used by [`ClientRegistry::default_instance`].
pub const DEFAULT_INSTANCE: &str = "default";

/// A client shared between callers. The mutex serializes queue and identity
/// updates.
pub type SharedClient = Arc<Mutex<AmplitudeClient>>;

/// Get-or-create lookup of named clients.
pub struct ClientRegistry {
	config: ClientConfig,
	transport: Option<Arc<dyn Transport>>,
	instances: Mutex<HashMap<String, SharedClient>>,
}

impl ClientRegistry {
	/// Creates a registry whose clients send over HTTP with `config`.
	pub fn new(config: ClientConfig) -> Self {
		Self {
			config,
			transport: None,
			instances: Mutex::new(HashMap::new()),
		}
	}

	/// Creates a registry whose clients all send through `transport`.
	pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
		Self {
			config: ClientConfig::default(),
			transport: Some(transport),
			instances: Mutex::new(HashMap::new()),
		}
	}

	/// Returns the client registered under `name`, creating it on first use.
	pub async fn instance(&self, name: &str) -> Result<SharedClient> {
		let mut instances = self.instances.lock().await;

		if let Some(client) = instances.get(name) {
			return Ok(Arc::clone(client));
		}

		let transport = match &self.transport {
			Some(transport) => Arc::clone(transport),
			None => Arc::new(HttpTransport::new(&self.config)?),
		};
		let client = Arc::new(Mutex::new(AmplitudeClient::new(transport)));
		instances.insert(name.to_string(), Arc::clone(&client));

		debug!(instance = %name, "Created Amplitude client instance");
		Ok(client)
	}

	/// Returns the client registered under [`DEFAULT_INSTANCE`].
	pub async fn default_instance(&self) -> Result<SharedClient> {
		self.instance(DEFAULT_INSTANCE).await
	}

	/// Returns true if a client has been created under `name`.
	pub async fn contains(&self, name: &str) -> bool {
		self.instances.lock().await.contains_key(name)
	}

	/// Returns the number of clients created so far.
	pub async fn len(&self) -> usize {
		self.instances.lock().await.len()
	}

	/// Returns true if no client has been created yet.
	pub async fn is_empty(&self) -> bool {
		self.instances.lock().await.is_empty()
	}
}

impl Default for ClientRegistry {
	fn default() -> Self {
		Self::new(ClientConfig::default())
	}
}
