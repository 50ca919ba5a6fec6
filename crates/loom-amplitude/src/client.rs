// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Amplitude client for logging events and identifying users.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use loom_amplitude_core::Event;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::error::{AnalyticsError, Result};
use crate::properties::Properties;
use crate::transport::{HttpTransport, PostFields, Transport};

/// Default endpoint for event submission.
pub const DEFAULT_EVENT_URL: &str = "https://api2.amplitude.com/httpapi";
/// Default endpoint for identify requests.
pub const DEFAULT_IDENTIFY_URL: &str = "https://api.amplitude.com/identify";

/// Configuration for the Amplitude client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// URL events are posted to.
	pub event_url: String,
	/// URL identify requests are posted to.
	pub identify_url: String,
	/// Timeout for HTTP requests.
	pub request_timeout: Duration,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			event_url: DEFAULT_EVENT_URL.to_string(),
			identify_url: DEFAULT_IDENTIFY_URL.to_string(),
			request_timeout: Duration::from_secs(10),
		}
	}
}

/// Builder for constructing an AmplitudeClient.
///
/// Nothing is required up front. Events can be queued before an API key or
/// identity is known and sent once [`AmplitudeClient::init`] has been called.
pub struct AmplitudeClientBuilder {
	api_key: Option<String>,
	user_id: Option<String>,
	device_id: Option<String>,
	config: ClientConfig,
	transport: Option<Arc<dyn Transport>>,
}

impl AmplitudeClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			api_key: None,
			user_id: None,
			device_id: None,
			config: ClientConfig::default(),
			transport: None,
		}
	}

	/// Sets the API key.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets the initial user ID.
	pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	/// Sets the initial device ID.
	pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
		self.device_id = Some(device_id.into());
		self
	}

	/// Replaces the whole configuration.
	pub fn config(mut self, config: ClientConfig) -> Self {
		self.config = config;
		self
	}

	/// Sets the URL events are posted to.
	pub fn event_url(mut self, url: impl Into<String>) -> Self {
		self.config.event_url = url.into();
		self
	}

	/// Sets the URL identify requests are posted to.
	pub fn identify_url(mut self, url: impl Into<String>) -> Self {
		self.config.identify_url = url.into();
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Uses a custom transport instead of HTTP.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Builds the AmplitudeClient.
	///
	/// Fails only when the HTTP client cannot be constructed.
	pub fn build(self) -> Result<AmplitudeClient> {
		let transport = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(&self.config)?),
		};

		info!(
			event_url = %self.config.event_url,
			has_api_key = self.api_key.is_some(),
			"Amplitude client initialized"
		);

		let mut client = AmplitudeClient::new(transport);
		client.api_key = self.api_key;
		client.user_id = self.user_id;
		client.device_id = self.device_id;
		Ok(client)
	}
}

impl Default for AmplitudeClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Client for logging analytics events to Amplitude.
///
/// Events may be queued before the client is fully configured. Once an API
/// key and a user or device ID are set, [`drain_queue`](Self::drain_queue)
/// sends everything that was queued, oldest first. Each event is sent in its
/// own request and is attempted exactly once.
///
/// Identity set on the client overrides identity set on an event. User
/// properties set on the client are attached to the next event created and
/// then cleared.
///
/// # Example
///
/// ```ignore
/// use loom_amplitude::{AmplitudeClient, Properties};
///
/// let mut client = AmplitudeClient::builder().build()?;
///
/// // Not configured yet, so this is queued
/// client.queue_event("app_opened", Properties::new()).await?;
///
/// client.init("api-key", Some("user@example.com"));
/// client.drain_queue().await?;
///
/// // Sent immediately now
/// client.log_event("button_clicked", Properties::new()
///     .insert("button_name", "checkout")
/// ).await?;
/// ```
pub struct AmplitudeClient {
	api_key: Option<String>,
	user_id: Option<String>,
	device_id: Option<String>,
	user_properties: Map<String, Value>,
	opt_out: bool,
	queue: VecDeque<Event>,
	transport: Arc<dyn Transport>,
}

impl AmplitudeClient {
	/// Creates a new builder for constructing an AmplitudeClient.
	pub fn builder() -> AmplitudeClientBuilder {
		AmplitudeClientBuilder::new()
	}

	/// Creates an unconfigured client sending through `transport`.
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self {
			api_key: None,
			user_id: None,
			device_id: None,
			user_properties: Map::new(),
			opt_out: false,
			queue: VecDeque::new(),
			transport,
		}
	}

	/// Sets the API key and, optionally, the user ID.
	pub fn init(&mut self, api_key: impl Into<String>, user_id: Option<&str>) -> &mut Self {
		self.api_key = Some(api_key.into());
		if let Some(user_id) = user_id {
			self.set_user_id(user_id);
		}
		self
	}

	/// Sets the user ID applied to every event sent from now on.
	pub fn set_user_id(&mut self, user_id: impl Into<String>) -> &mut Self {
		self.user_id = Some(user_id.into());
		self
	}

	/// Sets the device ID applied to every event sent from now on.
	pub fn set_device_id(&mut self, device_id: impl Into<String>) -> &mut Self {
		self.device_id = Some(device_id.into());
		self
	}

	/// Merges user properties to attach to the next event created.
	pub fn set_user_properties<I, K, V>(&mut self, properties: I) -> &mut Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		for (key, value) in properties {
			self.user_properties.insert(key.into(), value.into());
		}
		self
	}

	/// Drops user properties that have not been sent yet.
	pub fn reset_user_properties(&mut self) -> &mut Self {
		self.user_properties.clear();
		self
	}

	/// Clears the user ID, device ID and pending user properties.
	///
	/// Events already queued keep whatever identity they were created with.
	pub fn reset_user(&mut self) -> &mut Self {
		self.user_id = None;
		self.device_id = None;
		self.reset_user_properties()
	}

	/// Stops (or resumes) sending anything to Amplitude.
	///
	/// Queued events are kept while opted out.
	pub fn set_opt_out(&mut self, opt_out: bool) -> &mut Self {
		self.opt_out = opt_out;
		self
	}

	/// Returns the API key, if set and non-empty.
	pub fn api_key(&self) -> Option<&str> {
		non_empty(&self.api_key)
	}

	/// Returns the user ID, if set and non-empty.
	pub fn user_id(&self) -> Option<&str> {
		non_empty(&self.user_id)
	}

	/// Returns the device ID, if set and non-empty.
	pub fn device_id(&self) -> Option<&str> {
		non_empty(&self.device_id)
	}

	/// User properties waiting to go out with the next event.
	pub fn user_properties(&self) -> &Map<String, Value> {
		&self.user_properties
	}

	/// Returns true if the client is opted out.
	pub fn opt_out(&self) -> bool {
		self.opt_out
	}

	/// Returns true if events are waiting in the queue.
	pub fn has_queued_events(&self) -> bool {
		!self.queue.is_empty()
	}

	/// Returns the number of events currently queued.
	pub fn queue_len(&self) -> usize {
		self.queue.len()
	}

	/// Discards every queued event without sending it.
	pub fn reset_queue(&mut self) -> &mut Self {
		self.queue.clear();
		self
	}

	/// Creates an event carrying the client's identity and pending user
	/// properties. The pending user properties are cleared.
	pub fn new_event(&mut self, event_type: &str, properties: Properties) -> Event {
		let mut event = Event::default();

		if let Some(user_id) = self.user_id() {
			event.set_user_id(user_id);
		}
		if let Some(device_id) = self.device_id() {
			event.set_device_id(device_id);
		}
		if !self.user_properties.is_empty() {
			event.set_user_properties(std::mem::take(&mut self.user_properties));
		}

		event.set_event_type(event_type).set_all(properties);
		event
	}

	/// Logs an event immediately.
	///
	/// Requires an API key and a user or device ID. Use
	/// [`queue_event`](Self::queue_event) when the client may not be
	/// configured yet.
	///
	/// Pending user properties are consumed even while opted out.
	pub async fn log_event(&mut self, event_type: &str, properties: Properties) -> Result<()> {
		let event = self.new_event(event_type, properties);
		self.log_event_object(event).await
	}

	/// Sends a prepared event immediately.
	///
	/// The client's user and device IDs replace any set on the event.
	pub async fn log_event_object(&self, mut event: Event) -> Result<()> {
		if self.opt_out {
			return Ok(());
		}

		if let Some(user_id) = self.user_id() {
			event.set_user_id(user_id);
		}
		if let Some(device_id) = self.device_id() {
			event.set_device_id(device_id);
		}

		let api_key = self.require_api_key()?;
		if event.event_type().is_none() {
			return Err(AnalyticsError::MissingEventType);
		}
		if event.user_id().is_none() && event.device_id().is_none() {
			return Err(AnalyticsError::MissingIdentity);
		}

		let fields = PostFields::event(api_key, event.to_json()?);
		self.post(fields).await
	}

	/// Logs the event now if the client is ready, otherwise queues it.
	///
	/// The client is ready when nothing is queued yet and it has an API key
	/// plus a user or device ID of its own. Identity set on individual events
	/// does not count.
	pub async fn queue_event(&mut self, event_type: &str, properties: Properties) -> Result<()> {
		if self.opt_out {
			return Ok(());
		}

		let event = self.new_event(event_type, properties);

		if self.queue.is_empty() && self.is_ready() {
			return self.log_event_object(event).await;
		}

		debug!(
			event_type = %event_type,
			queued = self.queue.len() + 1,
			"Queued event until client is initialized"
		);
		self.queue.push_back(event);
		Ok(())
	}

	/// Sends every queued event, oldest first.
	///
	/// Stops at the first failure and returns it. The failed event is dropped;
	/// events behind it stay queued. While opted out nothing is sent and the
	/// queue is left as is.
	pub async fn drain_queue(&mut self) -> Result<()> {
		if self.opt_out {
			debug!(
				queued = self.queue.len(),
				"Opted out, leaving queued events in place"
			);
			return Ok(());
		}

		while let Some(event) = self.queue.pop_front() {
			self.log_event_object(event).await?;
		}

		Ok(())
	}

	/// Sends the pending user properties without logging an event.
	///
	/// Uses the client's user and device IDs when set. Requires an API key.
	/// Pending user properties are cleared once the request succeeds.
	pub async fn identify(&mut self) -> Result<()> {
		if self.opt_out {
			return Ok(());
		}

		let api_key = self.require_api_key()?;
		let identification = Identification {
			user_properties: &self.user_properties,
			user_id: self.user_id(),
			device_id: self.device_id(),
		};
		let fields = PostFields::identification(api_key, serde_json::to_string(&identification)?);

		self.post(fields).await?;
		self.reset_user_properties();
		Ok(())
	}

	fn is_ready(&self) -> bool {
		self.api_key().is_some() && (self.user_id().is_some() || self.device_id().is_some())
	}

	fn require_api_key(&self) -> Result<&str> {
		self.api_key().ok_or(AnalyticsError::MissingApiKey)
	}

	async fn post(&self, fields: PostFields) -> Result<()> {
		let response = match self.transport.post(&fields).await {
			Ok(response) => response,
			Err(e) => {
				error!(
					error = %e,
					endpoint = ?fields.endpoint,
					"Amplitude transport unavailable"
				);
				return Err(e);
			}
		};

		info!(
			http_code = response.status,
			response = %response.body,
			post_fields = ?fields,
			"Amplitude HTTP API response"
		);

		if response.is_rejection() {
			return Err(AnalyticsError::Rejected {
				status: response.status,
				body: response.body,
				fields,
			});
		}

		Ok(())
	}
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|s| !s.is_empty())
}

/// Request payload for identify.
#[derive(Debug, Serialize)]
struct Identification<'a> {
	user_properties: &'a Map<String, Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	user_id: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	device_id: Option<&'a str>,
}
