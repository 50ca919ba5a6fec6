// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of form-encoded requests to the Amplitude endpoints.
//!
//! The client talks to the network only through [`Transport`]. A single
//! attempt is made per request; status handling and logging live in the
//! client, so a transport just reports what came back.

use std::fmt;

use reqwest::Client;
use tracing::{debug, error};

use crate::client::ClientConfig;
use crate::error::{AnalyticsError, Result};

/// SDK version for the User-Agent header.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// SDK name for the User-Agent header.
const SDK_NAME: &str = "loom-amplitude";

/// The endpoint a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
	/// Event submission.
	Event,
	/// User property updates without an event.
	Identify,
}

impl Endpoint {
	/// Name of the form field carrying the JSON payload.
	pub fn payload_field(self) -> &'static str {
		match self {
			Endpoint::Event => "event",
			Endpoint::Identify => "identification",
		}
	}
}

/// The form fields of one request.
///
/// The `Debug` output redacts the API key so the fields can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct PostFields {
	/// Endpoint the request goes to.
	pub endpoint: Endpoint,
	/// API key sent with the request.
	pub api_key: String,
	/// JSON text of the event or identification.
	pub payload: String,
}

impl PostFields {
	/// Creates the fields for a request to `endpoint`.
	pub fn new(endpoint: Endpoint, api_key: impl Into<String>, payload: String) -> Self {
		Self {
			endpoint,
			api_key: api_key.into(),
			payload,
		}
	}

	/// Creates the fields for an event request.
	pub fn event(api_key: impl Into<String>, payload: String) -> Self {
		Self::new(Endpoint::Event, api_key, payload)
	}

	/// Creates the fields for an identify request.
	pub fn identification(api_key: impl Into<String>, payload: String) -> Self {
		Self::new(Endpoint::Identify, api_key, payload)
	}

	/// The `(name, value)` pairs posted as the request body.
	pub fn form(&self) -> [(&'static str, &str); 2] {
		[
			("api_key", self.api_key.as_str()),
			(self.endpoint.payload_field(), self.payload.as_str()),
		]
	}
}

impl fmt::Debug for PostFields {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PostFields")
			.field("endpoint", &self.endpoint)
			.field("api_key", &"[REDACTED]")
			.field(self.endpoint.payload_field(), &self.payload)
			.finish()
	}
}

/// What the endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body text.
	pub body: String,
}

impl TransportResponse {
	/// True for statuses in the 400–599 range.
	pub fn is_rejection(&self) -> bool {
		(400..=599).contains(&self.status)
	}
}

/// Sends one request to an Amplitude endpoint.
///
/// Implementations return any HTTP response, error statuses included, as a
/// [`TransportResponse`]. An `Err` means no response was received.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
	/// Posts `fields` and returns the response.
	async fn post(&self, fields: &PostFields) -> Result<TransportResponse>;
}

/// Returns the User-Agent sent with every request.
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{SDK_VERSION}")
}

/// HTTP transport backed by `reqwest`.
pub struct HttpTransport {
	http_client: Client,
	event_url: String,
	identify_url: String,
}

impl HttpTransport {
	/// Builds the HTTP client for the configured endpoints.
	pub fn new(config: &ClientConfig) -> Result<Self> {
		let http_client = Client::builder()
			.user_agent(user_agent())
			.timeout(config.request_timeout)
			.build()
			.map_err(|e| {
				error!(error = %e, "Unable to build HTTP client, Amplitude transport unavailable");
				AnalyticsError::RequestFailed(e)
			})?;

		Ok(Self {
			http_client,
			event_url: config.event_url.clone(),
			identify_url: config.identify_url.clone(),
		})
	}

	fn url(&self, endpoint: Endpoint) -> &str {
		match endpoint {
			Endpoint::Event => &self.event_url,
			Endpoint::Identify => &self.identify_url,
		}
	}
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
	async fn post(&self, fields: &PostFields) -> Result<TransportResponse> {
		let url = self.url(fields.endpoint);
		debug!(url = %url, endpoint = ?fields.endpoint, "Posting to Amplitude");

		let response = self
			.http_client
			.post(url)
			.form(&fields.form())
			.send()
			.await?;

		let status = response.status().as_u16();
		let body = response.text().await.map_err(|e| {
			debug!(error = %e, status, "Unable to read Amplitude response body");
			AnalyticsError::RequestFailed(e)
		})?;

		Ok(TransportResponse { status, body })
	}
}
