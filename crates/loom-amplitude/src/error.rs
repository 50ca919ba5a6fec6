// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Amplitude SDK.

use thiserror::Error;

use crate::transport::PostFields;

/// Message for [`AnalyticsError::MissingApiKey`].
pub const NO_API_KEY_MESSAGE: &str = "API Key is required to log an event";
/// Message for [`AnalyticsError::MissingIdentity`].
pub const NO_USER_OR_DEVICE_MESSAGE: &str = "Either user_id or device_id required to log an event";

/// Amplitude SDK errors.
#[derive(Debug, Error)]
pub enum AnalyticsError {
	/// No API key was configured when an event was sent.
	#[error("API Key is required to log an event")]
	MissingApiKey,

	/// Neither the client nor the event carried a user or device ID.
	#[error("Either user_id or device_id required to log an event")]
	MissingIdentity,

	/// The event has no event type.
	#[error("event_type is required to log an event")]
	MissingEventType,

	/// HTTP request could not be made.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// A custom transport could not deliver the request.
	#[error("transport unavailable: {0}")]
	TransportUnavailable(String),

	/// The endpoint answered with a 4xx or 5xx status.
	#[error("Amplitude HTTP API response ({status}): {body}")]
	Rejected {
		status: u16,
		body: String,
		fields: PostFields,
	},

	/// Serialization error.
	#[error("serialization error: {0}")]
	Serialization(String),
}

impl AnalyticsError {
	/// True for caller misuse that must be fixed before resubmitting.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			AnalyticsError::MissingApiKey
				| AnalyticsError::MissingIdentity
				| AnalyticsError::MissingEventType
		)
	}

	/// True when the request never got a response.
	pub fn is_transport(&self) -> bool {
		matches!(
			self,
			AnalyticsError::RequestFailed(_) | AnalyticsError::TransportUnavailable(_)
		)
	}

	/// HTTP status of a rejected request.
	pub fn status(&self) -> Option<u16> {
		match self {
			AnalyticsError::Rejected { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl From<serde_json::Error> for AnalyticsError {
	fn from(err: serde_json::Error) -> Self {
		AnalyticsError::Serialization(err.to_string())
	}
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
