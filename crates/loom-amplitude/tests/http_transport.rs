// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end tests of the HTTP transport against a local mock server.

use std::collections::HashMap;
use std::time::Duration;

use loom_amplitude::{AmplitudeClient, AnalyticsError, Properties};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn form_fields(request: &Request) -> HashMap<String, String> {
	let body = String::from_utf8(request.body.clone()).unwrap();
	let url = reqwest::Url::parse(&format!("http://form.local/?{body}")).unwrap();
	url.query_pairs().into_owned().collect()
}

fn client_for(server: &MockServer) -> AmplitudeClient {
	AmplitudeClient::builder()
		.event_url(format!("{}/httpapi", server.uri()))
		.identify_url(format!("{}/identify", server.uri()))
		.request_timeout(Duration::from_secs(5))
		.build()
		.unwrap()
}

#[tokio::test]
async fn test_queued_event_is_posted_after_init() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/httpapi"))
		.and(header_regex("user-agent", "^loom-amplitude/"))
		.respond_with(ResponseTemplate::new(200).set_body_string("success"))
		.expect(1)
		.mount(&server)
		.await;

	let mut client = client_for(&server);
	client.queue_event("Signup", Properties::new()).await.unwrap();
	assert!(client.has_queued_events());

	client.init("K", Some("U"));
	client.drain_queue().await.unwrap();
	assert!(!client.has_queued_events());

	let requests = server.received_requests().await.unwrap();
	assert_eq!(requests.len(), 1);

	let fields = form_fields(&requests[0]);
	assert_eq!(fields["api_key"], "K");
	let event: Value = serde_json::from_str(&fields["event"]).unwrap();
	assert_eq!(event, json!({"event_type": "Signup", "user_id": "U"}));
}

#[tokio::test]
async fn test_identify_posts_identification() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/identify"))
		.respond_with(ResponseTemplate::new(200).set_body_string("success"))
		.expect(1)
		.mount(&server)
		.await;

	let mut client = client_for(&server);
	client
		.init("K", None)
		.set_device_id("D")
		.set_user_properties([("plan", "pro")]);
	client.identify().await.unwrap();

	let requests = server.received_requests().await.unwrap();
	let fields = form_fields(&requests[0]);
	assert_eq!(fields["api_key"], "K");
	let identification: Value = serde_json::from_str(&fields["identification"]).unwrap();
	assert_eq!(
		identification,
		json!({"user_properties": {"plan": "pro"}, "device_id": "D"})
	);
	assert!(client.user_properties().is_empty());
}

#[tokio::test]
async fn test_error_status_is_a_rejection_and_not_retried() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/httpapi"))
		.respond_with(ResponseTemplate::new(400).set_body_string("invalid_api_key"))
		.expect(1)
		.mount(&server)
		.await;

	let mut client = client_for(&server);
	client.init("bad-key", Some("U"));

	let err = client
		.log_event("Event", Properties::new().insert("quantity", "2"))
		.await
		.unwrap_err();

	match err {
		AnalyticsError::Rejected {
			status,
			body,
			fields,
		} => {
			assert_eq!(status, 400);
			assert_eq!(body, "invalid_api_key");
			assert_eq!(fields.api_key, "bad-key");
			let event: Value = serde_json::from_str(&fields.payload).unwrap();
			assert_eq!(event["quantity"], 2);
		}
		other => panic!("expected rejection, got {other:?}"),
	}
}

#[tokio::test]
async fn test_server_error_status_is_a_rejection() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(503))
		.mount(&server)
		.await;

	let mut client = client_for(&server);
	client.init("K", Some("U"));

	let err = client.log_event("Event", Properties::new()).await.unwrap_err();
	assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_transport_error() {
	let mut client = AmplitudeClient::builder()
		.event_url("http://127.0.0.1:1/httpapi")
		.request_timeout(Duration::from_secs(2))
		.build()
		.unwrap();
	client.init("K", Some("U"));

	let err = client.log_event("Event", Properties::new()).await.unwrap_err();
	assert!(err.is_transport(), "unexpected error: {err:?}");
	assert!(matches!(err, AnalyticsError::RequestFailed(_)));
}

#[tokio::test]
async fn test_truncated_response_body_is_a_transport_error() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();

	let server = tokio::spawn(async move {
		let (mut socket, _) = listener.accept().await.unwrap();
		let mut request = Vec::new();
		let mut buf = [0u8; 1024];
		while !String::from_utf8_lossy(&request).contains("event=") {
			let n = socket.read(&mut buf).await.unwrap();
			if n == 0 {
				break;
			}
			request.extend_from_slice(&buf[..n]);
		}
		socket
			.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nsucc")
			.await
			.unwrap();
		socket.shutdown().await.unwrap();
	});

	let mut client = AmplitudeClient::builder()
		.event_url(format!("http://{addr}/httpapi"))
		.request_timeout(Duration::from_secs(5))
		.build()
		.unwrap();
	client.init("K", Some("U"));

	let err = client.log_event("Event", Properties::new()).await.unwrap_err();
	assert!(err.is_transport(), "unexpected error: {err:?}");
	assert!(matches!(err, AnalyticsError::RequestFailed(_)));

	server.await.unwrap();
}
