//! reqwest-backed transport.

use std::time::Duration;

use relogin_protocol::{Headers, Method, Request, Response};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Transport, TransportFuture};
use crate::error::{Error, Result, TransportError};

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpTransportConfig {
	/// Whole-request timeout in milliseconds.
	#[serde(default)]
	pub timeout_ms: Option<u64>,
	/// Connection establishment timeout in milliseconds.
	#[serde(default)]
	pub connect_timeout_ms: Option<u64>,
	#[serde(default)]
	pub user_agent: Option<String>,
}

/// HTTP transport built on a shared [`reqwest::Client`].
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
}

impl HttpTransport {
	/// Creates a transport with default settings.
	pub fn new() -> Result<Self> {
		Self::with_config(&HttpTransportConfig::default())
	}

	pub fn with_config(config: &HttpTransportConfig) -> Result<Self> {
		let mut builder = reqwest::Client::builder();
		if let Some(ms) = config.timeout_ms {
			builder = builder.timeout(Duration::from_millis(ms));
		}
		if let Some(ms) = config.connect_timeout_ms {
			builder = builder.connect_timeout(Duration::from_millis(ms));
		}
		if let Some(agent) = &config.user_agent {
			builder = builder.user_agent(agent.clone());
		}
		let client = builder
			.build()
			.map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
		Ok(Self::with_client(client))
	}

	/// Wraps an already configured client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}

	async fn perform(&self, request: Request) -> std::result::Result<Response, TransportError> {
		let Request { method, url, headers, body } = request;
		trace!(target = "relogin.transport", %method, %url, "sending");

		let mut builder = self.client.request(to_reqwest_method(method), &url);
		for (name, value) in headers.iter() {
			builder = builder.header(name, value);
		}
		if !body.is_empty() {
			builder = builder.body(body);
		}

		let response = builder
			.send()
			.await
			.map_err(|e| TransportError::with_source(format!("{method} {url} failed"), e))?;

		let status = response.status().as_u16();
		let headers: Headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
			.collect();
		let body = response
			.bytes()
			.await
			.map_err(|e| TransportError::with_source(format!("{method} {url}: failed to read body"), e))?;

		trace!(target = "relogin.transport", %method, %url, status, bytes = body.len(), "received");
		Ok(Response {
			status,
			headers,
			body: body.to_vec(),
		})
	}
}

impl Transport for HttpTransport {
	fn send(&self, request: Request) -> TransportFuture<'_> {
		Box::pin(self.perform(request))
	}
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
		Method::Head => reqwest::Method::HEAD,
		Method::Options => reqwest::Method::OPTIONS,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn config_deserializes_camel_case() {
		let config: HttpTransportConfig = serde_json::from_str(r#"{"timeoutMs": 5000, "userAgent": "relogin-test"}"#).unwrap();
		assert_eq!(config.timeout_ms, Some(5000));
		assert_eq!(config.connect_timeout_ms, None);
		assert_eq!(config.user_agent.as_deref(), Some("relogin-test"));
	}

	#[test]
	fn methods_map_to_reqwest() {
		assert_eq!(to_reqwest_method(Method::Post), reqwest::Method::POST);
		assert_eq!(to_reqwest_method(Method::Options), reqwest::Method::OPTIONS);
	}

	#[tokio::test]
	async fn unreachable_host_is_transport_error() {
		let transport = HttpTransport::with_config(&HttpTransportConfig {
			connect_timeout_ms: Some(500),
			..Default::default()
		})
		.unwrap();
		// Port 9 (discard) on loopback is almost never listening.
		let err = transport.send(Request::get("http://127.0.0.1:9/")).await.unwrap_err();
		assert!(err.message().contains("GET http://127.0.0.1:9/ failed"));
	}

	#[tokio::test]
	async fn wraps_a_prebuilt_client() {
		let client = reqwest::Client::builder().connect_timeout(Duration::from_millis(500)).build().unwrap();
		let transport = HttpTransport::with_client(client);
		let err = transport.send(Request::post("http://127.0.0.1:9/login")).await.unwrap_err();
		assert!(err.message().contains("POST http://127.0.0.1:9/login failed"));
	}
}
