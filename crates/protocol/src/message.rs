//! Outgoing requests and received responses.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::headers::Headers;

/// HTTP request method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	#[default]
	Get,
	Post,
	Put,
	Patch,
	Delete,
	Head,
	Options,
}

impl Method {
	pub fn as_str(&self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
			Method::Head => "HEAD",
			Method::Options => "OPTIONS",
		}
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a method token is not one of the supported verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMethodError(String);

impl fmt::Display for ParseMethodError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown HTTP method: {}", self.0)
	}
}

impl std::error::Error for ParseMethodError {}

impl FromStr for Method {
	type Err = ParseMethodError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(Method::Get),
			"POST" => Ok(Method::Post),
			"PUT" => Ok(Method::Put),
			"PATCH" => Ok(Method::Patch),
			"DELETE" => Ok(Method::Delete),
			"HEAD" => Ok(Method::Head),
			"OPTIONS" => Ok(Method::Options),
			_ => Err(ParseMethodError(s.to_string())),
		}
	}
}

/// Outgoing HTTP request.
///
/// Requests are plain values. The interceptor stamps session secrets onto a clone
/// before each send, so the caller's copy is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	pub method: Method,
	pub url: String,
	#[serde(default)]
	pub headers: Headers,
	#[serde(default, with = "base64_body", skip_serializing_if = "Vec::is_empty")]
	pub body: Vec<u8>,
}

impl Request {
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			headers: Headers::new(),
			body: Vec::new(),
		}
	}

	pub fn get(url: impl Into<String>) -> Self {
		Self::new(Method::Get, url)
	}

	pub fn post(url: impl Into<String>) -> Self {
		Self::new(Method::Post, url)
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.set(name, value);
		self
	}

	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();
		self
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name)
	}
}

/// Received HTTP response. Treated as immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	pub status: u16,
	#[serde(default)]
	pub headers: Headers,
	#[serde(default, with = "base64_body")]
	pub body: Vec<u8>,
}

impl Response {
	pub fn new(status: u16) -> Self {
		Self {
			status,
			headers: Headers::new(),
			body: Vec::new(),
		}
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.append(name, value);
		self
	}

	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();
		self
	}

	/// Any 2xx status.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Deserializes the body as JSON.
	pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
		serde_json::from_slice(&self.body)
	}
}

mod base64_body {
	use base64::Engine as _;
	use base64::engine::general_purpose::STANDARD;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&STANDARD.encode(body))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		let encoded = String::deserialize(deserializer)?;
		STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
	}
}
