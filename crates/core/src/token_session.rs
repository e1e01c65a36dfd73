//! Ready-made [`Session`] for token and cookie based APIs.
//!
//! Covers the two common server shapes without writing a custom session:
//!
//! - Token APIs: the login response body is the token, which is sent back in a
//!   header such as `X-API-Token` or `Authorization: Bearer <token>`.
//! - Cookie APIs: the login response sets a session cookie (e.g. `JSESSIONID`),
//!   which is sent back in the `Cookie` header.
//!
//! Expiry is detected from the status code (401 by default) and, optionally, from a
//! marker in the response body for servers that answer an expired session with 200.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use glob::Pattern;
use relogin_protocol::{Method, Request, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::secret::{Secret, SecretCell};
use crate::session::Session;

const DEFAULT_TOKEN_HEADER: &str = "X-API-Token";

/// Where the secret is read from in a login response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SecretSource {
	/// The whole response body, trimmed of surrounding whitespace.
	#[default]
	Body,
	/// A response header.
	Header { name: String },
	/// A cookie set through `Set-Cookie`.
	Cookie { name: String },
}

/// How the secret is attached to outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SecretTarget {
	/// `name: [scheme ]secret`
	Header {
		name: String,
		#[serde(default)]
		scheme: Option<String>,
	},
	/// `Cookie: name=secret`, merged with any cookies already on the request.
	Cookie { name: String },
}

impl Default for SecretTarget {
	fn default() -> Self {
		SecretTarget::Header {
			name: DEFAULT_TOKEN_HEADER.to_string(),
			scheme: None,
		}
	}
}

/// Login request as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTemplate {
	#[serde(default = "default_login_method")]
	pub method: Method,
	pub url: String,
	#[serde(default)]
	pub headers: BTreeMap<String, String>,
	/// Text body, typically the encoded credentials.
	#[serde(default)]
	pub body: Option<String>,
}

impl LoginTemplate {
	pub fn to_request(&self) -> Request {
		let mut request = Request::new(self.method, self.url.clone());
		for (name, value) in &self.headers {
			request.headers.append(name.clone(), value.clone());
		}
		if let Some(body) = &self.body {
			request.body = body.clone().into_bytes();
		}
		request
	}
}

fn default_login_method() -> Method {
	Method::Post
}

fn default_expired_statuses() -> Vec<u16> {
	vec![401]
}

/// Serializable form of a [`TokenSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSessionConfig {
	pub login: LoginTemplate,
	#[serde(default)]
	pub extract: SecretSource,
	#[serde(default)]
	pub attach: SecretTarget,
	#[serde(default = "default_expired_statuses")]
	pub expired_statuses: Vec<u16>,
	#[serde(default)]
	pub expired_body_contains: Option<String>,
	/// URL globs this session handles. Empty means every URL.
	#[serde(default)]
	pub include: Vec<String>,
	/// URL globs this session never handles, e.g. static assets.
	#[serde(default)]
	pub exclude: Vec<String>,
}

/// Configurable token/cookie session.
///
/// The login request itself is never handled, so sending it through the
/// interceptor does not trigger a nested login.
#[derive(Debug)]
pub struct TokenSession {
	login: Request,
	extract: SecretSource,
	attach: SecretTarget,
	expired_statuses: Vec<u16>,
	expired_body_contains: Option<String>,
	include: Vec<Pattern>,
	exclude: Vec<Pattern>,
	secret: SecretCell,
	logins: AtomicU64,
}

impl TokenSession {
	/// Session that reads the token from the login body and sends it as `X-API-Token`.
	pub fn new(login: Request) -> Self {
		Self {
			login,
			extract: SecretSource::default(),
			attach: SecretTarget::default(),
			expired_statuses: default_expired_statuses(),
			expired_body_contains: None,
			include: Vec::new(),
			exclude: Vec::new(),
			secret: SecretCell::new(),
			logins: AtomicU64::new(0),
		}
	}

	/// Builds a session from its configuration.
	///
	/// # Errors
	///
	/// Returns [`Error::Config`] if an include/exclude glob is malformed.
	pub fn from_config(config: &TokenSessionConfig) -> Result<Self> {
		let mut session = Self::new(config.login.to_request())
			.with_extract(config.extract.clone())
			.with_attach(config.attach.clone())
			.with_expired_statuses(config.expired_statuses.iter().copied());
		session.expired_body_contains = config.expired_body_contains.clone();
		for pattern in &config.include {
			session = session.include(pattern)?;
		}
		for pattern in &config.exclude {
			session = session.exclude(pattern)?;
		}
		Ok(session)
	}

	pub fn with_extract(mut self, extract: SecretSource) -> Self {
		self.extract = extract;
		self
	}

	pub fn with_attach(mut self, attach: SecretTarget) -> Self {
		self.attach = attach;
		self
	}

	pub fn with_expired_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
		self.expired_statuses = statuses.into_iter().collect();
		self
	}

	pub fn with_expired_body_marker(mut self, marker: impl Into<String>) -> Self {
		self.expired_body_contains = Some(marker.into());
		self
	}

	/// Restricts the session to URLs matching `pattern`.
	pub fn include(mut self, pattern: &str) -> Result<Self> {
		self.include.push(compile(pattern)?);
		Ok(self)
	}

	/// Excludes URLs matching `pattern`.
	pub fn exclude(mut self, pattern: &str) -> Result<Self> {
		self.exclude.push(compile(pattern)?);
		Ok(self)
	}

	pub fn secret(&self) -> Option<Secret> {
		self.secret.get()
	}

	/// Seeds a secret obtained out of band.
	pub fn set_secret(&self, secret: impl Into<Secret>) {
		self.secret.store(secret);
	}

	/// Forgets the secret so the next handled request logs in first.
	pub fn clear_secret(&self) {
		self.secret.clear();
	}

	/// Number of secrets successfully stored from login responses.
	pub fn login_count(&self) -> u64 {
		self.logins.load(Ordering::Relaxed)
	}

	pub fn login_request(&self) -> &Request {
		&self.login
	}

	fn is_login_request(&self, request: &Request) -> bool {
		request.method == self.login.method && request.url == self.login.url
	}

	fn derive_secret(&self, response: &Response) -> Option<String> {
		let value = match &self.extract {
			SecretSource::Body => std::str::from_utf8(&response.body).ok()?.trim().to_string(),
			SecretSource::Header { name } => response.header(name)?.trim().to_string(),
			SecretSource::Cookie { name } => response.headers.get_all("Set-Cookie").find_map(|c| cookie_value(c, name))?,
		};
		(!value.is_empty()).then_some(value)
	}
}

impl Session for TokenSession {
	fn should_handle(&self, request: &Request) -> bool {
		if self.is_login_request(request) {
			return false;
		}
		let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(&request.url));
		included && !self.exclude.iter().any(|p| p.matches(&request.url))
	}

	fn login_request_before(&self, _request: &Request) -> Option<Request> {
		(!self.secret.is_set()).then(|| self.login.clone())
	}

	fn apply_secret(&self, request: &mut Request) {
		let Some(secret) = self.secret.get() else {
			return;
		};
		match &self.attach {
			SecretTarget::Header { name, scheme } => {
				let value = match scheme {
					Some(scheme) => format!("{scheme} {}", secret.expose()),
					None => secret.expose().to_string(),
				};
				request.headers.set(name.clone(), value);
			}
			SecretTarget::Cookie { name } => {
				let merged = merge_cookie(request.header("Cookie"), name, secret.expose());
				request.headers.set("Cookie", merged);
			}
		}
	}

	fn login_request_after(&self, response: &Response) -> Option<Request> {
		let expired = self.expired_statuses.contains(&response.status)
			|| self
				.expired_body_contains
				.as_deref()
				.is_some_and(|marker| response.text().contains(marker));
		expired.then(|| self.login.clone())
	}

	fn store_secret(&self, response: &Response) -> bool {
		if !response.is_success() {
			return false;
		}
		let Some(value) = self.derive_secret(response) else {
			debug!(target = "relogin.session", status = response.status, "login response carried no secret");
			return false;
		};
		self.secret.store(value);
		let count = self.logins.fetch_add(1, Ordering::Relaxed) + 1;
		debug!(target = "relogin.session", logins = count, "secret stored");
		true
	}
}

fn compile(pattern: &str) -> Result<Pattern> {
	Pattern::new(pattern).map_err(|e| Error::Config(format!("invalid URL pattern {pattern:?}: {e}")))
}

/// Value of cookie `name` in a `Set-Cookie` header, ignoring attributes.
fn cookie_value(set_cookie: &str, name: &str) -> Option<String> {
	let pair = set_cookie.split(';').next()?;
	let (cookie_name, value) = pair.split_once('=')?;
	(cookie_name.trim() == name).then(|| value.trim().to_string())
}

/// Replaces or adds `name=value` in a `Cookie` header value.
fn merge_cookie(existing: Option<&str>, name: &str, value: &str) -> String {
	let mut pairs: Vec<String> = existing
		.unwrap_or_default()
		.split(';')
		.map(str::trim)
		.filter(|pair| !pair.is_empty() && pair.split_once('=').map(|(n, _)| n.trim()) != Some(name))
		.map(str::to_string)
		.collect();
	pairs.push(format!("{name}={value}"));
	pairs.join("; ")
}
