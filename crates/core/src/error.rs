//! Error types for the session interceptor.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller of a logical request.
///
/// A request that no session claims is not an error; it is passed through.
#[derive(Debug, Error)]
pub enum Error {
	/// A login request could not establish a secret.
	///
	/// During [`LoginPhase::BeforeRequest`] the original request was never sent.
	/// During [`LoginPhase::AfterExpiry`] the expired response was discarded.
	#[error("Login failed during {phase}: {reason}")]
	LoginFailed { phase: LoginPhase, reason: LoginFailure },

	/// Network-level failure on the original request. Never retried by the engine.
	#[error("Transport error: {0}")]
	Transport(#[from] TransportError),

	/// Invalid session or transport configuration.
	#[error("Invalid configuration: {0}")]
	Config(String),
}

impl Error {
	pub fn is_login_failure(&self) -> bool {
		matches!(self, Error::LoginFailed { .. })
	}

	/// Phase of the failed login, if this is a login failure.
	pub fn login_phase(&self) -> Option<LoginPhase> {
		match self {
			Error::LoginFailed { phase, .. } => Some(*phase),
			_ => None,
		}
	}
}

/// When a login was attempted within a logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
	/// The session had no usable secret before sending.
	BeforeRequest,
	/// The response to the original request signalled an expired session.
	AfterExpiry,
}

impl fmt::Display for LoginPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LoginPhase::BeforeRequest => f.write_str("pre-login"),
			LoginPhase::AfterExpiry => f.write_str("re-login"),
		}
	}
}

/// Why a login did not produce a secret.
#[derive(Debug, Error)]
pub enum LoginFailure {
	/// The server answered, but the session could not derive a secret from it.
	#[error("response with status {status} did not yield a secret")]
	Rejected { status: u16 },

	/// The login request itself failed at the network level.
	#[error("login request failed: {0}")]
	Transport(#[source] TransportError),
}

/// Network-level failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
	message: String,
	#[source]
	source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			source: None,
		}
	}

	pub fn with_source(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self {
			message: message.into(),
			source: Some(Box::new(source)),
		}
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}
