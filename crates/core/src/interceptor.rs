//! Request lifecycle engine.
//!
//! For every outgoing request the interceptor runs:
//!
//! ```text
//! Idle -> (PreLogin?) -> Attach -> Sent -> (ReLogin?) -> Attach -> Sent -> Done
//! ```
//!
//! Each login branch is taken at most once per logical request, and the re-login
//! branch is never re-entered: the response to the retried send is returned as-is,
//! even if it signals expiry again. This guarantees termination against a server
//! that keeps rejecting the session.
//!
//! # Concurrency
//!
//! Logins for one session are serialized by the registration's login gate. A request
//! that needs a pre-login re-checks [`Session::login_request_before`] once it holds the
//! gate, so requests queued behind an in-flight login reuse its secret. A request that
//! hits an expired session skips its own login when the login generation moved since
//! it was stamped, since a concurrent request already refreshed the secret.
//!
//! # Cancellation
//!
//! Dropping the future returned by [`Interceptor::execute`] cancels the in-flight
//! transport call. [`Session::store_secret`] only runs after a login response has been
//! fully received, so a cancelled login stores nothing.
//!
//! [`Session::login_request_before`]: crate::Session::login_request_before
//! [`Session::store_secret`]: crate::Session::store_secret

use std::sync::Arc;

use relogin_protocol::{Request, Response};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, LoginFailure, LoginPhase, Result};
use crate::registry::{ResolvedSession, SessionRegistry};
use crate::transport::Transport;

/// Wraps a [`Transport`] with session management.
///
/// Call [`execute`](Interceptor::execute) wherever the transport would otherwise be
/// called directly.
#[derive(Debug, Clone)]
pub struct Interceptor<T> {
	transport: T,
	registry: Arc<SessionRegistry>,
}

impl<T: Transport> Interceptor<T> {
	pub fn new(transport: T, registry: Arc<SessionRegistry>) -> Self {
		Self { transport, registry }
	}

	pub fn registry(&self) -> &Arc<SessionRegistry> {
		&self.registry
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Performs a logical request.
	///
	/// Requests no registered session claims are sent unmodified.
	///
	/// # Errors
	///
	/// - [`Error::LoginFailed`] if a login did not yield a secret
	/// - [`Error::Transport`] if the original request failed at the network level
	pub async fn execute(&self, request: Request) -> Result<Response> {
		match self.registry.resolve(&request) {
			Some(resolved) => self.execute_for(&resolved, request).await,
			None => {
				trace!(target = "relogin.interceptor", method = %request.method, url = %request.url, "unclaimed; passing through");
				Ok(self.transport.send(request).await?)
			}
		}
	}

	/// Performs a logical request on behalf of an already resolved session.
	pub async fn execute_for(&self, resolved: &ResolvedSession, request: Request) -> Result<Response> {
		let session = resolved.session();
		if !session.should_handle(&request) {
			return Ok(self.transport.send(request).await?);
		}

		self.ensure_logged_in(resolved, &request).await?;

		let (response, stamped_generation) = self.send_stamped(resolved, &request).await?;
		let Some(login) = session.login_request_after(&response) else {
			return Ok(response);
		};

		debug!(
			target = "relogin.interceptor",
			url = %request.url,
			status = response.status,
			"session expired; logging in again"
		);
		self.relogin(resolved, login, stamped_generation).await?;

		let (retried, _) = self.send_stamped(resolved, &request).await?;
		debug!(target = "relogin.interceptor", url = %request.url, status = retried.status, "retried once");
		Ok(retried)
	}

	async fn ensure_logged_in(&self, resolved: &ResolvedSession, request: &Request) -> Result<()> {
		let session = resolved.session();
		if session.login_request_before(request).is_none() {
			return Ok(());
		}

		let _gate = resolved.lock_login().await;
		let Some(login) = session.login_request_before(request) else {
			debug!(target = "relogin.interceptor", url = %request.url, "secret obtained by concurrent login");
			return Ok(());
		};
		self.login(resolved, LoginPhase::BeforeRequest, login).await
	}

	async fn relogin(&self, resolved: &ResolvedSession, login: Request, stamped_generation: u64) -> Result<()> {
		let _gate = resolved.lock_login().await;
		if resolved.generation() != stamped_generation {
			debug!(target = "relogin.interceptor", "secret refreshed by concurrent login; skipping");
			return Ok(());
		}
		self.login(resolved, LoginPhase::AfterExpiry, login).await
	}

	async fn login(&self, resolved: &ResolvedSession, phase: LoginPhase, login: Request) -> Result<()> {
		debug!(target = "relogin.interceptor", %phase, method = %login.method, url = %login.url, "sending login request");

		let response = match self.transport.send(login).await {
			Ok(response) => response,
			Err(source) => {
				warn!(target = "relogin.interceptor", %phase, error = %source, "login request failed");
				return Err(Error::LoginFailed {
					phase,
					reason: LoginFailure::Transport(source),
				});
			}
		};

		let Some(generation) = resolved.store_secret(&response) else {
			warn!(target = "relogin.interceptor", %phase, status = response.status, "login response did not yield a secret");
			return Err(Error::LoginFailed {
				phase,
				reason: LoginFailure::Rejected { status: response.status },
			});
		};
		info!(target = "relogin.interceptor", %phase, generation, "session secret stored");
		Ok(())
	}

	/// Sends a fresh copy of `request` carrying the current secret.
	///
	/// Returns the response and the login generation the stamped secret belongs to.
	async fn send_stamped(&self, resolved: &ResolvedSession, request: &Request) -> Result<(Response, u64)> {
		let mut stamped = request.clone();
		let generation = resolved.stamp(&mut stamped);

		let response = self.transport.send(stamped).await?;
		trace!(target = "relogin.interceptor", url = %request.url, status = response.status, generation, "sent");
		Ok((response, generation))
	}
}
