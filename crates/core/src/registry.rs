//! Set of active sessions consulted to route each outgoing request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use relogin_protocol::{Request, Response};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::session::{SharedSession, same_session};

/// A registered session together with its login coordination state.
struct Registration {
	session: SharedSession,
	/// Serializes login check-and-send sequences for this session.
	login_gate: Mutex<()>,
	/// Bumped after every stored secret.
	generation: AtomicU64,
	/// Held shared while stamping and exclusively while storing, so a stamped
	/// secret and the generation read with it always belong together.
	stamp_lock: RwLock<()>,
}

/// Session resolved for one logical request.
///
/// Holds the registration alive for the duration of the request, so invalidating
/// the session mid-flight does not affect requests already dispatched.
#[derive(Clone)]
pub struct ResolvedSession {
	registration: Arc<Registration>,
}

impl ResolvedSession {
	pub fn session(&self) -> &SharedSession {
		&self.registration.session
	}

	/// Number of secrets stored through the interceptor for this registration.
	pub fn generation(&self) -> u64 {
		self.registration.generation.load(Ordering::Acquire)
	}

	fn advance_generation(&self) -> u64 {
		self.registration.generation.fetch_add(1, Ordering::AcqRel) + 1
	}

	/// Applies the current secret to `request` and returns the generation it belongs to.
	pub(crate) fn stamp(&self, request: &mut Request) -> u64 {
		let _shared = self.registration.stamp_lock.read();
		self.registration.session.apply_secret(request);
		self.generation()
	}

	/// Hands a login response to the session. Returns the new generation if a
	/// secret was stored.
	pub(crate) fn store_secret(&self, response: &Response) -> Option<u64> {
		let _exclusive = self.registration.stamp_lock.write();
		self.registration
			.session
			.store_secret(response)
			.then(|| self.advance_generation())
	}

	pub(crate) async fn lock_login(&self) -> MutexGuard<'_, ()> {
		self.registration.login_gate.lock().await
	}
}

impl std::fmt::Debug for ResolvedSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResolvedSession").field("generation", &self.generation()).finish_non_exhaustive()
	}
}

/// Registry of active sessions.
///
/// Membership is unique by identity. Resolution walks sessions in registration order
/// and the first one whose [`should_handle`](crate::Session::should_handle) returns
/// `true` wins. Safe to read while other tasks register or invalidate sessions.
#[derive(Default)]
pub struct SessionRegistry {
	entries: RwLock<Vec<Arc<Registration>>>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a session. Registering the same session twice is a no-op.
	///
	/// Returns `true` if the session was newly added.
	pub fn register(&self, session: SharedSession) -> bool {
		let mut entries = self.entries.write();
		if entries.iter().any(|entry| same_session(&entry.session, &session)) {
			debug!(target = "relogin.registry", "session already registered");
			return false;
		}
		entries.push(Arc::new(Registration {
			session,
			login_gate: Mutex::new(()),
			generation: AtomicU64::new(0),
			stamp_lock: RwLock::new(()),
		}));
		debug!(target = "relogin.registry", count = entries.len(), "session registered");
		true
	}

	/// Removes a session. Returns `true` if it was registered.
	pub fn invalidate(&self, session: &SharedSession) -> bool {
		let mut entries = self.entries.write();
		let before = entries.len();
		entries.retain(|entry| !same_session(&entry.session, session));
		let removed = entries.len() != before;
		if removed {
			debug!(target = "relogin.registry", count = entries.len(), "session invalidated");
		}
		removed
	}

	/// Finds the session responsible for `request`, if any.
	pub fn resolve(&self, request: &Request) -> Option<ResolvedSession> {
		// Snapshot so `should_handle` runs without holding the lock.
		let entries: Vec<Arc<Registration>> = self.entries.read().clone();
		entries
			.into_iter()
			.find(|entry| entry.session.should_handle(request))
			.map(|registration| ResolvedSession { registration })
	}

	pub fn contains(&self, session: &SharedSession) -> bool {
		self.entries.read().iter().any(|entry| same_session(&entry.session, session))
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl std::fmt::Debug for SessionRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionRegistry").field("sessions", &self.len()).finish()
	}
}
