//! Session capability contract implemented by embedding applications.

use std::sync::Arc;

use relogin_protocol::{Request, Response};

/// Reference-counted, type-erased session as stored by the registry.
pub type SharedSession = Arc<dyn Session>;

/// Per-application session policy.
///
/// A session owns its secret and decides which requests it manages, when a login is
/// needed and how the secret travels on the wire. The interceptor never writes the
/// secret itself; it only calls [`Session::store_secret`] with a login response.
///
/// Implementations are shared between concurrent requests, so secret storage must be
/// synchronized. [`SecretCell`](crate::SecretCell) provides that.
///
/// Hooks are called in this order for each logical request:
///
/// 1. [`should_handle`](Session::should_handle)
/// 2. [`login_request_before`](Session::login_request_before), then
///    [`store_secret`](Session::store_secret) if a login was sent
/// 3. [`apply_secret`](Session::apply_secret)
/// 4. [`login_request_after`](Session::login_request_after) on the response, then at
///    most one more `store_secret` / `apply_secret` round
pub trait Session: Send + Sync + 'static {
	/// Whether this session manages `request`. Must be free of side effects.
	///
	/// Returning `false` lets the request through untouched, e.g. for unprotected
	/// static assets.
	fn should_handle(&self, request: &Request) -> bool;

	/// Login request to perform before `request`, if the secret is known to be
	/// missing or stale. Must be free of side effects.
	fn login_request_before(&self, request: &Request) -> Option<Request>;

	/// Stamps the current secret onto `request`. No-op without a secret.
	fn apply_secret(&self, request: &mut Request);

	/// Login request to perform if `response` signals an expired session
	/// (canonically a 401).
	fn login_request_after(&self, response: &Response) -> Option<Request>;

	/// Extracts and stores a secret from a login response.
	///
	/// Returns `false` when no secret could be derived (failure status, empty body,
	/// unparsable payload); the previous secret must then stay untouched. Must never
	/// panic: internal failures are reported through the return value.
	fn store_secret(&self, response: &Response) -> bool;
}

/// Identity comparison for shared sessions.
///
/// Compares the data pointers only, so two handles to the same allocation are equal
/// even when their vtable pointers differ.
pub fn same_session(a: &SharedSession, b: &SharedSession) -> bool {
	std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
