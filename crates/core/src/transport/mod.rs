//! Transport abstraction: the collaborator that actually performs HTTP requests.
//!
//! The interceptor issues both original and login requests through a [`Transport`].
//! Timeouts, redirects and connection pooling are the transport's business; the
//! engine adds no timeout layer of its own.
//!
//! Dropping a [`TransportFuture`] cancels the underlying call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use relogin_protocol::{Request, Response};

use crate::error::TransportError;

pub mod fake;
pub mod http;

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Response, TransportError>> + Send + 'a>>;

/// Sends a single request and returns its response.
///
/// Implementations must support concurrent calls from multiple tasks.
pub trait Transport: Send + Sync {
	fn send(&self, request: Request) -> TransportFuture<'_>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
	fn send(&self, request: Request) -> TransportFuture<'_> {
		(**self).send(request)
	}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
	fn send(&self, request: Request) -> TransportFuture<'_> {
		(**self).send(request)
	}
}
