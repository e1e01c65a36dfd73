//! Fake transport for unit testing sessions and the interceptor without a network.
//!
//! Responses come from a handler closure or a FIFO script, and every request the
//! transport receives is recorded for inspection.
//!
//! # Example
//!
//! ```ignore
//! let transport = FakeTransport::scripted([
//!     Ok(Response::new(200).with_body("Token-1")),
//!     Ok(Response::new(200).with_body("PONG")),
//! ]);
//! let interceptor = Interceptor::new(transport, registry);
//!
//! interceptor.execute(Request::post("http://localhost/ping")).await?;
//! let sent = interceptor.transport().take_sent();
//! assert_eq!(sent.len(), 2);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use relogin_protocol::{Request, Response};

use super::{Transport, TransportFuture};
use crate::error::TransportError;

type Handler = dyn Fn(&Request) -> Result<Response, TransportError> + Send + Sync;

/// In-memory transport with scripted responses and request capture.
pub struct FakeTransport {
	handler: Box<Handler>,
	latency: Option<Duration>,
	sent: Mutex<Vec<Request>>,
}

impl FakeTransport {
	/// Answers every request with `handler`.
	pub fn new<F>(handler: F) -> Self
	where
		F: Fn(&Request) -> Result<Response, TransportError> + Send + Sync + 'static,
	{
		Self {
			handler: Box::new(handler),
			latency: None,
			sent: Mutex::new(Vec::new()),
		}
	}

	/// Answers requests with the given results in order.
	///
	/// Once the script runs out every further request fails with a transport error.
	pub fn scripted<I>(script: I) -> Self
	where
		I: IntoIterator<Item = Result<Response, TransportError>>,
	{
		let queue = Mutex::new(script.into_iter().collect::<VecDeque<_>>());
		Self::new(move |request| {
			queue
				.lock()
				.pop_front()
				.unwrap_or_else(|| Err(TransportError::new(format!("script exhausted at {} {}", request.method, request.url))))
		})
	}

	/// Delays every response, which lets tests overlap or cancel in-flight calls.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Requests received so far, in arrival order.
	pub fn sent(&self) -> Vec<Request> {
		self.sent.lock().clone()
	}

	/// Takes all recorded requests, clearing the buffer.
	pub fn take_sent(&self) -> Vec<Request> {
		std::mem::take(&mut *self.sent.lock())
	}

	pub fn sent_count(&self) -> usize {
		self.sent.lock().len()
	}
}

impl Transport for FakeTransport {
	fn send(&self, request: Request) -> TransportFuture<'_> {
		self.sent.lock().push(request.clone());
		Box::pin(async move {
			if let Some(latency) = self.latency {
				tokio::time::sleep(latency).await;
			}
			(self.handler)(&request)
		})
	}
}

impl std::fmt::Debug for FakeTransport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FakeTransport")
			.field("latency", &self.latency)
			.field("sent", &self.sent_count())
			.finish_non_exhaustive()
	}
}
