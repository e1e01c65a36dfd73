//! Client-side HTTP interceptor that keeps an authenticated session alive.
//!
//! An embedding application describes how its server authenticates by implementing
//! [`Session`]. Sessions are registered with a [`SessionRegistry`], and every request
//! goes through [`Interceptor::execute`] instead of the raw [`Transport`]:
//!
//! 1. The registry picks the (first) session whose [`Session::should_handle`] claims the request.
//! 2. If the session has no usable secret, a login request is sent first.
//! 3. The secret is attached and the request is sent.
//! 4. If the response signals an expired session, the engine logs in again and retries
//!    the request exactly once.
//!
//! Unclaimed requests pass straight through to the transport.
//!
//! # Example
//!
//! ```ignore
//! let registry = Arc::new(SessionRegistry::new());
//! let session = Arc::new(TokenSession::new(Request::post("http://localhost:9595/login")));
//! registry.register(session.clone());
//!
//! let interceptor = Interceptor::new(HttpTransport::new()?, Arc::clone(&registry));
//! let response = interceptor.execute(Request::post("http://localhost:9595/ping")).await?;
//! assert_eq!(response.text(), "PONG");
//! ```

pub mod error;
pub mod interceptor;
pub mod registry;
pub mod secret;
pub mod session;
pub mod token_session;
pub mod transport;

pub use error::{Error, LoginFailure, LoginPhase, Result, TransportError};
pub use interceptor::Interceptor;
pub use registry::{ResolvedSession, SessionRegistry};
pub use relogin_protocol::{Headers, Method, Request, Response};
pub use secret::{Secret, SecretCell};
pub use session::{Session, SharedSession, same_session};
pub use token_session::{LoginTemplate, SecretSource, SecretTarget, TokenSession, TokenSessionConfig};
pub use transport::fake::FakeTransport;
pub use transport::http::{HttpTransport, HttpTransportConfig};
pub use transport::{Transport, TransportFuture};
