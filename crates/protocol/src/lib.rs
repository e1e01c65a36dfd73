//! Data types for the relogin session interceptor.
//!
//! This crate contains the plain request/response shapes that travel between an
//! embedding application, the interceptor engine and the HTTP transport.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond header lookup and serialization
//! * Transport-neutral: No dependency on any particular HTTP client
//! * Serializable: Bodies are encoded as base64 so responses can be dumped as JSON
//!
//! Session handling and the retry engine are built on top of these types in `relogin`.

pub mod headers;
pub mod message;

pub use headers::Headers;
pub use message::{Method, ParseMethodError, Request, Response};
