//! Local mock API for trying sessions out by hand.
//!
//! Token endpoints (all POST):
//! - `/login` mints `Token-<n>` and returns it as the body
//! - `/ping` answers `PONG` with a valid `X-API-Token`, 401 otherwise
//! - `/logout` revokes the token in `X-API-Token`
//!
//! Cookie endpoints:
//! - `POST /session/login` takes `{"username", "password"}` and sets `JSESSIONID`
//! - `GET /api_call` answers 401 without the cookie, `200 Session expired` once the
//!   session is older than the TTL, and a JSON payload otherwise
//!
//! `GET /stats` reports counters as JSON.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info};

pub const SESSION_COOKIE: &str = "JSESSIONID";
const TOKEN_HEADER: &str = "X-API-Token";
const EXPIRED_BODY: &str = "Session expired";

#[derive(Debug, Clone)]
pub struct MockServerOptions {
	pub session_ttl: Duration,
	pub username: String,
	pub password: String,
}

impl Default for MockServerOptions {
	fn default() -> Self {
		Self {
			session_ttl: Duration::from_secs(5),
			username: "alice".to_string(),
			password: "secret".to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockStats {
	pub valid_tokens: BTreeSet<String>,
	pub login_count: u32,
	pub ping_count: u32,
	pub logout_count: u32,
	pub session_login_count: u32,
	pub rejected_logins: u32,
	pub api_call_count: u32,
	pub expired_calls: u32,
}

#[derive(Debug, Default)]
struct MockState {
	stats: MockStats,
	sessions: HashMap<String, Instant>,
}

/// Cloneable handle on the mock API; all clones share one state.
#[derive(Debug, Clone)]
pub struct MockServer {
	options: Arc<MockServerOptions>,
	state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Deserialize)]
struct Credentials {
	username: String,
	password: String,
}

impl MockServer {
	pub fn new(options: MockServerOptions) -> Self {
		Self {
			options: Arc::new(options),
			state: Arc::default(),
		}
	}

	pub fn router(&self) -> Router {
		Router::new()
			.route("/login", post(token_login))
			.route("/ping", post(ping))
			.route("/logout", post(logout))
			.route("/session/login", post(session_login))
			.route("/api_call", get(api_call))
			.route("/stats", get(stats))
			.with_state(self.clone())
	}

	pub fn stats(&self) -> MockStats {
		self.state.lock().stats.clone()
	}

	/// Serves until the listener fails or the task is dropped.
	pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
		let router = self.router();
		axum::serve(listener, router).await
	}
}

fn valid_token(stats: &MockStats, headers: &HeaderMap) -> Option<String> {
	let token = headers.get(TOKEN_HEADER)?.to_str().ok()?;
	stats.valid_tokens.contains(token).then(|| token.to_string())
}

fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(key, _)| *key == name)
		.map(|(_, value)| value.to_string())
}

/// Six uppercase hex digits, unique for the first 2^24 sessions.
fn session_id(n: u32) -> String {
	format!("{:06X}", n.wrapping_mul(0x9E37_79B1) & 0x00FF_FFFF)
}

fn bad_credentials() -> Response {
	(
		StatusCode::UNAUTHORIZED,
		[(header::CONTENT_TYPE, "application/json")],
		r#"{ "status": "401", "code": "401", "message": "Bad username or password" }"#,
	)
		.into_response()
}

async fn token_login(State(server): State<MockServer>) -> String {
	let mut state = server.state.lock();
	state.stats.login_count += 1;
	let token = format!("Token-{}", state.stats.login_count);
	state.stats.valid_tokens.insert(token.clone());
	debug!(target = "relogin.mock", %token, "token issued");
	token
}

async fn ping(State(server): State<MockServer>, headers: HeaderMap) -> Response {
	let mut state = server.state.lock();
	if valid_token(&state.stats, &headers).is_none() {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	state.stats.ping_count += 1;
	"PONG".into_response()
}

async fn logout(State(server): State<MockServer>, headers: HeaderMap) -> Response {
	let mut state = server.state.lock();
	let Some(token) = valid_token(&state.stats, &headers) else {
		return StatusCode::UNAUTHORIZED.into_response();
	};
	state.stats.valid_tokens.remove(&token);
	state.stats.logout_count += 1;
	debug!(target = "relogin.mock", %token, "token revoked");
	StatusCode::OK.into_response()
}

async fn session_login(State(server): State<MockServer>, body: String) -> Response {
	let Ok(credentials) = serde_json::from_str::<Credentials>(&body) else {
		return StatusCode::BAD_REQUEST.into_response();
	};

	let mut state = server.state.lock();
	if credentials.username != server.options.username || credentials.password != server.options.password {
		state.stats.rejected_logins += 1;
		return bad_credentials();
	}

	state.stats.session_login_count += 1;
	let id = session_id(state.stats.session_login_count);
	state.sessions.insert(id.clone(), Instant::now());
	debug!(target = "relogin.mock", session = %id, "cookie session created");

	let cookie = format!("{SESSION_COOKIE}={id}; Path=/; Secure; HttpOnly");
	let mut response = (
		[(header::CONTENT_TYPE, "application/json")],
		r#"{ "user_id": 123, "unread_notifications": 42 }"#,
	)
		.into_response();
	if let Ok(value) = HeaderValue::from_str(&cookie) {
		response.headers_mut().insert(header::SET_COOKIE, value);
	}
	response
}

async fn api_call(State(server): State<MockServer>, headers: HeaderMap) -> Response {
	let Some(id) = request_cookie(&headers, SESSION_COOKIE) else {
		return bad_credentials();
	};

	let mut state = server.state.lock();
	let live = state
		.sessions
		.get(&id)
		.is_some_and(|created| created.elapsed() <= server.options.session_ttl);
	if !live {
		state.stats.expired_calls += 1;
		return (StatusCode::OK, EXPIRED_BODY).into_response();
	}

	state.stats.api_call_count += 1;
	(
		[(header::CONTENT_TYPE, "application/json")],
		r#"{ "pets": ["cat", "horse", "cow"] }"#,
	)
		.into_response()
}

async fn stats(State(server): State<MockServer>) -> Json<MockStats> {
	Json(server.stats())
}

/// Binds `addr` and serves the mock API until the process is stopped.
pub async fn run(addr: &str, options: MockServerOptions) -> std::io::Result<()> {
	let listener = TcpListener::bind(addr).await?;
	let local = listener.local_addr()?;
	info!(target = "relogin.mock", %local, ttl_secs = options.session_ttl.as_secs(), "mock server listening");
	println!("Mock server listening on http://{local}");
	MockServer::new(options).serve(listener).await
}
