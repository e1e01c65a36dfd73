// Local web service used by the integration tests.
//
// Three POST endpoints, no parameters:
// - /login mints a new token "Token-<n>" and returns it as the body
// - /ping answers "PONG" if X-API-Token carries a valid token, else 401
// - /logout revokes the token in X-API-Token, 401 without a valid one

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
	pub valid_tokens: BTreeSet<String>,
	pub login_count: u32,
	pub ping_count: u32,
	pub logout_count: u32,
}

type SharedStats = Arc<Mutex<ServiceStats>>;

pub struct TestServer {
	addr: SocketAddr,
	stats: SharedStats,
	handle: JoinHandle<()>,
}

impl TestServer {
	pub async fn start() -> Self {
		let stats = SharedStats::default();
		let app = Router::new()
			.route("/login", post(login))
			.route("/ping", post(ping))
			.route("/logout", post(logout))
			.with_state(Arc::clone(&stats));

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
			.await
			.expect("Failed to bind test server");
		let addr = listener.local_addr().expect("Failed to read local addr");
		let handle = tokio::spawn(async move {
			axum::serve(listener, app).await.expect("Test server failed");
		});

		Self { addr, stats, handle }
	}

	pub fn url(&self, path: &str) -> String {
		format!("http://{}{}", self.addr, path)
	}

	pub fn stats(&self) -> ServiceStats {
		self.stats.lock().clone()
	}

	pub fn shutdown(self) {
		self.handle.abort();
	}
}

fn valid_token(stats: &ServiceStats, headers: &HeaderMap) -> Option<String> {
	let token = headers.get("X-API-Token")?.to_str().ok()?;
	stats.valid_tokens.contains(token).then(|| token.to_string())
}

async fn login(State(stats): State<SharedStats>) -> String {
	let mut stats = stats.lock();
	stats.login_count += 1;
	let token = format!("Token-{}", stats.login_count);
	stats.valid_tokens.insert(token.clone());
	token
}

async fn ping(State(stats): State<SharedStats>, headers: HeaderMap) -> Response {
	let mut stats = stats.lock();
	if valid_token(&stats, &headers).is_none() {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	stats.ping_count += 1;
	"PONG".into_response()
}

async fn logout(State(stats): State<SharedStats>, headers: HeaderMap) -> Response {
	let mut stats = stats.lock();
	let Some(token) = valid_token(&stats, &headers) else {
		return StatusCode::UNAUTHORIZED.into_response();
	};
	stats.valid_tokens.remove(&token);
	stats.logout_count += 1;
	StatusCode::OK.into_response()
}
