// Integration tests for the session lifecycle over real HTTP.
//
// Mirrors how an application adopts the interceptor: a token API answered by a local
// server, a TokenSession registered at login time and invalidated at teardown.

mod test_server;

use std::collections::BTreeSet;
use std::sync::Arc;

use relogin::{FakeTransport, HttpTransport, Interceptor, Request, Response, SessionRegistry, SharedSession, TokenSession};
use test_server::{ServiceStats, TestServer};

async fn assert_status(interceptor: &Interceptor<HttpTransport>, expected: u16, url: String) {
	let response = interceptor.execute(Request::post(url.clone())).await.expect("request should complete");
	assert_eq!(response.status, expected, "{url} returned {} instead of {expected}", response.status);
}

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

fn stats(tokens: &[&str], login_count: u32, ping_count: u32, logout_count: u32) -> ServiceStats {
	ServiceStats {
		valid_tokens: tokens.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
		login_count,
		ping_count,
		logout_count,
	}
}

#[tokio::test]
async fn test_session_lifecycle_against_token_api() {
	init_tracing();
	let server = TestServer::start().await;
	let registry = Arc::new(SessionRegistry::new());
	let interceptor = Interceptor::new(HttpTransport::new().unwrap(), Arc::clone(&registry));

	assert_eq!(server.stats(), stats(&[], 0, 0, 0));

	// No session registered: everything passes through untouched.
	assert_status(&interceptor, 200, server.url("/login")).await;
	assert_status(&interceptor, 401, server.url("/ping")).await;
	assert_status(&interceptor, 401, server.url("/logout")).await;
	assert_eq!(server.stats(), stats(&["Token-1"], 1, 0, 0));

	let session = Arc::new(TokenSession::new(Request::post(server.url("/login"))));
	let shared: SharedSession = session.clone();
	registry.register(Arc::clone(&shared));

	// The session logs in on its own before the first call.
	assert_status(&interceptor, 200, server.url("/ping")).await;
	assert_eq!(session.secret().unwrap().expose(), "Token-2");
	assert_eq!(server.stats(), stats(&["Token-1", "Token-2"], 2, 1, 0));

	// A known secret does not trigger another login.
	assert_status(&interceptor, 200, server.url("/ping")).await;
	assert_eq!(session.secret().unwrap().expose(), "Token-2");
	assert_eq!(server.stats(), stats(&["Token-1", "Token-2"], 2, 2, 0));

	// Logout works thanks to the attached token.
	assert_status(&interceptor, 200, server.url("/logout")).await;
	assert_eq!(server.stats(), stats(&["Token-1"], 2, 2, 1));

	// The revoked token yields a 401, which triggers a second login and a retry.
	assert_status(&interceptor, 200, server.url("/ping")).await;
	assert_eq!(session.secret().unwrap().expose(), "Token-3");
	assert_eq!(server.stats(), stats(&["Token-1", "Token-3"], 3, 3, 1));
	assert_eq!(session.login_count(), 2);

	// After invalidation the request is unmatched again.
	assert!(registry.invalidate(&shared));
	assert_status(&interceptor, 401, server.url("/ping")).await;
	assert_eq!(server.stats(), stats(&["Token-1", "Token-3"], 3, 3, 1));

	server.shutdown();
}

#[tokio::test]
async fn test_concurrent_first_requests_share_one_login() {
	let server = TestServer::start().await;
	let registry = Arc::new(SessionRegistry::new());
	let session = Arc::new(TokenSession::new(Request::post(server.url("/login"))));
	registry.register(session.clone());
	let interceptor = Arc::new(Interceptor::new(HttpTransport::new().unwrap(), registry));

	let pings = (0..10).map(|_| {
		let interceptor = Arc::clone(&interceptor);
		let url = server.url("/ping");
		async move { interceptor.execute(Request::post(url)).await }
	});
	for result in futures_util::future::join_all(pings).await {
		assert_eq!(result.unwrap().text(), "PONG");
	}

	let stats = server.stats();
	assert_eq!(stats.login_count, 1);
	assert_eq!(stats.ping_count, 10);

	server.shutdown();
}

#[tokio::test]
async fn test_first_matching_session_wins() -> anyhow::Result<()> {
	let api = Arc::new(TokenSession::new(Request::post("http://api.test/login")).include("http://api.test/*")?);
	let fallback = Arc::new(TokenSession::new(Request::post("http://fallback.test/login")));
	api.set_secret("api-token");
	fallback.set_secret("fallback-token");

	let registry = Arc::new(SessionRegistry::new());
	registry.register(api.clone());
	registry.register(fallback.clone());

	let transport = FakeTransport::new(|_| Ok(Response::new(200)));
	let interceptor = Interceptor::new(transport, registry);

	interceptor.execute(Request::get("http://api.test/pets")).await?;
	interceptor.execute(Request::get("http://other.test/pets")).await?;

	let sent = interceptor.transport().take_sent();
	assert_eq!(sent[0].header("X-API-Token"), Some("api-token"));
	assert_eq!(sent[1].header("X-API-Token"), Some("fallback-token"));
	Ok(())
}
