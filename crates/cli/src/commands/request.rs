use std::sync::Arc;

use relogin::{HttpTransport, Interceptor, Request, SessionRegistry, TokenSession};
use tracing::{info, warn};

use crate::cli::RequestArgs;
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output;

pub async fn execute(args: &RequestArgs, config: &CliConfig) -> Result<()> {
	let request = build_request(args)?;

	let registry = Arc::new(SessionRegistry::new());
	let session = config.session.as_ref().map(TokenSession::from_config).transpose()?.map(Arc::new);
	match &session {
		Some(session) => {
			let login = session.login_request();
			info!(target = "relogin.cli", login_method = %login.method, login_url = %login.url, "session configured");
			registry.register(session.clone());
		}
		None => warn!(target = "relogin.cli", "no session configured, sending requests unauthenticated"),
	}

	let transport = HttpTransport::with_config(&config.transport)?;
	let interceptor = Interceptor::new(transport, registry);

	for attempt in 1..=args.repeat {
		info!(target = "relogin.cli", attempt, method = %request.method, url = %request.url, "sending request");
		let response = interceptor.execute(request.clone()).await?;
		println!("{}", output::render_response(&response, args.format)?);
	}

	if let Some(session) = session {
		info!(target = "relogin.cli", logins = session.login_count(), "session summary");
	}
	Ok(())
}

/// Turns the command line into a [`Request`]. Headers are `Name: value`.
pub fn build_request(args: &RequestArgs) -> Result<Request> {
	let mut request = Request::new(args.method, args.url.clone());
	for raw in &args.headers {
		let (name, value) = raw
			.split_once(':')
			.ok_or_else(|| CliError::InvalidArgument(format!("header must be 'Name: value', got '{raw}'")))?;
		let name = name.trim();
		if name.is_empty() {
			return Err(CliError::InvalidArgument(format!("header name missing in '{raw}'")));
		}
		request.headers.append(name, value.trim());
	}
	if let Some(data) = &args.data {
		request.body = data.clone().into_bytes();
	}
	Ok(request)
}
