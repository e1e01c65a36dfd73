use std::time::Duration;

use crate::cli::MockServerArgs;
use crate::error::{CliError, Result};
use crate::mock_server::{self, MockServerOptions};

pub async fn execute(args: MockServerArgs) -> Result<()> {
	let options = MockServerOptions {
		session_ttl: Duration::from_secs(args.ttl),
		username: args.username,
		password: args.password,
	};
	let addr = format!("{}:{}", args.host, args.port);
	mock_server::run(&addr, options)
		.await
		.map_err(|e| CliError::Server(format!("{addr}: {e}")))
}
