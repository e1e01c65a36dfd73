mod mock_server;
mod request;

pub use request::build_request;

use crate::cli::{Cli, Commands};
use crate::config::CliConfig;
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	match cli.command {
		Commands::Request(args) => {
			let config = CliConfig::resolve(cli.config.as_deref())?;
			request::execute(&args, &config).await
		}
		Commands::MockServer(args) => mock_server::execute(args).await,
	}
}
