use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Args, Parser, Subcommand};
use relogin::Method;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "relogin")]
#[command(about = "Send HTTP requests through a session that logs itself back in")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Session and transport configuration (JSON)
	#[arg(short, long, global = true, env = "RELOGIN_CONFIG", value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Send a request through the configured session
	#[command(alias = "req")]
	Request(RequestArgs),

	/// Run the local mock API (token and cookie endpoints)
	#[command(alias = "mock")]
	MockServer(MockServerArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
	pub url: String,

	/// HTTP method
	#[arg(short = 'X', long, default_value = "GET")]
	pub method: Method,

	/// Extra header, repeatable
	#[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
	pub headers: Vec<String>,

	/// Request body
	#[arg(short, long)]
	pub data: Option<String>,

	/// Send the same request this many times, sharing one session
	#[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
	pub repeat: u32,

	#[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct MockServerArgs {
	#[arg(long, default_value = "127.0.0.1")]
	pub host: String,

	#[arg(short, long, default_value_t = 9595)]
	pub port: u16,

	/// Lifetime of cookie sessions in seconds
	#[arg(long, default_value_t = 5)]
	pub ttl: u64,

	/// Username accepted by POST /session/login
	#[arg(long, default_value = "alice")]
	pub username: String,

	/// Password accepted by POST /session/login
	#[arg(long, default_value = "secret")]
	pub password: String,
}

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default().bold())
		.usage(AnsiColor::Yellow.on_default().bold())
		.literal(AnsiColor::Green.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_request_with_headers_and_repeat() {
		let cli = Cli::try_parse_from([
			"relogin",
			"-vv",
			"request",
			"http://localhost:9595/ping",
			"-X",
			"POST",
			"-H",
			"Accept: text/plain",
			"-H",
			"X-Trace: 1",
			"--repeat",
			"3",
			"-f",
			"json",
		])
		.unwrap();

		assert_eq!(cli.verbose, 2);
		let Commands::Request(args) = cli.command else {
			panic!("expected request command");
		};
		assert_eq!(args.method, Method::Post);
		assert_eq!(args.headers, vec!["Accept: text/plain", "X-Trace: 1"]);
		assert_eq!(args.repeat, 3);
		assert_eq!(args.format, OutputFormat::Json);
	}

	#[test]
	fn rejects_zero_repeat() {
		assert!(Cli::try_parse_from(["relogin", "request", "http://x", "--repeat", "0"]).is_err());
	}

	#[test]
	fn mock_server_defaults() {
		let cli = Cli::try_parse_from(["relogin", "mock-server"]).unwrap();
		let Commands::MockServer(args) = cli.command else {
			panic!("expected mock-server command");
		};
		assert_eq!(args.port, 9595);
		assert_eq!(args.ttl, 5);
		assert_eq!(args.username, "alice");
	}
}
