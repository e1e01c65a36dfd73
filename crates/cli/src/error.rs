//! CLI error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Relogin(#[from] relogin::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Config error: {0}")]
	Config(String),

	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("Server error: {0}")]
	Server(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
