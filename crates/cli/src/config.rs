//! JSON configuration for the `request` command.
//!
//! ```json
//! {
//!   "session": {
//!     "login": { "url": "http://localhost:9595/login" },
//!     "attach": { "kind": "header", "name": "X-API-Token" }
//!   },
//!   "transport": { "timeoutMs": 10000 }
//! }
//! ```
//!
//! The file is taken from `--config`, then `RELOGIN_CONFIG`, then
//! `<config dir>/relogin/config.json`. A missing default file yields an empty
//! config (no session, default transport).

use std::fs;
use std::path::{Path, PathBuf};

use relogin::{HttpTransportConfig, TokenSessionConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
	#[serde(default)]
	pub session: Option<TokenSessionConfig>,
	#[serde(default)]
	pub transport: HttpTransportConfig,
}

impl CliConfig {
	/// Reads and parses a config file. Unlike [`CliConfig::resolve`], a missing file is an error.
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path).map_err(|e| CliError::Config(format!("cannot read {}: {e}", path.display())))?;
		serde_json::from_str(&content).map_err(|e| CliError::Config(format!("invalid config {}: {e}", path.display())))
	}

	pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
		if let Some(path) = explicit {
			debug!(target = "relogin.cli", path = %path.display(), "loading config");
			return Self::load(path);
		}
		match default_path() {
			Some(path) if path.is_file() => {
				debug!(target = "relogin.cli", path = %path.display(), "loading default config");
				Self::load(&path)
			}
			_ => Ok(Self::default()),
		}
	}
}

pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("relogin").join("config.json"))
}

#[cfg(test)]
mod tests {
	use relogin::{SecretSource, SecretTarget};

	use super::*;

	#[test]
	fn loads_cookie_session_config() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		fs::write(
			&path,
			r#"{
				"session": {
					"login": {
						"url": "http://localhost:9595/session/login",
						"headers": { "Content-Type": "application/json" },
						"body": "{\"username\":\"alice\",\"password\":\"secret\"}"
					},
					"extract": { "kind": "cookie", "name": "JSESSIONID" },
					"attach": { "kind": "cookie", "name": "JSESSIONID" },
					"expiredBodyContains": "Session expired"
				},
				"transport": { "timeoutMs": 2500 }
			}"#,
		)
		.unwrap();

		let config = CliConfig::load(&path).unwrap();
		let session = config.session.unwrap();
		assert_eq!(session.extract, SecretSource::Cookie { name: "JSESSIONID".into() });
		assert_eq!(session.attach, SecretTarget::Cookie { name: "JSESSIONID".into() });
		assert_eq!(session.expired_statuses, vec![401]);
		assert_eq!(session.expired_body_contains.as_deref(), Some("Session expired"));
		assert_eq!(config.transport.timeout_ms, Some(2500));
	}

	#[test]
	fn empty_object_is_default() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		fs::write(&path, "{}").unwrap();

		assert_eq!(CliConfig::load(&path).unwrap(), CliConfig::default());
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = CliConfig::resolve(Some(&dir.path().join("nope.json"))).unwrap_err();
		assert!(matches!(err, CliError::Config(_)));
	}

	#[test]
	fn malformed_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		fs::write(&path, "{ \"session\": ").unwrap();

		let err = CliConfig::load(&path).unwrap_err();
		assert!(err.to_string().contains("invalid config"));
	}
}
