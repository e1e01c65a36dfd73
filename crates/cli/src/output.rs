//! Rendering of responses for the terminal.

use clap::ValueEnum;
use colored::Colorize;
use relogin::{Headers, Response};
use serde::Serialize;

use crate::error::Result;

/// Output format for responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Status line followed by the body
	#[default]
	Text,
	/// Pretty JSON document per response
	Json,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Text => write!(f, "text"),
			OutputFormat::Json => write!(f, "json"),
		}
	}
}

/// JSON shape of a response. The body is decoded as (lossy) UTF-8 text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseView<'a> {
	status: u16,
	headers: &'a Headers,
	body: String,
}

pub fn render_response(response: &Response, format: OutputFormat) -> Result<String> {
	match format {
		OutputFormat::Text => {
			let status = if response.is_success() {
				response.status.to_string().green()
			} else {
				response.status.to_string().red()
			};
			let body = response.text();
			if body.is_empty() {
				Ok(format!("{status}"))
			} else {
				Ok(format!("{status}\n{body}"))
			}
		}
		OutputFormat::Json => {
			let view = ResponseView {
				status: response.status,
				headers: &response.headers,
				body: response.text().into_owned(),
			};
			Ok(serde_json::to_string_pretty(&view)?)
		}
	}
}
