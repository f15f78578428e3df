//! Client for the external diagram-rendering engine.
//!
//! The engine receives Mermaid source as `{"diagram_source": "..."}` and answers with the
//! rendered markup (SVG) as the response body.

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client,
	header::{ACCEPT, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::{Map, Value};

pub async fn render(cfg: &marpad_config::Renderer, code: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let res = client
		.post(endpoint(cfg))
		.headers(request_headers(&cfg.default_headers)?)
		.json(&serde_json::json!({ "diagram_source": code }))
		.send()
		.await?;
	let body = res.error_for_status()?.text().await?;

	parse_render_response(body)
}

pub fn endpoint(cfg: &marpad_config::Renderer) -> String {
	format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path)
}

pub fn request_headers(default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(ACCEPT, HeaderValue::from_static("image/svg+xml"));

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header {key} must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

fn parse_render_response(body: String) -> Result<String> {
	if body.trim().is_empty() {
		return Err(Error::InvalidResponse {
			message: "Renderer returned an empty body.".to_string(),
		});
	}

	Ok(body)
}
