mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Editor, Postgres, Renderer, Security, Service, Storage};

use std::{env, fs, path::Path};

/// Overrides `service.public_base_url` when set.
pub const PUBLIC_BASE_URL_ENV: &str = "MARPAD_PUBLIC_BASE_URL";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg = parse(path, &raw)?;

	apply_public_base_url_override(&mut cfg, env::var(PUBLIC_BASE_URL_ENV).ok());
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	toml::from_str(raw).map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })
}

pub fn apply_public_base_url_override(cfg: &mut Config, value: Option<String>) {
	if let Some(value) = value
		&& !value.trim().is_empty()
	{
		cfg.service.public_base_url = value;
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.log_level", &cfg.service.log_level),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("renderer.api_base", &cfg.renderer.api_base),
		("editor.api_base", &cfg.editor.api_base),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !is_http_url(&cfg.service.public_base_url) {
		return Err(Error::Validation {
			message: "service.public_base_url must start with http:// or https://.".to_string(),
		});
	}
	if !is_http_url(&cfg.editor.api_base) {
		return Err(Error::Validation {
			message: "editor.api_base must start with http:// or https://.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.renderer.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "renderer.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.renderer.path.starts_with('/') {
		return Err(Error::Validation {
			message: "renderer.path must start with '/'.".to_string(),
		});
	}

	for (key, value) in &cfg.renderer.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("renderer.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.editor.render_debounce_ms == 0 || cfg.editor.persist_debounce_ms == 0 {
		return Err(Error::Validation {
			message: "editor debounce periods must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}

	let trimmed = cfg.service.public_base_url.trim().trim_end_matches('/').to_string();

	cfg.service.public_base_url = trimmed;
	cfg.editor.api_base = cfg.editor.api_base.trim().trim_end_matches('/').to_string();
	cfg.renderer.api_base = cfg.renderer.api_base.trim().trim_end_matches('/').to_string();
}

fn is_http_url(value: &str) -> bool {
	value.starts_with("http://") || value.starts_with("https://")
}
