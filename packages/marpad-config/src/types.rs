use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub renderer: Renderer,
	pub editor: Editor,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Externally visible origin used to build share links outside a browser, e.g.
	/// "https://marpad.example.com".
	pub public_base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Renderer {
	pub api_base: String,
	#[serde(default = "default_renderer_path")]
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Editor {
	/// Base URL of the notes API the editor syncs with.
	pub api_base: String,
	#[serde(default = "default_debounce_ms")]
	pub render_debounce_ms: u64,
	#[serde(default = "default_debounce_ms")]
	pub persist_debounce_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	#[serde(default = "default_bind_localhost_only")]
	pub bind_localhost_only: bool,
	/// Optional. When set, mutating note requests must carry this bearer token.
	pub api_auth_token: Option<String>,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: default_bind_localhost_only(), api_auth_token: None }
	}
}

fn default_renderer_path() -> String {
	"/mermaid/svg".to_string()
}

fn default_debounce_ms() -> u64 {
	500
}

fn default_bind_localhost_only() -> bool {
	true
}
