use std::sync::Arc;

use marpad_storage::{NoteStore, PgNoteStore, db::Db};

/// Immutable request-independent settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
	pub public_base_url: String,
	pub api_auth_token: Option<String>,
}
impl Settings {
	pub fn from_config(config: &marpad_config::Config) -> Self {
		Self {
			public_base_url: config.service.public_base_url.clone(),
			api_auth_token: config.security.api_auth_token.clone(),
		}
	}
}

#[derive(Clone)]
pub struct AppState {
	pub notes: Arc<dyn NoteStore>,
	pub settings: Arc<Settings>,
}
impl AppState {
	pub async fn new(config: &marpad_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::with_store(Arc::new(PgNoteStore::new(db)), Settings::from_config(config)))
	}

	pub fn with_store(notes: Arc<dyn NoteStore>, settings: Settings) -> Self {
		Self { notes, settings: Arc::new(settings) }
	}
}
