pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Render(#[from] marpad_render::Error),
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("Notes API responded {status} {code}: {message}")]
	Api { status: u16, code: String, message: String },
	#[error("Invalid origin {origin:?}: {message}")]
	InvalidOrigin { origin: String, message: String },
	#[error("Clipboard error: {message}")]
	Clipboard { message: String },
}
