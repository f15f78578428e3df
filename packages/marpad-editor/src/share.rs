use reqwest::Url;
use uuid::Uuid;

use crate::{Error, Result};

/// Query parameter the page shell reads the share id from.
pub const NOTE_QUERY_PARAM: &str = "note";

/// Builds `<origin>/?note=<id>`. Any path or query already on `origin` is discarded.
pub fn share_url(origin: &str, id: Uuid) -> Result<String> {
	let mut url = parse_origin(origin)?;

	url.set_path("/");
	url.set_query(None);
	url.set_fragment(None);
	url.query_pairs_mut().append_pair(NOTE_QUERY_PARAM, &id.to_string());

	Ok(url.into())
}

/// Parses an origin that share links can be built on.
pub fn parse_origin(origin: &str) -> Result<Url> {
	let url = Url::parse(origin).map_err(|err| Error::InvalidOrigin {
		origin: origin.to_string(),
		message: err.to_string(),
	})?;

	if url.cannot_be_a_base() {
		return Err(Error::InvalidOrigin {
			origin: origin.to_string(),
			message: "origin must be a base URL".to_string(),
		});
	}

	Ok(url)
}
