use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BoxFuture, Error, NotesClient, Result};

/// The subset of a note the editor needs. Timestamps are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SharedNote {
	pub id: Uuid,
	pub code: String,
}

#[derive(Debug, Serialize)]
struct CodeBody<'a> {
	code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	code: String,
	message: String,
}

/// [`NotesClient`] backed by the notes HTTP API.
pub struct HttpNotesClient {
	client: Client,
	api_base: String,
	auth_token: Option<String>,
}
impl HttpNotesClient {
	pub fn new(api_base: impl Into<String>, auth_token: Option<String>) -> Result<Self> {
		let client = Client::builder().build()?;
		let api_base = api_base.into().trim_end_matches('/').to_string();

		Ok(Self { client, api_base, auth_token })
	}

	fn collection_url(&self) -> String {
		format!("{}/notes", self.api_base)
	}

	fn item_url(&self, id: Uuid) -> String {
		format!("{}/notes/{id}", self.api_base)
	}

	fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
		match self.auth_token.as_deref() {
			Some(token) => request.bearer_auth(token),
			None => request,
		}
	}

	async fn create_note(&self, code: &str) -> Result<SharedNote> {
		let res = self
			.authorize(self.client.post(self.collection_url()))
			.json(&CodeBody { code })
			.send()
			.await?;

		if res.status() != StatusCode::CREATED {
			return Err(api_error(res).await);
		}

		Ok(res.json().await?)
	}

	async fn fetch_note(&self, id: Uuid) -> Result<Option<SharedNote>> {
		let res = self.client.get(self.item_url(id)).send().await?;

		match res.status() {
			StatusCode::OK => Ok(Some(res.json().await?)),
			StatusCode::NOT_FOUND => Ok(None),
			_ => Err(api_error(res).await),
		}
	}

	async fn update_note(&self, id: Uuid, code: &str) -> Result<()> {
		let res = self
			.authorize(self.client.put(self.item_url(id)))
			.json(&CodeBody { code })
			.send()
			.await?;

		if res.status() != StatusCode::NO_CONTENT {
			return Err(api_error(res).await);
		}

		Ok(())
	}
}
impl NotesClient for HttpNotesClient {
	fn create<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<SharedNote>> {
		Box::pin(self.create_note(code))
	}

	fn fetch<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<SharedNote>>> {
		Box::pin(self.fetch_note(id))
	}

	fn update<'a>(&'a self, id: Uuid, code: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.update_note(id, code))
	}
}

async fn api_error(res: Response) -> Error {
	let status = res.status().as_u16();
	let body = res.text().await.unwrap_or_default();

	parse_api_error(status, &body)
}

fn parse_api_error(status: u16, body: &str) -> Error {
	match serde_json::from_str::<ErrorBody>(body) {
		Ok(ErrorBody { code, message }) => Error::Api { status, code, message },
		Err(_) => Error::Api { status, code: "UNEXPECTED_RESPONSE".to_string(), message: body.to_string() },
	}
}
