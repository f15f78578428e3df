use axum::{
	Json, Router,
	extract::{Path, State, rejection::JsonRejection},
	http::{HeaderMap, HeaderValue, Method, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marpad_storage::models::Note;

use crate::{page, state::AppState};

pub const COLLECTION_ALLOW: &str = "POST";
pub const ITEM_ALLOW: &str = "GET, PUT, DELETE";

const NOT_FOUND: &str = "NOT_FOUND";
const FAILED_OPERATION: &str = "FAILED_OPERATION";
const INVALID_REQUEST: &str = "INVALID_REQUEST";
const UNAUTHORIZED: &str = "UNAUTHORIZED";

const NOTE_MISSING_MESSAGE: &str = "Note does not exist.";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(page::index))
		.route("/page-props", get(page::props))
		.route("/health", get(health))
		.route("/notes", post(create_note).fallback(collection_method_not_allowed))
		.route(
			"/notes/{id}",
			get(get_note)
				.head(item_method_not_allowed)
				.put(update_note)
				.delete(delete_note)
				.fallback(item_method_not_allowed),
		)
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
	pub code: String,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn create_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
	authorize(&state, &headers)?;

	let Json(payload) = payload.map_err(invalid_body)?;
	let note = state.notes.create(&payload.code).await.map_err(|err| {
		tracing::error!(error = %err, "Note failed to create.");

		json_error(StatusCode::UNPROCESSABLE_ENTITY, FAILED_OPERATION, "Cannot create Note.")
	})?;

	tracing::info!(note_id = %note.id, "Note created.");

	Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
	State(state): State<AppState>,
	Path(raw_id): Path<String>,
) -> Result<Json<Note>, ApiError> {
	let id = parse_note_id(&raw_id)?;
	let note = state.notes.find_by_id(id).await.ok_or_else(note_missing)?;

	Ok(Json(note))
}

async fn update_note(
	State(state): State<AppState>,
	Path(raw_id): Path<String>,
	headers: HeaderMap,
	payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
	authorize(&state, &headers)?;

	let id = parse_note_id(&raw_id)?;
	let payload = match payload {
		Ok(Json(payload)) => payload,
		// A missing note is reported before a bad body.
		Err(rejection) => match state.notes.find_by_id(id).await {
			Some(_) => return Err(invalid_body(rejection)),
			None => return Err(note_missing()),
		},
	};

	state.notes.update(id, &payload.code).await.map_err(|err| {
		store_error(err, id, "Note failed to update.", "Cannot update content for Note.")
	})?;

	Ok(StatusCode::NO_CONTENT)
}

async fn delete_note(
	State(state): State<AppState>,
	Path(raw_id): Path<String>,
	headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
	authorize(&state, &headers)?;

	let id = parse_note_id(&raw_id)?;

	state
		.notes
		.delete(id)
		.await
		.map_err(|err| store_error(err, id, "Note failed to delete.", "Cannot delete Note."))?;

	tracing::info!(note_id = %id, "Note deleted.");

	Ok(StatusCode::NO_CONTENT)
}

async fn collection_method_not_allowed(method: Method) -> Response {
	method_not_allowed(&method, COLLECTION_ALLOW)
}

async fn item_method_not_allowed(method: Method) -> Response {
	method_not_allowed(&method, ITEM_ALLOW)
}

fn method_not_allowed(method: &Method, allow: &'static str) -> Response {
	(
		StatusCode::METHOD_NOT_ALLOWED,
		[(header::ALLOW, HeaderValue::from_static(allow))],
		format!("Method {method} Not Allowed"),
	)
		.into_response()
}

/// Identifiers are opaque to callers, so anything that is not a UUID simply does not exist.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
	Uuid::parse_str(raw).map_err(|_| note_missing())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
	let Some(expected) = state.settings.api_auth_token.as_deref() else {
		return Ok(());
	};
	let provided = headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.map(str::trim);

	if provided == Some(expected) {
		return Ok(());
	}

	Err(json_error(StatusCode::UNAUTHORIZED, UNAUTHORIZED, "A valid bearer token is required."))
}

fn store_error(
	err: marpad_storage::Error,
	id: Uuid,
	log_message: &'static str,
	failure_message: &'static str,
) -> ApiError {
	match err {
		marpad_storage::Error::NotFound(_) => note_missing(),
		err => {
			tracing::error!(note_id = %id, error = %err, "{log_message}");

			json_error(StatusCode::UNPROCESSABLE_ENTITY, FAILED_OPERATION, failure_message)
		},
	}
}

fn note_missing() -> ApiError {
	json_error(StatusCode::NOT_FOUND, NOT_FOUND, NOTE_MISSING_MESSAGE)
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
	json_error(StatusCode::BAD_REQUEST, INVALID_REQUEST, rejection.body_text())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, code: code.into(), message: message.into() }
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { code: self.code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
