use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, Response, StatusCode, header},
};
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use marpad_api::{
	routes,
	state::{AppState, Settings},
};
use marpad_storage::NoteStore;
use marpad_testkit::MemoryNoteStore;

const BASE_URL: &str = "https://marpad.example.com";

fn app_with(store: Arc<MemoryNoteStore>, api_auth_token: Option<&str>) -> Router {
	let settings = Settings {
		public_base_url: BASE_URL.to_string(),
		api_auth_token: api_auth_token.map(str::to_string),
	};

	routes::router(AppState::with_store(store, settings))
}

fn app() -> (Router, Arc<MemoryNoteStore>) {
	let store = Arc::new(MemoryNoteStore::new());

	(app_with(store.clone(), None), store)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
	let builder = Request::builder().method(method).uri(uri);

	let request = match body {
		Some(body) => builder
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string())),
		None => builder.body(Body::empty()),
	};

	request.expect("Failed to build request.")
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
	app.clone().oneshot(req).await.expect("Failed to call router.")
}

async fn read_bytes(response: Response<Body>) -> Vec<u8> {
	body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.")
		.to_vec()
}

async fn read_json(response: Response<Body>) -> Value {
	serde_json::from_slice(&read_bytes(response).await).expect("Failed to parse response.")
}

fn allow(response: &Response<Body>) -> &str {
	response
		.headers()
		.get(header::ALLOW)
		.expect("Missing Allow header.")
		.to_str()
		.expect("Allow header must be ASCII.")
}

#[tokio::test]
async fn health_ok() {
	let (app, _) = app();
	let response = send(&app, request("GET", "/health", None)).await;

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_creates_note_and_echoes_code() {
	let (app, store) = app();
	let response = send(
		&app,
		request("POST", "/notes", Some(serde_json::json!({ "code": "graph TD;A-->B;" }))),
	)
	.await;

	assert_eq!(response.status(), StatusCode::CREATED);

	let json = read_json(response).await;
	let id = json["id"].as_str().expect("Missing id.");

	assert!(!id.is_empty());
	assert_eq!(json["code"], "graph TD;A-->B;");
	assert!(json["createdAt"].is_string());
	assert!(json["updatedAt"].is_string());

	let id = Uuid::parse_str(id).expect("Id must be a UUID.");

	assert_eq!(store.get(id).map(|note| note.code), Some("graph TD;A-->B;".to_string()));
}

#[tokio::test]
async fn get_returns_stored_note() {
	let (app, store) = app();
	let note = store.create("sequenceDiagram").await.expect("Failed to seed note.");
	let response = send(&app, request("GET", &format!("/notes/{}", note.id), None)).await;

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["id"], note.id.to_string());
	assert_eq!(json["code"], "sequenceDiagram");
}

#[tokio::test]
async fn get_missing_note_is_structured_404() {
	let (app, _) = app();

	for uri in [format!("/notes/{}", Uuid::new_v4()), "/notes/not-a-uuid".to_string()] {
		let response = send(&app, request("GET", &uri, None)).await;

		assert_eq!(response.status(), StatusCode::NOT_FOUND);

		let json = read_json(response).await;

		assert_eq!(json["code"], "NOT_FOUND");
		assert_eq!(json["message"], "Note does not exist.");
	}
}

#[tokio::test]
async fn put_replaces_code_with_empty_204() {
	let (app, store) = app();
	let note = store.create("graph TD;").await.expect("Failed to seed note.");
	let response = send(
		&app,
		request(
			"PUT",
			&format!("/notes/{}", note.id),
			Some(serde_json::json!({ "code": "graph LR;" })),
		),
	)
	.await;

	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	assert!(read_bytes(response).await.is_empty());

	let updated = store.get(note.id).expect("Note must still exist.");

	assert_eq!(updated.code, "graph LR;");
	assert_eq!(updated.created_at, note.created_at);
	assert!(updated.updated_at >= note.updated_at);
}

#[tokio::test]
async fn delete_removes_note() {
	let (app, store) = app();
	let note = store.create("graph TD;").await.expect("Failed to seed note.");
	let response = send(&app, request("DELETE", &format!("/notes/{}", note.id), None)).await;

	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	assert!(store.is_empty());

	let response = send(&app, request("GET", &format!("/notes/{}", note.id), None)).await;

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutations_on_missing_note_are_404() {
	let (app, _) = app();
	let uri = format!("/notes/{}", Uuid::new_v4());
	let put = send(&app, request("PUT", &uri, Some(serde_json::json!({ "code": "x" })))).await;

	assert_eq!(put.status(), StatusCode::NOT_FOUND);
	assert_eq!(read_json(put).await["code"], "NOT_FOUND");

	let delete = send(&app, request("DELETE", &uri, None)).await;

	assert_eq!(delete.status(), StatusCode::NOT_FOUND);

	let put = send(&app, request("PUT", "/notes/42", Some(serde_json::json!({ "code": "x" })))).await;

	assert_eq!(put.status(), StatusCode::NOT_FOUND);

	for body in [None, Some(serde_json::json!({}))] {
		let put = send(&app, request("PUT", &uri, body)).await;

		assert_eq!(put.status(), StatusCode::NOT_FOUND);
		assert_eq!(read_json(put).await["code"], "NOT_FOUND");
	}
}

#[tokio::test]
async fn bad_body_on_existing_note_is_400() {
	let (app, store) = app();
	let note = store.create("graph TD;").await.expect("Failed to seed note.");
	let uri = format!("/notes/{}", note.id);
	let put = send(&app, request("PUT", &uri, Some(serde_json::json!({})))).await;

	assert_eq!(put.status(), StatusCode::BAD_REQUEST);
	assert_eq!(read_json(put).await["code"], "INVALID_REQUEST");
	assert_eq!(store.get(note.id).map(|note| note.code), Some("graph TD;".to_string()));
}

#[tokio::test]
async fn storage_failure_on_existing_note_is_422() {
	let (app, store) = app();
	let note = store.create("graph TD;").await.expect("Failed to seed note.");

	store.set_fail_writes(true);

	let uri = format!("/notes/{}", note.id);
	let put = send(&app, request("PUT", &uri, Some(serde_json::json!({ "code": "graph LR;" })))).await;

	assert_eq!(put.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let json = read_json(put).await;

	assert_eq!(json["code"], "FAILED_OPERATION");
	assert_eq!(json["message"], "Cannot update content for Note.");

	let delete = send(&app, request("DELETE", &uri, None)).await;

	assert_eq!(delete.status(), StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(read_json(delete).await["message"], "Cannot delete Note.");
	assert_eq!(store.get(note.id).map(|note| note.code), Some("graph TD;".to_string()));
}

#[tokio::test]
async fn create_failure_is_422() {
	let (app, store) = app();

	store.set_fail_writes(true);

	let response =
		send(&app, request("POST", "/notes", Some(serde_json::json!({ "code": "graph TD;" }))))
			.await;

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(read_json(response).await["code"], "FAILED_OPERATION");
}

#[tokio::test]
async fn malformed_body_is_400() {
	let (app, _) = app();
	let response = send(&app, request("POST", "/notes", Some(serde_json::json!({ "text": 1 })))).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(read_json(response).await["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn unsupported_verbs_are_405_with_allow() {
	let (app, _) = app();

	for method in ["GET", "HEAD", "PUT", "DELETE", "PATCH"] {
		let response = send(&app, request(method, "/notes", None)).await;

		assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(allow(&response), "POST");
	}

	let uri = format!("/notes/{}", Uuid::new_v4());

	for method in ["POST", "PATCH"] {
		let response = send(&app, request(method, &uri, None)).await;

		assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(allow(&response), "GET, PUT, DELETE");

		let body = String::from_utf8(read_bytes(response).await).expect("Body must be UTF-8.");

		assert_eq!(body, format!("Method {method} Not Allowed"));
	}
}

#[tokio::test]
async fn head_on_note_is_405_even_when_note_exists() {
	let (app, store) = app();
	let note = store.create("graph TD;").await.expect("Failed to seed note.");

	for uri in [format!("/notes/{}", note.id), format!("/notes/{}", Uuid::new_v4())] {
		let response = send(&app, request("HEAD", &uri, None)).await;

		assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(allow(&response), "GET, PUT, DELETE");
	}
}

#[tokio::test]
async fn configured_token_guards_mutations_only() {
	let store = Arc::new(MemoryNoteStore::new());
	let app = app_with(store.clone(), Some("s3cret"));
	let payload = serde_json::json!({ "code": "graph TD;" });
	let response = send(&app, request("POST", "/notes", Some(payload.clone()))).await;

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(read_json(response).await["code"], "UNAUTHORIZED");

	let mut authorized = request("POST", "/notes", Some(payload));

	authorized
		.headers_mut()
		.insert(header::AUTHORIZATION, "Bearer s3cret".parse().expect("Valid header value."));

	let response = send(&app, authorized).await;

	assert_eq!(response.status(), StatusCode::CREATED);

	let id = read_json(response).await["id"].as_str().expect("Missing id.").to_string();
	let response = send(&app, request("GET", &format!("/notes/{id}"), None)).await;

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn page_props_load_shared_note() {
	let (app, store) = app();
	let note = store.create("graph LR;X-->Y;").await.expect("Failed to seed note.");
	let response = send(&app, request("GET", &format!("/page-props?note={}", note.id), None)).await;

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["code"], "graph LR;X-->Y;");
	assert_eq!(json["error"], Value::Null);
	assert_eq!(json["shareId"], note.id.to_string());
	assert_eq!(json["shareUrl"], format!("{BASE_URL}/?note={}", note.id));
}

#[tokio::test]
async fn page_props_fall_back_to_sample_on_missing_note() {
	let (app, _) = app();
	let response =
		send(&app, request("GET", &format!("/page-props?note={}", Uuid::new_v4()), None)).await;
	let json = read_json(response).await;

	assert_eq!(json["code"], marpad_editor::SAMPLE_CODE);
	assert_eq!(json["error"], "Note does not exist.");
	assert_eq!(json["shareUrl"], Value::Null);

	let response = send(&app, request("GET", "/page-props", None)).await;
	let json = read_json(response).await;

	assert_eq!(json["code"], marpad_editor::SAMPLE_CODE);
	assert_eq!(json["error"], Value::Null);
}

#[tokio::test]
async fn index_renders_escaped_note() {
	let (app, store) = app();
	let note = store.create("graph TD;A-->B;").await.expect("Failed to seed note.");
	let response = send(&app, request("GET", &format!("/?note={}", note.id), None)).await;

	assert_eq!(response.status(), StatusCode::OK);

	let html = String::from_utf8(read_bytes(response).await).expect("Body must be UTF-8.");

	assert!(html.contains("<title>MarPad</title>"));
	assert!(html.contains("graph TD;A--&gt;B;"));
	assert!(html.contains(&format!("{BASE_URL}/?note={}", note.id)));
}

fn pg_config(dsn: String) -> marpad_config::Config {
	use marpad_config::{Config, Editor, Postgres, Renderer, Security, Service, Storage};

	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			public_base_url: BASE_URL.to_string(),
		},
		storage: Storage { postgres: Postgres { dsn, pool_max_conns: 1 } },
		renderer: Renderer {
			api_base: "http://127.0.0.1:1".to_string(),
			path: "/mermaid/svg".to_string(),
			timeout_ms: 1_000,
			default_headers: Default::default(),
		},
		editor: Editor {
			api_base: "http://127.0.0.1:1".to_string(),
			render_debounce_ms: 500,
			persist_debounce_ms: 500,
		},
		security: Security { bind_localhost_only: true, api_auth_token: None },
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MARPAD_PG_DSN to run."]
async fn postgres_backed_note_lifecycle() {
	let Some(base_dsn) = marpad_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set MARPAD_PG_DSN to run this test.");

		return;
	};
	let test_db = marpad_testkit::TestDatabase::new(&base_dsn)
		.await
		.expect("Failed to create test database.");
	let config = pg_config(test_db.dsn().to_string());
	let state = AppState::new(&config).await.expect("Failed to initialize app state.");
	let app = routes::router(state);
	let response =
		send(&app, request("POST", "/notes", Some(serde_json::json!({ "code": "graph TD;" }))))
			.await;

	assert_eq!(response.status(), StatusCode::CREATED);

	let id = read_json(response).await["id"].as_str().expect("Missing id.").to_string();
	let uri = format!("/notes/{id}");
	let put = send(&app, request("PUT", &uri, Some(serde_json::json!({ "code": "graph LR;" })))).await;

	assert_eq!(put.status(), StatusCode::NO_CONTENT);

	let get = send(&app, request("GET", &uri, None)).await;

	assert_eq!(read_json(get).await["code"], "graph LR;");

	let delete = send(&app, request("DELETE", &uri, None)).await;

	assert_eq!(delete.status(), StatusCode::NO_CONTENT);

	let delete = send(&app, request("DELETE", &uri, None)).await;

	assert_eq!(delete.status(), StatusCode::NOT_FOUND);

	drop(app);
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
