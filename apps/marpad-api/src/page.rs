//! Server-rendered entry page. Loads the note named by `?note=` so the editor starts from it.

use axum::{
	Json,
	extract::{Query, State},
	response::Html,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

const PAGE_TITLE: &str = "MarPad";
/// Browser side of the editor: renders with mermaid after a quiet period, shares through
/// `POST /notes` and auto-saves shared notes with `PUT /notes/{id}`.
const EDITOR_SCRIPT: &str = r#"import mermaid from "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";

const QUIET_MS = 500;
const props = JSON.parse(document.getElementById("page-props").textContent);
const code = document.getElementById("code");
const diagram = document.getElementById("diagram");
const share = document.getElementById("share");
const link = document.getElementById("share-url");
const status = document.getElementById("status");
let shareId = props.shareId;
let renderTimer;
let saveTimer;
let renders = 0;

mermaid.initialize({ startOnLoad: false });

function debounce(timer, action) {
	clearTimeout(timer);
	return setTimeout(action, QUIET_MS);
}

async function render() {
	try {
		const { svg } = await mermaid.render(`diagram${renders++}`, code.value);
		diagram.innerHTML = svg;
		status.textContent = "";
	} catch (err) {
		status.textContent = err.message;
	}
}

async function save() {
	const res = await fetch(`/notes/${shareId}`, {
		method: "PUT",
		headers: { "Content-Type": "application/json" },
		body: JSON.stringify({ code: code.value }),
	});
	status.textContent = res.ok ? "" : (await res.json()).message;
}

function showLink(url) {
	link.href = url;
	link.textContent = url;
	link.hidden = false;
	share.disabled = true;
}

code.addEventListener("input", () => {
	renderTimer = debounce(renderTimer, render);
	if (shareId) {
		saveTimer = debounce(saveTimer, save);
	}
});

share.addEventListener("click", async () => {
	if (shareId) {
		return;
	}
	const res = await fetch("/notes", {
		method: "POST",
		headers: { "Content-Type": "application/json" },
		body: JSON.stringify({ code: code.value }),
	});
	const body = await res.json();
	if (!res.ok) {
		status.textContent = body.message;
		return;
	}
	shareId = body.id;
	const url = new URL("/", window.location.origin);
	url.searchParams.set("note", shareId);
	showLink(url.toString());
	if (window.isSecureContext && navigator.clipboard) {
		navigator.clipboard.writeText(url.toString());
	}
});

if (props.shareUrl) {
	showLink(props.shareUrl);
}
renderTimer = debounce(renderTimer, render);
"#;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
	pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
	pub code: String,
	pub error: Option<String>,
	pub share_id: Option<Uuid>,
	pub share_url: Option<String>,
}

pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
	let props = load_props(&state, query.note.as_deref()).await;

	Html(render_page(&props))
}

pub async fn props(
	State(state): State<AppState>,
	Query(query): Query<PageQuery>,
) -> Json<PageProps> {
	Json(load_props(&state, query.note.as_deref()).await)
}

pub async fn load_props(state: &AppState, note: Option<&str>) -> PageProps {
	let mut props = PageProps {
		code: marpad_editor::SAMPLE_CODE.to_string(),
		error: None,
		share_id: None,
		share_url: None,
	};
	let Some(raw) = note.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return props;
	};
	let found = match Uuid::parse_str(raw) {
		Ok(id) => state.notes.find_by_id(id).await,
		Err(_) => None,
	};
	let Some(found) = found else {
		tracing::info!(note = raw, "Requested note does not exist.");

		props.error = Some("Note does not exist.".to_string());

		return props;
	};

	props.share_url = match marpad_editor::share_url(&state.settings.public_base_url, found.id) {
		Ok(url) => Some(url),
		Err(err) => {
			tracing::warn!(error = %err, "Failed to build share URL.");

			None
		},
	};
	props.code = found.code;
	props.share_id = Some(found.id);

	props
}

pub fn render_page(props: &PageProps) -> String {
	let error = props
		.error
		.as_deref()
		.map(|message| format!("<p class=\"error\" role=\"alert\">{}</p>", escape_html(message)))
		.unwrap_or_default();
	let share = match props.share_url.as_deref() {
		Some(url) => {
			let url = escape_html(url);

			format!("<a id=\"share-url\" class=\"share-url\" href=\"{url}\">{url}</a>")
		},
		None => "<a id=\"share-url\" class=\"share-url\" hidden></a>".to_string(),
	};
	let props_json = serde_json::to_string(props)
		.unwrap_or_else(|_| "{}".to_string())
		.replace('<', "\\u003c")
		.replace('>', "\\u003e")
		.replace('&', "\\u0026");

	format!(
		"<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<meta name=\"viewport\" content=\"initial-scale=1.0, width=device-width\">
<title>{PAGE_TITLE}</title>
</head>
<body>
<header><nav><a href=\"/\">{PAGE_TITLE}</a></nav></header>
<main>
{error}<div class=\"editor\">
<textarea id=\"code\">{code}</textarea>
<pre><code id=\"diagram\"></code></pre>
</div>
<hr>
<button id=\"share\" type=\"button\">Share</button>
{share}
<p id=\"status\" role=\"status\"></p>
<script type=\"application/json\" id=\"page-props\">{props_json}</script>
<script type=\"module\">{EDITOR_SCRIPT}</script>
</main>
</body>
</html>
",
		code = escape_html(&props.code),
	)
}

pub fn escape_html(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(ch),
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escapes_markup_characters() {
		assert_eq!(escape_html("A-->B & <C> \"d\" 'e'"), "A--&gt;B &amp; &lt;C&gt; &quot;d&quot; &#39;e&#39;");
	}

	#[test]
	fn embedded_props_cannot_close_the_script_tag() {
		let props = PageProps {
			code: "</script><script>alert(1)</script>".to_string(),
			error: None,
			share_id: None,
			share_url: None,
		};
		let html = render_page(&props);

		assert_eq!(html.matches("</script>").count(), 2);
		assert!(html.contains("&lt;/script&gt;"));
	}

	#[test]
	fn page_wires_share_and_auto_save() {
		let props = PageProps {
			code: marpad_editor::SAMPLE_CODE.to_string(),
			error: None,
			share_id: None,
			share_url: None,
		};
		let html = render_page(&props);

		assert!(html.contains("<script type=\"module\">"));
		assert!(html.contains("method: \"POST\""));
		assert!(html.contains("method: \"PUT\""));
		assert!(html.contains("<a id=\"share-url\" class=\"share-url\" hidden></a>"));
	}
}
