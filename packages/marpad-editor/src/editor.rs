use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use uuid::Uuid;

use crate::{Clipboard, Debouncer, DiagramRenderer, NotesClient, Result, share};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareState {
	/// Local only; edits are never persisted.
	Unshared,
	/// Persisted; every edit is auto-saved to the note.
	Shared { id: Uuid },
}

/// Latest render outcome. A failed render keeps the previous diagram and records the error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderView {
	pub diagram: String,
	/// Source the current `diagram` was rendered from.
	pub source: String,
	pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SyncView {
	#[default]
	Idle,
	Saved,
	Failed { message: String },
}

#[derive(Clone, Debug)]
pub struct EditorSettings {
	/// Origin share links are built on, e.g. "https://marpad.example.com".
	pub origin: String,
	pub render_quiet: Duration,
	pub persist_quiet: Duration,
}
impl EditorSettings {
	pub fn from_config(cfg: &marpad_config::Editor, origin: impl Into<String>) -> Self {
		Self {
			origin: origin.into(),
			render_quiet: Duration::from_millis(cfg.render_debounce_ms),
			persist_quiet: Duration::from_millis(cfg.persist_debounce_ms),
		}
	}
}

#[derive(Clone)]
pub struct EditorDeps {
	pub notes: Arc<dyn NotesClient>,
	pub renderer: Arc<dyn DiagramRenderer>,
}

/// Editor view-model.
///
/// Must be created inside a tokio runtime; the render and persist debouncers each own a task
/// that is cancelled when the editor is dropped.
pub struct Editor {
	code: String,
	share: ShareState,
	share_url: Option<String>,
	settings: EditorSettings,
	notes: Arc<dyn NotesClient>,
	render_view: watch::Receiver<RenderView>,
	sync_tx: Arc<watch::Sender<SyncView>>,
	sync_view: watch::Receiver<SyncView>,
	render: Debouncer<String>,
	persist: Option<Debouncer<String>>,
}
impl Editor {
	pub fn new(
		settings: EditorSettings,
		deps: EditorDeps,
		code: impl Into<String>,
		share_id: Option<Uuid>,
	) -> Result<Self> {
		share::parse_origin(&settings.origin)?;

		let code = code.into();
		let (render_tx, render_view) = watch::channel(RenderView::default());
		let (sync_tx, sync_view) = watch::channel(SyncView::default());
		let render = spawn_render(settings.render_quiet, deps.renderer, Arc::new(render_tx));
		let mut editor = Self {
			code,
			share: ShareState::Unshared,
			share_url: None,
			settings,
			notes: deps.notes,
			render_view,
			sync_tx: Arc::new(sync_tx),
			sync_view,
			render,
			persist: None,
		};

		if let Some(id) = share_id {
			editor.set_share_id(id)?;
		}

		editor.render.schedule(editor.code.clone());

		Ok(editor)
	}

	pub fn code(&self) -> &str {
		&self.code
	}

	pub fn share_state(&self) -> ShareState {
		self.share
	}

	pub fn share_url(&self) -> Option<&str> {
		self.share_url.as_deref()
	}

	pub fn render_view(&self) -> RenderView {
		self.render_view.borrow().clone()
	}

	pub fn subscribe_render(&self) -> watch::Receiver<RenderView> {
		self.render_view.clone()
	}

	pub fn sync_view(&self) -> SyncView {
		self.sync_view.borrow().clone()
	}

	/// Replaces the source text. Re-rendering is always scheduled; persistence only once shared.
	pub fn edit(&mut self, code: impl Into<String>) {
		self.code = code.into();

		self.render.schedule(self.code.clone());

		if let Some(persist) = &self.persist {
			persist.schedule(self.code.clone());
		}
	}

	/// Persists the current text as a new note and switches to auto-save. Sharing an already
	/// shared editor returns its id without another request.
	pub async fn share(&mut self) -> Result<Uuid> {
		if let ShareState::Shared { id } = self.share {
			return Ok(id);
		}

		let note = self.notes.create(&self.code).await?;

		self.set_share_id(note.id)?;

		tracing::info!(note_id = %note.id, "Note shared.");

		Ok(note.id)
	}

	/// Copies the share link. Returns `false` without touching the clipboard when there is no
	/// link yet or the clipboard is unavailable.
	pub fn copy_share_url(&self, clipboard: &dyn Clipboard) -> Result<bool> {
		let Some(url) = self.share_url.as_deref() else {
			return Ok(false);
		};

		if !clipboard.is_secure_context() {
			return Ok(false);
		}

		clipboard.write_text(url)?;

		Ok(true)
	}

	fn set_share_id(&mut self, id: Uuid) -> Result<()> {
		self.share_url = Some(share::share_url(&self.settings.origin, id)?);
		self.share = ShareState::Shared { id };
		self.persist = Some(spawn_persist(
			self.settings.persist_quiet,
			id,
			self.notes.clone(),
			self.sync_tx.clone(),
		));

		Ok(())
	}
}

fn spawn_render(
	quiet: Duration,
	renderer: Arc<dyn DiagramRenderer>,
	tx: Arc<watch::Sender<RenderView>>,
) -> Debouncer<String> {
	Debouncer::spawn(quiet, move |code: String| {
		let renderer = renderer.clone();
		let tx = tx.clone();

		async move {
			match renderer.render(&code).await {
				Ok(diagram) => tx.send_modify(|view| {
					view.diagram = diagram;
					view.source = code;
					view.error = None;
				}),
				Err(err) => {
					tracing::debug!(error = %err, "Diagram render failed.");

					tx.send_modify(|view| view.error = Some(err.to_string()));
				},
			}
		}
	})
}

fn spawn_persist(
	quiet: Duration,
	id: Uuid,
	notes: Arc<dyn NotesClient>,
	tx: Arc<watch::Sender<SyncView>>,
) -> Debouncer<String> {
	Debouncer::spawn(quiet, move |code: String| {
		let notes = notes.clone();
		let tx = tx.clone();

		async move {
			match notes.update(id, &code).await {
				Ok(()) => {
					tx.send_replace(SyncView::Saved);
				},
				Err(err) => {
					tracing::warn!(note_id = %id, error = %err, "Note auto-save failed.");

					tx.send_replace(SyncView::Failed { message: err.to_string() });
				},
			}
		}
	})
}
