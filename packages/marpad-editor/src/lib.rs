//! Client-side editor state: the current diagram source, its rendered output and the share id
//! that turns local edits into auto-saved notes.

pub mod client;
pub mod debounce;
pub mod editor;
pub mod renderer;
pub mod share;

mod error;

pub use client::{HttpNotesClient, SharedNote};
pub use debounce::Debouncer;
pub use editor::{Editor, EditorDeps, EditorSettings, RenderView, ShareState, SyncView};
pub use error::{Error, Result};
pub use renderer::HttpRenderer;
pub use share::share_url;

use std::{future::Future, pin::Pin};

use uuid::Uuid;

/// Diagram shown before the user has typed or loaded anything.
pub const SAMPLE_CODE: &str = "graph TD;\nA-->B;\nA-->C;\nB-->D;\nC-->D;";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait NotesClient
where
	Self: Send + Sync,
{
	fn create<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<SharedNote>>;

	fn fetch<'a>(&'a self, id: Uuid) -> BoxFuture<'a, Result<Option<SharedNote>>>;

	fn update<'a>(&'a self, id: Uuid, code: &'a str) -> BoxFuture<'a, Result<()>>;
}

pub trait DiagramRenderer
where
	Self: Send + Sync,
{
	fn render<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<String>>;
}

pub trait Clipboard {
	/// Clipboard writes are only permitted from a secure context.
	fn is_secure_context(&self) -> bool;

	fn write_text(&self, text: &str) -> Result<()>;
}
