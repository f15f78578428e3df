//! Line-oriented terminal front end for the editor view-model.
//!
//! Every input line is appended to the document. Lines starting with `:` are commands:
//! `:share`, `:url`, `:show` and `:quit`.

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use marpad_editor::{
	Editor, EditorDeps, EditorSettings, HttpNotesClient, HttpRenderer, NotesClient, RenderView,
};

#[derive(Debug, Parser)]
#[command(
	version = marpad_cli::VERSION,
	rename_all = "kebab",
	styles = marpad_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Share id of a note to open and keep in sync.
	#[arg(long, short = 'n', value_name = "ID")]
	pub note: Option<Uuid>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
	Share,
	Url,
	Show,
	Quit,
	Unknown(String),
	Append(String),
}
impl Command {
	pub fn parse(line: &str) -> Self {
		match line.trim_end() {
			":share" => Self::Share,
			":url" => Self::Url,
			":show" => Self::Show,
			":quit" | ":q" => Self::Quit,
			other if other.starts_with(':') => Self::Unknown(other.to_string()),
			_ => Self::Append(line.to_string()),
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = marpad_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let notes = Arc::new(HttpNotesClient::new(
		config.editor.api_base.clone(),
		config.security.api_auth_token.clone(),
	)?);
	let (code, share_id) = match args.note {
		Some(id) => match notes.fetch(id).await? {
			Some(note) => (note.code, Some(note.id)),
			None => return Err(eyre::eyre!("Note {id} does not exist.")),
		},
		None => (marpad_editor::SAMPLE_CODE.to_string(), None),
	};
	let settings = EditorSettings::from_config(&config.editor, config.service.public_base_url.clone());
	let deps = EditorDeps { notes, renderer: Arc::new(HttpRenderer::new(config.renderer.clone())) };
	let mut editor = Editor::new(settings, deps, code, share_id)?;
	let mut renders = editor.subscribe_render();

	tokio::spawn(async move {
		while renders.changed().await.is_ok() {
			let view = renders.borrow_and_update().clone();

			println!("{}", describe(&view));
		}
	});

	println!("{}", editor.code());

	let mut lines = BufReader::new(io::stdin()).lines();

	while let Some(line) = lines.next_line().await? {
		match Command::parse(&line) {
			Command::Share => match editor.share().await {
				Ok(_) => println!("{}", editor.share_url().unwrap_or_default()),
				Err(err) => eprintln!("Share failed: {err}"),
			},
			Command::Url => match editor.share_url() {
				Some(url) => println!("{url}"),
				None => println!("Not shared yet; use :share."),
			},
			Command::Show => {
				println!("{}", editor.code());
				println!("{}", describe(&editor.render_view()));
				println!("sync: {:?}", editor.sync_view());
			},
			Command::Quit => break,
			Command::Unknown(command) => eprintln!("Unknown command {command}."),
			Command::Append(text) => {
				let mut code = editor.code().to_string();

				if !code.is_empty() && !code.ends_with('\n') {
					code.push('\n');
				}

				code.push_str(&text);
				editor.edit(code);
			},
		}
	}

	Ok(())
}

fn describe(view: &RenderView) -> String {
	match &view.error {
		Some(err) => format!("render failed: {err}"),
		None => format!("rendered {} bytes", view.diagram.len()),
	}
}
